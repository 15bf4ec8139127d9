//! # inspector-render
//!
//! レプリカのスナップショットを表示用のレイアウトに変換する。
//!
//! ```text
//! &[u8] (現在) ─┐
//!               ├─▶ hexdump::render ─▶ HexLayout ─▶ to_html() / to_text()
//! &[u8] (前回) ─┘
//!
//! HexView: 前回スナップショットとリビジョンを保持し、
//!          新しいデータのときだけ最初の変更位置へのスクロールを 1 回要求する
//! ```
//!
//! DOM には触れない。HTML 文字列と要素 ID を返し、スクロールはホストが行う。

pub mod hexdump;
pub mod listing;
pub mod view;

pub use hexdump::{render, HexCell, HexLayout, HexRow};
pub use listing::{render_program, render_registers, selected_entry_id};
pub use view::HexView;

/// 1 行あたりのデフォルト列数
pub const DEFAULT_COLUMNS: usize = 16;

/// HTML テキストのエスケープ
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("ld a,<b>"), "ld a,&lt;b&gt;");
        assert_eq!(escape_html(r#"a&"b'"#), "a&amp;&quot;b&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }
}

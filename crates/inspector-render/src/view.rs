//! 状態を持つ 16 進ダンプビュー
//!
//! 前回のスナップショットとリビジョンを覚えておき、
//! 「新しいデータによる再描画」と「同じデータの再描画」を区別する。
//!
//! ```text
//! render(buf, rev)
//!   rev == last_rev ─▶ キャッシュしたレイアウトを返す（スクロール要求なし）
//!   rev != last_rev ─▶ 前回スナップショットと差分 → スナップショット置き換え
//!                      → 最初の変更があればスクロール要求を 1 回だけ立てる
//! ```

use tracing::trace;

use crate::hexdump::{cell_id, render, HexLayout};
use crate::DEFAULT_COLUMNS;

/// 差分を覚える 16 進ダンプビュー
#[derive(Debug, Clone)]
pub struct HexView {
    /// 要素 ID の接頭辞（例: `"memory"`）
    id_prefix: String,
    columns: usize,
    /// 最後に描画した内容
    snapshot: Option<Vec<u8>>,
    /// 最後に描画したリビジョン
    last_revision: Option<u64>,
    layout: HexLayout,
    /// まだ取り出されていないスクロール先のアドレス
    pending_scroll: Option<usize>,
}

impl HexView {
    /// ビューを生成する
    pub fn new(id_prefix: impl Into<String>, columns: usize) -> Self {
        HexView {
            id_prefix: id_prefix.into(),
            columns: columns.max(1),
            snapshot: None,
            last_revision: None,
            layout: HexLayout::default(),
            pending_scroll: None,
        }
    }

    /// 1 行あたりの列数
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// 列数を変える（次の描画で行を組み直す。強調は維持しない）
    pub fn set_columns(&mut self, columns: usize) {
        let columns = columns.max(1);
        if columns != self.columns {
            self.columns = columns;
            self.last_revision = None;
            self.pending_scroll = None;
            if let Some(snapshot) = &self.snapshot {
                self.layout = render(snapshot, None, self.columns);
            }
        }
    }

    /// バッファを描画する
    ///
    /// # 引数
    /// - `current`: レプリカの現在の内容
    /// - `revision`: レプリカのリビジョン番号
    pub fn render(&mut self, current: &[u8], revision: u64) -> &HexLayout {
        if self.last_revision == Some(revision) && self.snapshot.is_some() {
            return &self.layout;
        }

        let layout = render(current, self.snapshot.as_deref(), self.columns);
        // 取り出されなかった前回の要求は持ち越さない
        self.pending_scroll = layout.first_change;
        if let Some(address) = layout.first_change {
            trace!(view = %self.id_prefix, address, "scroll armed");
        }

        self.layout = layout;
        self.snapshot = Some(current.to_vec());
        self.last_revision = Some(revision);
        &self.layout
    }

    /// バッファを描画して HTML を返す（セル ID はこのビューの接頭辞）
    pub fn render_html(&mut self, current: &[u8], revision: u64) -> String {
        self.render(current, revision);
        self.layout.to_html(&self.id_prefix)
    }

    /// 最後のレイアウト
    pub fn layout(&self) -> &HexLayout {
        &self.layout
    }

    /// スクロール先のアドレスを取り出す（新しいデータごとに 1 回だけ）
    pub fn take_scroll_target(&mut self) -> Option<usize> {
        self.pending_scroll.take()
    }

    /// スクロール先の要素 ID を取り出す
    pub fn take_scroll_element_id(&mut self) -> Option<String> {
        self.take_scroll_target()
            .map(|address| cell_id(&self.id_prefix, address))
    }

    /// スナップショットを捨てる（次の描画は何も強調しない）
    pub fn forget(&mut self) {
        self.snapshot = None;
        self.last_revision = None;
        self.layout = HexLayout::default();
        self.pending_scroll = None;
    }
}

impl Default for HexView {
    fn default() -> Self {
        HexView::new("hexdump", DEFAULT_COLUMNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_render_arms_nothing() {
        let mut view = HexView::new("memory", 4);
        let layout = view.render(&[1, 2, 3, 4], 1);
        assert!(!layout.has_changes());
        assert_eq!(view.take_scroll_target(), None);
    }

    #[test]
    fn test_new_revision_scrolls_once() {
        let mut view = HexView::new("memory", 4);
        view.render(&[0, 0, 0, 0], 1);

        let layout = view.render(&[0, 0, 1, 0], 2);
        assert_eq!(layout.first_change, Some(2));
        assert_eq!(view.take_scroll_target(), Some(2));
        assert_eq!(view.take_scroll_target(), None);
    }

    #[test]
    fn test_same_revision_keeps_highlight_without_scroll() {
        let mut view = HexView::new("memory", 4);
        view.render(&[0, 0, 0, 0], 1);
        view.render(&[0, 0, 1, 0], 2);
        assert_eq!(view.take_scroll_target(), Some(2));

        let layout = view.render(&[0, 0, 1, 0], 2);
        assert_eq!(layout.changed, vec![2]);
        assert_eq!(view.take_scroll_target(), None);
    }

    #[test]
    fn test_next_revision_diffs_against_latest_snapshot() {
        let mut view = HexView::new("memory", 4);
        view.render(&[0, 0, 0, 0], 1);
        view.render(&[0, 0, 1, 0], 2);
        let layout = view.render(&[5, 0, 1, 0], 3);
        assert_eq!(layout.changed, vec![0]);
    }

    #[test]
    fn test_forget_resets_highlighting() {
        let mut view = HexView::new("memory", 4);
        view.render(&[0, 0, 0, 0], 1);
        view.render(&[0, 0, 1, 0], 2);
        view.forget();

        let layout = view.render(&[0, 0, 1, 1], 3);
        assert!(!layout.has_changes());
        assert_eq!(view.take_scroll_target(), None);
    }

    #[test]
    fn test_scroll_element_id() {
        let mut view = HexView::new("vram", 16);
        view.render(&[0; 32], 1);
        let mut next = [0u8; 32];
        next[0x11] = 3;
        view.render(&next, 2);
        assert_eq!(view.take_scroll_element_id().as_deref(), Some("vram-0011"));
    }

    #[test]
    fn test_untaken_target_not_carried_into_unchanged_render() {
        let mut view = HexView::new("memory", 4);
        view.render(&[0, 0, 0, 0], 1);
        view.render(&[0, 0, 1, 0], 2);

        // リビジョンは進んだが内容は同じ
        let layout = view.render(&[0, 0, 1, 0], 3);
        assert!(!layout.has_changes());
        assert_eq!(view.take_scroll_target(), None);
    }

    #[test]
    fn test_untaken_target_replaced_by_latest_change() {
        let mut view = HexView::new("memory", 4);
        view.render(&[0, 0, 0, 0], 1);
        view.render(&[0, 0, 1, 0], 2);
        view.render(&[0, 0, 1, 7], 3);
        assert_eq!(view.take_scroll_target(), Some(3));
    }

    #[test]
    fn test_render_html_uses_prefix() {
        let mut view = HexView::new("vram", 4);
        view.render(&[0; 4], 1);
        let html = view.render_html(&[0, 9, 0, 0], 2);
        assert!(html.contains(r#"<div class="hexdump__content changed" id="vram-0001">09</div>"#));
    }

    #[test]
    fn test_set_columns_relayouts() {
        let mut view = HexView::new("memory", 4);
        view.render(&[1, 2, 3, 4, 5, 6, 7, 8], 1);
        view.set_columns(8);
        assert_eq!(view.layout().rows.len(), 1);
        assert_eq!(view.columns(), 8);
    }
}

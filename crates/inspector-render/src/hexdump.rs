//! 差分付き 16 進ダンプ
//!
//! ## 1 行の形
//! ```text
//! 0010  ff 00 41 00 ...  ..A. ...
//! ^^^^  ^^^^^^^^^^^^^^^  ^^^^^^^^
//! アドレス (4 桁 16 進)  ASCII (32..=126 はそのまま、それ以外は '.')
//! ```
//! 位置が「変更あり」になるのは、前回スナップショットがあり、その位置を含み、
//! 値が異なる場合だけ。

use core::fmt::Write as _;

use crate::escape_html;

/// 1 バイト分のセル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexCell {
    pub address: usize,
    pub value: u8,
    /// 前回のレンダリングから値が変わった
    pub changed: bool,
}

impl HexCell {
    /// 2 桁の 16 進表記
    pub fn hex(&self) -> String {
        format!("{:02x}", self.value)
    }

    /// ASCII 列の表示文字
    pub fn ascii(&self) -> char {
        printable(self.value)
    }
}

/// 1 行分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexRow {
    /// 行の先頭アドレス
    pub address: usize,
    pub cells: Vec<HexCell>,
}

impl HexRow {
    /// 0 埋め 4 桁の 16 進アドレス
    pub fn address_label(&self) -> String {
        format!("{:04x}", self.address)
    }
}

/// レンダリング結果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HexLayout {
    pub columns: usize,
    pub rows: Vec<HexRow>,
    /// 変更のあったアドレス（昇順）
    pub changed: Vec<usize>,
    /// 最も小さい変更アドレス
    pub first_change: Option<usize>,
}

/// バッファを行に分割し、前回スナップショットとの差分を付ける
///
/// # 引数
/// - `current`: 現在のバッファ
/// - `previous`: 前回レンダリング時のバッファ（初回は None。何も強調しない）
/// - `columns`: 1 行あたりのバイト数（0 は 1 として扱う）
pub fn render(current: &[u8], previous: Option<&[u8]>, columns: usize) -> HexLayout {
    let columns = columns.max(1);
    let mut changed = Vec::new();

    let rows = current
        .chunks(columns)
        .enumerate()
        .map(|(row, chunk)| {
            let base = row * columns;
            let cells = chunk
                .iter()
                .enumerate()
                .map(|(offset, &value)| {
                    let address = base + offset;
                    let is_changed = previous
                        .and_then(|prev| prev.get(address))
                        .is_some_and(|&old| old != value);
                    if is_changed {
                        changed.push(address);
                    }
                    HexCell {
                        address,
                        value,
                        changed: is_changed,
                    }
                })
                .collect();
            HexRow {
                address: base,
                cells,
            }
        })
        .collect();

    let first_change = changed.first().copied();
    HexLayout {
        columns,
        rows,
        changed,
        first_change,
    }
}

/// セルの要素 ID
pub fn cell_id(id_prefix: &str, address: usize) -> String {
    format!("{}-{:04x}", id_prefix, address)
}

fn printable(value: u8) -> char {
    if (32..=126).contains(&value) {
        value as char
    } else {
        '.'
    }
}

impl HexLayout {
    /// 変更の有無
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }

    /// アドレスのセルを探す
    pub fn cell(&self, address: usize) -> Option<&HexCell> {
        self.rows
            .get(address / self.columns.max(1))
            .and_then(|row| row.cells.iter().find(|cell| cell.address == address))
    }

    /// HTML を生成する
    ///
    /// 16 進セルには `{id_prefix}-{address}` の ID を付け、変更セルには
    /// `changed` クラスを付ける。
    pub fn to_html(&self, id_prefix: &str) -> String {
        let prefix = escape_html(id_prefix);
        let mut html = String::from(r#"<div class="hexdump">"#);

        for row in &self.rows {
            let _ = write!(
                html,
                r#"<div class="hexdump__entry"><div class="hexdump__address">{}</div><div class="hexdump__contents">"#,
                row.address_label()
            );
            for cell in &row.cells {
                let class = if cell.changed {
                    "hexdump__content changed"
                } else {
                    "hexdump__content"
                };
                let _ = write!(
                    html,
                    r#"<div class="{}" id="{}">{}</div>"#,
                    class,
                    cell_id(&prefix, cell.address),
                    cell.hex()
                );
            }
            html.push_str(r#"</div><div class="hexdump__contents">"#);
            for cell in &row.cells {
                let class = if cell.changed {
                    "hexdump__content changed"
                } else {
                    "hexdump__content"
                };
                let ch = cell.ascii().to_string();
                let _ = write!(html, r#"<div class="{}">{}</div>"#, class, escape_html(&ch));
            }
            html.push_str("</div></div>");
        }

        html.push_str("</div>");
        html
    }

    /// 古典的なテキスト形式の 16 進ダンプ
    ///
    /// 変更セルの直後には `*` を付ける。
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for row in &self.rows {
            text.push_str(&row.address_label());
            text.push(' ');
            for cell in &row.cells {
                let _ = write!(text, " {}", cell.hex());
                if cell.changed {
                    text.push('*');
                }
            }
            // 最終行が短いときも ASCII 列の位置を揃える
            for _ in row.cells.len()..self.columns {
                text.push_str("   ");
            }
            text.push_str("  ");
            text.extend(row.cells.iter().map(HexCell::ascii));
            text.push('\n');
        }
        text
    }
}

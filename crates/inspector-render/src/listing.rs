//! レジスタとプログラムリストのマークアップ

use core::fmt::Write as _;

use inspector_proto::{ProgramEntry, Status};

use crate::escape_html;

/// 選択中の命令の要素 ID
pub fn selected_entry_id(pc: u16) -> String {
    format!("opcode-{:04x}", pc)
}

/// レジスタ一覧の HTML（名前は大文字）
pub fn render_registers(status: &Status) -> String {
    let mut html = String::from(r#"<div class="registers">"#);
    for register in &status.registers {
        let _ = write!(
            html,
            r#"<div class="register"><div class="register__name">{}</div><div class="register__value">{}</div></div>"#,
            escape_html(&register.name.to_uppercase()),
            register.value
        );
    }
    html.push_str("</div>");
    html
}

/// プログラムリストの HTML
///
/// PC と同じアドレスの命令に `selected` を付け、[`selected_entry_id`] の ID を与える。
///
/// # 引数
/// - `entries`: アドレス昇順のリスト
/// - `pc`: 現在の PC（ステータス未受信なら None。何も選択しない）
pub fn render_program(entries: &[ProgramEntry], pc: Option<u16>) -> String {
    let mut html = String::from(r#"<div class="opcodes">"#);
    for entry in entries {
        if pc == Some(entry.address) {
            let _ = write!(
                html,
                r#"<div class="opcode selected" id="{}">"#,
                selected_entry_id(entry.address)
            );
        } else {
            html.push_str(r#"<div class="opcode">"#);
        }
        let _ = write!(
            html,
            r#"<div class="opcode__column opcode__address">{}</div><div class="opcode__column opcode__hex">{}</div><div class="opcode__column opcode__instruction">{}</div></div>"#,
            entry.address,
            escape_html(&entry.raw_bytes_hex),
            escape_html(&entry.mnemonic)
        );
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_proto::Register;

    fn entry(address: u16, hex: &str, mnemonic: &str) -> ProgramEntry {
        ProgramEntry {
            address,
            raw_bytes_hex: hex.into(),
            mnemonic: mnemonic.into(),
        }
    }

    #[test]
    fn test_register_names_uppercased() {
        let status = Status {
            program_counter: 0,
            registers: vec![
                Register {
                    name: "hl".into(),
                    value: 258,
                },
                Register {
                    name: "a".into(),
                    value: -1,
                },
            ],
        };
        let html = render_registers(&status);
        assert!(
            html.contains(r#"<div class="register__name">HL</div><div class="register__value">258</div>"#)
        );
        assert!(
            html.contains(r#"<div class="register__name">A</div><div class="register__value">-1</div>"#)
        );
    }

    #[test]
    fn test_program_selects_pc() {
        let entries = vec![entry(0, "3e01", "ld a,1"), entry(2, "c9", "ret")];
        let html = render_program(&entries, Some(2));

        assert_eq!(html.matches("selected").count(), 1);
        assert!(html.contains(r#"<div class="opcode selected" id="opcode-0002">"#));
        assert!(html.contains(r#"<div class="opcode__column opcode__instruction">ret</div>"#));
    }

    #[test]
    fn test_program_without_status_selects_nothing() {
        let entries = vec![entry(0, "00", "nop")];
        let html = render_program(&entries, None);
        assert!(!html.contains("selected"));
    }

    #[test]
    fn test_program_escapes_mnemonic() {
        let entries = vec![entry(0, "00", "ld a,<x>")];
        assert!(render_program(&entries, None).contains("ld a,&lt;x&gt;"));
    }
}

//! # inspector-proto
//!
//! インスペクタとリモートエミュレータ間の JSON ワイヤーメッセージ。
//!
//! ## 2 種類のトランスポート
//!
//! - **ポーリング（HTTP）**: `GET status` / `GET program` /
//!   `GET memory?hash=<fp>` / `GET vram?hash=<fp>` / `POST step` / `POST reset`
//! - **プッシュ（永続チャンネル）**: `{"type": ..., "data": ...}` 形式のテキストフレーム
//!
//! どちらもペイロードの型（[`Status`], [`ProgramEntry`], [`DeltaPatch`],
//! [`BufferPayload`]）は共通。
//!
//! ## フィンガープリント
//!
//! ハッシュは 10 進数文字列の不透明な値として扱い、このクレートでは解釈しない。

use serde::{Deserialize, Serialize};

pub mod error;
pub mod message;
pub mod patch;

pub use error::ProtoError;
pub use message::{ClientMessage, ServerMessage, SyncRequest};
pub use patch::{BufferPayload, DeltaPatch};

/// HTTP エンドポイント名（API ベースからの相対パス）
pub mod endpoint {
    /// `GET` → [`Status`](crate::Status)
    pub const STATUS: &str = "status";
    /// `GET` → `Vec<ProgramEntry>`
    pub const PROGRAM: &str = "program";
    /// `GET ?hash=` → [`BufferPayload`](crate::BufferPayload)
    pub const MEMORY: &str = "memory";
    /// `GET ?hash=` → [`BufferPayload`](crate::BufferPayload)
    pub const VRAM: &str = "vram";
    /// `POST` → ステップ後の [`Status`](crate::Status)
    pub const STEP: &str = "step";
    /// `POST` → リセット後の [`Status`](crate::Status)
    pub const RESET: &str = "reset";
}

/// CPU レジスタ 1 本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    /// レジスタ名（例: `"a"`, `"hl"`）
    pub name: String,
    /// 値
    pub value: i64,
}

/// CPU ステータス
///
/// 更新のたびに丸ごと置き換える（マージしない）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// プログラムカウンタ
    #[serde(rename = "pc")]
    pub program_counter: u16,
    /// レジスタ（表示順）
    #[serde(default)]
    pub registers: Vec<Register>,
}

/// 逆アセンブル済みの命令 1 件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramEntry {
    /// 命令の先頭アドレス
    pub address: u16,
    /// 命令バイト列の 16 進表記（例: `"3E 42"`）
    #[serde(rename = "hexcontents")]
    pub raw_bytes_hex: String,
    /// ニーモニック（例: `"LD A, n"`）
    #[serde(rename = "instruction")]
    pub mnemonic: String,
}

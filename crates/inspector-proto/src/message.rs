//! プッシュチャンネルのメッセージ
//!
//! ## Wire Format
//! ```text
//! Client → Remote:
//!   {"type": "status"}
//!   {"type": "program"}
//!   {"type": "memory", "data": {"hash": "<fingerprint>"}}
//!   {"type": "vram",   "data": {"hash": "<fingerprint>"}}
//!   {"type": "step"}
//!
//! Remote → Client:
//!   {"type": "status" | "program" | "memory" | "vram", "data": <payload>}
//! ```
//!
//! `reset` はプッシュチャンネルに含まれない（HTTP の one-shot リクエスト）。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtoError;
use crate::patch::BufferPayload;
use crate::{ProgramEntry, Status};

/// 同期要求のペイロード（クライアントのフィンガープリント）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    /// 10 進数文字列のフィンガープリント（不透明な値として扱う）
    pub hash: String,
}

impl SyncRequest {
    /// フィンガープリント文字列から要求を作る
    pub fn new(hash: impl Into<String>) -> Self {
        SyncRequest { hash: hash.into() }
    }
}

/// クライアント → リモートの意図メッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ClientMessage {
    /// ステータス要求
    Status,
    /// プログラムリスト要求
    Program,
    /// メモリ同期要求
    Memory(SyncRequest),
    /// VRAM 同期要求
    Vram(SyncRequest),
    /// 1 命令ステップ実行
    Step,
}

impl ClientMessage {
    /// JSON テキストフレームにエンコードする
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("ClientMessage encode should not fail")
    }

    /// JSON テキストフレームからデコードする（リモート側・テスト用）
    pub fn decode(text: &str) -> Result<Self, ProtoError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// リモート → クライアントのイベントメッセージ
///
/// 要求 1 件に対して応答 1 件とは限らず、リモートが自発的に送ることもある。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ServerMessage {
    /// ステータス（丸ごと置き換え）
    Status(Status),
    /// プログラムリスト（丸ごと置き換え）
    Program(Vec<ProgramEntry>),
    /// メモリの差分または全体
    Memory(BufferPayload),
    /// VRAM の差分または全体
    Vram(BufferPayload),
}

/// `type` だけ先に読むための外枠
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl ServerMessage {
    /// JSON テキストフレームからデコードする
    ///
    /// # エラー
    /// - `ProtoError::Json`: JSON として不正、または `data` の形が合わない
    /// - `ProtoError::UnknownMessageType`: 未知の `type`
    /// - `ProtoError::NonNumericAddress` / `ValueOutOfRange`: パッチが不正
    pub fn decode(text: &str) -> Result<Self, ProtoError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        match envelope.kind.as_str() {
            "status" => Ok(ServerMessage::Status(serde_json::from_value(envelope.data)?)),
            "program" => Ok(ServerMessage::Program(serde_json::from_value(envelope.data)?)),
            "memory" => Ok(ServerMessage::Memory(BufferPayload::from_value(envelope.data)?)),
            "vram" => Ok(ServerMessage::Vram(BufferPayload::from_value(envelope.data)?)),
            _ => Err(ProtoError::UnknownMessageType(envelope.kind)),
        }
    }

    /// JSON テキストフレームにエンコードする（リモート側・テスト用）
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("ServerMessage encode should not fail")
    }

    /// メッセージ種別（ログ用）
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Status(_) => "status",
            ServerMessage::Program(_) => "program",
            ServerMessage::Memory(_) => "memory",
            ServerMessage::Vram(_) => "vram",
        }
    }
}

//! 送信要求と受信データの表現
//!
//! トランスポートは I/O を行わない。送るべきものを [`Outbound`] として返し、
//! ホスト（ブラウザ側の JS）が `fetch` / WebSocket で実行する。
//! 届いたものは [`Inbound`] として戻してもらう。
//!
//! ```text
//! Outbound (JSON):
//!   {"transport":"http","method":"GET","url":"/api/memory?hash=123","kind":"memory"}
//!   {"transport":"push","frame":"{\"type\":\"step\"}"}
//!   {"transport":"connect","url":"/ws"}
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// HTTP メソッド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

/// レスポンスの種別
///
/// ホストはリクエストに付いていた `kind` をそのままレスポンスと一緒に返す。
/// これでレスポンスとリクエストを対応付ける。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Status,
    Program,
    Memory,
    #[serde(rename = "vram")]
    Video,
    Step,
    Reset,
}

impl ResponseKind {
    /// ワイヤー上の名前
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Status => "status",
            ResponseKind::Program => "program",
            ResponseKind::Memory => "memory",
            ResponseKind::Video => "vram",
            ResponseKind::Step => "step",
            ResponseKind::Reset => "reset",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseKind {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status" => Ok(ResponseKind::Status),
            "program" => Ok(ResponseKind::Program),
            "memory" => Ok(ResponseKind::Memory),
            "vram" => Ok(ResponseKind::Video),
            "step" => Ok(ResponseKind::Step),
            "reset" => Ok(ResponseKind::Reset),
            other => Err(TransportError::UnknownResponseKind(other.to_string())),
        }
    }
}

/// one-shot の HTTP リクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub kind: ResponseKind,
}

/// ホストに実行してもらう送信要求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum Outbound {
    /// HTTP リクエストを 1 回送る
    Http(HttpRequest),
    /// プッシュチャンネルにテキストフレームを送る
    Push { frame: String },
    /// プッシュチャンネルを開く
    Connect { url: String },
}

impl Outbound {
    /// JSON にエンコードする（ホストへ渡す形式）
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("Outbound encode should not fail")
    }
}

/// ホストから戻ってくる受信データ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// HTTP レスポンスのボディ（リクエスト時の `kind` 付き）
    Response { kind: ResponseKind, body: &'a str },
    /// プッシュチャンネルで届いたテキストフレーム
    Push(&'a str),
}

impl Inbound<'_> {
    /// ログ・エラー用の名前
    pub fn label(&self) -> &'static str {
        match self {
            Inbound::Response { .. } => "http response",
            Inbound::Push(_) => "push frame",
        }
    }
}

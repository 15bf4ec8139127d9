//! # inspector-transport
//!
//! レプリカストアへの「要求」をワイヤーメッセージに変換し、
//! 届いたワイヤーメッセージをストアの変更に変換するトランスポート戦略。
//!
//! ## 2 つの戦略
//!
//! | 戦略 | 送信 | 受信 |
//! |------|------|------|
//! | [`PollingTransport`] | 能力ごとに one-shot HTTP | 要求 1 件に応答 1 件 |
//! | [`PushTransport`]    | 永続チャンネルのテキストフレーム | 到着順のイベント（自発的な更新もあり） |
//!
//! どちらも [`Transport`] トレイトを実装し、セッション生成時に 1 つだけ選ぶ。
//! 呼び出し側で戦略ごとに分岐しないこと。
//!
//! ## I/O を持たない設計
//!
//! ```text
//! Session ──request_*()──▶ Transport ──Outbound──▶ ホスト (fetch / WebSocket)
//!                                                        │
//! ReplicaStore ◀──receive(Inbound)── Transport ◀─────────┘
//! ```

use core::fmt;
use core::str::FromStr;

use inspector_hash::Fingerprint;
use inspector_proto::{BufferPayload, ProgramEntry, ProtoError, Status};
use inspector_replica::{BufferId, ReplicaStore, StatusChange};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod error;
pub mod polling;
pub mod push;
pub mod request;

pub use error::TransportError;
pub use polling::PollingTransport;
pub use push::PushTransport;
pub use request::{HttpMethod, HttpRequest, Inbound, Outbound, ResponseKind};

/// デフォルトの HTTP API ベース
pub const DEFAULT_API_BASE: &str = "/api";

/// デフォルトのプッシュチャンネル URL
pub const DEFAULT_PUSH_URL: &str = "/ws";

/// 受信データを適用した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// ステータスを置き換えた
    Status(StatusChange),
    /// プログラムリストを置き換えた
    Program { entries: usize },
    /// バッファを更新した（`written` = 書き込んだ位置の数。0 なら変更なし）
    Buffer { target: BufferId, written: usize },
    /// 未知のイベント種別を破棄した
    Ignored { kind: String },
}

/// トランスポート戦略の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// ハッシュゲート付きポーリング
    #[default]
    Polling,
    /// プッシュ / サブスクライブ
    Push,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Polling => f.write_str("polling"),
            TransportKind::Push => f.write_str("push"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "polling" => Ok(TransportKind::Polling),
            "push" => Ok(TransportKind::Push),
            other => Err(TransportError::UnknownStrategy(other.to_string())),
        }
    }
}

/// トランスポート戦略の共通インターフェース
///
/// 能力（`request_*` / `send_*`）は送るべき [`Outbound`] を返すだけで、
/// 送信そのものはホストが行う。応答は `receive` でストアに適用する。
pub trait Transport {
    /// 戦略の種別
    fn kind(&self) -> TransportKind;

    /// セッション開始時に必要な接続要求（ポーリングでは不要）
    fn connect(&mut self) -> Option<Outbound> {
        None
    }

    /// 送信可能か（プッシュチャンネルが閉じていれば false）
    fn is_open(&self) -> bool {
        true
    }

    /// チャンネルが閉じたことを記録する。自動再接続はしない
    fn close(&mut self) {}

    /// ステータス要求
    fn request_status(&mut self) -> Outbound;

    /// プログラムリスト要求
    fn request_program(&mut self) -> Outbound;

    /// メモリ同期要求（クライアントの現在のフィンガープリント付き）
    fn request_memory_sync(&mut self, fingerprint: Fingerprint) -> Outbound;

    /// VRAM 同期要求
    fn request_video_sync(&mut self, fingerprint: Fingerprint) -> Outbound;

    /// 1 ステップ実行
    fn send_step(&mut self) -> Outbound;

    /// リセット
    fn send_reset(&mut self) -> Outbound;

    /// 受信データをデコードしてストアに適用する
    ///
    /// # エラー
    /// - `TransportError::Protocol`: 不正なメッセージ（ストアは変更されない）
    /// - `TransportError::Replica`: 容量外アドレスのパッチ（ストアは変更されない）
    /// - `TransportError::UnexpectedInbound`: この戦略では扱えない入力
    fn receive(
        &mut self,
        inbound: Inbound<'_>,
        store: &mut ReplicaStore,
    ) -> Result<Applied, TransportError>;
}

/// 種別に応じた戦略を生成する
///
/// # 引数
/// - `kind`: 戦略
/// - `api_base`: HTTP API のベース（例: `"/api"`）
/// - `push_url`: プッシュチャンネルの URL（ポーリングでは使わない）
pub fn transport_for(kind: TransportKind, api_base: &str, push_url: &str) -> Box<dyn Transport> {
    match kind {
        TransportKind::Polling => Box::new(PollingTransport::new(api_base)),
        TransportKind::Push => Box::new(PushTransport::new(push_url, api_base)),
    }
}

/// HTTP レスポンスのボディを種別に応じてデコードし、ストアに適用する
///
/// ポーリング戦略の全レスポンスと、プッシュ戦略の `reset` で共有する。
pub(crate) fn apply_http_response(
    kind: ResponseKind,
    body: &str,
    store: &mut ReplicaStore,
) -> Result<Applied, TransportError> {
    match kind {
        ResponseKind::Status | ResponseKind::Step | ResponseKind::Reset => {
            let status: Status = serde_json::from_str(body).map_err(ProtoError::from)?;
            Ok(apply_status(status, store))
        }
        ResponseKind::Program => {
            let listing: Vec<ProgramEntry> = serde_json::from_str(body).map_err(ProtoError::from)?;
            Ok(apply_program(listing, store))
        }
        ResponseKind::Memory => {
            let payload = BufferPayload::decode(body)?;
            apply_buffer(BufferId::Memory, &payload, store)
        }
        ResponseKind::Video => {
            let payload = BufferPayload::decode(body)?;
            apply_buffer(BufferId::Video, &payload, store)
        }
    }
}

pub(crate) fn apply_status(status: Status, store: &mut ReplicaStore) -> Applied {
    Applied::Status(store.apply_status(status))
}

pub(crate) fn apply_program(listing: Vec<ProgramEntry>, store: &mut ReplicaStore) -> Applied {
    Applied::Program {
        entries: store.apply_program(listing),
    }
}

pub(crate) fn apply_buffer(
    target: BufferId,
    payload: &BufferPayload,
    store: &mut ReplicaStore,
) -> Result<Applied, TransportError> {
    let written = store.apply_payload(target, payload)?;
    debug!(buffer = target.as_str(), written, "buffer synchronized");
    Ok(Applied::Buffer { target, written })
}

/// API ベースとエンドポイントを連結する
pub(crate) fn join_url(base: &str, endpoint: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), endpoint)
}

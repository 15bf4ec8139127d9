//! 戦略 B: プッシュ / サブスクライブ
//!
//! セッション開始時に永続チャンネルを 1 本開き、型付きの意図メッセージを送る。
//! リモートからのイベントは到着順にそのまま適用する（並べ替え・合成はしない）。
//! 同じアドレスへの差分が続いた場合は後から届いたものが勝つ。
//!
//! チャンネルが閉じても自動で再接続はしない。再接続時はセッションが
//! すべての構造を全同期し直す（切断中のイベントは取り戻せないため）。

use inspector_hash::Fingerprint;
use inspector_proto::{endpoint, ClientMessage, ProtoError, ServerMessage, SyncRequest};
use inspector_replica::{BufferId, ReplicaStore};
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::request::{HttpMethod, HttpRequest, Inbound, Outbound, ResponseKind};
use crate::{
    apply_buffer, apply_http_response, apply_program, apply_status, join_url, Applied, Transport,
    TransportKind,
};

/// チャンネルの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelState {
    /// まだ開いていない
    Idle,
    /// 開いている（または開く要求を出した）
    Open,
    /// 閉じた（リモート・ネットワークによる切断）
    Closed,
}

/// プッシュ戦略
#[derive(Debug, Clone)]
pub struct PushTransport {
    /// チャンネルの URL
    url: String,
    /// `reset` 用の HTTP API ベース
    api_base: String,
    state: ChannelState,
}

impl PushTransport {
    /// チャンネル URL と API ベースを指定して生成する
    pub fn new(url: impl Into<String>, api_base: impl Into<String>) -> Self {
        PushTransport {
            url: url.into(),
            api_base: api_base.into(),
            state: ChannelState::Idle,
        }
    }

    fn frame(message: ClientMessage) -> Outbound {
        Outbound::Push {
            frame: message.encode(),
        }
    }

    /// イベント 1 件をストアに適用する
    fn apply_event(&self, text: &str, store: &mut ReplicaStore) -> Result<Applied, TransportError> {
        let message = match ServerMessage::decode(text) {
            Ok(message) => message,
            Err(ProtoError::UnknownMessageType(kind)) => {
                // 前方互換: 未知の種別は状態に触れずに破棄する
                warn!(%kind, "dropping push event of unknown type");
                return Ok(Applied::Ignored { kind });
            }
            Err(e) => return Err(e.into()),
        };

        debug!(kind = message.kind(), "push event");
        match message {
            ServerMessage::Status(status) => Ok(apply_status(status, store)),
            ServerMessage::Program(listing) => Ok(apply_program(listing, store)),
            ServerMessage::Memory(payload) => apply_buffer(BufferId::Memory, &payload, store),
            ServerMessage::Vram(payload) => apply_buffer(BufferId::Video, &payload, store),
        }
    }
}

impl Transport for PushTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Push
    }

    fn connect(&mut self) -> Option<Outbound> {
        self.state = ChannelState::Open;
        Some(Outbound::Connect {
            url: self.url.clone(),
        })
    }

    fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    fn close(&mut self) {
        if self.state != ChannelState::Closed {
            debug!(url = %self.url, "push channel closed");
        }
        self.state = ChannelState::Closed;
    }

    fn request_status(&mut self) -> Outbound {
        Self::frame(ClientMessage::Status)
    }

    fn request_program(&mut self) -> Outbound {
        Self::frame(ClientMessage::Program)
    }

    fn request_memory_sync(&mut self, fingerprint: Fingerprint) -> Outbound {
        Self::frame(ClientMessage::Memory(SyncRequest::new(fingerprint.to_string())))
    }

    fn request_video_sync(&mut self, fingerprint: Fingerprint) -> Outbound {
        Self::frame(ClientMessage::Vram(SyncRequest::new(fingerprint.to_string())))
    }

    fn send_step(&mut self) -> Outbound {
        Self::frame(ClientMessage::Step)
    }

    /// `reset` はチャンネル外の one-shot HTTP リクエスト
    fn send_reset(&mut self) -> Outbound {
        Outbound::Http(HttpRequest {
            method: HttpMethod::Post,
            url: join_url(&self.api_base, endpoint::RESET),
            kind: ResponseKind::Reset,
        })
    }

    fn receive(
        &mut self,
        inbound: Inbound<'_>,
        store: &mut ReplicaStore,
    ) -> Result<Applied, TransportError> {
        match inbound {
            Inbound::Push(text) => self.apply_event(text, store),
            Inbound::Response { kind, body } => apply_http_response(kind, body, store),
        }
    }
}

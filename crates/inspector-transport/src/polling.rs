//! 戦略 A: ハッシュゲート付きポーリング
//!
//! 能力ごとに one-shot の HTTP リクエストを送る。メモリ同期では手元の
//! フィンガープリントを送り、リモートは一致すれば空パッチ、
//! そうでなければ差分かバッファ全体を返す。

use inspector_hash::Fingerprint;
use inspector_proto::endpoint;
use inspector_replica::ReplicaStore;

use crate::error::TransportError;
use crate::request::{HttpMethod, HttpRequest, Inbound, Outbound, ResponseKind};
use crate::{apply_http_response, join_url, Applied, Transport, TransportKind};

/// ポーリング戦略
#[derive(Debug, Clone)]
pub struct PollingTransport {
    /// HTTP API のベース（例: `"/api"`）
    api_base: String,
}

impl PollingTransport {
    /// API ベースを指定して生成する
    pub fn new(api_base: impl Into<String>) -> Self {
        PollingTransport {
            api_base: api_base.into(),
        }
    }

    fn request(&self, method: HttpMethod, path: &str, kind: ResponseKind) -> Outbound {
        Outbound::Http(HttpRequest {
            method,
            url: join_url(&self.api_base, path),
            kind,
        })
    }
}

impl Transport for PollingTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Polling
    }

    fn request_status(&mut self) -> Outbound {
        self.request(HttpMethod::Get, endpoint::STATUS, ResponseKind::Status)
    }

    fn request_program(&mut self) -> Outbound {
        self.request(HttpMethod::Get, endpoint::PROGRAM, ResponseKind::Program)
    }

    fn request_memory_sync(&mut self, fingerprint: Fingerprint) -> Outbound {
        let path = format!("{}?hash={}", endpoint::MEMORY, fingerprint);
        self.request(HttpMethod::Get, &path, ResponseKind::Memory)
    }

    fn request_video_sync(&mut self, fingerprint: Fingerprint) -> Outbound {
        let path = format!("{}?hash={}", endpoint::VRAM, fingerprint);
        self.request(HttpMethod::Get, &path, ResponseKind::Video)
    }

    fn send_step(&mut self) -> Outbound {
        self.request(HttpMethod::Post, endpoint::STEP, ResponseKind::Step)
    }

    fn send_reset(&mut self) -> Outbound {
        self.request(HttpMethod::Post, endpoint::RESET, ResponseKind::Reset)
    }

    fn receive(
        &mut self,
        inbound: Inbound<'_>,
        store: &mut ReplicaStore,
    ) -> Result<Applied, TransportError> {
        match inbound {
            Inbound::Response { kind, body } => apply_http_response(kind, body, store),
            Inbound::Push(_) => Err(TransportError::UnexpectedInbound {
                strategy: TransportKind::Polling,
                inbound: inbound.label(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_replica::{BufferId, DeltaTracker, ReplicaError};

    fn url_of(out: &Outbound) -> &str {
        match out {
            Outbound::Http(req) => &req.url,
            other => panic!("expected http request, got {:?}", other),
        }
    }

    #[test]
    fn test_request_urls() {
        let mut transport = PollingTransport::new("/api");
        assert_eq!(url_of(&transport.request_status()), "/api/status");
        assert_eq!(url_of(&transport.request_program()), "/api/program");
        assert_eq!(
            url_of(&transport.request_memory_sync(Fingerprint::from_raw(42))),
            "/api/memory?hash=42"
        );
        assert_eq!(
            url_of(&transport.request_video_sync(Fingerprint::from_raw(7))),
            "/api/vram?hash=7"
        );
    }

    #[test]
    fn test_step_and_reset_are_posts() {
        let mut transport = PollingTransport::new("/api");
        for (out, kind) in [
            (transport.send_step(), ResponseKind::Step),
            (transport.send_reset(), ResponseKind::Reset),
        ] {
            match out {
                Outbound::Http(req) => {
                    assert_eq!(req.method, HttpMethod::Post);
                    assert_eq!(req.kind, kind);
                }
                other => panic!("expected http request, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_step_response_replaces_status() {
        let mut transport = PollingTransport::new("/api");
        let mut store = ReplicaStore::default();
        let status = Inbound::Response {
            kind: ResponseKind::Status,
            body: r#"{"pc":0,"registers":[]}"#,
        };
        transport.receive(status, &mut store).unwrap();

        let step = Inbound::Response {
            kind: ResponseKind::Step,
            body: r#"{"pc":2,"registers":[]}"#,
        };
        let applied = transport.receive(step, &mut store).unwrap();

        match applied {
            Applied::Status(change) => assert!(change.pc_changed()),
            other => panic!("unexpected: {:?}", other),
        }
    }

    /// 変更がなければ空パッチが返り、バッファは変化しない
    #[test]
    fn test_unchanged_memory_sync() {
        let mut transport = PollingTransport::new("/api");
        let mut store = ReplicaStore::default();
        let mut tracker = DeltaTracker::new();
        let remote = vec![0u8; 64 * 1024];

        let f0 = store.current_fingerprint(BufferId::Memory);
        let payload = tracker.delta_for(Some(f0), &remote);
        let body = serde_json::to_string(&payload).unwrap();
        assert_eq!(body, "{}");

        let before = store.memory().bytes().to_vec();
        let response = Inbound::Response {
            kind: ResponseKind::Memory,
            body: &body,
        };
        let applied = transport.receive(response, &mut store).unwrap();

        assert_eq!(
            applied,
            Applied::Buffer {
                target: BufferId::Memory,
                written: 0
            }
        );
        assert_eq!(store.memory().bytes(), before.as_slice());
        assert_eq!(store.current_fingerprint(BufferId::Memory), f0);
    }

    #[test]
    fn test_full_buffer_response() {
        let mut transport = PollingTransport::new("/api");
        let mut store = ReplicaStore::new(4, 4);
        let response = Inbound::Response {
            kind: ResponseKind::Video,
            body: "[1,2,3,4]",
        };
        let applied = transport.receive(response, &mut store).unwrap();
        assert_eq!(
            applied,
            Applied::Buffer {
                target: BufferId::Video,
                written: 4
            }
        );
        assert_eq!(store.video().bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_out_of_range_patch_rejected() {
        let mut transport = PollingTransport::new("/api");
        let mut store = ReplicaStore::new(16, 16);
        let response = Inbound::Response {
            kind: ResponseKind::Memory,
            body: r#"{"1": 5, "16": 6}"#,
        };
        let result = transport.receive(response, &mut store);
        assert!(matches!(
            result,
            Err(TransportError::Replica(ReplicaError::AddressOutOfRange { address: 16, .. }))
        ));
        assert_eq!(store.memory().read(1), Some(0));
    }

    #[test]
    fn test_push_frame_is_unexpected() {
        let mut transport = PollingTransport::new("/api");
        let mut store = ReplicaStore::default();
        let result = transport.receive(Inbound::Push(r#"{"type":"status"}"#), &mut store);
        assert!(matches!(result, Err(TransportError::UnexpectedInbound { .. })));
    }
}

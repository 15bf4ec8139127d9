//! inspector-transport エラー型

use inspector_proto::ProtoError;
use inspector_replica::ReplicaError;

use crate::TransportKind;

/// トランスポート層のエラー
///
/// どれもセッションを終わらせるものではなく、該当メッセージ 1 件の破棄で済む。
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// プロトコル違反（不正な JSON・不正なパッチ）
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtoError),
    /// パッチのアドレスが容量外
    #[error("Rejected patch: {0}")]
    Replica(#[from] ReplicaError),
    /// この戦略では受け取れない入力（例: ポーリングにプッシュフレーム）
    #[error("{strategy} transport cannot handle {inbound} input")]
    UnexpectedInbound {
        strategy: TransportKind,
        inbound: &'static str,
    },
    /// 未知のトランスポート名
    #[error("Unknown transport strategy: {0:?}")]
    UnknownStrategy(String),
    /// 未知のレスポンス種別
    #[error("Unknown response kind: {0:?}")]
    UnknownResponseKind(String),
}

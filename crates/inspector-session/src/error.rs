//! inspector-session エラー型

use inspector_transport::TransportError;

/// セッションのエラー
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// 設定値が不正
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    /// 設定 JSON の解析失敗
    #[error("Config parse failed: {0}")]
    Config(#[from] serde_json::Error),
    /// プッシュチャンネルが閉じている（`reconnect` が必要）
    #[error("Push channel is closed")]
    ChannelClosed,
    /// 通信失敗でエラー状態に入っている（`reconnect` が必要）
    #[error("Session is in error state: {0}")]
    Failed(String),
    /// ホストから渡された値が不正
    #[error(transparent)]
    Transport(#[from] TransportError),
}

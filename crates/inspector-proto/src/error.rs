//! inspector-proto エラー型

/// ワイヤーメッセージのデコードエラー
///
/// どのエラーも「そのメッセージ 1 件を破棄する」プロトコル違反として扱われる。
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// JSON として不正、またはフィールドの型が合わない
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),
    /// 未知の `type`（前方互換のため破棄する）
    #[error("Unknown message type: {0:?}")]
    UnknownMessageType(String),
    /// パッチのキーが 10 進数のアドレスではない
    #[error("Non-numeric patch address: {0:?}")]
    NonNumericAddress(String),
    /// パッチの値が 0〜255 の範囲外
    #[error("Patch value out of byte range at address {address}: {value}")]
    ValueOutOfRange { address: usize, value: String },
    /// バッファのペイロードが配列でもオブジェクトでもない
    #[error("Unexpected buffer payload: {0}")]
    UnexpectedPayload(&'static str),
}

//! フィンガープリントのエラー型

/// フィンガープリント文字列の解析エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FingerprintError {
    /// 空文字列
    #[error("Empty fingerprint")]
    Empty,
    /// 10 進数の u64 として解釈できない
    #[error("Fingerprint is not a base-10 u64")]
    NotDecimal,
}

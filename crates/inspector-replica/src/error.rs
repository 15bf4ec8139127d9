//! inspector-replica エラー型

/// レプリカ操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplicaError {
    /// パッチのアドレスが容量外（RangeError）。パッチ全体が拒否される
    #[error("Patch address {address:#06X} out of range (capacity {capacity:#06X})")]
    AddressOutOfRange { address: usize, capacity: usize },
}

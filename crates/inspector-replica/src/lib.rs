//! # inspector-replica
//!
//! リモートエミュレータの状態のローカルレプリカ。
//!
//! ## 同期モデル
//!
//! リモートが常に唯一の正。クライアントはバイト値を生成せず、
//! リモートから届いた差分（[`DeltaPatch`](inspector_proto::DeltaPatch)）か
//! 全体バッファを適用するだけ。レプリカはいつでも捨てて作り直せる。
//!
//! ```text
//! 同期レスポンス / プッシュイベント
//!   ├── Full(buffer)  → apply_full   （全置き換え）
//!   └── Delta(patch)  → apply_delta  （検証 → 原子的マージ）
//! ```
//!
//! [`DeltaTracker`] はその逆側（リモートが差分を作る側）の実装。

pub mod buffer;
pub mod error;
pub mod store;
pub mod tracker;

pub use buffer::MemoryReplica;
pub use error::ReplicaError;
pub use store::{BufferId, ReplicaStore, StatusChange};
pub use tracker::DeltaTracker;

/// メモリレプリカの容量（Z80 のアドレス空間 64 KiB）
pub const MEMORY_CAPACITY: usize = 64 * 1024;

/// VRAM レプリカの容量（TMS9918 の 16 KiB）
pub const VRAM_CAPACITY: usize = 16 * 1024;

//! 固定容量のバイトレプリカ

use inspector_hash::Fingerprint;
use inspector_proto::{BufferPayload, DeltaPatch};
use tracing::{trace, warn};

use crate::error::ReplicaError;

/// リモートのメモリ領域をミラーする密なバイト列
///
/// ## 不変条件
/// - 長さは常に宣言した容量と等しい
/// - 未同期のバイトは 0
/// - 変更は `apply_full` / `apply_delta` のみ。可変参照は外に出さない
///
/// 内容が変わるたびに `revision` が 1 増える。描画側はこれで
/// 「新しいデータによる再描画」と「同じデータの再描画」を区別する。
#[derive(Debug, Clone)]
pub struct MemoryReplica {
    data: Box<[u8]>,
    revision: u64,
}

impl MemoryReplica {
    /// ゼロ埋めのレプリカを生成する
    pub fn new(capacity: usize) -> Self {
        MemoryReplica {
            data: vec![0u8; capacity].into_boxed_slice(),
            revision: 0,
        }
    }

    /// 容量（バイト）
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// 現在の内容（読み取り専用）
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// 1 バイト読む（容量外なら None）
    pub fn read(&self, address: usize) -> Option<u8> {
        self.data.get(address).copied()
    }

    /// 変更回数
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// 現在の内容のフィンガープリント
    ///
    /// 変更のたびに古くならないよう、キャッシュせず毎回計算する。
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.data)
    }

    /// バッファ全体を置き換える（初回ロード・全同期）
    ///
    /// 常に成功する。長さが容量と異なる場合は、足りない分を 0 で埋め、
    /// 余った分を切り捨てて容量を保つ。
    pub fn apply_full(&mut self, buffer: &[u8]) {
        let capacity = self.capacity();
        if buffer.len() != capacity {
            warn!(
                received = buffer.len(),
                capacity, "full buffer length differs from replica capacity"
            );
        }

        let n = buffer.len().min(capacity);
        self.data[..n].copy_from_slice(&buffer[..n]);
        self.data[n..].fill(0);
        self.revision += 1;
        trace!(revision = self.revision, "full buffer applied");
    }

    /// 差分をマージする
    ///
    /// すべてのアドレスを先に検証し、1 つでも容量外なら何も変更せずに
    /// `ReplicaError::AddressOutOfRange` を返す（部分適用はしない）。
    /// 成功時はパッチに含まれる位置だけを上書きする。
    ///
    /// # 戻り値
    /// 書き込んだ位置の数。空パッチは何もしない（revision も変わらない）。
    pub fn apply_delta(&mut self, patch: &DeltaPatch) -> Result<usize, ReplicaError> {
        let capacity = self.capacity();

        // DeltaPatch はアドレス昇順なので最大アドレスだけ見れば足りる
        if let Some(address) = patch.max_address().filter(|a| *a >= capacity) {
            warn!(address, capacity, "rejecting patch with out-of-range address");
            return Err(ReplicaError::AddressOutOfRange { address, capacity });
        }

        if patch.is_empty() {
            return Ok(0);
        }

        for (address, value) in patch.iter() {
            self.data[address] = value;
        }
        self.revision += 1;
        trace!(entries = patch.len(), revision = self.revision, "delta applied");

        Ok(patch.len())
    }

    /// 同期レスポンスのペイロードを適用する
    ///
    /// `Full` は `apply_full`、`Delta` は `apply_delta` に振り分ける。
    pub fn apply_payload(&mut self, payload: &BufferPayload) -> Result<usize, ReplicaError> {
        match payload {
            BufferPayload::Full(buffer) => {
                self.apply_full(buffer);
                Ok(buffer.len().min(self.capacity()))
            }
            BufferPayload::Delta(patch) => self.apply_delta(patch),
        }
    }

    /// ゼロ埋めに戻す（再接続時の作り直し）
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.revision += 1;
    }
}

//! レプリカストア
//!
//! リモートの状態（ステータス・プログラムリスト・メモリ・VRAM）の
//! ローカルコピーを一箇所で所有する。変更は狭い API 経由のみ。

use inspector_hash::Fingerprint;
use inspector_proto::{BufferPayload, DeltaPatch, ProgramEntry, Status};
use tracing::debug;

use crate::buffer::MemoryReplica;
use crate::error::ReplicaError;
use crate::{MEMORY_CAPACITY, VRAM_CAPACITY};

/// ストアが所有するバッファの識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferId {
    /// CPU から見た 64 KiB のメモリ空間
    Memory,
    /// VDP のビデオメモリ
    Video,
}

impl BufferId {
    /// ワイヤー上の名前
    pub fn as_str(&self) -> &'static str {
        match self {
            BufferId::Memory => "memory",
            BufferId::Video => "vram",
        }
    }
}

/// ステータス更新の結果
///
/// セッションはこれを見て「PC が変わったらメモリを再同期する」を行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// 更新前の PC（初回は None）
    pub previous_pc: Option<u16>,
    /// 更新後の PC
    pub current_pc: u16,
    /// 新しい PC が現在のプログラムリストに含まれない
    pub pc_outside_listing: bool,
}

impl StatusChange {
    /// 既知の PC から別の値に変わったか（初回の受信は含まない）
    pub fn pc_changed(&self) -> bool {
        self.previous_pc.is_some_and(|pc| pc != self.current_pc)
    }
}

/// レプリカストア
///
/// ## 所有関係
/// ```text
/// ReplicaStore
///   ├── status:  Option<Status>        丸ごと置き換え
///   ├── program: Vec<ProgramEntry>     丸ごと置き換え（アドレス昇順）
///   ├── memory:  MemoryReplica         差分マージ / 全置き換え
///   └── video:   MemoryReplica         差分マージ / 全置き換え
/// ```
///
/// 読み取り側には参照（スナップショット）だけを渡す。
#[derive(Debug, Clone)]
pub struct ReplicaStore {
    status: Option<Status>,
    program: Vec<ProgramEntry>,
    memory: MemoryReplica,
    video: MemoryReplica,
}

impl ReplicaStore {
    /// 指定容量のゼロ埋めレプリカでストアを生成する
    pub fn new(memory_capacity: usize, video_capacity: usize) -> Self {
        ReplicaStore {
            status: None,
            program: Vec::new(),
            memory: MemoryReplica::new(memory_capacity),
            video: MemoryReplica::new(video_capacity),
        }
    }

    /// ステータスを置き換える
    pub fn apply_status(&mut self, status: Status) -> StatusChange {
        let previous_pc = self.status.as_ref().map(|s| s.program_counter);
        let current_pc = status.program_counter;
        let pc_outside_listing = !self.listing_contains(current_pc);

        debug!(pc = current_pc, ?previous_pc, "status replaced");
        self.status = Some(status);

        StatusChange {
            previous_pc,
            current_pc,
            pc_outside_listing,
        }
    }

    /// プログラムリストを置き換える
    ///
    /// アドレス昇順の不変条件を保つため、受信順に関係なく並べ替える。
    pub fn apply_program(&mut self, mut listing: Vec<ProgramEntry>) -> usize {
        listing.sort_by_key(|entry| entry.address);
        debug!(entries = listing.len(), "program listing replaced");
        self.program = listing;
        self.program.len()
    }

    /// バッファ全体を置き換える
    pub fn apply_full(&mut self, target: BufferId, buffer: &[u8]) {
        self.replica_mut(target).apply_full(buffer);
    }

    /// バッファに差分をマージする（原子的）
    pub fn apply_delta(
        &mut self,
        target: BufferId,
        patch: &DeltaPatch,
    ) -> Result<usize, ReplicaError> {
        self.replica_mut(target).apply_delta(patch)
    }

    /// 同期レスポンスのペイロードを適用する
    pub fn apply_payload(
        &mut self,
        target: BufferId,
        payload: &BufferPayload,
    ) -> Result<usize, ReplicaError> {
        self.replica_mut(target).apply_payload(payload)
    }

    /// バッファの現在のフィンガープリント（毎回計算）
    pub fn current_fingerprint(&self, target: BufferId) -> Fingerprint {
        self.replica(target).fingerprint()
    }

    /// 現在のステータス
    pub fn snapshot_status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// 現在のプログラムリスト
    pub fn snapshot_program(&self) -> &[ProgramEntry] {
        &self.program
    }

    /// バッファの読み取り専用ビュー
    pub fn replica(&self, target: BufferId) -> &MemoryReplica {
        match target {
            BufferId::Memory => &self.memory,
            BufferId::Video => &self.video,
        }
    }

    /// メモリレプリカ
    pub fn memory(&self) -> &MemoryReplica {
        &self.memory
    }

    /// VRAM レプリカ
    pub fn video(&self) -> &MemoryReplica {
        &self.video
    }

    /// PC がプログラムリストのどれかの命令先頭に一致するか
    pub fn listing_contains(&self, address: u16) -> bool {
        self.program
            .binary_search_by_key(&address, |entry| entry.address)
            .is_ok()
    }

    /// 複製した状態をすべて捨てる（全同期のやり直し用）
    pub fn reset_replicas(&mut self) {
        self.status = None;
        self.program.clear();
        self.memory.clear();
        self.video.clear();
        debug!("replicas discarded");
    }

    fn replica_mut(&mut self, target: BufferId) -> &mut MemoryReplica {
        match target {
            BufferId::Memory => &mut self.memory,
            BufferId::Video => &mut self.video,
        }
    }
}

impl Default for ReplicaStore {
    fn default() -> Self {
        Self::new(MEMORY_CAPACITY, VRAM_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_proto::Register;

    fn status(pc: u16) -> Status {
        Status {
            program_counter: pc,
            registers: vec![Register {
                name: "a".into(),
                value: 0,
            }],
        }
    }

    fn entry(address: u16) -> ProgramEntry {
        ProgramEntry {
            address,
            raw_bytes_hex: "00".into(),
            mnemonic: "NOP".into(),
        }
    }

    #[test]
    fn test_default_capacities() {
        let store = ReplicaStore::default();
        assert_eq!(store.memory().capacity(), 64 * 1024);
        assert_eq!(store.video().capacity(), 16 * 1024);
        assert!(store.snapshot_status().is_none());
        assert!(store.snapshot_program().is_empty());
    }

    #[test]
    fn test_first_status_is_not_a_pc_change() {
        let mut store = ReplicaStore::default();
        let change = store.apply_status(status(0));
        assert_eq!(change.previous_pc, None);
        assert!(!change.pc_changed());
    }

    #[test]
    fn test_status_pc_change_detected() {
        let mut store = ReplicaStore::default();
        store.apply_status(status(0));

        let same = store.apply_status(status(0));
        assert!(!same.pc_changed());

        let moved = store.apply_status(status(2));
        assert!(moved.pc_changed());
        assert_eq!(moved.previous_pc, Some(0));
        assert_eq!(store.snapshot_status().map(|s| s.program_counter), Some(2));
    }

    #[test]
    fn test_pc_outside_listing() {
        let mut store = ReplicaStore::default();
        store.apply_program(vec![entry(0), entry(1), entry(3)]);

        assert!(!store.apply_status(status(3)).pc_outside_listing);
        assert!(store.apply_status(status(2)).pc_outside_listing);
    }

    #[test]
    fn test_program_sorted_by_address() {
        let mut store = ReplicaStore::default();
        store.apply_program(vec![entry(5), entry(1), entry(3)]);
        let addresses: Vec<u16> = store.snapshot_program().iter().map(|e| e.address).collect();
        assert_eq!(addresses, vec![1, 3, 5]);
    }

    #[test]
    fn test_buffers_are_independent() {
        let mut store = ReplicaStore::new(16, 16);
        let patch: DeltaPatch = [(1usize, 7u8)].into_iter().collect();
        store.apply_delta(BufferId::Video, &patch).unwrap();

        assert_eq!(store.video().read(1), Some(7));
        assert_eq!(store.memory().read(1), Some(0));
        assert_ne!(
            store.current_fingerprint(BufferId::Memory),
            store.current_fingerprint(BufferId::Video)
        );
    }

    #[test]
    fn test_reset_replicas() {
        let mut store = ReplicaStore::new(4, 4);
        store.apply_status(status(9));
        store.apply_program(vec![entry(9)]);
        store.apply_full(BufferId::Memory, &[1, 2, 3, 4]);

        store.reset_replicas();

        assert!(store.snapshot_status().is_none());
        assert!(store.snapshot_program().is_empty());
        assert_eq!(store.memory().bytes(), &[0, 0, 0, 0]);
        assert_eq!(store.memory().capacity(), 4);
    }
}

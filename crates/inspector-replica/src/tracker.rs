//! リモート側の差分計算
//!
//! ハッシュゲート付きポーリングのリモート側。エミュレータのバックエンドが
//! `GET memory?hash=<fp>` に応答するときに使う（テストでは基準リモートとして使う）。
//!
//! ## 判定手順
//! ```text
//! 基準なし                         → 全体
//! client_fp == fp(現在)            → 空パッチ（変更なし）
//! client_fp == fp(基準)            → 基準と現在で異なる位置だけ
//! それ以外                         → 全体（常に正しいフォールバック）
//! ```
//! 応答のたびに基準を現在の内容で置き換える。

use inspector_hash::Fingerprint;
use inspector_proto::{BufferPayload, DeltaPatch};
use tracing::trace;

/// 最後に送ったバッファを覚えて差分を返す
#[derive(Debug, Clone, Default)]
pub struct DeltaTracker {
    /// 最後にクライアントへ送った内容とそのフィンガープリント
    baseline: Option<(Vec<u8>, Fingerprint)>,
}

impl DeltaTracker {
    /// 基準なしで生成する（最初の応答は必ず全体）
    pub fn new() -> Self {
        DeltaTracker::default()
    }

    /// クライアントのフィンガープリントと現在の内容から応答を作る
    ///
    /// # 引数
    /// - `client`: クライアントが送ったフィンガープリント（解析できなければ None）
    /// - `current`: リモートの現在のバッファ
    pub fn delta_for(&mut self, client: Option<Fingerprint>, current: &[u8]) -> BufferPayload {
        let current_fp = Fingerprint::of(current);

        let payload = match (&self.baseline, client) {
            (_, Some(fp)) if fp == current_fp => {
                trace!("client is up to date");
                BufferPayload::Delta(DeltaPatch::new())
            }
            (Some((baseline, baseline_fp)), Some(fp))
                if fp == *baseline_fp && baseline.len() == current.len() =>
            {
                let patch = diff(baseline, current);
                trace!(changed = patch.len(), "sending delta against baseline");
                BufferPayload::Delta(patch)
            }
            _ => {
                trace!("fingerprint mismatch, sending full buffer");
                BufferPayload::Full(current.to_vec())
            }
        };

        self.baseline = Some((current.to_vec(), current_fp));
        payload
    }

    /// 基準を捨てる（リモート側のリセット時）
    pub fn forget(&mut self) {
        self.baseline = None;
    }
}

/// 2 つの同じ長さのバッファで値が異なる位置の差分
pub fn diff(previous: &[u8], current: &[u8]) -> DeltaPatch {
    previous
        .iter()
        .zip(current.iter())
        .enumerate()
        .filter(|(_, (prev, cur))| prev != cur)
        .map(|(address, (_, &cur))| (address, cur))
        .collect()
}

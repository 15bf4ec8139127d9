//! # inspector-hash
//!
//! レプリカの鮮度判定に使うコンテンツハッシュ。
//!
//! クライアントは手元のバッファのフィンガープリントをリモートに送り、
//! リモートは自分のフィンガープリントと比較して「変更なし」か差分を返す。
//! 暗号学的な強度は不要で、不要な全転送を避けられれば十分。
//!
//! ## アルゴリズム
//!
//! ```text
//! XXH64(bytes, seed = 0) → u64 → 10 進数文字列
//! ```
//!
//! リモート側（エミュレータ）も同じ関数でハッシュを計算するため、
//! seed やアルゴリズムを変更するとハッシュゲートが常にミスする。

#![no_std]
extern crate alloc;

mod error;
mod fingerprint;

pub use error::FingerprintError;
pub use fingerprint::Fingerprint;

/// XXH64 の seed（リモート側と一致させること）
pub const HASH_SEED: u64 = 0;

/// バイト列の 64 ビットハッシュを計算する
///
/// 決定的かつ順序依存。64 KiB のバッファでも同期のたびに計算できる速度。
pub fn hash(bytes: &[u8]) -> u64 {
    xxhash_rust::xxh64::xxh64(bytes, HASH_SEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_known_value() {
        // XXH64("", 0) の既知値
        assert_eq!(hash(&[]), 0xEF46_DB37_51D8_E999);
    }

    #[test]
    fn test_hash_deterministic() {
        let data = [0x3Eu8, 0x42, 0xD3, 0x98];
        assert_eq!(hash(&data), hash(&data));
    }

    #[test]
    fn test_hash_order_sensitive() {
        assert_ne!(hash(&[1, 2, 3, 4]), hash(&[4, 3, 2, 1]));
        assert_ne!(hash(&[0, 1]), hash(&[1, 0]));
    }

    #[test]
    fn test_hash_length_sensitive() {
        // 末尾のゼロも内容の一部として扱う
        assert_ne!(hash(&[0u8; 16]), hash(&[0u8; 17]));
    }

    #[test]
    fn test_full_memory_buffer() {
        let mut memory = alloc::vec![0u8; 64 * 1024];
        let zero = hash(&memory);
        memory[0xFFFF] = 1;
        assert_ne!(hash(&memory), zero);
    }
}

//! フィンガープリントの性質テスト（proptest）

use inspector_hash::{hash, Fingerprint};
use proptest::prelude::*;

proptest! {
    /// 同じ入力には常に同じハッシュ
    #[test]
    fn hash_is_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert_eq!(hash(&bytes), hash(&bytes));
        prop_assert_eq!(Fingerprint::of(&bytes), Fingerprint::of(&bytes));
    }

    /// 1 バイトでも変われば（ほぼ確実に）ハッシュも変わる
    #[test]
    fn single_byte_mutation_changes_hash(
        bytes in proptest::collection::vec(any::<u8>(), 1..4096),
        index in any::<prop::sample::Index>(),
        delta in 1u8..=255,
    ) {
        let mut mutated = bytes.clone();
        let i = index.index(mutated.len());
        mutated[i] = mutated[i].wrapping_add(delta);
        prop_assert_ne!(hash(&bytes), hash(&mutated));
    }

    /// 異なる 2 箇所の入れ替えでハッシュが変わる（順序依存）
    #[test]
    fn swapping_distinct_bytes_changes_hash(
        bytes in proptest::collection::vec(any::<u8>(), 2..1024),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let i = a.index(bytes.len());
        let j = b.index(bytes.len());
        prop_assume!(bytes[i] != bytes[j]);
        let mut swapped = bytes.clone();
        swapped.swap(i, j);
        prop_assert_ne!(hash(&bytes), hash(&swapped));
    }

    /// 10 進数表記は解析して元に戻る
    #[test]
    fn fingerprint_text_parses_back(raw in any::<u64>()) {
        let fp = Fingerprint::from_raw(raw);
        let parsed: Fingerprint = fp.to_string().parse().unwrap();
        prop_assert_eq!(parsed, fp);
    }
}

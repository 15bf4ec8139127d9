//! レプリカの性質テスト（proptest）

use inspector_proto::DeltaPatch;
use inspector_replica::{DeltaTracker, MemoryReplica, ReplicaError};
use proptest::prelude::*;

const CAPACITY: usize = 1024;

fn arb_patch(max_address: usize) -> impl Strategy<Value = DeltaPatch> {
    proptest::collection::btree_map(0..max_address, any::<u8>(), 0..64)
        .prop_map(|entries| entries.into_iter().collect())
}

fn replica_with(initial: &[u8]) -> MemoryReplica {
    let mut replica = MemoryReplica::new(CAPACITY);
    replica.apply_full(initial);
    replica
}

proptest! {
    /// パッチに含まれないアドレスは変化しない
    #[test]
    fn delta_touches_only_addressed_positions(
        initial in proptest::collection::vec(any::<u8>(), CAPACITY),
        patch in arb_patch(CAPACITY),
    ) {
        let mut replica = replica_with(&initial);
        replica.apply_delta(&patch).unwrap();

        for (address, &before) in initial.iter().enumerate() {
            let after = replica.read(address).unwrap();
            match patch.get(address) {
                Some(value) => prop_assert_eq!(after, value),
                None => prop_assert_eq!(after, before),
            }
        }
    }

    /// 容量外のアドレスを 1 つでも含むパッチは何も変更しない
    #[test]
    fn out_of_range_patch_mutates_nothing(
        initial in proptest::collection::vec(any::<u8>(), CAPACITY),
        patch in arb_patch(CAPACITY),
        bad_address in CAPACITY..CAPACITY * 4,
        bad_value in any::<u8>(),
    ) {
        let mut replica = replica_with(&initial);
        let revision = replica.revision();
        let mut patch = patch;
        patch.insert(bad_address, bad_value);

        let result = replica.apply_delta(&patch);

        let is_range_error = matches!(result, Err(ReplicaError::AddressOutOfRange { .. }));
        prop_assert!(is_range_error);
        prop_assert_eq!(replica.bytes(), initial.as_slice());
        prop_assert_eq!(replica.revision(), revision);
    }

    /// 空パッチはビット単位で何も変えない
    #[test]
    fn empty_patch_is_identity(initial in proptest::collection::vec(any::<u8>(), CAPACITY)) {
        let mut replica = replica_with(&initial);
        let fingerprint = replica.fingerprint();
        replica.apply_delta(&DeltaPatch::new()).unwrap();
        prop_assert_eq!(replica.bytes(), initial.as_slice());
        prop_assert_eq!(replica.fingerprint(), fingerprint);
    }

    /// トラッカーの応答を順に適用すると、クライアントは常にリモートと一致する
    #[test]
    fn tracker_keeps_client_in_sync(
        writes in proptest::collection::vec(
            proptest::collection::vec((0..CAPACITY, any::<u8>()), 0..16),
            1..8,
        ),
    ) {
        let mut tracker = DeltaTracker::new();
        let mut remote = vec![0u8; CAPACITY];
        let mut client = MemoryReplica::new(CAPACITY);

        for step in writes {
            for (address, value) in step {
                remote[address] = value;
            }
            let payload = tracker.delta_for(Some(client.fingerprint()), &remote);
            client.apply_payload(&payload).unwrap();
            prop_assert_eq!(client.bytes(), remote.as_slice());
        }
    }
}

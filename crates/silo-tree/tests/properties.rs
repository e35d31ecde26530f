//! Property-based tests for the bucket tree invariants.
//!
//! The tree must behave as an ordered entry set no matter how insertions
//! interleave, keep every bucket within capacity, and hand back exactly a
//! bucket's contents when a sealed handle is redeemed.

use proptest::prelude::*;
use std::collections::BTreeSet;

use silo_tree::{seal_digest, BucketTree, Entry, EventId, Merge};

fn arb_entry() -> impl Strategy<Value = Entry> {
    (1u64..200, prop::collection::vec(any::<u8>(), 0..4))
        .prop_map(|(id, payload)| Entry::new(EventId::new(id), payload))
}

fn arb_entries() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(arb_entry(), 0..120)
}

fn arb_capacity() -> impl Strategy<Value = u32> {
    2u32..8
}

fn build(capacity: u32, entries: &[Entry]) -> BucketTree {
    let mut tree = BucketTree::new(capacity).unwrap();
    for entry in entries {
        tree.insert(entry.clone());
    }
    tree
}

proptest! {
    #[test]
    fn value_preserves_distinct_inserts(capacity in arb_capacity(), entries in arb_entries()) {
        let tree = build(capacity, &entries);

        let expected: BTreeSet<Entry> = entries.iter().cloned().collect();
        prop_assert_eq!(tree.entries(), expected.clone());
        prop_assert_eq!(tree.len(), expected.len());
    }

    #[test]
    fn fanout_stays_bounded(capacity in arb_capacity(), entries in arb_entries()) {
        let tree = build(capacity, &entries);

        let stats = tree.stats();
        prop_assert!(stats.max_fanout <= capacity as usize);
        prop_assert_eq!(stats.entries, tree.len());
    }

    #[test]
    fn insertion_is_deterministic(capacity in arb_capacity(), entries in arb_entries()) {
        // Same insertion sequence, same buckets, same digests.
        let a = build(capacity, &entries);
        let b = build(capacity, &entries);
        prop_assert_eq!(a.sealed(), b.sealed());
    }

    #[test]
    fn leaf_handles_rehash_to_their_digest(capacity in arb_capacity(), entries in arb_entries()) {
        let tree = build(capacity, &entries);

        for handle in tree.sealed() {
            let mut scratch = tree.clone();
            let removed = scratch.extract(&handle).expect("advertised handle must resolve");

            // Redeeming a handle removes exactly those entries.
            let before = tree.entries();
            let after = scratch.entries();
            prop_assert_eq!(before.len(), after.len() + removed.len());
            for entry in &removed {
                prop_assert!(before.contains(entry));
                prop_assert!(!after.contains(entry));
            }

            // Leaf buckets re-hash to their advertised digest.
            if removed.len() == capacity as usize {
                prop_assert_eq!(seal_digest(&removed), handle.digest);
            }
        }
    }

    #[test]
    fn merge_is_commutative_on_entries(
        capacity in arb_capacity(),
        left in arb_entries(),
        right in arb_entries(),
    ) {
        let a = build(capacity, &left);
        let b = build(capacity, &right);

        prop_assert_eq!(a.merge(&b).entries(), b.merge(&a).entries());
    }

    #[test]
    fn merge_is_idempotent_on_entries(capacity in arb_capacity(), entries in arb_entries()) {
        let tree = build(capacity, &entries);
        prop_assert_eq!(tree.merge(&tree).entries(), tree.entries());
    }

    #[test]
    fn extract_then_reinsert_restores_value(capacity in arb_capacity(), entries in arb_entries()) {
        let full = build(capacity, &entries);
        let mut tree = full.clone();

        let handles = tree.sealed();
        if let Some(handle) = handles.first() {
            let removed = tree.extract(handle).expect("advertised handle must resolve");
            for entry in removed {
                tree.insert(entry);
            }
            prop_assert_eq!(tree.entries(), full.entries());
        }
    }
}

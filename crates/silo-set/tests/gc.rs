//! End-to-end garbage collection tests.
//!
//! Buckets of tombstones seal, replicas intersect the sealed handles, and
//! applying a universally-held handle erases the bucket everywhere without
//! changing the observable set.

use std::collections::BTreeSet;

use silo_set::{EventId, GcOrSet, Handle, Hasher, Merge};

const CAPACITY: u32 = 3;

fn id(n: u64) -> EventId {
    EventId::new(n)
}

/// A replica with three removed elements (one sealed tombstone bucket)
/// and one surviving element.
fn replica_with_sealed_bucket() -> GcOrSet {
    let mut set = GcOrSet::new(CAPACITY).unwrap();
    set.add(id(1), b"apple".to_vec()).unwrap();
    set.add(id(2), b"banana".to_vec()).unwrap();
    set.add(id(3), b"cherry".to_vec()).unwrap();
    set.add(id(4), b"damson".to_vec()).unwrap();

    set.remove(id(101), b"apple").unwrap();
    set.remove(id(102), b"banana").unwrap();
    set.remove(id(103), b"cherry").unwrap();
    set
}

fn common_handles(a: &GcOrSet, b: &GcOrSet) -> Vec<Handle> {
    let theirs: BTreeSet<Handle> = b.gcable().into_iter().collect();
    a.gcable()
        .into_iter()
        .filter(|handle| theirs.contains(handle))
        .collect()
}

#[test]
fn test_replicated_buckets_intersect() {
    let a = replica_with_sealed_bucket();
    // A peer that unions the same history seals the same bucket.
    let b = GcOrSet::new(CAPACITY).unwrap().merge(&a);

    let common = common_handles(&a, &b);
    assert_eq!(common.len(), 1);
    assert_eq!(common[0].newest, id(103));
}

#[test]
fn test_gc_shrinks_state_and_still_converges() {
    let mut a = replica_with_sealed_bucket();
    let mut b = GcOrSet::new(CAPACITY).unwrap().merge(&a);

    let handle = common_handles(&a, &b)[0];
    let before = serde_json::to_vec(&a).unwrap().len();

    assert_eq!(a.gc(&handle), 3);
    assert_eq!(b.gc(&handle), 3);

    let after = serde_json::to_vec(&a).unwrap().len();
    assert!(
        after < before,
        "gc should shrink serialized state: {} -> {}",
        before,
        after
    );

    // The observable set is untouched and replicas still converge.
    let expected = BTreeSet::from([b"damson".to_vec()]);
    assert_eq!(a.value(), expected.clone());
    assert_eq!(a.merge(&b).value(), expected.clone());
    assert_eq!(b.merge(&a).value(), expected);
}

#[test]
fn test_gc_is_neutral_for_universal_handles() {
    let a0 = replica_with_sealed_bucket();
    let mut b0 = GcOrSet::new(CAPACITY).unwrap().merge(&a0);
    // Divergent extra work on the peer.
    b0.add(id(50), b"elder".to_vec()).unwrap();

    let plain = a0.merge(&b0).value();

    let handle = common_handles(&a0, &b0)[0];
    let mut a1 = a0.clone();
    let mut b1 = b0.clone();
    a1.gc(&handle);
    b1.gc(&handle);

    assert_eq!(a1.merge(&b1).value(), plain);
}

#[test]
fn test_merge_replays_gc_instead_of_resurrecting() {
    let a0 = replica_with_sealed_bucket();
    let b = GcOrSet::new(CAPACITY).unwrap().merge(&a0);

    // Only A collects; B still carries the bucket.
    let handle = common_handles(&a0, &b)[0];
    let mut a = a0;
    a.gc(&handle);

    for merged in [a.merge(&b), b.merge(&a)] {
        assert_eq!(merged.value(), BTreeSet::from([b"damson".to_vec()]));
        // The erased bucket did not come back through the union, and the
        // trail remembers the erasure.
        assert!(!merged.gcable().contains(&handle));
        assert!(merged.trail().contains(&handle));
    }
}

#[test]
fn test_gc_of_unknown_handle_only_grows_trail() {
    let mut a = GcOrSet::new(CAPACITY).unwrap();
    a.add(id(1), b"apple".to_vec()).unwrap();

    let foreign = Handle::new(id(777), Hasher::hash(b"someone else's bucket"));
    let value_before = a.value();
    assert_eq!(a.gc(&foreign), 0);
    assert_eq!(a.value(), value_before);
    assert_eq!(a.trail(), vec![foreign]);

    // Merging with an unrelated replica still yields the plain union.
    let mut b = GcOrSet::new(CAPACITY).unwrap();
    b.add(id(2), b"pear".to_vec()).unwrap();
    assert_eq!(
        a.merge(&b).value(),
        BTreeSet::from([b"apple".to_vec(), b"pear".to_vec()])
    );
    assert_eq!(a.merge(&b).value(), b.merge(&a).value());
}

#[test]
fn test_gc_applies_in_any_order() {
    // Two sealed buckets; replicas collect them in opposite orders.
    let build = || {
        let mut set = GcOrSet::new(CAPACITY).unwrap();
        for n in 1..=6u64 {
            set.add(id(n), vec![b'a' + n as u8]).unwrap();
            set.remove(id(100 + n), &[b'a' + n as u8]).unwrap();
        }
        set.add(id(7), b"keep".to_vec()).unwrap();
        set
    };
    let mut a = build();
    let mut b = build();

    let handles = common_handles(&a, &b);
    assert!(handles.len() >= 2);

    for handle in &handles {
        a.gc(handle);
    }
    for handle in handles.iter().rev() {
        b.gc(handle);
    }

    let expected = BTreeSet::from([b"keep".to_vec()]);
    assert_eq!(a.value(), expected.clone());
    assert_eq!(b.value(), expected.clone());
    assert_eq!(a.merge(&b).value(), expected);
}

#[test]
fn test_trail_buckets_collapse_when_collected() {
    // Three GC rounds seal the trail itself; collecting the trail bucket
    // folds its handles into a single record.
    let mut set = GcOrSet::new(CAPACITY).unwrap();
    let mut seq = 0u64;
    let mut clock = 1000u64;

    for _ in 0..3 {
        for _ in 0..3 {
            seq += 1;
            set.add(id(seq), vec![b'a' + seq as u8]).unwrap();
            clock += 1;
            set.remove(id(clock), &[b'a' + seq as u8]).unwrap();
        }
        let handle = set
            .gcable()
            .into_iter()
            .next()
            .expect("a sealed tombstone bucket");
        assert_eq!(set.gc(&handle), 3);
    }
    assert_eq!(set.trail().len(), 3);

    // With the tombstone tree drained, the only sealed bucket left is the
    // trail's own.
    let gcable = set.gcable();
    assert_eq!(gcable.len(), 1);
    let trail_bucket = gcable[0];

    assert_eq!(set.gc(&trail_bucket), 0);
    assert_eq!(set.trail(), vec![trail_bucket]);
}

#[test]
fn test_life_goes_on_after_gc() {
    // New adds and removes keep working on a collected replica, and a
    // peer that never collected still converges with it.
    let mut a = replica_with_sealed_bucket();
    let b = GcOrSet::new(CAPACITY).unwrap().merge(&a);

    let handle = common_handles(&a, &b)[0];
    a.gc(&handle);

    a.add(id(10), b"elder".to_vec()).unwrap();
    a.remove(id(200), b"damson").unwrap();

    let expected = BTreeSet::from([b"elder".to_vec()]);
    assert_eq!(a.value(), expected.clone());
    assert_eq!(a.merge(&b).value(), expected.clone());
    assert_eq!(b.merge(&a).value(), expected);
}

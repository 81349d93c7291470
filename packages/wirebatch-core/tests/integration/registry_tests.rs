//! Callback registry tests under concurrency.

use std::cmp::Ordering;
use std::sync::{Arc, Barrier};
use std::thread;

use ntest::timeout;

use wirebatch_core::registry::{
    BytewiseComparator, Comparator, ComparatorHandle, FilterPolicy, MergeOperator,
};
use wirebatch_core::{CallbackRegistry, CowList};

/// Comparator that tags itself with the thread that registered it.
struct Tagged(String);

impl Comparator for Tagged {
    fn name(&self) -> &str {
        &self.0
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

struct Concat;

impl MergeOperator for Concat {
    fn name(&self) -> &str {
        "concat"
    }

    fn full_merge(
        &self,
        _key: &[u8],
        existing_value: Option<&[u8]>,
        operands: &[&[u8]],
    ) -> Option<Vec<u8>> {
        let mut merged = existing_value.unwrap_or_default().to_vec();
        for operand in operands {
            merged.extend_from_slice(operand);
        }
        Some(merged)
    }
}

struct ExactKeys;

impl FilterPolicy for ExactKeys {
    fn name(&self) -> &str {
        "exact-keys"
    }

    fn create_filter(&self, keys: &[&[u8]]) -> Vec<u8> {
        keys.join(&0u8)
    }

    fn key_may_match(&self, key: &[u8], filter: &[u8]) -> bool {
        filter.split(|&b| b == 0).any(|k| k == key)
    }
}

#[timeout(10000)]
#[test]
fn test_concurrent_registration_distinct_indices() {
    const THREADS: usize = 32;
    let registry = Arc::new(CallbackRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let name = format!("cmp-{}", i);
                let handle = registry.register_comparator(Arc::new(Tagged(name.clone())));
                (handle, name)
            })
        })
        .collect();

    let mut results: Vec<(ComparatorHandle, String)> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();
    results.sort_by_key(|(handle, _)| handle.index());

    for (expected_index, (handle, name)) in results.iter().enumerate() {
        assert_eq!(handle.index(), expected_index);
        assert_eq!(&*registry.comparator_name(*handle), name.as_str());
    }
}

#[timeout(10000)]
#[test]
fn test_lookups_race_with_appends() {
    let list = Arc::new(CowList::new());
    for i in 0..8u64 {
        list.append(i);
    }

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let list = Arc::clone(&list);
            thread::spawn(move || {
                for round in 0..10_000u64 {
                    let index = (round % 8) as usize;
                    assert_eq!(list.get(index), index as u64);
                    let snapshot = list.snapshot();
                    for (i, value) in snapshot.iter().enumerate() {
                        assert_eq!(*value, i as u64);
                    }
                }
            })
        })
        .collect();

    for i in 8..200u64 {
        assert_eq!(list.append(i), i as usize);
    }

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(list.len(), 200);
}

#[timeout(5000)]
#[test]
fn test_adapters_share_one_registry() {
    let registry = Arc::new(CallbackRegistry::new());
    let cmp = registry.register_comparator(Arc::new(BytewiseComparator));
    let merge = registry.register_merge_operator(Arc::new(Concat));
    let policy = registry.register_filter_policy(Arc::new(ExactKeys));

    // Each kind is indexed independently.
    assert_eq!(cmp.index(), 0);
    assert_eq!(merge.index(), 0);
    assert_eq!(policy.index(), 0);

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..1000 {
                    assert_eq!(registry.compare(cmp, b"a", b"b"), -1);
                    assert_eq!(
                        registry.full_merge(merge, b"k", Some(b"x".as_slice()), &[b"y".as_slice()]),
                        Some(b"xy".to_vec())
                    );
                    let filter = registry.create_filter(policy, &[b"one".as_slice(), b"two"]);
                    assert!(registry.key_may_match(policy, b"two", &filter));
                    assert!(!registry.key_may_match(policy, b"three", &filter));
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
}

//! Comparator callbacks.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{ordering_to_int, CallbackRegistry};
use crate::batch::timestamp;

/// Total order over keys supplied by the user.
///
/// Timestamp-aware comparators report a non-zero
/// [`timestamp_size`](Self::timestamp_size); every key then ends with a
/// timestamp suffix of that width.
pub trait Comparator: Send + Sync {
    /// Name persisted by the engine; must stay stable across restarts.
    fn name(&self) -> &str;

    /// Three-way comparison of two full keys.
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;

    /// Width of the timestamp suffix in bytes.
    fn timestamp_size(&self) -> usize {
        0
    }

    /// Compares two timestamps (suffixes only).
    fn compare_timestamp(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }

    /// Compares keys ignoring their timestamp suffixes.
    ///
    /// `a_has_ts` / `b_has_ts` state whether each key carries a suffix.
    /// The default strips the suffixes and delegates to `compare`, which is
    /// only correct for comparators without timestamps.
    fn compare_without_timestamp(
        &self,
        a: &[u8],
        a_has_ts: bool,
        b: &[u8],
        b_has_ts: bool,
    ) -> Ordering {
        let ts_size = self.timestamp_size();
        self.compare(
            strip_timestamp(a, a_has_ts, ts_size),
            strip_timestamp(b, b_has_ts, ts_size),
        )
    }
}

fn strip_timestamp(key: &[u8], has_ts: bool, ts_size: usize) -> &[u8] {
    if has_ts {
        &key[..key.len().saturating_sub(ts_size)]
    } else {
        key
    }
}

/// Lexicographic byte order, the engine's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytewiseComparator;

impl Comparator for BytewiseComparator {
    fn name(&self) -> &str {
        "leveldb.BytewiseComparator"
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

/// Bytewise user keys with an 8-byte little-endian u64 timestamp suffix.
///
/// Equal user keys order newer timestamps first.
#[derive(Debug, Clone, Copy, Default)]
pub struct U64TsBytewiseComparator;

impl Comparator for U64TsBytewiseComparator {
    fn name(&self) -> &str {
        "leveldb.BytewiseComparator.u64ts"
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        let ts_size = timestamp::U64_TIMESTAMP_SIZE;
        let split_a = a.len().saturating_sub(ts_size);
        let split_b = b.len().saturating_sub(ts_size);
        a[..split_a]
            .cmp(&b[..split_b])
            .then_with(|| self.compare_timestamp(&a[split_a..], &b[split_b..]).reverse())
    }

    fn timestamp_size(&self) -> usize {
        timestamp::U64_TIMESTAMP_SIZE
    }

    fn compare_timestamp(&self, a: &[u8], b: &[u8]) -> Ordering {
        match (timestamp::decode_u64(a), timestamp::decode_u64(b)) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => a.cmp(b),
        }
    }

    fn compare_without_timestamp(
        &self,
        a: &[u8],
        a_has_ts: bool,
        b: &[u8],
        b_has_ts: bool,
    ) -> Ordering {
        let ts_size = timestamp::U64_TIMESTAMP_SIZE;
        strip_timestamp(a, a_has_ts, ts_size).cmp(strip_timestamp(b, b_has_ts, ts_size))
    }
}

/// Handle for a registered comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComparatorHandle(usize);

impl ComparatorHandle {
    /// Rebuilds a handle from the integer carried across the native boundary.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Returns the integer handed to native code.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone)]
pub(crate) struct ComparatorSlot {
    name: Arc<str>,
    comparator: Arc<dyn Comparator>,
}

impl CallbackRegistry {
    /// Registers a comparator and returns its handle.
    pub fn register_comparator(&self, comparator: Arc<dyn Comparator>) -> ComparatorHandle {
        let name: Arc<str> = Arc::from(comparator.name());
        let index = self.comparators.append(ComparatorSlot {
            name: Arc::clone(&name),
            comparator,
        });
        tracing::debug!(name = %name, index, "registered comparator");
        ComparatorHandle(index)
    }

    /// Returns the registered comparator.
    pub fn comparator(&self, handle: ComparatorHandle) -> Arc<dyn Comparator> {
        self.comparators.get(handle.0).comparator
    }

    /// Name cached at registration time.
    pub fn comparator_name(&self, handle: ComparatorHandle) -> Arc<str> {
        self.comparators.get(handle.0).name
    }

    /// Three-way comparison: negative, zero or positive.
    pub fn compare(&self, handle: ComparatorHandle, a: &[u8], b: &[u8]) -> i32 {
        ordering_to_int(self.comparators.get(handle.0).comparator.compare(a, b))
    }

    /// Timestamp comparison for timestamp-aware comparators.
    pub fn compare_timestamp(&self, handle: ComparatorHandle, a: &[u8], b: &[u8]) -> i32 {
        ordering_to_int(self.comparators.get(handle.0).comparator.compare_timestamp(a, b))
    }

    /// Comparison ignoring timestamp suffixes.
    pub fn compare_without_timestamp(
        &self,
        handle: ComparatorHandle,
        a: &[u8],
        a_has_ts: bool,
        b: &[u8],
        b_has_ts: bool,
    ) -> i32 {
        let comparator = self.comparators.get(handle.0).comparator;
        ordering_to_int(comparator.compare_without_timestamp(a, a_has_ts, b, b_has_ts))
    }
}

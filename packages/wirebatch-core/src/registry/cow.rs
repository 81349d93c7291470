//! Copy-on-write list using ArcSwap for lock-free lookups.
//!
//! Readers load the current immutable snapshot with a single atomic
//! operation and never take a lock. Writers are serialized by a mutex, build
//! a new snapshot one element longer and publish it atomically.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

/// Append-only, index-addressed list with wait-free reads.
///
/// Indices returned by [`append`](Self::append) stay valid for the lifetime
/// of the list; entries are never removed or replaced.
#[derive(Debug)]
pub struct CowList<T> {
    /// Current published snapshot
    inner: ArcSwap<Vec<T>>,
    /// Serializes writers; readers never touch it
    writer: Mutex<()>,
}

impl<T> Default for CowList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CowList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Vec::new()),
            writer: Mutex::new(()),
        }
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Returns `true` if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    /// Loads the current snapshot.
    ///
    /// The snapshot is immutable; later appends publish a new one.
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        self.inner.load_full()
    }
}

impl<T: Clone> CowList<T> {
    /// Appends `item` and returns its index.
    ///
    /// # Performance
    /// - O(n): copies the current snapshot into a new allocation
    /// - Blocks only on other concurrent appends
    pub fn append(&self, item: T) -> usize {
        // The guarded data is (); a poisoned lock leaves nothing inconsistent.
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.inner.load();
        let index = current.len();
        let mut next = Vec::with_capacity(index + 1);
        next.extend_from_slice(current.as_slice());
        next.push(item);
        self.inner.store(Arc::new(next));
        index
    }

    /// Returns a clone of the entry at `index`.
    ///
    /// # Performance
    /// - O(1), one atomic load, no lock
    ///
    /// # Panics
    /// Panics if `index` was not returned by `append` on this list.
    pub fn get(&self, index: usize) -> T {
        let list = self.inner.load();
        match list.get(index) {
            Some(item) => item.clone(),
            None => panic!(
                "callback index {} out of range (registered: {})",
                index,
                list.len()
            ),
        }
    }
}

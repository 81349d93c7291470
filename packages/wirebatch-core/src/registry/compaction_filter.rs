//! Compaction filter callbacks.

use std::sync::Arc;

use super::CallbackRegistry;

/// Outcome of filtering one entry during compaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Keep the entry unchanged
    Keep,
    /// Drop the entry
    Remove,
    /// Keep the entry with a replacement value
    ChangeValue(Vec<u8>),
}

/// Inspects entries as compaction rewrites them.
pub trait CompactionFilter: Send + Sync {
    fn name(&self) -> &str;

    /// Decides the fate of `key -> value` found at `level`.
    fn filter(&self, level: u32, key: &[u8], value: &[u8]) -> Decision;
}

/// Handle for a registered compaction filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompactionFilterHandle(usize);

impl CompactionFilterHandle {
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
pub(crate) struct CompactionFilterSlot {
    name: Arc<str>,
    filter: Arc<dyn CompactionFilter>,
}

impl CallbackRegistry {
    /// Registers a compaction filter and returns its handle.
    pub fn register_compaction_filter(
        &self,
        filter: Arc<dyn CompactionFilter>,
    ) -> CompactionFilterHandle {
        let name: Arc<str> = Arc::from(filter.name());
        let index = self.compaction_filters.append(CompactionFilterSlot {
            name: Arc::clone(&name),
            filter,
        });
        tracing::debug!(name = %name, index, "registered compaction filter");
        CompactionFilterHandle(index)
    }

    /// Returns the registered compaction filter.
    pub fn compaction_filter(&self, handle: CompactionFilterHandle) -> Arc<dyn CompactionFilter> {
        self.compaction_filters.get(handle.0).filter
    }

    /// Name cached at registration time.
    pub fn compaction_filter_name(&self, handle: CompactionFilterHandle) -> Arc<str> {
        self.compaction_filters.get(handle.0).name
    }

    /// Runs the filter and returns `(remove, replacement_value)`.
    pub fn filter(
        &self,
        handle: CompactionFilterHandle,
        level: u32,
        key: &[u8],
        value: &[u8],
    ) -> (bool, Option<Vec<u8>>) {
        match self.compaction_filters.get(handle.0).filter.filter(level, key, value) {
            Decision::Keep => (false, None),
            Decision::Remove => (true, None),
            Decision::ChangeValue(new_value) => (false, Some(new_value)),
        }
    }
}

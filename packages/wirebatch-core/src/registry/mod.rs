//! Callback registry resolving integer handles to user callbacks.
//!
//! Native trampolines only ever carry a `usize` handle across the foreign
//! boundary. The registry maps that handle back to the registered object
//! through a [`CowList`], so lookups on engine background threads never take
//! a lock. Each callback kind has its own list and its own handle type.

pub mod compaction_filter;
pub mod comparator;
mod cow;
pub mod filter_policy;
pub mod merge_operator;

use std::fmt;

pub use compaction_filter::{CompactionFilter, CompactionFilterHandle, Decision};
pub use comparator::{
    BytewiseComparator, Comparator, ComparatorHandle, U64TsBytewiseComparator,
};
pub use cow::CowList;
pub use filter_policy::{FilterPolicy, FilterPolicyHandle};
pub use merge_operator::{MergeOperator, MergeOperatorHandle};

/// Registry of user callbacks, one append-only list per callback kind.
///
/// Owned by whatever owns the configuration the callbacks belong to; handles
/// are only meaningful for the registry that issued them.
#[derive(Default)]
pub struct CallbackRegistry {
    pub(crate) comparators: CowList<comparator::ComparatorSlot>,
    pub(crate) merge_operators: CowList<merge_operator::MergeOperatorSlot>,
    pub(crate) compaction_filters: CowList<compaction_filter::CompactionFilterSlot>,
    pub(crate) filter_policies: CowList<filter_policy::FilterPolicySlot>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("comparators", &self.comparators.len())
            .field("merge_operators", &self.merge_operators.len())
            .field("compaction_filters", &self.compaction_filters.len())
            .field("filter_policies", &self.filter_policies.len())
            .finish()
    }
}

/// Maps an ordering onto the native three-way comparison result.
pub(crate) fn ordering_to_int(ordering: std::cmp::Ordering) -> i32 {
    match ordering {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

//! Filter policy callbacks.

use std::sync::Arc;

use super::CallbackRegistry;

/// Builds and probes per-table key filters (e.g. bloom filters).
pub trait FilterPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// Builds a filter over `keys`, which are sorted by the active
    /// comparator and may contain duplicates.
    fn create_filter(&self, keys: &[&[u8]]) -> Vec<u8>;

    /// Must return `true` for every key passed to the `create_filter` call
    /// that produced `filter`; should mostly return `false` otherwise.
    fn key_may_match(&self, key: &[u8], filter: &[u8]) -> bool;
}

/// Handle for a registered filter policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterPolicyHandle(usize);

impl FilterPolicyHandle {
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
pub(crate) struct FilterPolicySlot {
    name: Arc<str>,
    policy: Arc<dyn FilterPolicy>,
}

impl CallbackRegistry {
    /// Registers a filter policy and returns its handle.
    pub fn register_filter_policy(&self, policy: Arc<dyn FilterPolicy>) -> FilterPolicyHandle {
        let name: Arc<str> = Arc::from(policy.name());
        let index = self.filter_policies.append(FilterPolicySlot {
            name: Arc::clone(&name),
            policy,
        });
        tracing::debug!(name = %name, index, "registered filter policy");
        FilterPolicyHandle(index)
    }

    /// Returns the registered filter policy.
    pub fn filter_policy(&self, handle: FilterPolicyHandle) -> Arc<dyn FilterPolicy> {
        self.filter_policies.get(handle.0).policy
    }

    /// Name cached at registration time.
    pub fn filter_policy_name(&self, handle: FilterPolicyHandle) -> Arc<str> {
        self.filter_policies.get(handle.0).name
    }

    /// Builds a filter over `keys`.
    pub fn create_filter(&self, handle: FilterPolicyHandle, keys: &[&[u8]]) -> Vec<u8> {
        self.filter_policies.get(handle.0).policy.create_filter(keys)
    }

    /// Returns `false` only if `key` is definitely absent from `filter`.
    pub fn key_may_match(&self, handle: FilterPolicyHandle, key: &[u8], filter: &[u8]) -> bool {
        self.filter_policies
            .get(handle.0)
            .policy
            .key_may_match(key, filter)
    }
}

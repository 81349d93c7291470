//! Merge operator callbacks.

use std::sync::Arc;

use super::CallbackRegistry;

/// User-defined read-modify-write semantics for merge records.
///
/// Every method returns `None` to signal failure; the engine then treats the
/// merge as unsuccessful (or, for partial merges, keeps the operands as-is).
pub trait MergeOperator: Send + Sync {
    fn name(&self) -> &str;

    /// Combines the existing value (if any) with all pending operands,
    /// oldest first.
    fn full_merge(
        &self,
        key: &[u8],
        existing_value: Option<&[u8]>,
        operands: &[&[u8]],
    ) -> Option<Vec<u8>>;

    /// Combines two adjacent operands into one. Unsupported by default.
    fn partial_merge(&self, _key: &[u8], _left: &[u8], _right: &[u8]) -> Option<Vec<u8>> {
        None
    }

    /// Combines a run of operands into one.
    ///
    /// The default folds [`partial_merge`](Self::partial_merge) left to right
    /// and fails on the first failed step.
    fn partial_merge_multi(&self, key: &[u8], operands: &[&[u8]]) -> Option<Vec<u8>> {
        let (first, rest) = operands.split_first()?;
        let mut merged = first.to_vec();
        for operand in rest {
            merged = self.partial_merge(key, &merged, operand)?;
        }
        Some(merged)
    }
}

/// Handle for a registered merge operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeOperatorHandle(usize);

impl MergeOperatorHandle {
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
pub(crate) struct MergeOperatorSlot {
    name: Arc<str>,
    operator: Arc<dyn MergeOperator>,
}

impl CallbackRegistry {
    /// Registers a merge operator and returns its handle.
    pub fn register_merge_operator(
        &self,
        operator: Arc<dyn MergeOperator>,
    ) -> MergeOperatorHandle {
        let name: Arc<str> = Arc::from(operator.name());
        let index = self.merge_operators.append(MergeOperatorSlot {
            name: Arc::clone(&name),
            operator,
        });
        tracing::debug!(name = %name, index, "registered merge operator");
        MergeOperatorHandle(index)
    }

    /// Returns the registered merge operator.
    pub fn merge_operator(&self, handle: MergeOperatorHandle) -> Arc<dyn MergeOperator> {
        self.merge_operators.get(handle.0).operator
    }

    /// Name cached at registration time.
    pub fn merge_operator_name(&self, handle: MergeOperatorHandle) -> Arc<str> {
        self.merge_operators.get(handle.0).name
    }

    /// Full merge; `None` means the success flag is false.
    pub fn full_merge(
        &self,
        handle: MergeOperatorHandle,
        key: &[u8],
        existing_value: Option<&[u8]>,
        operands: &[&[u8]],
    ) -> Option<Vec<u8>> {
        self.merge_operators
            .get(handle.0)
            .operator
            .full_merge(key, existing_value, operands)
    }

    /// Two-operand partial merge.
    pub fn partial_merge(
        &self,
        handle: MergeOperatorHandle,
        key: &[u8],
        left: &[u8],
        right: &[u8],
    ) -> Option<Vec<u8>> {
        self.merge_operators
            .get(handle.0)
            .operator
            .partial_merge(key, left, right)
    }

    /// Multi-operand partial merge.
    pub fn partial_merge_multi(
        &self,
        handle: MergeOperatorHandle,
        key: &[u8],
        operands: &[&[u8]],
    ) -> Option<Vec<u8>> {
        self.merge_operators
            .get(handle.0)
            .operator
            .partial_merge_multi(key, operands)
    }
}

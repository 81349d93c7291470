//! Batch configuration.

use serde::Deserialize;

/// Batch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Initial buffer capacity in bytes (header included)
    pub reserved_bytes: usize,
    /// Verify the header count once iteration reaches the end of the buffer
    pub verify_count: bool,
    /// Width of the timestamp suffix carried by keys (0 = no timestamps)
    pub timestamp_size: usize,
    /// Number of known column families; decoded indices must stay below it
    pub column_families: Option<u32>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            reserved_bytes: 0,
            verify_count: true,
            timestamp_size: 0,
            column_families: None,
        }
    }
}

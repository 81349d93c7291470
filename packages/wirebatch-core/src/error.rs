//! Batch codec error types.

use thiserror::Error;

/// Errors produced while building or decoding a write batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Buffer ended in the middle of a record or header
    #[error("Truncated batch: {context} at offset {offset}")]
    TruncatedBatch { offset: usize, context: &'static str },

    /// Varint continuation sequence exceeds 10 bytes or overflows u64
    #[error("Malformed varint at offset {offset}")]
    MalformedVarint { offset: usize },

    /// Rollback or pop with an empty save point stack
    #[error("No save point to restore")]
    NoSavePoint,

    /// Record references a column family outside the known set
    #[error("Column family {column_family} out of range (known families: {count})")]
    ColumnFamilyCountMismatch { column_family: u64, count: u64 },

    /// Tag byte does not name a supported record type
    #[error("Unknown record type 0x{tag:02x} at offset {offset}")]
    UnknownRecordType { tag: u8, offset: usize },

    /// Header count disagrees with the number of counted records decoded
    #[error("Batch has wrong count: header says {expected}, found {found}")]
    CountMismatch { expected: u32, found: u32 },
}

pub type Result<T> = std::result::Result<T, BatchError>;

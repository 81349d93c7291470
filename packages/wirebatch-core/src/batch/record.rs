//! Record tags and decoded records.

/// Record tag stored as the first byte of every batch record.
///
/// Discriminants are the engine's value-type constants and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordType {
    Delete = 0x00,
    Put = 0x01,
    Merge = 0x02,
    LogData = 0x03,
    ColumnFamilyDelete = 0x04,
    ColumnFamilyPut = 0x05,
    ColumnFamilyMerge = 0x06,
    SingleDelete = 0x07,
    ColumnFamilySingleDelete = 0x08,
    BeginPrepareXid = 0x09,
    EndPrepareXid = 0x0a,
    CommitXid = 0x0b,
    RollbackXid = 0x0c,
    Noop = 0x0d,
    ColumnFamilyDeleteRange = 0x0e,
    DeleteRange = 0x0f,
    ColumnFamilyBlobIndex = 0x10,
    BlobIndex = 0x11,
    BeginPersistedPrepareXid = 0x12,
    BeginUnprepareXid = 0x13,
}

/// Payload carried after the tag (and column family index, if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Payload {
    /// No payload
    Empty,
    /// One length-prefixed field, decoded into the key
    Key,
    /// One length-prefixed field, decoded into the value
    Value,
    /// Two length-prefixed fields
    KeyValue,
}

impl RecordType {
    /// Parses a tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        use RecordType::*;
        let kind = match tag {
            0x00 => Delete,
            0x01 => Put,
            0x02 => Merge,
            0x03 => LogData,
            0x04 => ColumnFamilyDelete,
            0x05 => ColumnFamilyPut,
            0x06 => ColumnFamilyMerge,
            0x07 => SingleDelete,
            0x08 => ColumnFamilySingleDelete,
            0x09 => BeginPrepareXid,
            0x0a => EndPrepareXid,
            0x0b => CommitXid,
            0x0c => RollbackXid,
            0x0d => Noop,
            0x0e => ColumnFamilyDeleteRange,
            0x0f => DeleteRange,
            0x10 => ColumnFamilyBlobIndex,
            0x11 => BlobIndex,
            0x12 => BeginPersistedPrepareXid,
            0x13 => BeginUnprepareXid,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns the tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Returns `true` if a column family index follows the tag.
    pub fn has_column_family(self) -> bool {
        use RecordType::*;
        matches!(
            self,
            ColumnFamilyDelete
                | ColumnFamilyPut
                | ColumnFamilyMerge
                | ColumnFamilySingleDelete
                | ColumnFamilyDeleteRange
                | ColumnFamilyBlobIndex
        )
    }

    /// Returns `true` if the record contributes to the batch count.
    ///
    /// Log data, no-ops and transaction markers are metadata.
    pub fn is_counted(self) -> bool {
        use RecordType::*;
        matches!(
            self,
            Put | Delete
                | SingleDelete
                | DeleteRange
                | Merge
                | BlobIndex
                | ColumnFamilyPut
                | ColumnFamilyDelete
                | ColumnFamilySingleDelete
                | ColumnFamilyDeleteRange
                | ColumnFamilyMerge
                | ColumnFamilyBlobIndex
        )
    }

    /// Returns the column-family-qualified tag for this operation.
    ///
    /// Tags that have no qualified form are returned unchanged.
    pub fn with_column_family(self) -> Self {
        use RecordType::*;
        match self {
            Put => ColumnFamilyPut,
            Delete => ColumnFamilyDelete,
            SingleDelete => ColumnFamilySingleDelete,
            DeleteRange => ColumnFamilyDeleteRange,
            Merge => ColumnFamilyMerge,
            BlobIndex => ColumnFamilyBlobIndex,
            other => other,
        }
    }

    pub(crate) fn payload(self) -> Payload {
        use RecordType::*;
        match self {
            Delete | SingleDelete | ColumnFamilyDelete | ColumnFamilySingleDelete => Payload::Key,
            Put | Merge | DeleteRange | BlobIndex | ColumnFamilyPut | ColumnFamilyMerge
            | ColumnFamilyDeleteRange | ColumnFamilyBlobIndex => Payload::KeyValue,
            LogData | EndPrepareXid | CommitXid | RollbackXid => Payload::Value,
            Noop | BeginPrepareXid | BeginPersistedPrepareXid | BeginUnprepareXid => {
                Payload::Empty
            }
        }
    }
}

/// A single decoded batch record.
///
/// Key and value borrow from the batch buffer. For range deletions the key is
/// the start of the range and the value its end; for log data and transaction
/// markers the blob is carried in the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub kind: RecordType,
    /// Column family index (0 for records without a qualified tag)
    pub column_family: u32,
    pub key: &'a [u8],
    pub value: &'a [u8],
}

impl<'a> Record<'a> {
    /// Splits the key into user key and a `ts_size`-byte timestamp suffix.
    ///
    /// Returns `None` if the key is shorter than `ts_size`.
    pub fn split_timestamp(&self, ts_size: usize) -> Option<(&'a [u8], &'a [u8])> {
        let split = self.key.len().checked_sub(ts_size)?;
        Some(self.key.split_at(split))
    }

    /// Returns the end key of a range deletion.
    pub fn end_key(&self) -> Option<&'a [u8]> {
        match self.kind {
            RecordType::DeleteRange | RecordType::ColumnFamilyDeleteRange => Some(self.value),
            _ => None,
        }
    }
}

//! Write batch encoder.
//!
//! A batch is the engine's contiguous representation of pending mutations:
//! a 12-byte header (`sequence: u64 LE`, `count: u32 LE`) followed by tagged
//! records. The byte layout is consumed by the engine as-is and must stay
//! bit-exact with its format.

mod iterator;
mod record;
pub mod timestamp;
pub mod varint;

pub use iterator::BatchIterator;
pub use record::{Record, RecordType};

use crate::config::BatchConfig;
use crate::error::{BatchError, Result};

/// Size of the batch header in bytes.
pub const HEADER_SIZE: usize = 12;

/// Index of the default column family.
pub const DEFAULT_COLUMN_FAMILY: u32 = 0;

const COUNT_OFFSET: usize = 8;

pub(crate) fn read_count(rep: &[u8]) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&rep[COUNT_OFFSET..HEADER_SIZE]);
    u32::from_le_bytes(bytes)
}

/// Rollback marker: buffer length and record count at the time it was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SavePoint {
    size: usize,
    count: u32,
}

/// An ordered, append-only batch of write records.
///
/// The batch owns its buffer exclusively; only its own append operations
/// mutate it. Records are decoded in exactly the order they were appended.
#[derive(Debug, Clone)]
pub struct Batch {
    rep: Vec<u8>,
    save_points: Vec<SavePoint>,
    config: BatchConfig,
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

impl Batch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::with_config(BatchConfig::default())
    }

    /// Creates an empty batch using `config`.
    pub fn with_config(config: BatchConfig) -> Self {
        let mut rep = Vec::with_capacity(config.reserved_bytes.max(HEADER_SIZE));
        rep.resize(HEADER_SIZE, 0);
        Self {
            rep,
            save_points: Vec::new(),
            config,
        }
    }

    /// Adopts an existing batch representation.
    ///
    /// # Errors
    /// `TruncatedBatch` if `data` is shorter than the header.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_config(data, BatchConfig::default())
    }

    /// Adopts an existing batch representation using `config`.
    pub fn from_bytes_with_config(data: Vec<u8>, config: BatchConfig) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(BatchError::TruncatedBatch {
                offset: data.len(),
                context: "header",
            });
        }
        Ok(Self {
            rep: data,
            save_points: Vec::new(),
            config,
        })
    }

    /// Returns the full representation (header and records).
    pub fn data(&self) -> &[u8] {
        &self.rep
    }

    /// Consumes the batch and returns its representation.
    pub fn into_bytes(self) -> Vec<u8> {
        self.rep
    }

    /// Returns the configuration the batch was built with.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Returns the size of the representation in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.rep.len()
    }

    /// Returns the number of counted records (log data excluded).
    pub fn count(&self) -> u32 {
        read_count(&self.rep)
    }

    /// Returns `true` if no records have been appended.
    pub fn is_empty(&self) -> bool {
        self.rep.len() == HEADER_SIZE
    }

    /// Returns the sequence number stored in the header.
    pub fn sequence(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.rep[..COUNT_OFFSET]);
        u64::from_le_bytes(bytes)
    }

    /// Sets the sequence number stored in the header.
    pub fn set_sequence(&mut self, sequence: u64) {
        self.rep[..COUNT_OFFSET].copy_from_slice(&sequence.to_le_bytes());
    }

    fn set_count(&mut self, count: u32) {
        self.rep[COUNT_OFFSET..HEADER_SIZE].copy_from_slice(&count.to_le_bytes());
    }

    /// Returns an iterator over the records, honouring the batch config.
    pub fn iter(&self) -> BatchIterator<'_> {
        let iter = BatchIterator::new(&self.rep).verify_count(self.config.verify_count);
        match self.config.column_families {
            Some(count) => iter.with_column_families(count),
            None => iter,
        }
    }

    /// Stores `key -> value`.
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.put_cf(DEFAULT_COLUMN_FAMILY, key, value);
    }

    /// Stores `key -> value` in column family `cf`.
    pub fn put_cf(&mut self, cf: u32, key: &[u8], value: &[u8]) {
        self.begin_record(RecordType::Put, cf);
        self.push_slice(&[key]);
        self.push_slice(&[value]);
    }

    /// Stores `key || ts -> value` in column family `cf`.
    pub fn put_cf_with_ts(&mut self, cf: u32, key: &[u8], ts: &[u8], value: &[u8]) {
        self.begin_record(RecordType::Put, cf);
        self.push_slice(&[key, ts]);
        self.push_slice(&[value]);
    }

    /// Erases `key`.
    pub fn delete(&mut self, key: &[u8]) {
        self.delete_cf(DEFAULT_COLUMN_FAMILY, key);
    }

    /// Erases `key` in column family `cf`.
    pub fn delete_cf(&mut self, cf: u32, key: &[u8]) {
        self.begin_record(RecordType::Delete, cf);
        self.push_slice(&[key]);
    }

    /// Erases `key || ts` in column family `cf`.
    pub fn delete_cf_with_ts(&mut self, cf: u32, key: &[u8], ts: &[u8]) {
        self.begin_record(RecordType::Delete, cf);
        self.push_slice(&[key, ts]);
    }

    /// Erases `key`, which must have been put at most once.
    pub fn single_delete(&mut self, key: &[u8]) {
        self.single_delete_cf(DEFAULT_COLUMN_FAMILY, key);
    }

    /// Single-delete of `key` in column family `cf`.
    pub fn single_delete_cf(&mut self, cf: u32, key: &[u8]) {
        self.begin_record(RecordType::SingleDelete, cf);
        self.push_slice(&[key]);
    }

    /// Single-delete of `key || ts` in column family `cf`.
    pub fn single_delete_cf_with_ts(&mut self, cf: u32, key: &[u8], ts: &[u8]) {
        self.begin_record(RecordType::SingleDelete, cf);
        self.push_slice(&[key, ts]);
    }

    /// Erases keys in `[start_key, end_key)`.
    pub fn delete_range(&mut self, start_key: &[u8], end_key: &[u8]) {
        self.delete_range_cf(DEFAULT_COLUMN_FAMILY, start_key, end_key);
    }

    /// Erases keys in `[start_key, end_key)` in column family `cf`.
    pub fn delete_range_cf(&mut self, cf: u32, start_key: &[u8], end_key: &[u8]) {
        self.begin_record(RecordType::DeleteRange, cf);
        self.push_slice(&[start_key]);
        self.push_slice(&[end_key]);
    }

    /// Queues a merge operand for `key`.
    pub fn merge(&mut self, key: &[u8], value: &[u8]) {
        self.merge_cf(DEFAULT_COLUMN_FAMILY, key, value);
    }

    /// Queues a merge operand for `key` in column family `cf`.
    pub fn merge_cf(&mut self, cf: u32, key: &[u8], value: &[u8]) {
        self.begin_record(RecordType::Merge, cf);
        self.push_slice(&[key]);
        self.push_slice(&[value]);
    }

    /// Appends an opaque blob for log consumers.
    ///
    /// Log data is metadata and does not change `count`.
    pub fn put_log_data(&mut self, blob: &[u8]) {
        self.begin_record(RecordType::LogData, DEFAULT_COLUMN_FAMILY);
        self.push_slice(&[blob]);
    }

    /// Pushes the current size and count onto the save point stack.
    pub fn set_save_point(&mut self) {
        self.save_points.push(SavePoint {
            size: self.rep.len(),
            count: self.count(),
        });
        tracing::trace!(depth = self.save_points.len(), "save point set");
    }

    /// Discards everything appended since the most recent save point.
    ///
    /// # Errors
    /// `NoSavePoint` if the stack is empty.
    pub fn rollback_to_save_point(&mut self) -> Result<()> {
        let save_point = self.save_points.pop().ok_or(BatchError::NoSavePoint)?;
        self.rep.truncate(save_point.size);
        self.set_count(save_point.count);
        tracing::trace!(
            size = save_point.size,
            count = save_point.count,
            "rolled back to save point"
        );
        Ok(())
    }

    /// Removes the most recent save point without touching the buffer.
    ///
    /// # Errors
    /// `NoSavePoint` if the stack is empty.
    pub fn pop_save_point(&mut self) -> Result<()> {
        self.save_points.pop().ok_or(BatchError::NoSavePoint)?;
        Ok(())
    }

    /// Removes all records, resets the header and drops all save points.
    pub fn clear(&mut self) {
        self.rep.clear();
        self.rep.resize(HEADER_SIZE, 0);
        self.save_points.clear();
    }

    /// Writes the tag (and column family index) and bumps the count.
    fn begin_record(&mut self, kind: RecordType, cf: u32) {
        if cf == DEFAULT_COLUMN_FAMILY {
            self.rep.push(kind.tag());
        } else {
            self.rep.push(kind.with_column_family().tag());
            varint::encode(u64::from(cf), &mut self.rep);
        }
        if kind.is_counted() {
            let count = self.count().wrapping_add(1);
            self.set_count(count);
        }
    }

    /// Writes the concatenation of `parts` as one length-prefixed field.
    fn push_slice(&mut self, parts: &[&[u8]]) {
        let len: usize = parts.iter().map(|part| part.len()).sum();
        varint::encode(len as u64, &mut self.rep);
        for part in parts {
            self.rep.extend_from_slice(part);
        }
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = Result<Record<'a>>;
    type IntoIter = BatchIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

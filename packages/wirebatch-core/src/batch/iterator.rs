//! Forward-only decoder over a batch representation.

use crate::error::{BatchError, Result};

use super::record::{Payload, Record, RecordType};
use super::{varint, HEADER_SIZE};

/// Streaming decoder over the records of a batch.
///
/// Pull protocol: [`advance`](Self::advance) decodes the next record and
/// returns whether one is available; [`record`](Self::record) exposes it and
/// [`err`](Self::err) reports the first decode error. Errors are sticky: once
/// set, `advance` keeps returning `false`.
///
/// Iteration ends when the buffer is exhausted at a record boundary. If count
/// verification is enabled, the number of counted records decoded is then
/// compared against the header count and any mismatch becomes the sticky
/// error.
///
/// The iterator borrows the buffer, so the batch cannot be mutated while it
/// is alive. Take a fresh iterator after every mutation.
#[derive(Debug, Clone)]
pub struct BatchIterator<'a> {
    data: &'a [u8],
    offset: usize,
    /// Count stored in the header, if the buffer has one
    header_count: Option<u32>,
    verify: bool,
    /// Counted records decoded so far
    found: u32,
    column_families: Option<u32>,
    record: Option<Record<'a>>,
    err: Option<BatchError>,
    finished: bool,
    err_reported: bool,
}

impl<'a> BatchIterator<'a> {
    /// Creates an iterator over a full batch representation (header included).
    ///
    /// A buffer shorter than the header yields a `TruncatedBatch` error on
    /// the first call.
    pub fn new(data: &'a [u8]) -> Self {
        let mut iter = Self::over(data, HEADER_SIZE.min(data.len()));
        if data.len() < HEADER_SIZE {
            iter.err = Some(BatchError::TruncatedBatch {
                offset: data.len(),
                context: "header",
            });
        } else {
            iter.header_count = Some(super::read_count(data));
        }
        iter
    }

    /// Creates an iterator over a bare record stream without a header.
    ///
    /// No count verification is performed.
    pub fn from_records(records: &'a [u8]) -> Self {
        Self::over(records, 0)
    }

    fn over(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            offset,
            header_count: None,
            verify: true,
            found: 0,
            column_families: None,
            record: None,
            err: None,
            finished: false,
            err_reported: false,
        }
    }

    /// Enables or disables verification of the header count.
    pub fn verify_count(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Rejects records referencing a column family index `>= count`.
    pub fn with_column_families(mut self, count: u32) -> Self {
        self.column_families = Some(count);
        self
    }

    /// Decodes the next record.
    ///
    /// Returns `false` at the end of the batch or on error; use
    /// [`err`](Self::err) to tell the two apart.
    pub fn advance(&mut self) -> bool {
        self.record = None;
        if self.err.is_some() || self.finished {
            return false;
        }

        if self.offset >= self.data.len() {
            self.finished = true;
            if let Some(expected) = self.header_count.filter(|_| self.verify) {
                if expected != self.found {
                    self.fail(BatchError::CountMismatch {
                        expected,
                        found: self.found,
                    });
                }
            }
            return false;
        }

        match self.decode_record() {
            Ok(record) => {
                if record.kind.is_counted() {
                    self.found = self.found.wrapping_add(1);
                }
                self.record = Some(record);
                true
            }
            Err(err) => {
                self.fail(err);
                false
            }
        }
    }

    /// Returns the record decoded by the last successful `advance`.
    pub fn record(&self) -> Option<&Record<'a>> {
        self.record.as_ref()
    }

    /// Returns the first error encountered, if any.
    pub fn err(&self) -> Option<&BatchError> {
        self.err.as_ref()
    }

    /// Returns the current byte offset into the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of counted records decoded so far.
    pub fn counted(&self) -> u32 {
        self.found
    }

    fn fail(&mut self, err: BatchError) {
        tracing::debug!(offset = self.offset, error = %err, "batch decode failed");
        self.record = None;
        self.err = Some(err);
    }

    fn decode_record(&mut self) -> Result<Record<'a>> {
        let start = self.offset;
        let tag = self.data[start];
        let kind = RecordType::from_tag(tag)
            .ok_or(BatchError::UnknownRecordType { tag, offset: start })?;
        let mut pos = start + 1;

        let mut column_family = 0u32;
        if kind.has_column_family() {
            let (raw, next) = varint::decode(self.data, pos)?;
            column_family =
                u32::try_from(raw).map_err(|_| BatchError::ColumnFamilyCountMismatch {
                    column_family: raw,
                    count: u64::from(u32::MAX) + 1,
                })?;
            if let Some(count) = self.column_families {
                if column_family >= count {
                    return Err(BatchError::ColumnFamilyCountMismatch {
                        column_family: raw,
                        count: u64::from(count),
                    });
                }
            }
            pos = next;
        }

        let empty: &'a [u8] = &[];
        let (key, value) = match kind.payload() {
            Payload::Empty => (empty, empty),
            Payload::Key => {
                let (key, next) = self.slice_at(pos)?;
                pos = next;
                (key, empty)
            }
            Payload::Value => {
                let (value, next) = self.slice_at(pos)?;
                pos = next;
                (empty, value)
            }
            Payload::KeyValue => {
                let (key, next) = self.slice_at(pos)?;
                let (value, next) = self.slice_at(next)?;
                pos = next;
                (key, value)
            }
        };

        self.offset = pos;
        Ok(Record {
            kind,
            column_family,
            key,
            value,
        })
    }

    /// Reads a length-prefixed slice at `pos`.
    fn slice_at(&self, pos: usize) -> Result<(&'a [u8], usize)> {
        let data = self.data;
        let (len, start) = varint::decode(data, pos)?;
        let end = usize::try_from(len)
            .ok()
            .and_then(|len| start.checked_add(len))
            .filter(|&end| end <= data.len())
            .ok_or(BatchError::TruncatedBatch {
                offset: start,
                context: "length-prefixed slice",
            })?;
        Ok((&data[start..end], end))
    }
}

impl<'a> Iterator for BatchIterator<'a> {
    type Item = Result<Record<'a>>;

    /// Yields records in order, then the first error (once), then `None`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.err_reported {
            return None;
        }
        if self.advance() {
            return self.record.map(Ok);
        }
        let err = self.err.clone()?;
        self.err_reported = true;
        Some(Err(err))
    }
}

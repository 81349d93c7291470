//! Unsigned LEB128-style varints as used by the engine's batch format.
//!
//! Values are split into 7-bit groups, least significant group first. Every
//! byte except the last has its continuation bit (0x80) set. A u64 needs at
//! most [`MAX_VARINT_LEN`] bytes and the final byte of a 10-byte encoding can
//! only carry bit 63, so decoding rejects anything longer or wider.

use crate::error::{BatchError, Result};

/// Maximum encoded length of a u64 (`ceil(64 / 7)`).
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7f;

/// Appends `value` to `buf`.
#[inline]
pub fn encode(value: u64, buf: &mut Vec<u8>) {
    let mut n = value;
    while n >= u64::from(CONTINUATION) {
        buf.push((n as u8) | CONTINUATION);
        n >>= 7;
    }
    buf.push(n as u8);
}

/// Number of bytes `encode` writes for `value`.
#[inline]
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Decodes a varint starting at `offset` in `buf`.
///
/// Returns the value and the offset just past its last byte.
///
/// # Errors
/// - `TruncatedBatch` if the buffer ends before a terminating byte
///   within the first [`MAX_VARINT_LEN`] bytes
/// - `MalformedVarint` if the 10th byte still has its continuation bit
///   set or carries bits beyond bit 63
pub fn decode(buf: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut shift = 0u32;

    for i in 0..MAX_VARINT_LEN {
        let pos = offset + i;
        let Some(&byte) = buf.get(pos) else {
            return Err(BatchError::TruncatedBatch {
                offset: pos,
                context: "varint",
            });
        };

        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(BatchError::MalformedVarint { offset });
        }

        value |= u64::from(byte & PAYLOAD) << shift;
        if byte & CONTINUATION == 0 {
            return Ok((value, pos + 1));
        }
        shift += 7;
    }

    Err(BatchError::MalformedVarint { offset })
}

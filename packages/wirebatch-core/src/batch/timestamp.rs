//! Fixed-width u64 timestamps appended to user keys.
//!
//! The engine's built-in timestamp-aware comparator expects an 8-byte
//! little-endian suffix on every key.

/// Width in bytes of a u64 timestamp suffix.
pub const U64_TIMESTAMP_SIZE: usize = 8;

/// Encodes a u64 timestamp suffix.
pub fn encode_u64(ts: u64) -> [u8; U64_TIMESTAMP_SIZE] {
    ts.to_le_bytes()
}

/// Decodes a u64 timestamp suffix.
///
/// Returns `None` unless `bytes` is exactly [`U64_TIMESTAMP_SIZE`] long.
pub fn decode_u64(bytes: &[u8]) -> Option<u64> {
    let bytes: [u8; U64_TIMESTAMP_SIZE] = bytes.try_into().ok()?;
    Some(u64::from_le_bytes(bytes))
}

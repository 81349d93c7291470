//! Line-oriented batch scripts.
//!
//! Each non-empty line that does not start with `#` is one operation:
//!
//! ```text
//! put <key> <value>
//! put_cf <cf> <key> <value>
//! delete <key>
//! delete_cf <cf> <key>
//! single_delete <key>
//! single_delete_cf <cf> <key>
//! delete_range <start> <end>
//! delete_range_cf <cf> <start> <end>
//! merge <key> <value>
//! merge_cf <cf> <key> <value>
//! put_cf_ts <cf> <key> <ts> <value>
//! delete_cf_ts <cf> <key> <ts>
//! single_delete_cf_ts <cf> <key> <ts>
//! log <blob>
//! savepoint | rollback | pop
//! ```
//!
//! Arguments are whitespace separated and taken as raw bytes, except `<cf>`
//! and `<ts>`, which are decimal integers. Timestamps are written as 8-byte
//! little-endian u64 suffixes.

use anyhow::{anyhow, bail, Context};
use wirebatch_core::batch::timestamp;
use wirebatch_core::{Batch, BatchConfig};

/// Builds a batch by running every line of `source`.
pub fn build(source: &str, config: BatchConfig) -> anyhow::Result<Batch> {
    let mut batch = Batch::with_config(config);
    for (number, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        apply(&mut batch, line).with_context(|| format!("line {}: {}", number + 1, line))?;
    }
    Ok(batch)
}

fn apply(batch: &mut Batch, line: &str) -> anyhow::Result<()> {
    let mut parts = line.split_whitespace();
    let op = parts.next().ok_or_else(|| anyhow!("empty operation"))?;
    let args: Vec<&str> = parts.collect();

    match (op, args.as_slice()) {
        ("put", [key, value]) => batch.put(key.as_bytes(), value.as_bytes()),
        ("put_cf", [cf, key, value]) => {
            batch.put_cf(parse_cf(cf)?, key.as_bytes(), value.as_bytes())
        }
        ("delete", [key]) => batch.delete(key.as_bytes()),
        ("delete_cf", [cf, key]) => batch.delete_cf(parse_cf(cf)?, key.as_bytes()),
        ("single_delete", [key]) => batch.single_delete(key.as_bytes()),
        ("single_delete_cf", [cf, key]) => batch.single_delete_cf(parse_cf(cf)?, key.as_bytes()),
        ("delete_range", [start, end]) => batch.delete_range(start.as_bytes(), end.as_bytes()),
        ("delete_range_cf", [cf, start, end]) => {
            batch.delete_range_cf(parse_cf(cf)?, start.as_bytes(), end.as_bytes())
        }
        ("merge", [key, value]) => batch.merge(key.as_bytes(), value.as_bytes()),
        ("merge_cf", [cf, key, value]) => {
            batch.merge_cf(parse_cf(cf)?, key.as_bytes(), value.as_bytes())
        }
        ("put_cf_ts", [cf, key, ts, value]) => batch.put_cf_with_ts(
            parse_cf(cf)?,
            key.as_bytes(),
            &parse_ts(ts)?,
            value.as_bytes(),
        ),
        ("delete_cf_ts", [cf, key, ts]) => {
            batch.delete_cf_with_ts(parse_cf(cf)?, key.as_bytes(), &parse_ts(ts)?)
        }
        ("single_delete_cf_ts", [cf, key, ts]) => {
            batch.single_delete_cf_with_ts(parse_cf(cf)?, key.as_bytes(), &parse_ts(ts)?)
        }
        ("log", [blob]) => batch.put_log_data(blob.as_bytes()),
        ("savepoint", []) => batch.set_save_point(),
        ("rollback", []) => batch.rollback_to_save_point()?,
        ("pop", []) => batch.pop_save_point()?,
        (op, args) => bail!("unknown operation '{}' with {} argument(s)", op, args.len()),
    }
    Ok(())
}

fn parse_cf(raw: &str) -> anyhow::Result<u32> {
    raw.parse().with_context(|| format!("invalid column family '{}'", raw))
}

fn parse_ts(raw: &str) -> anyhow::Result<[u8; timestamp::U64_TIMESTAMP_SIZE]> {
    let ts: u64 = raw.parse().with_context(|| format!("invalid timestamp '{}'", raw))?;
    Ok(timestamp::encode_u64(ts))
}

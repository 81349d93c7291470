//! Human-readable record listing.

use std::io::Write;

use anyhow::Context;
use wirebatch_core::{Batch, BatchConfig, Record};

/// Decodes `data` and writes one line per record to `out`.
///
/// Decode errors are reported after the records that preceded them.
pub fn dump(data: Vec<u8>, config: BatchConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let timestamp_size = config.timestamp_size;
    let batch = Batch::from_bytes_with_config(data, config).context("invalid batch header")?;
    writeln!(
        out,
        "sequence={} count={} bytes={}",
        batch.sequence(),
        batch.count(),
        batch.size_in_bytes()
    )?;

    let mut iter = batch.iter();
    while iter.advance() {
        if let Some(record) = iter.record() {
            writeln!(out, "{}", format_record(record, timestamp_size))?;
        }
    }

    if let Some(err) = iter.err() {
        tracing::warn!(offset = iter.offset(), "batch decode stopped early");
        return Err(err.clone()).context("failed to decode batch");
    }
    Ok(())
}

fn format_record(record: &Record<'_>, timestamp_size: usize) -> String {
    let mut line = format!("{:?}", record.kind);
    if record.kind.has_column_family() {
        line.push_str(&format!(" cf={}", record.column_family));
    }
    if !record.key.is_empty() {
        match record.split_timestamp(timestamp_size).filter(|_| timestamp_size > 0) {
            Some((user_key, ts)) => line.push_str(&format!(
                " key={} ts={}",
                user_key.escape_ascii(),
                ts.escape_ascii()
            )),
            None => line.push_str(&format!(" key={}", record.key.escape_ascii())),
        }
    }
    if !record.value.is_empty() {
        line.push_str(&format!(" value={}", record.value.escape_ascii()));
    }
    line
}

//! Batch encode/decode end-to-end tests.

use ntest::timeout;

use wirebatch_core::batch::{timestamp, HEADER_SIZE};
use wirebatch_core::{Batch, BatchConfig, BatchError, BatchIterator, RecordType};

#[timeout(1000)]
#[test]
fn test_put_delete_cf_merge_scenario() {
    let mut batch = Batch::new();
    batch.put(b"a", b"1");
    batch.delete_cf(2, b"b");
    batch.merge(b"a", b"2");
    assert_eq!(batch.count(), 3);

    let records: Vec<_> = batch.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].kind, RecordType::Put);
    assert_eq!(records[0].key, b"a");
    assert_eq!(records[0].value, b"1");

    assert_eq!(records[1].kind, RecordType::ColumnFamilyDelete);
    assert_eq!(records[1].column_family, 2);
    assert_eq!(records[1].key, b"b");

    assert_eq!(records[2].kind, RecordType::Merge);
    assert_eq!(records[2].key, b"a");
    assert_eq!(records[2].value, b"2");
}

#[timeout(1000)]
#[test]
fn test_pull_protocol_over_adopted_bytes() {
    let mut batch = Batch::new();
    batch.set_sequence(100);
    batch.single_delete(b"k1");
    batch.delete_range_cf(7, b"from", b"to");
    batch.put_log_data(b"replication-marker");

    let adopted = Batch::from_bytes(batch.data().to_vec()).unwrap();
    assert_eq!(adopted.sequence(), 100);
    assert_eq!(adopted.count(), 2);

    let mut iter = adopted.iter();
    assert!(iter.advance());
    assert_eq!(iter.record().unwrap().kind, RecordType::SingleDelete);

    assert!(iter.advance());
    let range = *iter.record().unwrap();
    assert_eq!(range.kind, RecordType::ColumnFamilyDeleteRange);
    assert_eq!(range.column_family, 7);
    assert_eq!(range.key, b"from");
    assert_eq!(range.end_key(), Some(&b"to"[..]));

    assert!(iter.advance());
    let log = iter.record().unwrap();
    assert_eq!(log.kind, RecordType::LogData);
    assert_eq!(log.value, b"replication-marker");

    assert!(!iter.advance());
    assert!(iter.err().is_none());
    assert_eq!(iter.offset(), adopted.size_in_bytes());
}

#[timeout(1000)]
#[test]
fn test_timestamped_batch() {
    let ts1 = timestamp::encode_u64(1);
    let ts2 = timestamp::encode_u64(2);

    let mut batch = Batch::new();
    batch.put_cf_with_ts(0, b"key1", &ts1, b"val1");
    batch.delete_cf_with_ts(0, b"key2", &ts2);
    assert_eq!(batch.count(), 2);

    let mut iter = batch.iter();
    assert!(iter.advance());
    let record = iter.record().unwrap();
    assert_eq!(record.kind, RecordType::Put);
    assert_eq!(record.key, [&b"key1"[..], &ts1].concat());
    assert_eq!(record.value, b"val1");

    assert!(iter.advance());
    let record = iter.record().unwrap();
    assert_eq!(record.kind, RecordType::Delete);
    let (user_key, ts) = record.split_timestamp(timestamp::U64_TIMESTAMP_SIZE).unwrap();
    assert_eq!(user_key, b"key2");
    assert_eq!(timestamp::decode_u64(ts), Some(2));

    assert!(!iter.advance());
}

#[timeout(1000)]
#[test]
fn test_save_points_nested() {
    let mut batch = Batch::new();
    let mut sizes = Vec::new();
    let mut counts = Vec::new();

    for i in 0..5u8 {
        batch.set_save_point();
        sizes.push(batch.size_in_bytes());
        counts.push(batch.count());
        batch.put(&[i], &[i; 3]);
        batch.put_log_data(&[i]);
    }
    assert_eq!(batch.count(), 5);

    for expected in (0..5).rev() {
        batch.rollback_to_save_point().unwrap();
        assert_eq!(batch.size_in_bytes(), sizes[expected]);
        assert_eq!(batch.count(), counts[expected]);
    }
    assert_eq!(batch.size_in_bytes(), HEADER_SIZE);
    assert_eq!(
        batch.rollback_to_save_point(),
        Err(BatchError::NoSavePoint)
    );
}

#[timeout(1000)]
#[test]
fn test_empty_keys_and_binary_payloads() {
    let all_bytes: Vec<u8> = (0..=255u8).collect();
    let mut batch = Batch::new();
    batch.put(b"", b"");
    batch.merge_cf(300, &all_bytes, &all_bytes);

    let records: Vec<_> = batch.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(records[0].key, b"");
    assert_eq!(records[0].value, b"");
    assert_eq!(records[1].kind, RecordType::ColumnFamilyMerge);
    assert_eq!(records[1].column_family, 300);
    assert_eq!(records[1].key, &all_bytes[..]);
    assert_eq!(records[1].value, &all_bytes[..]);
}

#[timeout(1000)]
#[test]
fn test_corrupted_tail_surfaces_typed_error() {
    let mut batch = Batch::new();
    batch.put(b"a", b"1");
    batch.put(b"b", b"2");
    let mut data = batch.into_bytes();
    data.truncate(data.len() - 1);

    let results: Vec<_> = BatchIterator::new(&data).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(BatchError::TruncatedBatch { .. })
    ));
}

#[timeout(1000)]
#[test]
fn test_config_from_json() {
    let config: BatchConfig =
        serde_json::from_str(r#"{"verify_count": false, "column_families": 4}"#).unwrap();
    assert!(!config.verify_count);
    assert_eq!(config.column_families, Some(4));
    assert_eq!(config.timestamp_size, 0);

    let mut data = Batch::new().into_bytes();
    data[8] = 9;
    let batch = Batch::from_bytes_with_config(data, config).unwrap();
    let mut iter = batch.iter();
    assert!(!iter.advance());
    assert!(iter.err().is_none());
}

//! Property: decoding reproduces every appended operation in order.

use proptest::prelude::*;

use wirebatch_core::{Batch, RecordType};

#[derive(Debug, Clone)]
enum Op {
    Put(u32, Vec<u8>, Vec<u8>),
    Delete(u32, Vec<u8>),
    SingleDelete(u32, Vec<u8>),
    DeleteRange(u32, Vec<u8>, Vec<u8>),
    Merge(u32, Vec<u8>, Vec<u8>),
    LogData(Vec<u8>),
}

fn bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

fn column_family() -> impl Strategy<Value = u32> {
    prop_oneof![Just(0u32), 1..16u32, any::<u32>()]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (column_family(), bytes(), bytes()).prop_map(|(cf, k, v)| Op::Put(cf, k, v)),
        (column_family(), bytes()).prop_map(|(cf, k)| Op::Delete(cf, k)),
        (column_family(), bytes()).prop_map(|(cf, k)| Op::SingleDelete(cf, k)),
        (column_family(), bytes(), bytes()).prop_map(|(cf, s, e)| Op::DeleteRange(cf, s, e)),
        (column_family(), bytes(), bytes()).prop_map(|(cf, k, v)| Op::Merge(cf, k, v)),
        bytes().prop_map(Op::LogData),
    ]
}

fn kind_for(plain: RecordType, cf: u32) -> RecordType {
    if cf == 0 {
        plain
    } else {
        plain.with_column_family()
    }
}

/// Expected (kind, cf, key, value) for one operation.
fn expected(op: &Op) -> (RecordType, u32, Vec<u8>, Vec<u8>) {
    match op {
        Op::Put(cf, k, v) => (kind_for(RecordType::Put, *cf), *cf, k.clone(), v.clone()),
        Op::Delete(cf, k) => (kind_for(RecordType::Delete, *cf), *cf, k.clone(), Vec::new()),
        Op::SingleDelete(cf, k) => (
            kind_for(RecordType::SingleDelete, *cf),
            *cf,
            k.clone(),
            Vec::new(),
        ),
        Op::DeleteRange(cf, s, e) => (
            kind_for(RecordType::DeleteRange, *cf),
            *cf,
            s.clone(),
            e.clone(),
        ),
        Op::Merge(cf, k, v) => (kind_for(RecordType::Merge, *cf), *cf, k.clone(), v.clone()),
        Op::LogData(blob) => (RecordType::LogData, 0, Vec::new(), blob.clone()),
    }
}

proptest! {
    #[test]
    fn decode_reproduces_appended_ops(ops in prop::collection::vec(op(), 0..32)) {
        let mut batch = Batch::new();
        for op in &ops {
            match op {
                Op::Put(cf, k, v) => batch.put_cf(*cf, k, v),
                Op::Delete(cf, k) => batch.delete_cf(*cf, k),
                Op::SingleDelete(cf, k) => batch.single_delete_cf(*cf, k),
                Op::DeleteRange(cf, s, e) => batch.delete_range_cf(*cf, s, e),
                Op::Merge(cf, k, v) => batch.merge_cf(*cf, k, v),
                Op::LogData(blob) => batch.put_log_data(blob),
            }
        }

        let counted = ops.iter().filter(|op| !matches!(op, Op::LogData(_))).count();
        prop_assert_eq!(batch.count() as usize, counted);

        let decoded: Vec<_> = batch
            .iter()
            .map(|r| r.map(|r| (r.kind, r.column_family, r.key.to_vec(), r.value.to_vec())))
            .collect::<Result<_, _>>()
            .unwrap();
        let wanted: Vec<_> = ops.iter().map(expected).collect();
        prop_assert_eq!(decoded, wanted);
    }
}

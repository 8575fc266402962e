//! Proptest generators for property-based testing.
//!
//! Strategies produce wire records in their canonical shape: an origin
//! point record always has slot 0, and metadata holds neither floats nor
//! nulls (a null would read back as absent metadata).

use bytes::Bytes;
use proptest::prelude::*;

use chainsync_core::{
    BlockRecord, DatumRecord, Hash32, HeaderRecord, InputRecord, OutputRecord, Point,
    PointRecord, RedeemerRecord, TxRecord, UtxoRecord, ValueRecord,
};

/// Generate a random Hash32.
pub fn hash32() -> impl Strategy<Value = Hash32> {
    any::<[u8; 32]>().prop_map(Hash32::from_bytes)
}

/// Generate a byte string of at most `max_len` bytes.
pub fn bytes(max_len: usize) -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..=max_len).prop_map(Bytes::from)
}

/// Generate a point; roughly one in ten is the origin.
pub fn point() -> impl Strategy<Value = Point> {
    prop_oneof![
        1 => Just(Point::Origin),
        9 => (any::<u64>(), hash32()).prop_map(|(slot, hash)| Point::specific(slot, hash)),
    ]
}

pub fn point_record() -> impl Strategy<Value = PointRecord> {
    point().prop_map(|p| PointRecord {
        slot: p.slot(),
        hash: p.hash().copied(),
    })
}

pub fn header_record() -> impl Strategy<Value = HeaderRecord> {
    (any::<u64>(), hash32(), any::<u64>(), any::<u16>()).prop_map(|(slot, hash, number, era)| {
        HeaderRecord {
            slot,
            hash,
            number,
            era,
        }
    })
}

pub fn input_record() -> impl Strategy<Value = InputRecord> {
    (hash32(), any::<u64>()).prop_map(|(tx_id, index)| InputRecord { tx_id, index })
}

/// Policy/asset pair lists, duplicates allowed.
fn asset_groups<T: Arbitrary + 'static>() -> impl Strategy<Value = Vec<(Bytes, Vec<(Bytes, T)>)>> {
    prop::collection::vec(
        (bytes(28), prop::collection::vec((bytes(32), any::<T>()), 0..4)),
        0..4,
    )
}

pub fn value_record() -> impl Strategy<Value = ValueRecord> {
    (any::<u64>(), asset_groups::<u64>()).prop_map(|(coin, assets)| ValueRecord { coin, assets })
}

pub fn datum_record() -> impl Strategy<Value = DatumRecord> {
    prop_oneof![
        bytes(32).prop_map(DatumRecord::Hash),
        bytes(128).prop_map(DatumRecord::Inline),
    ]
}

pub fn output_record() -> impl Strategy<Value = OutputRecord> {
    (bytes(57), value_record(), prop::option::of(datum_record()), bytes(64)).prop_map(
        |(address, value, datum, raw)| OutputRecord {
            address,
            value,
            datum,
            raw,
        },
    )
}

pub fn redeemer_record() -> impl Strategy<Value = RedeemerRecord> {
    (any::<u8>(), any::<u32>(), bytes(64), any::<u64>(), any::<u64>()).prop_map(
        |(tag, index, data, mem, steps)| RedeemerRecord {
            tag,
            index,
            data,
            mem,
            steps,
        },
    )
}

/// Float-free CBOR values, nested up to a few levels.
pub fn metadata_value() -> impl Strategy<Value = ciborium::Value> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(|n| ciborium::Value::Integer(n.into())),
        any::<u64>().prop_map(|n| ciborium::Value::Integer(n.into())),
        "[a-z0-9 ]{0,16}".prop_map(ciborium::Value::Text),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(ciborium::Value::Bytes),
        any::<bool>().prop_map(ciborium::Value::Bool),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(ciborium::Value::Array),
            prop::collection::vec((inner.clone(), inner), 0..4).prop_map(ciborium::Value::Map),
        ]
    })
}

pub fn tx_record() -> impl Strategy<Value = TxRecord> {
    (
        hash32(),
        prop::collection::vec(input_record(), 0..4),
        prop::collection::vec(output_record(), 0..4),
        asset_groups::<i64>(),
        prop::option::of(metadata_value()),
        prop::option::of(prop::collection::vec(redeemer_record(), 0..3)),
        bytes(256),
    )
        .prop_map(
            |(id, inputs, outputs, mint, metadata, redeemers, raw)| TxRecord {
                id,
                inputs,
                outputs,
                mint,
                metadata,
                redeemers,
                raw,
            },
        )
}

pub fn block_record() -> impl Strategy<Value = BlockRecord> {
    (
        header_record(),
        prop::collection::vec(tx_record(), 0..4),
    )
        .prop_map(|(header, transactions)| BlockRecord {
            slot: header.slot,
            hash: header.hash,
            number: header.number,
            era: header.era,
            transactions,
        })
}

pub fn utxo_record() -> impl Strategy<Value = UtxoRecord> {
    (hash32(), any::<u64>(), output_record()).prop_map(|(tx_id, index, output)| UtxoRecord {
        tx_id,
        index,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainsync_core::WireRecord;

    proptest! {
        #[test]
        fn test_point_records_are_canonical(record in point_record()) {
            if record.hash.is_none() {
                prop_assert_eq!(record.slot, 0);
            }
        }

        #[test]
        fn test_generated_blocks_encode(record in block_record()) {
            let bytes = record.to_cbor().unwrap();
            prop_assert_eq!(BlockRecord::from_cbor(&bytes).unwrap(), record);
        }
    }
}

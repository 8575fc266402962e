//! Decoding a wire record and encoding it back reproduces the original bytes.

use proptest::prelude::*;

use chainsync::core::{
    decode_block, decode_point, decode_utxo, BlockRecord, PointRecord, UtxoRecord, WireRecord,
};
use chainsync_testkit::{encode, generators, ChainBuilder};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_block_roundtrip_is_byte_identical(record in generators::block_record()) {
        let bytes = record.to_cbor().unwrap();
        let block = decode_block(&BlockRecord::from_cbor(&bytes).unwrap());
        prop_assert_eq!(encode::block_record(&block).to_cbor().unwrap(), bytes);
    }

    #[test]
    fn test_point_roundtrip_is_byte_identical(record in generators::point_record()) {
        let bytes = record.to_cbor().unwrap();
        let point = decode_point(&PointRecord::from_cbor(&bytes).unwrap());
        prop_assert_eq!(encode::point_record(&point).to_cbor().unwrap(), bytes);
    }

    #[test]
    fn test_utxo_roundtrip_is_byte_identical(record in generators::utxo_record()) {
        let bytes = record.to_cbor().unwrap();
        let utxo = decode_utxo(&UtxoRecord::from_cbor(&bytes).unwrap());
        prop_assert_eq!(utxo.output.index, record.index);
        prop_assert_eq!(encode::utxo_record(&utxo).to_cbor().unwrap(), bytes);
    }

    #[test]
    fn test_decoded_block_keeps_wire_order(record in generators::block_record()) {
        let block = decode_block(&record);
        prop_assert_eq!(block.point().slot(), record.slot);
        prop_assert_eq!(block.transactions.len(), record.transactions.len());

        for (i, (tx, wire)) in block.transactions.iter().zip(&record.transactions).enumerate() {
            prop_assert_eq!(tx.index, i as u64);
            prop_assert_eq!(tx.id, wire.id);
            prop_assert_eq!(tx.mint.len(), wire.mint.len());
            for (output, wire_output) in tx.outputs.iter().zip(&wire.outputs) {
                prop_assert_eq!(&output.address[..], &wire_output.address[..]);
                prop_assert_eq!(output.amount.multi_asset.len(), wire_output.value.assets.len());
            }
            if let Some(metadata) = &tx.metadata {
                // Conversion is total.
                let _ = metadata.to_json();
            }
        }
    }

    #[test]
    fn test_trailing_bytes_rejected(record in generators::block_record(), junk in 0u8..=0x17) {
        let mut bytes = record.to_cbor().unwrap();
        bytes.push(junk);
        prop_assert!(BlockRecord::from_cbor(&bytes).is_err());
    }
}

#[test]
fn test_fixture_block_roundtrip() {
    let record = ChainBuilder::new().transactions(4).block(1_000);
    let bytes = record.to_cbor().unwrap();
    let block = decode_block(&BlockRecord::from_cbor(&bytes).unwrap());

    assert_eq!(encode::block_record(&block).to_cbor().unwrap(), bytes);
    assert_eq!(block.transactions[3].mint.get(&record.transactions[3].mint[0].0, b"burned"), Some(-5));
}

//! Domain decoder: wire records to ledger entities.
//!
//! Every function here is total. A record that reached this layer already
//! parsed (see [`crate::codec`]), so there is nothing left to reject. The
//! decoder copies byte fields into fresh buffers and keeps list order.

use crate::block::{Block, TransactionBody, TransactionInput, TransactionOutput, Utxo};
use crate::point::Point;
use crate::records::{
    BlockRecord, DatumRecord, HeaderRecord, InputRecord, OutputRecord, PointRecord,
    RedeemerRecord, TxRecord, UtxoRecord, ValueRecord,
};
use crate::value::{Datum, DatumKind, ExUnits, Metadata, Mint, MultiAsset, Redeemer, RedeemerTag, Value};

/// Decode a chain position.
///
/// A record without a hash is the origin, whatever its slot says. There is
/// one origin, so the slot is dropped rather than kept on a hashless point.
pub fn decode_point(record: &PointRecord) -> Point {
    match record.hash {
        Some(hash) => Point::specific(record.slot, hash),
        None => Point::Origin,
    }
}

/// The point a header announces.
pub fn decode_header(record: &HeaderRecord) -> Point {
    Point::specific(record.slot, record.hash)
}

pub fn decode_block(record: &BlockRecord) -> Block {
    Block {
        slot: record.slot,
        hash: record.hash,
        number: record.number,
        era: record.era,
        transactions: record
            .transactions
            .iter()
            .enumerate()
            .map(|(index, tx)| decode_transaction_body(tx, index as u64))
            .collect(),
    }
}

/// Decode a transaction body found at `index` within its block.
pub fn decode_transaction_body(record: &TxRecord, index: u64) -> TransactionBody {
    let mut mint = Mint::new();
    for (policy, assets) in &record.mint {
        mint.push_policy(
            policy.to_vec(),
            assets
                .iter()
                .map(|(name, delta)| (name.to_vec(), *delta))
                .collect(),
        );
    }

    TransactionBody {
        id: record.id,
        index,
        inputs: record.inputs.iter().map(decode_input).collect(),
        outputs: record
            .outputs
            .iter()
            .enumerate()
            .map(|(i, output)| decode_output(output, i as u64))
            .collect(),
        mint,
        metadata: record.metadata.clone().map(Metadata),
        redeemers: record
            .redeemers
            .as_ref()
            .map(|list| list.iter().map(decode_redeemer).collect()),
        raw: record.raw.to_vec(),
    }
}

pub fn decode_input(record: &InputRecord) -> TransactionInput {
    TransactionInput {
        tx_id: record.tx_id,
        index: record.index,
    }
}

/// Decode an output found at `index` within its transaction.
pub fn decode_output(record: &OutputRecord, index: u64) -> TransactionOutput {
    TransactionOutput {
        address: record.address.to_vec(),
        amount: decode_value(&record.value),
        index,
        datum: record.datum.as_ref().map(decode_datum),
        raw: record.raw.to_vec(),
    }
}

pub fn decode_value(record: &ValueRecord) -> Value {
    let mut multi_asset = MultiAsset::new();
    for (policy, assets) in &record.assets {
        multi_asset.push_policy(
            policy.to_vec(),
            assets
                .iter()
                .map(|(name, quantity)| (name.to_vec(), *quantity))
                .collect(),
        );
    }

    Value {
        coin: record.coin,
        multi_asset,
    }
}

pub fn decode_datum(record: &DatumRecord) -> Datum {
    match record {
        DatumRecord::Hash(hash) => Datum {
            kind: DatumKind::Hash,
            payload: hash.to_vec(),
        },
        DatumRecord::Inline(data) => Datum {
            kind: DatumKind::Inline,
            payload: data.to_vec(),
        },
    }
}

pub fn decode_redeemer(record: &RedeemerRecord) -> Redeemer {
    Redeemer {
        tag: RedeemerTag::from_u8(record.tag),
        index: record.index,
        data: record.data.to_vec(),
        ex_units: ExUnits {
            mem: record.mem,
            steps: record.steps,
        },
    }
}

/// A UTXO entry. The output's index is the index of the input referencing it.
pub fn decode_utxo(record: &UtxoRecord) -> Utxo {
    Utxo {
        input: TransactionInput {
            tx_id: record.tx_id,
            index: record.index,
        },
        output: decode_output(&record.output, record.index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hash32;
    use bytes::Bytes;

    fn output(coin: u64) -> OutputRecord {
        OutputRecord {
            address: Bytes::from_static(&[0x61, 0x01]),
            value: ValueRecord {
                coin,
                assets: vec![(
                    Bytes::from_static(&[0xaa; 28]),
                    vec![
                        (Bytes::from_static(b"zeta"), 3),
                        (Bytes::from_static(b"alpha"), 1),
                    ],
                )],
            },
            datum: Some(DatumRecord::Inline(Bytes::from_static(&[0xd8, 0x79]))),
            raw: Bytes::from_static(&[0x82, 0x01]),
        }
    }

    fn tx() -> TxRecord {
        TxRecord {
            id: Hash32::from_bytes([0x11; 32]),
            inputs: vec![
                InputRecord { tx_id: Hash32::from_bytes([0x22; 32]), index: 4 },
                InputRecord { tx_id: Hash32::from_bytes([0x21; 32]), index: 0 },
            ],
            outputs: vec![output(5_000_000), output(1_000_000)],
            mint: vec![(
                Bytes::from_static(&[0xbb; 28]),
                vec![(Bytes::from_static(b"burn"), -7), (Bytes::from_static(b"mint"), 2)],
            )],
            metadata: None,
            redeemers: Some(vec![RedeemerRecord {
                tag: 1,
                index: 0,
                data: Bytes::from_static(&[0x80]),
                mem: 1_000,
                steps: 2_000,
            }]),
            raw: Bytes::from_static(&[0x84, 0xa0]),
        }
    }

    #[test]
    fn test_decode_point_origin_and_specific() {
        assert_eq!(decode_point(&PointRecord { slot: 0, hash: None }), Point::Origin);
        let hash = Hash32::from_bytes([1; 32]);
        assert_eq!(
            decode_point(&PointRecord { slot: 9, hash: Some(hash) }),
            Point::specific(9, hash)
        );
    }

    #[test]
    fn test_decode_hashless_point_is_canonical_origin() {
        let point = decode_point(&PointRecord { slot: 5, hash: None });
        assert_eq!(point, Point::Origin);
        assert_eq!(point.slot(), 0);
    }

    #[test]
    fn test_decode_block_indexes_transactions() {
        let record = BlockRecord {
            slot: 91,
            hash: Hash32::from_bytes([0xbb; 32]),
            number: 7,
            era: 7,
            transactions: vec![tx(), tx()],
        };
        let block = decode_block(&record);

        assert_eq!(block.point(), Point::specific(91, Hash32::from_bytes([0xbb; 32])));
        assert_eq!(block.number, 7);
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(block.transactions[0].index, 0);
        assert_eq!(block.transactions[1].index, 1);
    }

    #[test]
    fn test_decode_transaction_keeps_wire_order() {
        let body = decode_transaction_body(&tx(), 3);

        assert_eq!(body.index, 3);
        assert_eq!(body.inputs[0].index, 4);
        assert_eq!(body.inputs[1].tx_id, Hash32::from_bytes([0x21; 32]));
        assert_eq!(body.outputs[0].index, 0);
        assert_eq!(body.outputs[1].index, 1);
        assert_eq!(body.outputs[1].amount.coin, 1_000_000);
        assert_eq!(body.mint.get(&[0xbb; 28], b"burn"), Some(-7));
        assert_eq!(body.raw, vec![0x84, 0xa0]);

        let redeemers = body.redeemers.unwrap();
        assert_eq!(redeemers[0].tag, RedeemerTag::Mint);
        assert_eq!(redeemers[0].ex_units, ExUnits { mem: 1_000, steps: 2_000 });
    }

    #[test]
    fn test_decode_value_keeps_asset_order() {
        let value = decode_value(&output(1).value);
        let (_, assets) = value.multi_asset.iter().next().unwrap();
        assert_eq!(assets[0].0, b"zeta".to_vec());
        assert_eq!(assets[1].0, b"alpha".to_vec());
    }

    #[test]
    fn test_decode_datum_kinds() {
        let hash = decode_datum(&DatumRecord::Hash(Bytes::from_static(&[9; 32])));
        assert_eq!(hash.kind, DatumKind::Hash);
        let inline = decode_datum(&DatumRecord::Inline(Bytes::from_static(&[1])));
        assert_eq!(inline.kind, DatumKind::Inline);
        assert_eq!(inline.payload, vec![1]);
    }

    #[test]
    fn test_decode_utxo_uses_input_index() {
        let utxo = decode_utxo(&UtxoRecord {
            tx_id: Hash32::from_bytes([5; 32]),
            index: 2,
            output: output(10),
        });
        assert_eq!(utxo.input.index, 2);
        assert_eq!(utxo.output.index, 2);
        assert_eq!(utxo.output.amount.coin, 10);
    }
}

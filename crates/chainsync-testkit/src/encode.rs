//! Domain entities back to wire records.
//!
//! The inverse of the decoder, for round-trip tests: positional indices are
//! dropped since the wire carries them implicitly.

use bytes::Bytes;

use chainsync_core::{
    Block, BlockRecord, Datum, DatumKind, DatumRecord, InputRecord, MultiAsset, OutputRecord,
    Point, PointRecord, Redeemer, RedeemerRecord, TransactionBody, TransactionInput,
    TransactionOutput, TxRecord, Utxo, UtxoRecord, Value, ValueRecord,
};

pub fn point_record(point: &Point) -> PointRecord {
    PointRecord {
        slot: point.slot(),
        hash: point.hash().copied(),
    }
}

pub fn block_record(block: &Block) -> BlockRecord {
    BlockRecord {
        slot: block.slot,
        hash: block.hash,
        number: block.number,
        era: block.era,
        transactions: block.transactions.iter().map(tx_record).collect(),
    }
}

pub fn tx_record(tx: &TransactionBody) -> TxRecord {
    TxRecord {
        id: tx.id,
        inputs: tx.inputs.iter().map(input_record).collect(),
        outputs: tx.outputs.iter().map(output_record).collect(),
        mint: asset_groups(&tx.mint),
        metadata: tx.metadata.as_ref().map(|m| m.as_cbor().clone()),
        redeemers: tx
            .redeemers
            .as_ref()
            .map(|list| list.iter().map(redeemer_record).collect()),
        raw: Bytes::copy_from_slice(&tx.raw),
    }
}

pub fn input_record(input: &TransactionInput) -> InputRecord {
    InputRecord {
        tx_id: input.tx_id,
        index: input.index,
    }
}

pub fn output_record(output: &TransactionOutput) -> OutputRecord {
    OutputRecord {
        address: Bytes::copy_from_slice(&output.address),
        value: value_record(&output.amount),
        datum: output.datum.as_ref().map(datum_record),
        raw: Bytes::copy_from_slice(&output.raw),
    }
}

pub fn value_record(value: &Value) -> ValueRecord {
    ValueRecord {
        coin: value.coin,
        assets: asset_groups(&value.multi_asset),
    }
}

pub fn datum_record(datum: &Datum) -> DatumRecord {
    let payload = Bytes::copy_from_slice(&datum.payload);
    match datum.kind {
        DatumKind::Hash => DatumRecord::Hash(payload),
        DatumKind::Inline => DatumRecord::Inline(payload),
    }
}

pub fn redeemer_record(redeemer: &Redeemer) -> RedeemerRecord {
    RedeemerRecord {
        tag: redeemer.tag.to_u8(),
        index: redeemer.index,
        data: Bytes::copy_from_slice(&redeemer.data),
        mem: redeemer.ex_units.mem,
        steps: redeemer.ex_units.steps,
    }
}

pub fn utxo_record(utxo: &Utxo) -> UtxoRecord {
    UtxoRecord {
        tx_id: utxo.input.tx_id,
        index: utxo.input.index,
        output: output_record(&utxo.output),
    }
}

fn asset_groups<T: Copy>(assets: &MultiAsset<T>) -> Vec<(Bytes, Vec<(Bytes, T)>)> {
    assets
        .iter()
        .map(|(policy, entries)| {
            (
                Bytes::copy_from_slice(policy),
                entries
                    .iter()
                    .map(|(name, quantity)| (Bytes::copy_from_slice(name), *quantity))
                    .collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainsync_core::decode_block;

    use crate::fixtures::ChainBuilder;

    #[test]
    fn test_sample_block_survives_decode_and_encode() {
        let record = ChainBuilder::new().transactions(2).block(12);
        assert_eq!(block_record(&decode_block(&record)), record);
    }

    #[test]
    fn test_origin_record() {
        let record = point_record(&Point::Origin);
        assert_eq!(record.slot, 0);
        assert_eq!(record.hash, None);
    }
}

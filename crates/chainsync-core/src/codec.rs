//! CBOR codec for wire records.
//!
//! Payloads handed over by the transport are CBOR. Parsing a payload into
//! its record is the rejection point for malformed input: anything that
//! parses is safe to hand to [`crate::decode`], which never fails.
//!
//! Encoding is deterministic for a given record: struct fields are written
//! in declaration order and pair lists keep their order, so
//! `encode(parse(bytes)) == bytes` for any bytes this module produced.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RecordError;
use crate::records::{
    BlockRecord, HeaderRecord, OutputRecord, PointRecord, TxRecord, UtxoRecord,
};

/// A record that can travel as a CBOR payload.
pub trait WireRecord: Serialize + DeserializeOwned {
    /// Short name used in error messages.
    const KIND: &'static str;

    /// Encode to CBOR bytes.
    fn to_cbor(&self) -> Result<Vec<u8>, RecordError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| RecordError::Encode {
            kind: Self::KIND,
            message: e.to_string(),
        })?;
        Ok(buf)
    }

    /// Parse from CBOR bytes. The whole input must be consumed.
    fn from_cbor(bytes: &[u8]) -> Result<Self, RecordError> {
        let mut reader = bytes;
        let record = ciborium::from_reader(&mut reader).map_err(|e| RecordError::Decode {
            kind: Self::KIND,
            message: e.to_string(),
        })?;
        if !reader.is_empty() {
            return Err(RecordError::TrailingBytes {
                kind: Self::KIND,
                count: reader.len(),
            });
        }
        Ok(record)
    }
}

impl WireRecord for PointRecord {
    const KIND: &'static str = "point";
}

impl WireRecord for HeaderRecord {
    const KIND: &'static str = "header";
}

impl WireRecord for BlockRecord {
    const KIND: &'static str = "block";
}

impl WireRecord for TxRecord {
    const KIND: &'static str = "transaction";
}

impl WireRecord for OutputRecord {
    const KIND: &'static str = "output";
}

impl WireRecord for UtxoRecord {
    const KIND: &'static str = "utxo";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ValueRecord;
    use crate::types::Hash32;
    use bytes::Bytes;

    #[test]
    fn test_point_record_roundtrip() {
        let record = PointRecord {
            slot: 12,
            hash: Some(Hash32::from_bytes([3; 32])),
        };
        let bytes = record.to_cbor().unwrap();
        assert_eq!(PointRecord::from_cbor(&bytes).unwrap(), record);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let record = PointRecord { slot: 1, hash: None };
        let mut bytes = record.to_cbor().unwrap();
        bytes.push(0x00);
        assert!(matches!(
            PointRecord::from_cbor(&bytes),
            Err(RecordError::TrailingBytes { kind: "point", count: 1 })
        ));
    }

    #[test]
    fn test_wrong_record_kind_rejected() {
        let output = OutputRecord {
            address: Bytes::from_static(b"addr"),
            value: ValueRecord { coin: 1, assets: vec![] },
            datum: None,
            raw: Bytes::new(),
        };
        let bytes = output.to_cbor().unwrap();
        assert!(matches!(
            BlockRecord::from_cbor(&bytes),
            Err(RecordError::Decode { kind: "block", .. })
        ));
    }

    #[test]
    fn test_short_hash_rejected_at_parse() {
        // {"slot": 1, "hash": h'0102'}
        let value = ciborium::Value::Map(vec![
            (ciborium::Value::Text("slot".into()), ciborium::Value::Integer(1.into())),
            (ciborium::Value::Text("hash".into()), ciborium::Value::Bytes(vec![1, 2])),
        ]);
        let mut bytes = Vec::new();
        ciborium::into_writer(&value, &mut bytes).unwrap();
        assert!(PointRecord::from_cbor(&bytes).is_err());
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(HeaderRecord::from_cbor(&[]).is_err());
    }
}

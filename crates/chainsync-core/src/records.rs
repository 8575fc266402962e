//! Wire records produced by the transport collaborator.
//!
//! These are the shapes the node's payloads parse into before decoding.
//! Field order is wire order; map-like fields are lists of pairs so that
//! nothing is deduplicated or reordered on the way through.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::Hash32;

/// A chain position. `hash: None` is the origin.
///
/// The origin has no slot of its own: a record without a hash decodes to
/// [`crate::Point::Origin`] and the slot field is ignored. Encoders write
/// slot 0 for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRecord {
    pub slot: u64,
    pub hash: Option<Hash32>,
}

/// Header-only roll-forward payload (node-to-node role).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRecord {
    pub slot: u64,
    pub hash: Hash32,
    pub number: u64,
    pub era: u16,
}

/// A full block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub slot: u64,
    pub hash: Hash32,
    pub number: u64,
    pub era: u16,
    pub transactions: Vec<TxRecord>,
}

/// One transaction body as it appears inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxRecord {
    pub id: Hash32,
    pub inputs: Vec<InputRecord>,
    pub outputs: Vec<OutputRecord>,
    /// policy -> [(asset name, signed delta)]
    pub mint: Vec<(Bytes, Vec<(Bytes, i64)>)>,
    pub metadata: Option<ciborium::Value>,
    pub redeemers: Option<Vec<RedeemerRecord>>,
    pub raw: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub tx_id: Hash32,
    pub index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub address: Bytes,
    pub value: ValueRecord,
    pub datum: Option<DatumRecord>,
    pub raw: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRecord {
    pub coin: u64,
    /// policy -> [(asset name, quantity)]
    pub assets: Vec<(Bytes, Vec<(Bytes, u64)>)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatumRecord {
    /// Reference to a datum by its hash.
    Hash(Bytes),
    /// Datum carried inline in the output.
    Inline(Bytes),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemerRecord {
    pub tag: u8,
    pub index: u32,
    pub data: Bytes,
    pub mem: u64,
    pub steps: u64,
}

/// One entry of a UTXO-by-address query answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoRecord {
    pub tx_id: Hash32,
    pub index: u64,
    pub output: OutputRecord,
}

//! # Chainsync Core
//!
//! Pure primitives for the chain-sync client: chain positions, wire records,
//! and the decoder that turns wire records into typed ledger entities.
//!
//! This crate contains no I/O and no networking. Everything here is a value
//! type or a pure function.
//!
//! ## Key Types
//!
//! - [`Point`] - A chain position (slot + block hash), or the origin
//! - [`Hash32`] - Fixed-length hash used for block hashes and transaction ids
//! - [`Block`] - A decoded block with its ordered transaction bodies
//! - [`Value`] - Base coin plus a multi-asset bundle
//!
//! ## Decoding
//!
//! Wire records ([`records`]) are what the transport collaborator produces.
//! They travel as CBOR (see [`codec`]) and are mapped onto domain entities by
//! the total functions in [`decode`].

pub mod block;
pub mod codec;
pub mod decode;
pub mod error;
pub mod point;
pub mod records;
pub mod types;
pub mod value;

pub use block::{Block, TransactionBody, TransactionInput, TransactionOutput, Utxo};
pub use codec::WireRecord;
pub use decode::{
    decode_block, decode_datum, decode_header, decode_input, decode_output, decode_point,
    decode_redeemer, decode_transaction_body, decode_utxo, decode_value,
};
pub use error::{FormatError, RecordError};
pub use point::Point;
pub use records::{
    BlockRecord, DatumRecord, HeaderRecord, InputRecord, OutputRecord, PointRecord,
    RedeemerRecord, TxRecord, UtxoRecord, ValueRecord,
};
pub use types::{BlockHash, Hash32, NetworkMagic, TxId};
pub use value::{Datum, DatumKind, ExUnits, Metadata, Mint, MultiAsset, Redeemer, RedeemerTag, Value};

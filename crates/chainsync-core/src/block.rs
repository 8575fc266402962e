//! Decoded blocks and transactions.

use serde::{Deserialize, Serialize};

use crate::point::Point;
use crate::types::{BlockHash, TxId};
use crate::value::{Datum, Metadata, Mint, Redeemer, Value};

/// A decoded chain block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub slot: u64,
    pub hash: BlockHash,
    /// Block height. Strictly increases along the chain.
    pub number: u64,
    /// Ledger era the block was produced in.
    pub era: u16,
    pub transactions: Vec<TransactionBody>,
}

impl Block {
    /// The chain position of this block.
    pub fn point(&self) -> Point {
        Point::specific(self.slot, self.hash)
    }
}

/// One transaction inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionBody {
    pub id: TxId,
    /// Position within the containing block.
    pub index: u64,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub mint: Mint,
    pub metadata: Option<Metadata>,
    pub redeemers: Option<Vec<Redeemer>>,
    /// The transaction's encoded bytes, as received.
    pub raw: Vec<u8>,
}

/// Reference to an output of an earlier transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionInput {
    pub tx_id: TxId,
    pub index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub address: Vec<u8>,
    pub amount: Value,
    /// Position within the producing transaction.
    pub index: u64,
    pub datum: Option<Datum>,
    pub raw: Vec<u8>,
}

/// An unspent output together with the input that would spend it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub input: TransactionInput,
    pub output: TransactionOutput,
}

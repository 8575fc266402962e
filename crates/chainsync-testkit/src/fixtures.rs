//! Test fixtures and helpers.
//!
//! Deterministic chains for session tests: every block hash is derived from
//! the builder's seed and the slot, so two builders with the same seed agree
//! on every point and a forked builder does not.

use std::ops::RangeInclusive;
use std::sync::Arc;

use bytes::Bytes;

use chainsync_core::{
    BlockRecord, DatumRecord, Hash32, InputRecord, NetworkMagic, OutputRecord, Point,
    RecordError, RedeemerRecord, TxRecord, UtxoRecord, ValueRecord,
};
use chainsync_session::{MemoryNode, ReconnectPolicy, Role, SessionConfig, Target};

/// Default ledger era stamped on built blocks.
pub const DEFAULT_ERA: u16 = 7;

/// Builds deterministic block records.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
    seed: [u8; 32],
    era: u16,
    transactions_per_block: usize,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::with_seed([0u8; 32])
    }

    /// A builder whose hashes differ from every other seed's.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            seed,
            era: DEFAULT_ERA,
            transactions_per_block: 0,
        }
    }

    /// Stamp `era` on every block. Hashes do not depend on it.
    pub fn era(mut self, era: u16) -> Self {
        self.era = era;
        self
    }

    /// Put `count` sample transactions in every block.
    pub fn transactions(mut self, count: usize) -> Self {
        self.transactions_per_block = count;
        self
    }

    /// Hash of the block at `slot`.
    pub fn hash(&self, slot: u64) -> Hash32 {
        derive_hash(&self.seed, b"block", slot, 0)
    }

    /// Point of the block at `slot`.
    pub fn point(&self, slot: u64) -> Point {
        Point::specific(slot, self.hash(slot))
    }

    /// The block at `slot`. Block number equals the slot.
    pub fn block(&self, slot: u64) -> BlockRecord {
        BlockRecord {
            slot,
            hash: self.hash(slot),
            number: slot,
            era: self.era,
            transactions: (0..self.transactions_per_block)
                .map(|i| self.transaction(slot, i as u64))
                .collect(),
        }
    }

    pub fn blocks(&self, slots: RangeInclusive<u64>) -> Vec<BlockRecord> {
        slots.map(|slot| self.block(slot)).collect()
    }

    /// A transaction exercising every optional field.
    pub fn transaction(&self, slot: u64, index: u64) -> TxRecord {
        let id = derive_hash(&self.seed, b"tx", slot, index);
        let policy = derive_hash(&self.seed, b"policy", slot, 0);
        let policy = Bytes::copy_from_slice(&policy.as_bytes()[..28]);

        TxRecord {
            id,
            inputs: vec![InputRecord {
                tx_id: derive_hash(&self.seed, b"tx", slot.saturating_sub(1), index),
                index: 0,
            }],
            outputs: vec![
                sample_output(&self.seed, slot, 1_000_000 + index, None),
                sample_output(
                    &self.seed,
                    slot,
                    2_000_000,
                    Some(DatumRecord::Inline(Bytes::from_static(&[0xd8, 0x79, 0x80]))),
                ),
            ],
            mint: vec![(
                policy,
                vec![
                    (Bytes::from_static(b"token"), 100),
                    (Bytes::from_static(b"burned"), -5),
                ],
            )],
            metadata: Some(ciborium::Value::Map(vec![(
                ciborium::Value::Integer(674.into()),
                ciborium::Value::Text(format!("slot {}", slot)),
            )])),
            redeemers: Some(vec![RedeemerRecord {
                tag: 0,
                index: 0,
                data: Bytes::from_static(&[0x80]),
                mem: 1_700,
                steps: 476_468,
            }]),
            raw: Bytes::copy_from_slice(id.as_bytes()),
        }
    }

    /// A UTXO entry at `(tx_id, index)` holding `coin`.
    pub fn utxo(&self, tx_id: Hash32, index: u64, coin: u64) -> UtxoRecord {
        let datum = DatumRecord::Hash(Bytes::copy_from_slice(tx_id.as_bytes()));
        UtxoRecord {
            tx_id,
            index,
            output: sample_output(&self.seed, index, coin, Some(datum)),
        }
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_hash(seed: &[u8; 32], domain: &[u8], slot: u64, index: u64) -> Hash32 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(seed);
    hasher.update(domain);
    hasher.update(&slot.to_be_bytes());
    hasher.update(&index.to_be_bytes());
    Hash32::from_bytes(*hasher.finalize().as_bytes())
}

fn sample_output(seed: &[u8; 32], slot: u64, coin: u64, datum: Option<DatumRecord>) -> OutputRecord {
    let address = derive_hash(seed, b"address", slot, coin);
    OutputRecord {
        address: Bytes::copy_from_slice(address.as_bytes()),
        value: ValueRecord {
            coin,
            assets: Vec::new(),
        },
        datum,
        raw: Bytes::copy_from_slice(&coin.to_be_bytes()),
    }
}

/// A simulated node preloaded with a deterministic chain.
pub struct TestChain {
    pub node: Arc<MemoryNode>,
    pub builder: ChainBuilder,
}

impl TestChain {
    /// A node whose chain holds one block per slot in `slots`.
    pub fn new(slots: RangeInclusive<u64>) -> Result<Self, RecordError> {
        Self::with_builder(ChainBuilder::new(), slots)
    }

    pub fn with_builder(builder: ChainBuilder, slots: RangeInclusive<u64>) -> Result<Self, RecordError> {
        let chain = Self {
            node: MemoryNode::new(),
            builder,
        };
        chain.extend(slots)?;
        Ok(chain)
    }

    /// Append blocks to the node's chain.
    pub fn extend(&self, slots: RangeInclusive<u64>) -> Result<Point, RecordError> {
        let mut tip = self.node.tip();
        for block in self.builder.blocks(slots) {
            tip = self.node.push_block(&block)?;
        }
        Ok(tip)
    }

    pub fn point(&self, slot: u64) -> Point {
        self.builder.point(slot)
    }

    pub fn tip(&self) -> Point {
        self.node.tip()
    }
}

/// Where tests pretend the node lives.
pub fn local_target() -> Target {
    Target::Local("/tmp/chainsync-test.socket".into())
}

pub const TEST_MAGIC: NetworkMagic = NetworkMagic::PREVIEW;
pub const TEST_ROLE: Role = Role::ClientLocal;

/// Session config that reconnects at once, without sleeping.
pub fn immediate_config() -> SessionConfig {
    SessionConfig {
        reconnect: ReconnectPolicy::immediate(),
        ..SessionConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainsync_core::{decode_block, WireRecord};

    #[test]
    fn test_builder_is_deterministic() {
        let a = ChainBuilder::new().transactions(2);
        let b = ChainBuilder::new().transactions(2);
        assert_eq!(a.block(10), b.block(10));
        assert_eq!(a.block(10).to_cbor().unwrap(), b.block(10).to_cbor().unwrap());
    }

    #[test]
    fn test_forked_builder_differs() {
        let main = ChainBuilder::new();
        let fork = ChainBuilder::with_seed([1u8; 32]);
        assert_ne!(main.point(5), fork.point(5));
        assert_eq!(main.point(5).slot(), fork.point(5).slot());
    }

    #[test]
    fn test_era_is_stamped_on_blocks() {
        let babbage = ChainBuilder::new().era(6);
        assert_eq!(babbage.block(3).era, 6);
        assert_eq!(decode_block(&babbage.block(3)).era, 6);
        assert_eq!(ChainBuilder::new().block(3).era, DEFAULT_ERA);
        assert_eq!(babbage.point(3), ChainBuilder::new().point(3));
    }

    #[test]
    fn test_sample_transaction_decodes() {
        let block = decode_block(&ChainBuilder::new().transactions(3).block(4));
        assert_eq!(block.transactions.len(), 3);

        let tx = &block.transactions[2];
        assert_eq!(tx.index, 2);
        assert_eq!(tx.outputs[1].index, 1);
        assert_eq!(tx.mint.iter().next().unwrap().1[1].1, -5);
        assert_eq!(tx.metadata.as_ref().unwrap().to_json()["674"], "slot 4");
    }

    #[tokio::test]
    async fn test_chain_tip() {
        let chain = TestChain::new(1..=100).unwrap();
        assert_eq!(chain.tip(), chain.point(100));
        assert_eq!(chain.extend(101..=105).unwrap(), chain.point(105));
    }
}

//! # Chainsync Testkit
//!
//! Testing utilities for chainsync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Deterministic chains and a preloaded simulated node
//! - **Generators**: Proptest strategies for wire records
//! - **Encoders**: Domain entities back to wire records, for round-trip checks
//!
//! ## Test Fixtures
//!
//! ```rust
//! use chainsync_testkit::fixtures::TestChain;
//!
//! let chain = TestChain::new(1..=100).unwrap();
//! assert_eq!(chain.tip(), chain.point(100));
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use chainsync_core::{decode_block, WireRecord};
//! use chainsync_testkit::{encode::block_record, generators};
//!
//! proptest! {
//!     #[test]
//!     fn block_roundtrip(record in generators::block_record()) {
//!         let bytes = record.to_cbor().unwrap();
//!         let block = decode_block(&BlockRecord::from_cbor(&bytes).unwrap());
//!         prop_assert_eq!(block_record(&block).to_cbor().unwrap(), bytes);
//!     }
//! }
//! ```

pub mod encode;
pub mod fixtures;
pub mod generators;

pub use fixtures::{immediate_config, local_target, ChainBuilder, TestChain, TEST_MAGIC, TEST_ROLE};

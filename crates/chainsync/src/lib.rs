//! # Chainsync
//!
//! Client-side chain synchronisation against a blockchain node.
//!
//! ## Overview
//!
//! - **Points**: A chain position is a slot plus a block hash
//! - **Sessions**: Connect, intersect, then stream roll-forward and roll-back events
//! - **Resumption**: Transport failures are absorbed by reconnecting at the last point
//! - **Decoding**: Wire records become typed blocks, transactions, and values
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chainsync::{NetworkMagic, NextResponse, Point, Role, Session, SessionConfig, SessionEvent};
//! use chainsync::session::MemoryNode;
//!
//! async fn example() -> chainsync::Result<()> {
//!     let node = MemoryNode::new();
//!     let mut session = Session::new(node.connector(), SessionConfig::default());
//!     let mut notifications = session.subscribe();
//!
//!     let target = "relay.example.org:3001".parse().unwrap();
//!     session.connect(target, NetworkMagic::MAINNET, Role::PeerToPeer).await?;
//!
//!     let checkpoint: Point = "90@aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".parse()?;
//!     let mut stream = session.start_stream(&[checkpoint, Point::ORIGIN]).await?;
//!
//!     while let Some(event) = stream.next().await {
//!         match event {
//!             NextResponse::RollForward { block, .. } => println!("block {}", block.number),
//!             NextResponse::RollBack { point, .. } => println!("rolled back to {}", point),
//!             NextResponse::Await => {}
//!         }
//!         if let Ok(SessionEvent::Reconnected { resumed_at, .. }) = notifications.try_recv() {
//!             println!("resumed at {:?}", resumed_at);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `chainsync::core` - Points, wire records, and the decoder
//! - `chainsync::session` - Session, transport traits, and the in-memory node

pub use chainsync_core as core;
pub use chainsync_session as session;

pub use chainsync_core::{
    Block, BlockHash, Datum, DatumKind, ExUnits, FormatError, Hash32, Metadata, Mint,
    MultiAsset, NetworkMagic, Point, RecordError, Redeemer, RedeemerTag, TransactionBody,
    TransactionInput, TransactionOutput, TxId, Utxo, Value,
};
pub use chainsync_session::{
    Action, ChainSyncStream, Connector, NextResponse, ReconnectPolicy, Result, Role, Session,
    SessionConfig, SessionError, SessionEvent, SessionState, StopHandle, Target, Transport,
    TransportError,
};

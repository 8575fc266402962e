//! # Chainsync Session
//!
//! Client-side chain-sync session against a blockchain node.
//!
//! ## Overview
//!
//! A [`Session`] connects to a node through a [`Connector`], finds an
//! intersection with the consumer's known points, and then yields decoded
//! chain events one at a time. When the transport fails mid-stream the
//! session reconnects with the same endpoint, re-intersects at the last
//! point it yielded, and carries on.
//!
//! ## Key Properties
//!
//! - **Resumable**: After a reconnect the next event follows the last one yielded
//! - **Single owner**: At most one transport handle is live per session
//! - **Cooperative stop**: A [`StopHandle`] ends the stream between pulls
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chainsync_session::{MemoryNode, Role, Session, SessionConfig, Target};
//! use chainsync_core::NetworkMagic;
//!
//! async fn example() -> chainsync_session::Result<()> {
//!     let node = MemoryNode::new();
//!     let mut session = Session::new(node.connector(), SessionConfig::default());
//!
//!     let target: Target = "/run/node.socket".parse().unwrap();
//!     let tip = session.connect(target, NetworkMagic::PREVIEW, Role::ClientLocal).await?;
//!
//!     let mut stream = session.start_stream(&[tip]).await?;
//!     while let Some(event) = stream.next().await {
//!         println!("{:?} at {:?}", event.action(), event.point());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Event Flow
//!
//! ```text
//! Consumer                Session                 Node
//!   |--- next() ------------>|--- pull ------------->|
//!   |                        |<-- RollForward -------|
//!   |<-- RollForward --------|  (last point moves)   |
//!   |--- next() ------------>|--- pull ------------->|
//!   |                        |<-- error -------------|
//!   |                        |--- connect ---------->|
//!   |                        |--- intersect(last) -->|
//!   |                        |--- pull ------------->|
//!   |<-- RollForward --------|<-- RollForward -------|
//! ```

pub mod config;
pub mod error;
pub mod messages;
pub mod session;
pub mod stream;
pub mod transport;

pub use config::{ReconnectPolicy, SessionConfig};
pub use error::{Result, SessionError, TransportError};
pub use messages::{Action, Endpoint, NextResponse, RawEvent, Role, SessionEvent, Target};
pub use session::{Session, SessionState, StopHandle};
pub use stream::ChainSyncStream;
pub use transport::{
    memory::{MemoryConnector, MemoryNode, MemoryTransport},
    Connector, Transport,
};

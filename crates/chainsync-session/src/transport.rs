//! Transport abstraction for the session.
//!
//! The transport collaborator owns the wire protocol: multiplexing, the
//! handshake, and message framing. The session only sees the narrow
//! interface below. Implementations may sit on a Unix socket, TCP, or
//! nothing at all (see [`memory`]).

pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;

use chainsync_core::{NetworkMagic, Point};

use crate::error::TransportError;
use crate::messages::{RawEvent, Role, Target};

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Opens transport handles.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The handle type this connector produces.
    type Handle: Transport;

    /// Establish a connection and complete the handshake.
    async fn connect(
        &self,
        target: &Target,
        magic: NetworkMagic,
        role: Role,
    ) -> Result<Self::Handle>;
}

/// An established connection to a node.
///
/// Handles are exclusively owned. Dropping a handle must release the
/// underlying connection; [`Transport::disconnect`] does so explicitly.
#[async_trait]
pub trait Transport: Send {
    /// The node's current tip.
    async fn tip(&mut self) -> Result<Point>;

    /// Ask the node for the first candidate that is on its chain.
    ///
    /// Candidates are in preference order. Returns `None` if none match.
    async fn find_intersection(&mut self, candidates: &[Point]) -> Result<Option<Point>>;

    /// Pull the next chain-sync response. Blocks until one is available.
    ///
    /// Failures come back as [`RawEvent::Error`] rather than `Err`, so the
    /// caller classifies every pull the same way.
    async fn next_event(&mut self) -> RawEvent;

    /// Encoded block record at `point`, if the node has it.
    async fn fetch_block(&mut self, point: &Point) -> Result<Option<Bytes>>;

    /// Encoded UTXO records held by `address`.
    async fn fetch_utxos(&mut self, address: &str) -> Result<Vec<Bytes>>;

    /// Close the connection.
    async fn disconnect(&mut self) -> Result<()>;
}

//! A simple in-memory node for testing.
//!
//! [`MemoryNode`] holds a chain of encoded blocks and serves any number of
//! [`MemoryTransport`] connections, each with its own read cursor. Faults,
//! refused connections, and rollbacks can be scripted from the test.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;

use chainsync_core::{
    decode_header, BlockRecord, HeaderRecord, NetworkMagic, Point, PointRecord, RecordError,
    UtxoRecord, WireRecord,
};

use super::{Connector, Result, Transport};
use crate::error::TransportError;
use crate::messages::{RawEvent, Role, Target};

/// One block on the simulated chain.
#[derive(Debug, Clone)]
struct ChainEntry {
    point: Point,
    header: Bytes,
    block: Bytes,
}

/// Per-connection state.
#[derive(Debug)]
struct Connection {
    role: Role,
    /// Index of the last block delivered; `None` means at origin.
    cursor: Option<usize>,
    pending_rollback: Option<Point>,
    broken: bool,
}

#[derive(Debug, Default)]
struct NodeState {
    chain: Vec<ChainEntry>,
    utxos: HashMap<String, Vec<Bytes>>,
    connections: HashMap<u64, Connection>,
    next_connection_id: u64,
    magic: Option<NetworkMagic>,
    pending_faults: u32,
    refused_connections: u32,
    connect_count: u32,
    intersect_log: Vec<Vec<Point>>,
    rollback_on_intersect: bool,
}

impl NodeState {
    fn tip(&self) -> Point {
        self.chain.last().map(|e| e.point).unwrap_or(Point::Origin)
    }

    fn index_of(&self, point: &Point) -> Option<usize> {
        self.chain.iter().position(|e| e.point == *point)
    }
}

/// Shared state for a simulated node.
#[derive(Debug, Default)]
pub struct MemoryNode {
    state: Mutex<NodeState>,
}

impl MemoryNode {
    /// Create an empty node (tip at origin).
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Only accept handshakes for this network.
    pub fn with_magic(self: Arc<Self>, magic: NetworkMagic) -> Arc<Self> {
        self.state().magic = Some(magic);
        self
    }

    /// A connector that opens transports to this node.
    pub fn connector(self: &Arc<Self>) -> MemoryConnector {
        MemoryConnector {
            node: Arc::clone(self),
        }
    }

    fn state(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a block to the chain and return its point.
    pub fn push_block(&self, record: &BlockRecord) -> std::result::Result<Point, RecordError> {
        let header = HeaderRecord {
            slot: record.slot,
            hash: record.hash,
            number: record.number,
            era: record.era,
        };
        let entry = ChainEntry {
            point: decode_header(&header),
            header: Bytes::from(header.to_cbor()?),
            block: Bytes::from(record.to_cbor()?),
        };
        let point = entry.point;
        self.state().chain.push(entry);
        Ok(point)
    }

    /// Truncate the chain after `point`. Connections that read past it get
    /// a roll-back on their next pull. Returns `false` if `point` is unknown.
    pub fn roll_back_to(&self, point: &Point) -> bool {
        let mut state = self.state();
        let keep = match point {
            Point::Origin => None,
            specific => match state.index_of(specific) {
                Some(i) => Some(i),
                None => return false,
            },
        };
        state.chain.truncate(keep.map(|i| i + 1).unwrap_or(0));

        for conn in state.connections.values_mut() {
            let past = match (conn.cursor, keep) {
                (Some(c), Some(k)) => c > k,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if past {
                conn.cursor = keep;
                conn.pending_rollback = Some(*point);
            }
        }
        true
    }

    /// Register a UTXO under `address`.
    pub fn add_utxo(
        &self,
        address: &str,
        record: &UtxoRecord,
    ) -> std::result::Result<(), RecordError> {
        let bytes = Bytes::from(record.to_cbor()?);
        self.state()
            .utxos
            .entry(address.to_string())
            .or_default()
            .push(bytes);
        Ok(())
    }

    /// The next `count` pulls (on any connection) fail and break their
    /// connection.
    pub fn inject_faults(&self, count: u32) {
        self.state().pending_faults += count;
    }

    /// Refuse the next `count` connection attempts.
    pub fn refuse_connections(&self, count: u32) {
        self.state().refused_connections += count;
    }

    /// Answer every successful intersection with a roll-back to it, as a
    /// real node does.
    pub fn set_rollback_on_intersect(&self, enabled: bool) {
        self.state().rollback_on_intersect = enabled;
    }

    pub fn tip(&self) -> Point {
        self.state().tip()
    }

    /// Successful connections so far.
    pub fn connect_count(&self) -> u32 {
        self.state().connect_count
    }

    /// Connections currently open.
    pub fn open_connections(&self) -> usize {
        self.state().connections.len()
    }

    /// Candidate lists passed to `find_intersection`, in call order.
    pub fn intersect_log(&self) -> Vec<Vec<Point>> {
        self.state().intersect_log.clone()
    }

    fn open(&self, magic: NetworkMagic, role: Role) -> Result<u64> {
        let mut state = self.state();
        if state.refused_connections > 0 {
            state.refused_connections -= 1;
            return Err(TransportError::Connection("connection refused".into()));
        }
        if let Some(expected) = state.magic {
            if expected != magic {
                return Err(TransportError::Connection(format!(
                    "network magic mismatch: node={}, client={}",
                    expected, magic
                )));
            }
        }

        let id = state.next_connection_id;
        state.next_connection_id += 1;
        state.connect_count += 1;
        // A fresh connection reads from the current tip.
        let cursor = state.chain.len().checked_sub(1);
        state.connections.insert(
            id,
            Connection {
                role,
                cursor,
                pending_rollback: None,
                broken: false,
            },
        );
        Ok(id)
    }

    fn close(&self, id: u64) {
        self.state().connections.remove(&id);
    }
}

/// Opens [`MemoryTransport`]s to a [`MemoryNode`].
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    node: Arc<MemoryNode>,
}

#[async_trait]
impl Connector for MemoryConnector {
    type Handle = MemoryTransport;

    async fn connect(
        &self,
        _target: &Target,
        magic: NetworkMagic,
        role: Role,
    ) -> Result<MemoryTransport> {
        let id = self.node.open(magic, role)?;
        Ok(MemoryTransport {
            id,
            node: Arc::clone(&self.node),
        })
    }
}

/// In-memory transport implementation.
#[derive(Debug)]
pub struct MemoryTransport {
    id: u64,
    node: Arc<MemoryNode>,
}

impl MemoryTransport {
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut NodeState, u64) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.node.state();
        match state.connections.get(&self.id) {
            None => return Err(TransportError::Closed),
            Some(conn) if conn.broken => return Err(TransportError::Closed),
            Some(_) => {}
        }
        f(&mut *state, self.id)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn tip(&mut self) -> Result<Point> {
        self.with_connection(|state, _| Ok(state.tip()))
    }

    async fn find_intersection(&mut self, candidates: &[Point]) -> Result<Option<Point>> {
        self.with_connection(|state, id| {
            state.intersect_log.push(candidates.to_vec());

            let found = candidates.iter().find_map(|candidate| match candidate {
                Point::Origin => Some((*candidate, None)),
                specific => state.index_of(specific).map(|i| (*candidate, Some(i))),
            });

            if let Some((point, cursor)) = found {
                let rollback = state.rollback_on_intersect;
                if let Some(conn) = state.connections.get_mut(&id) {
                    conn.cursor = cursor;
                    conn.pending_rollback = rollback.then_some(point);
                }
            }
            Ok(found.map(|(point, _)| point))
        })
    }

    async fn next_event(&mut self) -> RawEvent {
        let result = self.with_connection(|state, id| {
            if state.pending_faults > 0 {
                state.pending_faults -= 1;
                if let Some(conn) = state.connections.get_mut(&id) {
                    conn.broken = true;
                }
                return Err(TransportError::Io("connection reset by peer".into()));
            }

            let tip = state.tip();
            let chain_len = state.chain.len();
            let (role, next) = match state.connections.get_mut(&id) {
                Some(conn) => {
                    if let Some(point) = conn.pending_rollback.take() {
                        let payload = PointRecord {
                            slot: point.slot(),
                            hash: point.hash().copied(),
                        }
                        .to_cbor()
                        .map_err(|e| TransportError::Protocol(e.to_string()))?;
                        return Ok(RawEvent::RollBack {
                            tip,
                            payload: Bytes::from(payload),
                        });
                    }
                    let next = conn.cursor.map(|c| c + 1).unwrap_or(0);
                    if next >= chain_len {
                        return Ok(RawEvent::Await);
                    }
                    conn.cursor = Some(next);
                    (conn.role, next)
                }
                None => return Err(TransportError::Closed),
            };

            let entry = &state.chain[next];
            let payload = match role {
                Role::ClientLocal => entry.block.clone(),
                Role::PeerToPeer => entry.header.clone(),
            };
            Ok(RawEvent::RollForward { tip, payload })
        });

        result.unwrap_or_else(RawEvent::Error)
    }

    async fn fetch_block(&mut self, point: &Point) -> Result<Option<Bytes>> {
        self.with_connection(|state, _| {
            Ok(state
                .chain
                .iter()
                .find(|e| e.point == *point)
                .map(|e| e.block.clone()))
        })
    }

    async fn fetch_utxos(&mut self, address: &str) -> Result<Vec<Bytes>> {
        self.with_connection(|state, _| Ok(state.utxos.get(address).cloned().unwrap_or_default()))
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.node.close(self.id);
        Ok(())
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.node.close(self.id);
    }
}

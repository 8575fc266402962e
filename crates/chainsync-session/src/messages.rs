//! Message types exchanged with the transport and yielded to consumers.

use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use bytes::Bytes;

use chainsync_core::{Block, NetworkMagic, Point};

use crate::error::TransportError;

/// Where the node lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A local IPC socket path.
    Local(PathBuf),
    /// A remote `host:port`.
    Remote { host: String, port: u16 },
}

impl FromStr for Target {
    type Err = Infallible;

    /// `host:port` with a numeric port is remote; anything else is a path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((host, port)) = s.rsplit_once(':') {
            if !host.is_empty() && !host.contains('/') {
                if let Ok(port) = port.parse::<u16>() {
                    return Ok(Target::Remote {
                        host: host.to_string(),
                        port,
                    });
                }
            }
        }
        Ok(Target::Local(PathBuf::from(s)))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Local(path) => write!(f, "{}", path.display()),
            Target::Remote { host, port } => write!(f, "{}:{}", host, port),
        }
    }
}

/// Which side of the node protocol suite the session speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Role {
    /// Node-to-client over a local socket. Roll-forwards carry whole blocks.
    ClientLocal = 1,
    /// Node-to-node. Roll-forwards carry headers; bodies are block-fetched.
    PeerToPeer = 2,
}

/// Everything needed to (re)open a transport handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub target: Target,
    pub magic: NetworkMagic,
    pub role: Role,
}

/// Kind of a chain-sync response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    Error = 0,
    RollForward = 1,
    RollBack = 2,
    Await = 3,
}

/// One undecoded response from the transport.
///
/// Payloads are CBOR wire records: a block record (or a header record in
/// the peer role) for roll-forward, a point record for roll-back.
#[derive(Debug, Clone)]
pub enum RawEvent {
    Await,
    RollForward { tip: Point, payload: Bytes },
    RollBack { tip: Point, payload: Bytes },
    /// The transport failed; this is not a protocol message.
    Error(TransportError),
}

impl RawEvent {
    pub fn action(&self) -> Action {
        match self {
            RawEvent::Await => Action::Await,
            RawEvent::RollForward { .. } => Action::RollForward,
            RawEvent::RollBack { .. } => Action::RollBack,
            RawEvent::Error(_) => Action::Error,
        }
    }
}

/// One decoded chain-sync event, as yielded to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum NextResponse {
    /// Caught up with the node's tip for now.
    Await,
    /// The chain grew by one block.
    RollForward {
        tip: Point,
        block: Block,
        /// The block's encoded bytes, as received.
        block_cbor: Vec<u8>,
    },
    /// The chain reorganised back to `point`.
    RollBack { tip: Point, point: Point },
}

impl NextResponse {
    pub fn action(&self) -> Action {
        match self {
            NextResponse::Await => Action::Await,
            NextResponse::RollForward { .. } => Action::RollForward,
            NextResponse::RollBack { .. } => Action::RollBack,
        }
    }

    /// The position this event moves the session to. `None` for await.
    pub fn point(&self) -> Option<Point> {
        match self {
            NextResponse::Await => None,
            NextResponse::RollForward { block, .. } => Some(block.point()),
            NextResponse::RollBack { point, .. } => Some(*point),
        }
    }

    pub fn tip(&self) -> Option<Point> {
        match self {
            NextResponse::Await => None,
            NextResponse::RollForward { tip, .. } | NextResponse::RollBack { tip, .. } => {
                Some(*tip)
            }
        }
    }
}

/// Out-of-band notifications, delivered alongside the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The transport failed and the session resumed on a fresh handle.
    Reconnected {
        /// Point the session re-intersected at, if it had one.
        resumed_at: Option<Point>,
        /// Connection attempts this recovery took.
        attempts: u32,
    },
    /// The stream ended because the transport failed and could not be
    /// (or was not allowed to be) re-established.
    Disconnected { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parse_remote() {
        let target: Target = "relay.example.org:3001".parse().unwrap();
        assert_eq!(
            target,
            Target::Remote {
                host: "relay.example.org".into(),
                port: 3001
            }
        );
        assert_eq!(target.to_string(), "relay.example.org:3001");
    }

    #[test]
    fn test_target_parse_local() {
        let target: Target = "/tmp/node.socket".parse().unwrap();
        assert_eq!(target, Target::Local(PathBuf::from("/tmp/node.socket")));
    }

    #[test]
    fn test_target_path_with_colon_stays_local() {
        let target: Target = "/run/node:1".parse().unwrap();
        assert!(matches!(target, Target::Local(_)));

        let target: Target = "host:notaport".parse().unwrap();
        assert!(matches!(target, Target::Local(_)));
    }

    #[test]
    fn test_action_codes() {
        assert_eq!(Action::Error as u8, 0);
        assert_eq!(Action::RollForward as u8, 1);
        assert_eq!(Action::RollBack as u8, 2);
        assert_eq!(Action::Await as u8, 3);
        assert_eq!(RawEvent::Await.action(), Action::Await);
        assert_eq!(
            RawEvent::Error(TransportError::Closed).action(),
            Action::Error
        );
    }
}

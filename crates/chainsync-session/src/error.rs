//! Error types for the session module.

use thiserror::Error;

use chainsync_core::{FormatError, RecordError};

/// Failures reported by the transport collaborator.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The node could not be reached or refused the handshake.
    #[error("connection failed: {0}")]
    Connection(String),

    /// I/O failure on an established connection.
    #[error("i/o error: {0}")]
    Io(String),

    /// The connection is closed.
    #[error("connection closed")]
    Closed,

    /// The node did not answer in time.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The node answered with something the protocol does not allow here.
    #[error("protocol violation: {0}")]
    Protocol(String),
}

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Could not establish a transport handle. Carries the transport's
    /// reason: refused, handshake mismatch, or [`TransportError::Timeout`].
    #[error("connection error: {0}")]
    Connection(#[source] TransportError),

    /// Operation needs a connection and there is none.
    #[error("not connected")]
    NotConnected,

    /// No matching point, block, or UTXO.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed point input.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// A payload did not parse into its wire record.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// Transport failure on an established handle.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

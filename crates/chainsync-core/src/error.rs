//! Error types for chainsync core.

use thiserror::Error;

/// Malformed chain position input.
///
/// Raised when a caller hands in a point that cannot be represented exactly.
/// Points are never truncated or padded to make them fit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid hex in block hash: {0}")]
    InvalidHex(String),

    #[error("invalid hash length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("point at slot {0} has no block hash")]
    MissingHash(u64),

    #[error("malformed point text {0:?}: expected slot@hash")]
    MalformedText(String),
}

impl From<hex::FromHexError> for FormatError {
    fn from(e: hex::FromHexError) -> Self {
        FormatError::InvalidHex(e.to_string())
    }
}

/// A payload that does not parse into the wire record it claims to be.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to decode {kind} record: {message}")]
    Decode { kind: &'static str, message: String },

    #[error("failed to encode {kind} record: {message}")]
    Encode { kind: &'static str, message: String },

    #[error("{count} trailing bytes after {kind} record")]
    TrailingBytes { kind: &'static str, count: usize },
}

//! Point: an immutable chain position.
//!
//! A point names a block by its slot and header hash. The special origin
//! point sits before the first block and carries no hash.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;
use crate::types::BlockHash;

/// A position on the chain.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Point {
    /// Before the first block. Slot 0, empty hash.
    #[default]
    Origin,
    /// A specific block.
    Specific {
        /// Slot the block was minted in.
        slot: u64,
        /// Header hash of the block.
        hash: BlockHash,
    },
}

impl Point {
    pub const ORIGIN: Self = Point::Origin;

    /// Build a point from a slot and a hex-encoded block hash.
    ///
    /// Slot 0 with an empty hash is the origin. An empty hash at any other
    /// slot, invalid hex, or a hash of the wrong length is a [`FormatError`].
    pub fn new(slot: u64, hash_hex: &str) -> Result<Self, FormatError> {
        if hash_hex.is_empty() {
            return if slot == 0 {
                Ok(Point::Origin)
            } else {
                Err(FormatError::MissingHash(slot))
            };
        }
        let hash = BlockHash::from_hex(hash_hex)?;
        Ok(Point::Specific { slot, hash })
    }

    /// Build a point from an already-validated hash.
    pub const fn specific(slot: u64, hash: BlockHash) -> Self {
        Point::Specific { slot, hash }
    }

    pub fn slot(&self) -> u64 {
        match self {
            Point::Origin => 0,
            Point::Specific { slot, .. } => *slot,
        }
    }

    pub fn hash(&self) -> Option<&BlockHash> {
        match self {
            Point::Origin => None,
            Point::Specific { hash, .. } => Some(hash),
        }
    }

    pub fn is_origin(&self) -> bool {
        matches!(self, Point::Origin)
    }

    /// Hex of the hash, empty for the origin.
    pub fn hash_hex(&self) -> String {
        self.hash().map(|h| h.to_hex()).unwrap_or_default()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.slot(), self.hash_hex())
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Point::Origin => write!(f, "Point(origin)"),
            Point::Specific { slot, hash } => write!(f, "Point({}@{})", slot, &hash.to_hex()[..16]),
        }
    }
}

impl FromStr for Point {
    type Err = FormatError;

    /// Parse the `slot@hash` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (slot, hash) = s
            .split_once('@')
            .ok_or_else(|| FormatError::MalformedText(s.to_string()))?;
        let slot = slot
            .parse::<u64>()
            .map_err(|_| FormatError::MalformedText(s.to_string()))?;
        Point::new(slot, hash)
    }
}

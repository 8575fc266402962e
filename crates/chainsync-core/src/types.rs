//! Strong type definitions for chain identifiers.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::FormatError;

/// A 32-byte hash, as used for block hashes and transaction ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash32(pub [u8; 32]);

/// Hash identifying a block header.
pub type BlockHash = Hash32;

/// Hash identifying a transaction (derived from its raw bytes upstream).
pub type TxId = Hash32;

impl Hash32 {
    /// Byte length of every hash on the chain.
    pub const LEN: usize = 32;

    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex. The decoded length must be exactly [`Hash32::LEN`].
    pub fn from_hex(s: &str) -> Result<Self, FormatError> {
        let bytes = hex::decode(s)?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Hash32 {
    type Error = FormatError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into().map_err(|_| FormatError::InvalidLength {
            expected: Self::LEN,
            got: slice.len(),
        })?;
        Ok(Self(arr))
    }
}

// Hashes travel as CBOR byte strings, not as arrays of 32 integers.
impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HashVisitor;

        impl<'de> Visitor<'de> for HashVisitor {
            type Value = Hash32;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a byte string of length {}", Hash32::LEN)
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Hash32, E> {
                Hash32::try_from(v).map_err(|_| E::invalid_length(v.len(), &self))
            }
        }

        deserializer.deserialize_bytes(HashVisitor)
    }
}

/// Network identifier negotiated during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkMagic(pub u64);

impl NetworkMagic {
    pub const MAINNET: Self = Self(764_824_073);
    pub const TESTNET: Self = Self(1_097_911_063);
    pub const PREVIEW: Self = Self(2);
    pub const PRE_PRODUCTION: Self = Self(1);

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NetworkMagic {
    fn from(magic: u64) -> Self {
        Self(magic)
    }
}

impl fmt::Display for NetworkMagic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_hex_roundtrip() {
        let hash = Hash32::from_bytes([0x42; 32]);
        let recovered = Hash32::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, recovered);
    }

    #[test]
    fn test_hash_rejects_short_input() {
        let err = Hash32::from_hex("abcd").unwrap_err();
        assert_eq!(err, FormatError::InvalidLength { expected: 32, got: 2 });
    }

    #[test]
    fn test_hash_rejects_bad_hex() {
        assert!(matches!(Hash32::from_hex("zz"), Err(FormatError::InvalidHex(_))));
    }

    #[test]
    fn test_hash_display_is_full_hex() {
        let hash = Hash32::from_bytes([0xab; 32]);
        assert_eq!(format!("{}", hash), "ab".repeat(32));
        assert!(format!("{:?}", hash).starts_with("Hash32("));
    }

    #[test]
    fn test_hash_cbor_is_byte_string() {
        let hash = Hash32::from_bytes([7; 32]);
        let mut buf = Vec::new();
        ciborium::into_writer(&hash, &mut buf).unwrap();
        // major type 2 (bytes), one-byte length follows
        assert_eq!(buf[0], 0x58);
        assert_eq!(buf[1], 32);

        let back: Hash32 = ciborium::from_reader(buf.as_slice()).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_zero_hash() {
        assert_eq!(Hash32::ZERO.to_hex(), "00".repeat(Hash32::LEN));
        assert_eq!(Hash32::from_hex(&"00".repeat(32)).unwrap(), Hash32::ZERO);
        assert_ne!(Hash32::from_bytes([1; 32]), Hash32::ZERO);
    }

    #[test]
    fn test_network_magic_constants() {
        assert_eq!(NetworkMagic::MAINNET.value(), 764_824_073);
        assert_eq!(NetworkMagic::PREVIEW.value(), 2);
    }
}

use primitive_types::H256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wrapper type for block hashes with controlled string representation.
///
/// A single source of truth for how block hashes are formatted when they
/// appear in RPC parameters and error messages. All block hashes should use
/// this type instead of raw `H256`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHash(pub H256);

impl BlockHash {
    pub fn new(hash: H256) -> Self {
        Self(hash)
    }

    pub fn inner(&self) -> &H256 {
        &self.0
    }

    pub fn into_inner(self) -> H256 {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_fixed_bytes()
    }
}

impl From<H256> for BlockHash {
    fn from(hash: H256) -> Self {
        Self(hash)
    }
}

impl From<BlockHash> for H256 {
    fn from(hash: BlockHash) -> Self {
        hash.0
    }
}

impl From<[u8; 32]> for BlockHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(H256::from(bytes))
    }
}

/// Format: "0x" followed by 64 lowercase hex characters
impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Serialize as hex string with "0x" prefix
impl Serialize for BlockHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Deserialize from hex string (with or without "0x" prefix)
impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let hex_str = s.strip_prefix("0x").unwrap_or(&s);

        let bytes = hex::decode(hex_str).map_err(serde::de::Error::custom)?;

        if bytes.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "Expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        let mut hash_bytes = [0u8; 32];
        hash_bytes.copy_from_slice(&bytes);

        Ok(BlockHash(H256::from(hash_bytes)))
    }
}

//! The injected RPC capability and its value types.
//!
//! The retriever consumes five read-only node RPCs. No transport ships
//! with this crate; implement [`ChainRpc`] over whatever client the host
//! application uses (tests inject an in-memory mock).

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::types::BlockHash;

#[derive(Debug, Error, Clone)]
pub enum RpcError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected RPC response: {0}")]
    UnexpectedResponse(String),
}

/// Read-only node RPC surface.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// `state_getMetadata`: the metadata blob at a block (or the latest).
    async fn state_get_metadata(&self, at: Option<BlockHash>) -> Result<Vec<u8>, RpcError>;

    /// `state_getStorage`: raw storage value under a key, `None` if absent.
    async fn state_get_storage(
        &self,
        key: &[u8],
        at: Option<BlockHash>,
    ) -> Result<Option<Vec<u8>>, RpcError>;

    /// `chain_getBlock`: signed block at a hash (or the head).
    async fn chain_get_block(&self, at: Option<BlockHash>) -> Result<SignedBlock, RpcError>;

    /// `chain_getBlockHash`: hash of a block number (or the head).
    async fn chain_get_block_hash(&self, number: Option<u64>)
        -> Result<Option<BlockHash>, RpcError>;

    /// `chain_getHeader`: header at a hash (or the head).
    async fn chain_get_header(&self, at: Option<BlockHash>) -> Result<Header, RpcError>;
}

/// `chain_getBlock` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedBlock {
    pub block: Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub header: Header,
    /// Hex-encoded, length-prefixed extrinsic wire bytes.
    pub extrinsics: Vec<String>,
}

impl Block {
    /// Hex-decode every extrinsic of the block body.
    pub fn extrinsic_bytes(&self) -> Result<Vec<Vec<u8>>, RpcError> {
        self.extrinsics.iter().map(|hex| from_hex(hex)).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub parent_hash: BlockHash,
    /// Block number; nodes return hex strings, light clients plain numbers.
    #[serde(
        deserialize_with = "deserialize_block_number",
        serialize_with = "serialize_block_number"
    )]
    pub number: u64,
    pub state_root: BlockHash,
    pub extrinsics_root: BlockHash,
    #[serde(default)]
    pub digest: Digest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Digest {
    #[serde(default)]
    pub logs: Vec<String>,
}

/// Decode a 0x-prefixed (or bare) hex blob.
pub fn from_hex(value: &str) -> Result<Vec<u8>, RpcError> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(stripped)
        .map_err(|e| RpcError::UnexpectedResponse(format!("invalid hex '{value}': {e}")))
}

/// Encode bytes as a 0x-prefixed hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a block number from either a hex string (standard Substrate
/// nodes) or a JSON number (Smoldot light client).
pub fn parse_block_number(value: &serde_json::Value) -> Result<u64, String> {
    if let Some(hex_str) = value.as_str() {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        return u64::from_str_radix(hex_str, 16)
            .map_err(|e| format!("invalid hex '{hex_str}': {e}"));
    }

    if let Some(num) = value.as_u64() {
        return Ok(num);
    }

    Err(format!("expected hex string or number, got: {value}"))
}

fn deserialize_block_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    parse_block_number(&value).map_err(serde::de::Error::custom)
}

fn serialize_block_number<S: Serializer>(number: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{number:x}"))
}

use super::types::TypeId;
use crate::codec::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to decode metadata: {0}")]
    Codec(#[from] CodecError),

    #[error("metadata blob does not start with the 'meta' magic (got 0x{0:08x})")]
    BadMagic(u32),

    #[error("unsupported metadata version {0}, only v14 is supported")]
    UnsupportedVersion(u8),

    #[error("type {0} is not present in the metadata type table")]
    UnknownType(TypeId),

    #[error("pallet with index {0} is not present in the metadata")]
    UnknownPalletIndex(u8),

    #[error("pallet '{0}' is not present in the metadata")]
    UnknownPallet(String),

    #[error("storage entry '{entry}' is not declared by pallet '{pallet}'")]
    UnknownStorageEntry { pallet: String, entry: String },
}

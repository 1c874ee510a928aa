//! The pallet side of the metadata model: event/call types, storage
//! entries and their hashers, and the extrinsic description.

use super::types::TypeId;

/// One pallet of the runtime.
#[derive(Debug, Clone)]
pub struct PalletMetadata {
    pub name: String,
    /// The pallet's wire index (first byte of every EventId/CallIndex).
    pub index: u8,
    /// Type id of the pallet's event variant type, if it emits events.
    pub event_type: Option<TypeId>,
    /// Type id of the pallet's call variant type, if it has dispatchables.
    pub call_type: Option<TypeId>,
    pub storage: Option<PalletStorageMetadata>,
}

impl PalletMetadata {
    pub fn has_events(&self) -> bool {
        self.event_type.is_some()
    }

    pub fn has_calls(&self) -> bool {
        self.call_type.is_some()
    }
}

/// Storage namespace of one pallet.
#[derive(Debug, Clone)]
pub struct PalletStorageMetadata {
    /// Storage prefix, usually the pallet name.
    pub prefix: String,
    pub entries: Vec<StorageEntryMetadata>,
}

impl PalletStorageMetadata {
    pub fn entry(&self, name: &str) -> Option<&StorageEntryMetadata> {
        self.entries.iter().find(|e| e.name == name)
    }
}

/// A single storage item.
#[derive(Debug, Clone)]
pub struct StorageEntryMetadata {
    pub name: String,
    pub modifier: StorageEntryModifier,
    pub ty: StorageEntryType,
    /// SCALE-encoded default value returned for absent keys.
    pub default: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageEntryModifier {
    Optional,
    Default,
}

#[derive(Debug, Clone)]
pub enum StorageEntryType {
    /// Single value under a fixed key.
    Plain(TypeId),
    /// Keyed map; one hasher per key part.
    Map {
        hashers: Vec<StorageHasher>,
        key: TypeId,
        value: TypeId,
    },
}

/// Hashers a storage map may declare for its key parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageHasher {
    Blake2_128,
    Blake2_256,
    Blake2_128Concat,
    Twox128,
    Twox256,
    Twox64Concat,
    Identity,
}

/// Description of the chain's extrinsic format.
#[derive(Debug, Clone)]
pub struct ExtrinsicMetadata {
    /// Type id of the extrinsic type itself.
    pub ty: TypeId,
    /// Extrinsic format version the runtime produces.
    pub version: u8,
    pub signed_extensions: Vec<SignedExtensionMetadata>,
}

/// One signed extension carried in the signature bundle.
#[derive(Debug, Clone)]
pub struct SignedExtensionMetadata {
    pub identifier: String,
    pub ty: TypeId,
    pub additional_signed: TypeId,
}

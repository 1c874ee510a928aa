// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Typed view over on-chain metadata (v14).
//!
//! A [`Metadata`] value is an immutable snapshot of what a runtime exposed
//! at one block: the flat type table and the pallets with their event/call
//! types and storage entries. Snapshots are cheap to share and never
//! mutated; the retriever swaps whole snapshots instead.

mod decode;
mod error;
mod pallets;
mod registry;
pub mod types;

pub use error::MetadataError;
pub use pallets::{
    ExtrinsicMetadata, PalletMetadata, PalletStorageMetadata, SignedExtensionMetadata,
    StorageEntryMetadata, StorageEntryModifier, StorageEntryType, StorageHasher,
};
pub use registry::TypeRegistry;
pub use types::{Field, Path, Primitive, TypeDef, TypeEntry, TypeId, Variant};

/// An immutable metadata snapshot.
#[derive(Debug, Clone)]
pub struct Metadata {
    types: TypeRegistry,
    pallets: Vec<PalletMetadata>,
    extrinsic: ExtrinsicMetadata,
}

impl Metadata {
    /// Assemble a snapshot from already-decoded parts.
    ///
    /// Mostly useful for tests and custom metadata sources; RPC callers go
    /// through [`Metadata::from_bytes`].
    pub fn new(
        types: TypeRegistry,
        pallets: Vec<PalletMetadata>,
        extrinsic: ExtrinsicMetadata,
    ) -> Self {
        Self {
            types,
            pallets,
            extrinsic,
        }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn pallets(&self) -> impl Iterator<Item = &PalletMetadata> {
        self.pallets.iter()
    }

    pub fn extrinsic(&self) -> &ExtrinsicMetadata {
        &self.extrinsic
    }

    /// Resolve a type id to its definition, O(1).
    pub fn type_of(&self, id: TypeId) -> Result<&TypeDef, MetadataError> {
        self.types.type_of(id)
    }

    pub fn pallet_by_index(&self, index: u8) -> Result<&PalletMetadata, MetadataError> {
        self.pallets
            .iter()
            .find(|p| p.index == index)
            .ok_or(MetadataError::UnknownPalletIndex(index))
    }

    pub fn pallet_by_name(&self, name: &str) -> Result<&PalletMetadata, MetadataError> {
        self.pallets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| MetadataError::UnknownPallet(name.to_string()))
    }

    /// Shortcut to the event variant type of a pallet, if it has one.
    pub fn event_type_for(&self, pallet_index: u8) -> Result<Option<TypeId>, MetadataError> {
        Ok(self.pallet_by_index(pallet_index)?.event_type)
    }

    /// Shortcut to the call variant type of a pallet, if it has one.
    pub fn call_type_for(&self, pallet_index: u8) -> Result<Option<TypeId>, MetadataError> {
        Ok(self.pallet_by_index(pallet_index)?.call_type)
    }

    /// Look up the storage entry metadata for `pallet.entry`.
    pub fn storage_entry(
        &self,
        pallet: &str,
        entry: &str,
    ) -> Result<&StorageEntryMetadata, MetadataError> {
        let pallet_meta = self.pallet_by_name(pallet)?;
        pallet_meta
            .storage
            .as_ref()
            .and_then(|s| s.entry(entry))
            .ok_or_else(|| MetadataError::UnknownStorageEntry {
                pallet: pallet.to_string(),
                entry: entry.to_string(),
            })
    }
}

//! Storage-key derivation.
//!
//! A storage value lives under `twox128(pallet) ‖ twox128(entry)`, with one
//! hashed key part appended per map key. The hashers come from the entry's
//! metadata.

use crate::metadata::{Metadata, MetadataError, StorageEntryType, StorageHasher};
use sp_crypto_hashing::{blake2_128, blake2_256, twox_64, twox_128, twox_256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageKeyError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("storage entry '{pallet}.{entry}' is plain but {given} key part(s) were given")]
    UnexpectedKeys {
        pallet: String,
        entry: String,
        given: usize,
    },

    #[error("storage map '{pallet}.{entry}' expects {expected} key part(s), got {given}")]
    KeyCountMismatch {
        pallet: String,
        entry: String,
        expected: usize,
        given: usize,
    },
}

/// Extension trait applying a metadata hasher to raw bytes.
pub trait HasherExt {
    fn hash(&self, data: &[u8]) -> Vec<u8>;
}

impl HasherExt for StorageHasher {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        match self {
            StorageHasher::Blake2_128 => blake2_128(data).to_vec(),
            StorageHasher::Blake2_256 => blake2_256(data).to_vec(),
            StorageHasher::Blake2_128Concat => {
                let mut out = blake2_128(data).to_vec();
                out.extend_from_slice(data);
                out
            }
            StorageHasher::Twox128 => twox_128(data).to_vec(),
            StorageHasher::Twox256 => twox_256(data).to_vec(),
            StorageHasher::Twox64Concat => {
                let mut out = twox_64(data).to_vec();
                out.extend_from_slice(data);
                out
            }
            StorageHasher::Identity => data.to_vec(),
        }
    }
}

/// Key of a plain (unkeyed) storage value: `twox128(pallet) ‖ twox128(entry)`.
pub fn plain_key(pallet: &str, entry: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(&twox_128(pallet.as_bytes()));
    key.extend_from_slice(&twox_128(entry.as_bytes()));
    key
}

/// The well-known `System.Events` key.
pub fn system_events_key() -> Vec<u8> {
    plain_key("System", "Events")
}

/// Derive the full storage key for `pallet.entry`, applying the entry's
/// metadata hashers to the SCALE-encoded key parts.
///
/// Pass no key parts for plain entries; for maps, one encoded part per
/// declared hasher.
pub fn storage_key(
    metadata: &Metadata,
    pallet: &str,
    entry: &str,
    key_parts: &[&[u8]],
) -> Result<Vec<u8>, StorageKeyError> {
    let entry_meta = metadata.storage_entry(pallet, entry)?;
    let mut key = plain_key(pallet, entry);

    match &entry_meta.ty {
        StorageEntryType::Plain(_) => {
            if !key_parts.is_empty() {
                return Err(StorageKeyError::UnexpectedKeys {
                    pallet: pallet.to_string(),
                    entry: entry.to_string(),
                    given: key_parts.len(),
                });
            }
        }
        StorageEntryType::Map { hashers, .. } => {
            if hashers.len() != key_parts.len() {
                return Err(StorageKeyError::KeyCountMismatch {
                    pallet: pallet.to_string(),
                    entry: entry.to_string(),
                    expected: hashers.len(),
                    given: key_parts.len(),
                });
            }
            for (hasher, part) in hashers.iter().zip(key_parts) {
                key.extend_from_slice(&hasher.hash(part));
            }
        }
    }

    Ok(key)
}

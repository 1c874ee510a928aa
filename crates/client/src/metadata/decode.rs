//! Bootstrap decoder for the metadata blob itself.
//!
//! The blob returned by `state_getMetadata` is SCALE-encoded using the
//! metadata's own definitions, so it has to be decoded against a
//! hand-written schema of the v14 layout. Two wire details matter and are
//! easy to get wrong: the `id` of each type-table entry is
//! compact-encoded, while every type reference *inside* a definition is a
//! plain little-endian `u32`.

use super::error::MetadataError;
use super::pallets::{
    ExtrinsicMetadata, PalletMetadata, PalletStorageMetadata, SignedExtensionMetadata,
    StorageEntryMetadata, StorageEntryModifier, StorageEntryType, StorageHasher,
};
use super::registry::TypeRegistry;
use super::types::{Field, Path, Primitive, TypeDef, TypeEntry, TypeId, Variant};
use super::Metadata;
use crate::codec::{
    decode_compact_len, decode_compact_u32, primitives, CodecError, SliceSource, Source,
};

/// Little-endian "meta".
const META_MAGIC: u32 = 0x6174_656d;

const SUPPORTED_VERSION: u8 = 14;

impl Metadata {
    /// Decode a full metadata blob as returned by `state_getMetadata`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetadataError> {
        let mut src = SliceSource::new(bytes);

        let magic = primitives::decode_u32(&mut src)?;
        if magic != META_MAGIC {
            return Err(MetadataError::BadMagic(magic));
        }

        let version = src.read_byte()?;
        if version != SUPPORTED_VERSION {
            return Err(MetadataError::UnsupportedVersion(version));
        }

        let types = decode_type_registry(&mut src)?;
        let pallets = decode_pallets(&mut src)?;
        let extrinsic = decode_extrinsic_meta(&mut src)?;
        // Trailing runtime type id; nothing downstream reads it.
        let _runtime_ty = decode_type_ref(&mut src)?;

        tracing::debug!(
            types = types.len(),
            pallets = pallets.len(),
            "decoded metadata v14"
        );

        Ok(Metadata::new(types, pallets, extrinsic))
    }
}

/// Embedded type references are plain u32, not compact.
fn decode_type_ref<S: Source + ?Sized>(src: &mut S) -> Result<TypeId, CodecError> {
    primitives::decode_u32(src)
}

fn decode_vec<T, S, F>(src: &mut S, mut decode_item: F) -> Result<Vec<T>, CodecError>
where
    S: Source + ?Sized,
    F: FnMut(&mut S) -> Result<T, CodecError>,
{
    let len = decode_compact_len(src)?;
    let mut items = Vec::with_capacity(len.min(1024));
    for _ in 0..len {
        items.push(decode_item(src)?);
    }
    Ok(items)
}

fn decode_string_vec<S: Source + ?Sized>(src: &mut S) -> Result<Vec<String>, CodecError> {
    decode_vec(src, primitives::decode_string)
}

fn decode_type_registry<S: Source + ?Sized>(src: &mut S) -> Result<TypeRegistry, CodecError> {
    let len = decode_compact_len(src)?;
    let mut registry = TypeRegistry::new();
    for _ in 0..len {
        // PortableType { id: Compact<u32>, ty: Type }
        let id = decode_compact_u32(src)?;
        let entry = decode_type_entry(src, id)?;
        registry.insert(entry);
    }
    Ok(registry)
}

fn decode_type_entry<S: Source + ?Sized>(src: &mut S, id: TypeId) -> Result<TypeEntry, CodecError> {
    let path = Path::new(decode_string_vec(src)?);

    // Type parameters: (name, Option<type ref>) pairs; only consumed.
    let param_count = decode_compact_len(src)?;
    for _ in 0..param_count {
        let _name = primitives::decode_string(src)?;
        let _ty = primitives::decode_option(src, decode_type_ref)?;
    }

    let type_def = decode_type_def(src)?;
    let _docs = decode_string_vec(src)?;

    Ok(TypeEntry { id, path, type_def })
}

fn decode_type_def<S: Source + ?Sized>(src: &mut S) -> Result<TypeDef, CodecError> {
    match src.read_byte()? {
        0 => Ok(TypeDef::Composite {
            fields: decode_fields(src)?,
        }),
        1 => Ok(TypeDef::Variant {
            variants: decode_vec(src, decode_variant)?,
        }),
        2 => Ok(TypeDef::Sequence(decode_type_ref(src)?)),
        3 => {
            let len = primitives::decode_u32(src)?;
            let item = decode_type_ref(src)?;
            Ok(TypeDef::Array { len, item })
        }
        4 => Ok(TypeDef::Tuple(decode_vec(src, decode_type_ref)?)),
        5 => Ok(TypeDef::Primitive(decode_primitive(src)?)),
        6 => Ok(TypeDef::Compact(decode_type_ref(src)?)),
        7 => {
            let bit_store = decode_type_ref(src)?;
            let bit_order = decode_type_ref(src)?;
            Ok(TypeDef::BitSequence {
                bit_store,
                bit_order,
            })
        }
        other => Err(CodecError::Malformed(format!(
            "invalid type definition discriminant {other}"
        ))),
    }
}

fn decode_primitive<S: Source + ?Sized>(src: &mut S) -> Result<Primitive, CodecError> {
    Ok(match src.read_byte()? {
        0 => Primitive::Bool,
        1 => Primitive::Char,
        2 => Primitive::Str,
        3 => Primitive::U8,
        4 => Primitive::U16,
        5 => Primitive::U32,
        6 => Primitive::U64,
        7 => Primitive::U128,
        8 => Primitive::U256,
        9 => Primitive::I8,
        10 => Primitive::I16,
        11 => Primitive::I32,
        12 => Primitive::I64,
        13 => Primitive::I128,
        14 => Primitive::I256,
        other => {
            return Err(CodecError::Malformed(format!(
                "invalid primitive kind {other}"
            )));
        }
    })
}

fn decode_fields<S: Source + ?Sized>(src: &mut S) -> Result<Vec<Field>, CodecError> {
    decode_vec(src, |src| {
        let name = primitives::decode_option(src, primitives::decode_string)?;
        let ty = decode_type_ref(src)?;
        let type_name = primitives::decode_option(src, primitives::decode_string)?;
        let _docs = decode_string_vec(src)?;
        Ok(Field {
            name,
            ty,
            type_name,
        })
    })
}

fn decode_variant<S: Source + ?Sized>(src: &mut S) -> Result<Variant, CodecError> {
    let name = primitives::decode_string(src)?;
    let fields = decode_fields(src)?;
    let index = src.read_byte()?;
    let _docs = decode_string_vec(src)?;
    Ok(Variant {
        name,
        index,
        fields,
    })
}

fn decode_pallets<S: Source + ?Sized>(src: &mut S) -> Result<Vec<PalletMetadata>, CodecError> {
    decode_vec(src, |src| {
        let name = primitives::decode_string(src)?;
        let storage = primitives::decode_option(src, decode_pallet_storage)?;
        let call_type = primitives::decode_option(src, decode_type_ref)?;
        let event_type = primitives::decode_option(src, decode_type_ref)?;

        // Constants: (name, ty, value, docs); only consumed.
        let constant_count = decode_compact_len(src)?;
        for _ in 0..constant_count {
            let _name = primitives::decode_string(src)?;
            let _ty = decode_type_ref(src)?;
            let _value = primitives::decode_bytes(src)?;
            let _docs = decode_string_vec(src)?;
        }

        let _error_type = primitives::decode_option(src, decode_type_ref)?;
        let index = src.read_byte()?;

        Ok(PalletMetadata {
            name,
            index,
            event_type,
            call_type,
            storage,
        })
    })
}

fn decode_pallet_storage<S: Source + ?Sized>(
    src: &mut S,
) -> Result<PalletStorageMetadata, CodecError> {
    let prefix = primitives::decode_string(src)?;
    let entries = decode_vec(src, decode_storage_entry)?;
    Ok(PalletStorageMetadata { prefix, entries })
}

fn decode_storage_entry<S: Source + ?Sized>(
    src: &mut S,
) -> Result<StorageEntryMetadata, CodecError> {
    let name = primitives::decode_string(src)?;
    let modifier = match src.read_byte()? {
        0 => StorageEntryModifier::Optional,
        1 => StorageEntryModifier::Default,
        other => {
            return Err(CodecError::Malformed(format!(
                "invalid storage modifier {other}"
            )));
        }
    };
    let ty = match src.read_byte()? {
        0 => StorageEntryType::Plain(decode_type_ref(src)?),
        1 => {
            let hashers = decode_vec(src, decode_storage_hasher)?;
            let key = decode_type_ref(src)?;
            let value = decode_type_ref(src)?;
            StorageEntryType::Map {
                hashers,
                key,
                value,
            }
        }
        other => {
            return Err(CodecError::Malformed(format!(
                "invalid storage entry kind {other}"
            )));
        }
    };
    let default = primitives::decode_bytes(src)?;
    let _docs = decode_string_vec(src)?;

    Ok(StorageEntryMetadata {
        name,
        modifier,
        ty,
        default,
    })
}

fn decode_storage_hasher<S: Source + ?Sized>(src: &mut S) -> Result<StorageHasher, CodecError> {
    Ok(match src.read_byte()? {
        0 => StorageHasher::Blake2_128,
        1 => StorageHasher::Blake2_256,
        2 => StorageHasher::Blake2_128Concat,
        3 => StorageHasher::Twox128,
        4 => StorageHasher::Twox256,
        5 => StorageHasher::Twox64Concat,
        6 => StorageHasher::Identity,
        other => {
            return Err(CodecError::Malformed(format!(
                "invalid storage hasher {other}"
            )));
        }
    })
}

fn decode_extrinsic_meta<S: Source + ?Sized>(src: &mut S) -> Result<ExtrinsicMetadata, CodecError> {
    let ty = decode_type_ref(src)?;
    let version = src.read_byte()?;
    let signed_extensions = decode_vec(src, |src| {
        let identifier = primitives::decode_string(src)?;
        let ty = decode_type_ref(src)?;
        let additional_signed = decode_type_ref(src)?;
        Ok(SignedExtensionMetadata {
            identifier,
            ty,
            additional_signed,
        })
    })?;

    Ok(ExtrinsicMetadata {
        ty,
        version,
        signed_extensions,
    })
}

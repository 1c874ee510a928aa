use super::{CallIndex, EventId};
use crate::codec::CodecError;
use crate::metadata::{MetadataError, TypeId};
use thiserror::Error;

/// Failures while compiling a decoder registry from metadata.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("{what} type of pallet '{pallet}' is not a variant type")]
    NotAVariant { pallet: String, what: &'static str },

    #[error("unsupported {kind} type (id {id}) reached via {path}")]
    UnsupportedType {
        kind: &'static str,
        id: TypeId,
        path: String,
    },

    #[error("recursive type {0} left unresolved after registry build")]
    UnresolvedRecursiveType(TypeId),

    #[error("indirection for type {0} resolves to another indirection; metadata is malformed")]
    IndirectionChain(TypeId),
}

/// Failures while running compiled decoders over wire bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("no event decoder registered for {0}")]
    UnknownEvent(EventId),

    #[error("no call decoder registered for {0}")]
    UnknownCall(CallIndex),

    #[error("unknown discriminant 0x{discriminant:02x} for variant type '{type_name}'")]
    UnknownVariant { type_name: String, discriminant: u8 },

    #[error("decoder tree reached an unresolved indirection node")]
    UnresolvedIndirection,
}

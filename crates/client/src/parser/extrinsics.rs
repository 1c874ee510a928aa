//! Extrinsic parsing.
//!
//! Wire form: `Compact<len> ‖ version-byte ‖ [signature] ‖ call`. Bit 7 of
//! the version byte is the signed flag; only raw version 4 is supported.
//! The shape of the signature bundle varies by chain, so the parser is
//! generic over the signer, signature and payment-field types; the defaults
//! cover the common chains.

use thiserror::Error;

use crate::codec::{
    decode_compact_len, decode_compact_u32, decode_compact_u128, primitives, CodecError,
    SliceSource, Source,
};
use crate::decoder::{CallIndex, DecodeError, DecodedValue, DecoderRegistry};

/// Extrinsic format version this parser understands.
pub const EXTRINSIC_VERSION: u8 = 4;

const SIGNED_MASK: u8 = 0b1000_0000;

/// A part of the signature bundle that knows how to decode itself.
pub trait SignaturePart: Sized {
    fn decode<S: Source + ?Sized>(src: &mut S) -> Result<Self, CodecError>;
}

/// The standard multi-format address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiAddress {
    /// 32-byte account id.
    Id([u8; 32]),
    /// Compact account index.
    Index(u32),
    Raw(Vec<u8>),
    Address32([u8; 32]),
    Address20([u8; 20]),
}

impl SignaturePart for MultiAddress {
    fn decode<S: Source + ?Sized>(src: &mut S) -> Result<Self, CodecError> {
        match src.read_byte()? {
            0 => Ok(MultiAddress::Id(primitives::decode_byte_array(src)?)),
            1 => Ok(MultiAddress::Index(decode_compact_u32(src)?)),
            2 => Ok(MultiAddress::Raw(primitives::decode_bytes(src)?)),
            3 => Ok(MultiAddress::Address32(primitives::decode_byte_array(src)?)),
            4 => Ok(MultiAddress::Address20(primitives::decode_byte_array(src)?)),
            other => Err(CodecError::Malformed(format!(
                "unknown address variant 0x{other:02x}"
            ))),
        }
    }
}

/// The standard multi-scheme signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiSignature {
    Ed25519([u8; 64]),
    Sr25519([u8; 64]),
    Ecdsa([u8; 65]),
}

impl SignaturePart for MultiSignature {
    fn decode<S: Source + ?Sized>(src: &mut S) -> Result<Self, CodecError> {
        match src.read_byte()? {
            0 => Ok(MultiSignature::Ed25519(primitives::decode_byte_array(src)?)),
            1 => Ok(MultiSignature::Sr25519(primitives::decode_byte_array(src)?)),
            2 => Ok(MultiSignature::Ecdsa(primitives::decode_byte_array(src)?)),
            other => Err(CodecError::Malformed(format!(
                "unknown signature variant 0x{other:02x}"
            ))),
        }
    }
}

/// Transaction mortality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Era {
    Immortal,
    Mortal { period: u64, phase: u64 },
}

impl Era {
    /// Decode the one- or two-byte era encoding.
    pub fn decode<S: Source + ?Sized>(src: &mut S) -> Result<Self, CodecError> {
        let first = src.read_byte()?;
        if first == 0 {
            return Ok(Era::Immortal);
        }
        let second = src.read_byte()?;
        let encoded = first as u64 + ((second as u64) << 8);
        let period = 2u64 << (encoded % (1 << 4));
        let quantize_factor = (period >> 12).max(1);
        let phase = (encoded >> 4) * quantize_factor;
        if period >= 4 && phase < period {
            Ok(Era::Mortal { period, phase })
        } else {
            Err(CodecError::Malformed("invalid era encoding".to_string()))
        }
    }
}

/// Default payment fields: a plain compact tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tip(pub u128);

impl SignaturePart for Tip {
    fn decode<S: Source + ?Sized>(src: &mut S) -> Result<Self, CodecError> {
        Ok(Tip(decode_compact_u128(src)?))
    }
}

/// Payment fields of chains whose transaction-payment extension carries an
/// optional asset id (asset-tx-payment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipWithAssetId {
    pub tip: u128,
    pub asset_id: Option<u32>,
}

impl SignaturePart for TipWithAssetId {
    fn decode<S: Source + ?Sized>(src: &mut S) -> Result<Self, CodecError> {
        let tip = decode_compact_u128(src)?;
        let asset_id = primitives::decode_option(src, primitives::decode_u32)?;
        Ok(TipWithAssetId { tip, asset_id })
    }
}

/// The decoded signature bundle of a signed extrinsic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrinsicSignature<A, S, P> {
    pub signer: A,
    pub signature: S,
    pub era: Era,
    pub nonce: u32,
    pub payment: P,
}

/// A decoded extrinsic.
#[derive(Debug, Clone)]
pub struct Extrinsic<A, S, P> {
    /// `Pallet.call` display name.
    pub name: String,
    pub call_index: CallIndex,
    /// Raw extrinsic format version (low 7 bits of the version byte).
    pub version: u8,
    /// Present for signed extrinsics only.
    pub signature: Option<ExtrinsicSignature<A, S, P>>,
    /// Ordered map of the call's named arguments.
    pub fields: DecodedValue,
}

/// The extrinsic shape of the common chains.
pub type DefaultExtrinsic = Extrinsic<MultiAddress, MultiSignature, Tip>;

#[derive(Debug, Error)]
pub enum ExtrinsicError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("failed to decode call fields: {0}")]
    Decode(#[source] DecodeError),

    #[error("no call decoder registered for {0}")]
    UnknownCall(CallIndex),

    #[error("unsupported extrinsic version {0}")]
    UnsupportedVersion(u8),

    #[error("{remaining} trailing byte(s) after call data")]
    TrailingBytes { remaining: usize },

    #[error("extrinsic {index}: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<ExtrinsicError>,
    },
}

/// Decode one length-prefixed extrinsic.
pub fn decode_extrinsic<A, Sg, P>(
    registry: &DecoderRegistry,
    bytes: &[u8],
) -> Result<Extrinsic<A, Sg, P>, ExtrinsicError>
where
    A: SignaturePart,
    Sg: SignaturePart,
    P: SignaturePart,
{
    let mut outer = SliceSource::new(bytes);
    let len = decode_compact_len(&mut outer)?;
    // The prefix is the exact wire size of what follows; decode within it.
    let payload = outer.read_bytes(len)?;
    let mut src = SliceSource::new(payload);

    let version_byte = src.read_byte()?;
    let signed = version_byte & SIGNED_MASK != 0;
    let version = version_byte & !SIGNED_MASK;
    if version != EXTRINSIC_VERSION {
        return Err(ExtrinsicError::UnsupportedVersion(version));
    }

    let signature = if signed {
        let signer = A::decode(&mut src)?;
        let signature = Sg::decode(&mut src)?;
        let era = Era::decode(&mut src)?;
        let nonce = decode_compact_u32(&mut src)?;
        let payment = P::decode(&mut src)?;
        Some(ExtrinsicSignature {
            signer,
            signature,
            era,
            nonce,
            payment,
        })
    } else {
        None
    };

    let pallet = src.read_byte()?;
    let call = src.read_byte()?;
    let call_index = CallIndex { pallet, call };

    let (decoder, fields) = registry
        .decode_call_fields(call_index, &mut src)
        .map_err(|e| match e {
            DecodeError::UnknownCall(index) => ExtrinsicError::UnknownCall(index),
            source => ExtrinsicError::Decode(source),
        })?;

    if src.remaining() > 0 {
        return Err(ExtrinsicError::TrailingBytes {
            remaining: src.remaining(),
        });
    }

    Ok(Extrinsic {
        name: decoder.name(),
        call_index,
        version,
        signature,
        fields,
    })
}

/// Decode every extrinsic of a block body, annotating failures with the
/// extrinsic's index.
pub fn decode_extrinsics<A, Sg, P>(
    registry: &DecoderRegistry,
    extrinsics: &[Vec<u8>],
) -> Result<Vec<Extrinsic<A, Sg, P>>, ExtrinsicError>
where
    A: SignaturePart,
    Sg: SignaturePart,
    P: SignaturePart,
{
    extrinsics
        .iter()
        .enumerate()
        .map(|(index, bytes)| {
            decode_extrinsic(registry, bytes).map_err(|source| ExtrinsicError::AtIndex {
                index,
                source: Box::new(source),
            })
        })
        .collect()
}

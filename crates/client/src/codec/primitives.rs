//! SCALE primitive codecs: booleans, fixed-width integers, byte strings,
//! UTF-8 strings and options.
//!
//! All integers are little-endian on the wire. 128- and 256-bit values keep
//! their explicit byte width; 256-bit values are handled as raw little-endian
//! byte arrays since no native integer holds them.

use super::compact::{decode_compact_len, encode_compact};
use super::error::CodecError;
use super::source::{Output, Source};

/// A decoded string payload, or the raw bytes when UTF-8 validation failed
/// and the caller asked for lossy decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringOrBytes {
    Utf8(String),
    Raw(Vec<u8>),
}

pub fn decode_bool<S: Source + ?Sized>(src: &mut S) -> Result<bool, CodecError> {
    match src.read_byte()? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::Malformed(format!(
            "invalid boolean byte 0x{other:02x}"
        ))),
    }
}

pub fn encode_bool(value: bool, out: &mut Output) {
    out.push_byte(value as u8);
}

macro_rules! fixed_int_codec {
    ($dec:ident, $enc:ident, $ty:ty) => {
        pub fn $dec<S: Source + ?Sized>(src: &mut S) -> Result<$ty, CodecError> {
            let mut buf = [0u8; size_of::<$ty>()];
            src.read_exact(&mut buf)?;
            Ok(<$ty>::from_le_bytes(buf))
        }

        pub fn $enc(value: $ty, out: &mut Output) {
            out.write(&value.to_le_bytes());
        }
    };
}

fixed_int_codec!(decode_u8, encode_u8, u8);
fixed_int_codec!(decode_u16, encode_u16, u16);
fixed_int_codec!(decode_u32, encode_u32, u32);
fixed_int_codec!(decode_u64, encode_u64, u64);
fixed_int_codec!(decode_u128, encode_u128, u128);
fixed_int_codec!(decode_i8, encode_i8, i8);
fixed_int_codec!(decode_i16, encode_i16, i16);
fixed_int_codec!(decode_i32, encode_i32, i32);
fixed_int_codec!(decode_i64, encode_i64, i64);
fixed_int_codec!(decode_i128, encode_i128, i128);

/// Decode a 256-bit integer as its 32 little-endian bytes.
pub fn decode_u256<S: Source + ?Sized>(src: &mut S) -> Result<[u8; 32], CodecError> {
    decode_byte_array::<32, S>(src)
}

pub fn encode_u256(value: &[u8; 32], out: &mut Output) {
    out.write(value);
}

/// Decode a fixed-size byte array (no length prefix).
pub fn decode_byte_array<const N: usize, S: Source + ?Sized>(
    src: &mut S,
) -> Result<[u8; N], CodecError> {
    let mut buf = [0u8; N];
    src.read_exact(&mut buf)?;
    Ok(buf)
}

/// Decode a `char` from its UTF-32 code point.
pub fn decode_char<S: Source + ?Sized>(src: &mut S) -> Result<char, CodecError> {
    let code = decode_u32(src)?;
    char::from_u32(code)
        .ok_or_else(|| CodecError::Malformed(format!("invalid char code point 0x{code:x}")))
}

pub fn encode_char(value: char, out: &mut Output) {
    encode_u32(value as u32, out);
}

/// Decode a length-prefixed byte string.
pub fn decode_bytes<S: Source + ?Sized>(src: &mut S) -> Result<Vec<u8>, CodecError> {
    let len = decode_compact_len(src)?;
    let mut buf = vec![0u8; len];
    src.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn encode_bytes(value: &[u8], out: &mut Output) {
    encode_compact(value.len() as u128, out);
    out.write(value);
}

/// Decode a length-prefixed UTF-8 string, failing on invalid UTF-8.
pub fn decode_string<S: Source + ?Sized>(src: &mut S) -> Result<String, CodecError> {
    let bytes = decode_bytes(src)?;
    String::from_utf8(bytes).map_err(|_| CodecError::Malformed("invalid UTF-8 string".to_string()))
}

/// Decode a length-prefixed string, returning the raw bytes when UTF-8
/// validation fails instead of erroring.
pub fn decode_string_lossy<S: Source + ?Sized>(src: &mut S) -> Result<StringOrBytes, CodecError> {
    let bytes = decode_bytes(src)?;
    match String::from_utf8(bytes) {
        Ok(s) => Ok(StringOrBytes::Utf8(s)),
        Err(e) => Ok(StringOrBytes::Raw(e.into_bytes())),
    }
}

pub fn encode_string(value: &str, out: &mut Output) {
    encode_bytes(value.as_bytes(), out);
}

/// Decode an `Option<T>` given a decoder for `T`.
pub fn decode_option<T, S, F>(src: &mut S, decode_inner: F) -> Result<Option<T>, CodecError>
where
    S: Source + ?Sized,
    F: FnOnce(&mut S) -> Result<T, CodecError>,
{
    match src.read_byte()? {
        0 => Ok(None),
        1 => Ok(Some(decode_inner(src)?)),
        other => Err(CodecError::Malformed(format!(
            "invalid option discriminant 0x{other:02x}"
        ))),
    }
}

pub fn encode_option<T, F>(value: Option<&T>, out: &mut Output, encode_inner: F)
where
    F: FnOnce(&T, &mut Output),
{
    match value {
        None => out.push_byte(0),
        Some(inner) => {
            out.push_byte(1);
            encode_inner(inner, out);
        }
    }
}

/// Decode `Option<bool>`, which uses a dedicated one-byte, three-state form.
pub fn decode_option_bool<S: Source + ?Sized>(src: &mut S) -> Result<Option<bool>, CodecError> {
    match src.read_byte()? {
        0 => Ok(None),
        1 => Ok(Some(true)),
        2 => Ok(Some(false)),
        other => Err(CodecError::Malformed(format!(
            "invalid Option<bool> byte 0x{other:02x}"
        ))),
    }
}

pub fn encode_option_bool(value: Option<bool>, out: &mut Output) {
    out.push_byte(match value {
        None => 0,
        Some(true) => 1,
        Some(false) => 2,
    });
}

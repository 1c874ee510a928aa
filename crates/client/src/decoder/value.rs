//! The boundary value tree produced by dynamic decoding.

use primitive_types::U256;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A decoded value.
///
/// Callers consume this by case analysis; it is deliberately the only shape
/// the dynamic decoder hands out. Composites keep their on-wire field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Bool(bool),
    Char(char),
    String(String),
    /// Unsigned integers up to 128 bits.
    Uint(u128),
    /// Signed integers up to 128 bits.
    Int(i128),
    /// 256-bit unsigned integer, little-endian bytes.
    U256([u8; 32]),
    /// 256-bit signed integer, two's-complement little-endian bytes.
    I256([u8; 32]),
    /// Raw byte blob (`Vec<u8>`, `[u8; N]`, or a lossy string).
    Bytes(Vec<u8>),
    /// Ordered sequence (vectors, arrays).
    Sequence(Vec<DecodedValue>),
    /// Struct or tuple: ordered `(name, value)` pairs.
    Composite(Vec<(String, DecodedValue)>),
    /// Tagged-union case: the variant name and its fields, or `None` for a
    /// fieldless variant.
    Variant {
        name: String,
        fields: Option<Box<DecodedValue>>,
    },
}

impl DecodedValue {
    /// Field lookup on a composite.
    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        match self {
            DecodedValue::Composite(fields) => fields
                .iter()
                .find_map(|(n, v)| (n == name).then_some(v)),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u128> {
        match self {
            DecodedValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DecodedValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[DecodedValue]> {
        match self {
            DecodedValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// The case name, when this is a variant.
    pub fn variant_name(&self) -> Option<&str> {
        match self {
            DecodedValue::Variant { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Render a 256-bit two's-complement little-endian value as decimal.
fn i256_to_string(bytes: &[u8; 32]) -> String {
    let negative = bytes[31] & 0x80 != 0;
    let value = U256::from_little_endian(bytes);
    if negative {
        // Magnitude of the negative value: !x + 1.
        let magnitude = (!value).overflowing_add(U256::one()).0;
        format!("-{magnitude}")
    } else {
        value.to_string()
    }
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::Bool(v) => serializer.serialize_bool(*v),
            DecodedValue::Char(v) => serializer.serialize_char(*v),
            DecodedValue::String(v) => serializer.serialize_str(v),
            // Numbers past 64 bits go out as decimal strings so JSON
            // consumers do not lose precision.
            DecodedValue::Uint(v) => {
                if let Ok(small) = u64::try_from(*v) {
                    serializer.serialize_u64(small)
                } else {
                    serializer.serialize_str(&v.to_string())
                }
            }
            DecodedValue::Int(v) => {
                if let Ok(small) = i64::try_from(*v) {
                    serializer.serialize_i64(small)
                } else {
                    serializer.serialize_str(&v.to_string())
                }
            }
            DecodedValue::U256(bytes) => {
                serializer.serialize_str(&U256::from_little_endian(bytes).to_string())
            }
            DecodedValue::I256(bytes) => serializer.serialize_str(&i256_to_string(bytes)),
            DecodedValue::Bytes(bytes) => {
                serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
            }
            DecodedValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DecodedValue::Composite(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            DecodedValue::Variant { name, fields } => {
                let mut map = serializer.serialize_map(Some(1))?;
                match fields {
                    Some(inner) => map.serialize_entry(name, inner)?,
                    None => map.serialize_entry(name, &())?,
                }
                map.end()
            }
        }
    }
}

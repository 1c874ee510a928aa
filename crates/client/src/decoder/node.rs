//! Compiled decoder nodes.
//!
//! Nodes live in an arena and reference each other by [`NodeId`], so the
//! tree can contain cycles without owning itself. Decoding walks the arena;
//! nodes hold no mutable state, which makes a compiled registry freely
//! shareable across threads.

use std::collections::BTreeMap;

use super::error::DecodeError;
use super::value::DecodedValue;
use crate::codec::{
    compact, primitives, CodecError, Source,
};

/// Index of a node in the decoder arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// One case of a compiled variant decoder.
#[derive(Debug, Clone)]
pub(crate) struct VariantCase {
    pub name: String,
    pub fields: Vec<(String, NodeId)>,
}

/// A compiled field decoder.
#[derive(Debug, Clone)]
pub(crate) enum DecoderNode {
    Bool,
    Char,
    Str,
    /// `Option<bool>` has its own one-byte, three-state wire form.
    OptionBool { some_field: String },
    /// Unsigned integer of 8..=128 bits.
    Uint { bits: u16 },
    /// Signed integer of 8..=128 bits.
    Int { bits: u16 },
    U256,
    I256,
    /// Compact unsigned integer whose target is at most `max_bits` wide.
    CompactUint { max_bits: u16 },
    /// Compact unsigned integer up to 256 bits.
    CompactU256,
    /// `Vec<u8>` fast path.
    Bytes,
    /// `[u8; len]` fast path.
    ByteArray { len: u32 },
    Composite { fields: Vec<(String, NodeId)> },
    Variant {
        /// Used in error messages only.
        label: String,
        cases: BTreeMap<u8, VariantCase>,
    },
    Sequence { item: NodeId },
    Array { len: u32, item: NodeId },
    /// Cycle breaker: a stable slot whose target is back-patched once the
    /// real decoder exists. Must not be invoked while unresolved.
    Indirection { target: Option<NodeId> },
}

/// Arena of compiled decoder nodes.
#[derive(Debug, Clone, Default)]
pub(crate) struct DecoderArena {
    nodes: Vec<DecoderNode>,
}

impl DecoderArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: DecoderNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &DecoderNode {
        &self.nodes[id.0]
    }

    pub fn set(&mut self, id: NodeId, node: DecoderNode) {
        self.nodes[id.0] = node;
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &DecoderNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Decode one value at `id` from `src`.
    pub fn decode_at<S: Source + ?Sized>(
        &self,
        id: NodeId,
        src: &mut S,
    ) -> Result<DecodedValue, DecodeError> {
        match self.node(id) {
            DecoderNode::Bool => Ok(DecodedValue::Bool(primitives::decode_bool(src)?)),
            DecoderNode::Char => Ok(DecodedValue::Char(primitives::decode_char(src)?)),
            DecoderNode::Str => Ok(DecodedValue::String(primitives::decode_string(src)?)),
            DecoderNode::OptionBool { some_field } => {
                match primitives::decode_option_bool(src)? {
                    None => Ok(DecodedValue::Variant {
                        name: "None".to_string(),
                        fields: None,
                    }),
                    Some(value) => Ok(DecodedValue::Variant {
                        name: "Some".to_string(),
                        fields: Some(Box::new(DecodedValue::Composite(vec![(
                            some_field.clone(),
                            DecodedValue::Bool(value),
                        )]))),
                    }),
                }
            }
            DecoderNode::Uint { bits } => {
                let value = match bits {
                    8 => primitives::decode_u8(src)? as u128,
                    16 => primitives::decode_u16(src)? as u128,
                    32 => primitives::decode_u32(src)? as u128,
                    64 => primitives::decode_u64(src)? as u128,
                    _ => primitives::decode_u128(src)?,
                };
                Ok(DecodedValue::Uint(value))
            }
            DecoderNode::Int { bits } => {
                let value = match bits {
                    8 => primitives::decode_i8(src)? as i128,
                    16 => primitives::decode_i16(src)? as i128,
                    32 => primitives::decode_i32(src)? as i128,
                    64 => primitives::decode_i64(src)? as i128,
                    _ => primitives::decode_i128(src)?,
                };
                Ok(DecodedValue::Int(value))
            }
            DecoderNode::U256 => Ok(DecodedValue::U256(primitives::decode_u256(src)?)),
            DecoderNode::I256 => Ok(DecodedValue::I256(primitives::decode_u256(src)?)),
            DecoderNode::CompactUint { max_bits } => {
                let value = compact::decode_compact_u128(src)?;
                let fits = match max_bits {
                    8 => value <= u8::MAX as u128,
                    16 => value <= u16::MAX as u128,
                    32 => value <= u32::MAX as u128,
                    64 => value <= u64::MAX as u128,
                    _ => true,
                };
                if !fits {
                    return Err(CodecError::OutOfRange {
                        target: uint_target_name(*max_bits),
                    }
                    .into());
                }
                Ok(DecodedValue::Uint(value))
            }
            DecoderNode::CompactU256 => {
                Ok(DecodedValue::U256(compact::decode_compact_u256(src)?))
            }
            DecoderNode::Bytes => Ok(DecodedValue::Bytes(primitives::decode_bytes(src)?)),
            DecoderNode::ByteArray { len } => {
                let mut buf = vec![0u8; *len as usize];
                src.read_exact(&mut buf)?;
                Ok(DecodedValue::Bytes(buf))
            }
            DecoderNode::Composite { fields } => self.decode_fields(fields, src),
            DecoderNode::Variant { label, cases } => {
                let discriminant = src.read_byte()?;
                let case = cases.get(&discriminant).ok_or_else(|| {
                    DecodeError::UnknownVariant {
                        type_name: label.clone(),
                        discriminant,
                    }
                })?;
                let fields = if case.fields.is_empty() {
                    None
                } else {
                    Some(Box::new(self.decode_fields(&case.fields, src)?))
                };
                Ok(DecodedValue::Variant {
                    name: case.name.clone(),
                    fields,
                })
            }
            DecoderNode::Sequence { item } => {
                let len = compact::decode_compact_len(src)?;
                let mut items = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    items.push(self.decode_at(*item, src)?);
                }
                Ok(DecodedValue::Sequence(items))
            }
            DecoderNode::Array { len, item } => {
                let mut items = Vec::with_capacity((*len as usize).min(1024));
                for _ in 0..*len {
                    items.push(self.decode_at(*item, src)?);
                }
                Ok(DecodedValue::Sequence(items))
            }
            DecoderNode::Indirection { target } => match target {
                Some(target) => self.decode_at(*target, src),
                None => Err(DecodeError::UnresolvedIndirection),
            },
        }
    }

    /// Decode an ordered field list into a composite value.
    pub fn decode_fields<S: Source + ?Sized>(
        &self,
        fields: &[(String, NodeId)],
        src: &mut S,
    ) -> Result<DecodedValue, DecodeError> {
        let mut out = Vec::with_capacity(fields.len());
        for (name, node) in fields {
            out.push((name.clone(), self.decode_at(*node, src)?));
        }
        Ok(DecodedValue::Composite(out))
    }
}

fn uint_target_name(bits: u16) -> &'static str {
    match bits {
        8 => "u8",
        16 => "u16",
        32 => "u32",
        64 => "u64",
        _ => "u128",
    }
}

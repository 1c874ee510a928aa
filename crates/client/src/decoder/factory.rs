//! Compiles a metadata snapshot into decoder trees.
//!
//! The walk is recursive over type definitions and must terminate on
//! recursive type graphs. Two maps keyed by type id drive this: `built`
//! holds finalised nodes, `pending` holds indirection slots for types whose
//! subtree is still being constructed. Revisiting a pending type returns
//! its shared indirection slot; the slot is back-patched once the real
//! decoder exists and stays in place for every node that captured it.

use std::collections::{BTreeMap, HashMap};

use super::error::RegistryError;
use super::node::{DecoderArena, DecoderNode, NodeId, VariantCase};
use super::{CallIndex, DecoderRegistry, EventId, ItemDecoder};
use crate::metadata::{
    Field, Metadata, Primitive, TypeDef, TypeEntry, TypeId, Variant,
};

pub(crate) fn build_registry(metadata: &Metadata) -> Result<DecoderRegistry, RegistryError> {
    let mut builder = Builder {
        metadata,
        arena: DecoderArena::new(),
        built: HashMap::new(),
        pending: HashMap::new(),
        slot_owner: HashMap::new(),
        walk: Vec::new(),
    };

    let mut events = HashMap::new();
    let mut calls = HashMap::new();

    for pallet in metadata.pallets() {
        if let Some(ty) = pallet.event_type {
            let variants = builder.expect_variant(ty, &pallet.name, "events")?;
            for variant in variants {
                let decoder = builder.item_decoder(pallet, variant)?;
                events.insert(
                    EventId {
                        pallet: pallet.index,
                        variant: variant.index,
                    },
                    decoder,
                );
            }
        }
        if let Some(ty) = pallet.call_type {
            let variants = builder.expect_variant(ty, &pallet.name, "calls")?;
            for variant in variants {
                let decoder = builder.item_decoder(pallet, variant)?;
                calls.insert(
                    CallIndex {
                        pallet: pallet.index,
                        call: variant.index,
                    },
                    decoder,
                );
            }
        }
    }

    let arena = builder.finish()?;

    tracing::debug!(
        events = events.len(),
        calls = calls.len(),
        "compiled decoder registry"
    );

    Ok(DecoderRegistry {
        arena,
        events,
        calls,
    })
}

struct Builder<'a> {
    metadata: &'a Metadata,
    arena: DecoderArena,
    built: HashMap<TypeId, NodeId>,
    pending: HashMap<TypeId, NodeId>,
    /// Indirection slot -> the type it was created for, for error reporting.
    slot_owner: HashMap<NodeId, TypeId>,
    /// Current path through the type graph, for error reporting.
    walk: Vec<String>,
}

impl<'a> Builder<'a> {
    fn entry(&self, id: TypeId) -> Result<&'a TypeEntry, RegistryError> {
        let metadata: &'a Metadata = self.metadata;
        Ok(metadata.types().resolve(id)?)
    }

    fn expect_variant(
        &self,
        ty: TypeId,
        pallet: &str,
        what: &'static str,
    ) -> Result<&'a [Variant], RegistryError> {
        match &self.entry(ty)?.type_def {
            TypeDef::Variant { variants } => Ok(variants),
            _ => Err(RegistryError::NotAVariant {
                pallet: pallet.to_string(),
                what,
            }),
        }
    }

    fn item_decoder(
        &mut self,
        pallet: &crate::metadata::PalletMetadata,
        variant: &'a Variant,
    ) -> Result<ItemDecoder, RegistryError> {
        self.walk
            .push(format!("{}.{}", pallet.name, variant.name));
        let fields = self.build_field_list(&variant.fields)?;
        self.walk.pop();
        Ok(ItemDecoder {
            pallet: pallet.name.clone(),
            variant: variant.name.clone(),
            fields,
        })
    }

    /// Build decoders for an ordered field list, applying the display-name
    /// policy and `#k` duplicate disambiguation.
    fn build_field_list(
        &mut self,
        fields: &'a [Field],
    ) -> Result<Vec<(String, NodeId)>, RegistryError> {
        let mut out = Vec::with_capacity(fields.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        for field in fields {
            let base = self.field_display_name(field)?;
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}#{count}")
            };
            *count += 1;
            let node = self.build_node(field.ty)?;
            out.push((name, node));
        }
        Ok(out)
    }

    /// Display name of a field: explicit name, then the type's path join,
    /// then the type-name hint, then `lookup_index_<id>`.
    fn field_display_name(&self, field: &Field) -> Result<String, RegistryError> {
        if let Some(name) = &field.name {
            return Ok(name.clone());
        }
        let entry = self.entry(field.ty)?;
        if !entry.path.is_empty() {
            return Ok(entry.path.join());
        }
        if let Some(hint) = &field.type_name {
            return Ok(hint.clone());
        }
        Ok(format!("lookup_index_{}", field.ty))
    }

    /// Build (or reuse) the decoder node for a type id.
    fn build_node(&mut self, id: TypeId) -> Result<NodeId, RegistryError> {
        if let Some(&node) = self.built.get(&id) {
            return Ok(node);
        }
        if let Some(&slot) = self.pending.get(&id) {
            // Already somewhere above us in the walk: share its slot.
            return Ok(slot);
        }

        let slot = self.arena.alloc(DecoderNode::Indirection { target: None });
        self.pending.insert(id, slot);
        self.slot_owner.insert(slot, id);

        let real = self.build_from_def(id)?;

        // An indirection must never point at another indirection.
        if matches!(self.arena.node(real), DecoderNode::Indirection { .. }) {
            return Err(RegistryError::IndirectionChain(id));
        }

        self.arena.set(slot, DecoderNode::Indirection { target: Some(real) });
        self.pending.remove(&id);
        self.built.insert(id, real);
        Ok(real)
    }

    fn build_from_def(&mut self, id: TypeId) -> Result<NodeId, RegistryError> {
        let entry = self.entry(id)?;
        self.walk.push(walk_label(entry));
        let node = self.node_for_def(id, entry)?;
        self.walk.pop();
        Ok(node)
    }

    fn node_for_def(
        &mut self,
        id: TypeId,
        entry: &'a TypeEntry,
    ) -> Result<NodeId, RegistryError> {
        let node = match &entry.type_def {
            TypeDef::Primitive(p) => self.arena.alloc(primitive_node(*p)),
            TypeDef::Composite { fields } => {
                let fields = self.build_field_list(fields)?;
                self.arena.alloc(DecoderNode::Composite { fields })
            }
            TypeDef::Variant { variants } => {
                if let Some(some_field) = self.option_bool_field(entry)? {
                    self.arena.alloc(DecoderNode::OptionBool { some_field })
                } else {
                    let mut cases = BTreeMap::new();
                    for variant in variants {
                        let fields = self.build_field_list(&variant.fields)?;
                        cases.insert(
                            variant.index,
                            VariantCase {
                                name: variant.name.clone(),
                                fields,
                            },
                        );
                    }
                    let label = if entry.path.is_empty() {
                        format!("variant_{id}")
                    } else {
                        entry.path.join()
                    };
                    self.arena.alloc(DecoderNode::Variant { label, cases })
                }
            }
            TypeDef::Sequence(item) => {
                if self.is_u8(*item)? {
                    self.arena.alloc(DecoderNode::Bytes)
                } else {
                    let item = self.build_node(*item)?;
                    self.arena.alloc(DecoderNode::Sequence { item })
                }
            }
            TypeDef::Array { len, item } => {
                if self.is_u8(*item)? {
                    self.arena.alloc(DecoderNode::ByteArray { len: *len })
                } else {
                    let item = self.build_node(*item)?;
                    self.arena.alloc(DecoderNode::Array {
                        len: *len,
                        item,
                    })
                }
            }
            TypeDef::Tuple(items) => {
                // Anonymous positional field names.
                let mut fields = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let node = self.build_node(*item)?;
                    fields.push((i.to_string(), node));
                }
                self.arena.alloc(DecoderNode::Composite { fields })
            }
            TypeDef::Compact(inner) => self.build_compact(*inner)?,
            TypeDef::BitSequence { .. } => {
                return Err(self.unsupported("bit sequence", id));
            }
            TypeDef::HistoricMetaCompat => {
                return Err(self.unsupported("historic metadata compatibility", id));
            }
        };
        Ok(node)
    }

    /// Compact wrapper: a compact primitive, or a composite whose fields
    /// are all compact-encodable primitives.
    fn build_compact(&mut self, inner: TypeId) -> Result<NodeId, RegistryError> {
        let entry = self.entry(inner)?;
        let node = match &entry.type_def {
            TypeDef::Primitive(p) => match compact_bits(*p) {
                Some(256) => self.arena.alloc(DecoderNode::CompactU256),
                Some(max_bits) => self.arena.alloc(DecoderNode::CompactUint { max_bits }),
                None => return Err(self.unsupported("compact of non-unsigned primitive", inner)),
            },
            TypeDef::Composite { fields } => {
                let mut compiled = Vec::with_capacity(fields.len());
                let mut seen: HashMap<String, usize> = HashMap::new();
                for field in fields {
                    let base = self.field_display_name(field)?;
                    let count = seen.entry(base.clone()).or_insert(0);
                    let name = if *count == 0 {
                        base
                    } else {
                        format!("{base}#{count}")
                    };
                    *count += 1;
                    let node = self.build_compact(field.ty)?;
                    compiled.push((name, node));
                }
                self.arena.alloc(DecoderNode::Composite { fields: compiled })
            }
            _ => return Err(self.unsupported("compact wrapper over non-primitive", inner)),
        };
        Ok(node)
    }

    /// Detect `Option<bool>`, which has a special wire form. Returns the
    /// display name for the `Some` field when matched.
    fn option_bool_field(&self, entry: &'a TypeEntry) -> Result<Option<String>, RegistryError> {
        if entry.path.segments != ["Option"] {
            return Ok(None);
        }
        let TypeDef::Variant { variants } = &entry.type_def else {
            return Ok(None);
        };
        let some = match variants.iter().find(|v| v.name == "Some") {
            Some(some) if variants.len() == 2 && some.fields.len() == 1 => some,
            _ => return Ok(None),
        };
        let inner = self.entry(some.fields[0].ty)?;
        if inner.type_def == TypeDef::Primitive(Primitive::Bool) {
            Ok(Some(self.field_display_name(&some.fields[0])?))
        } else {
            Ok(None)
        }
    }

    fn is_u8(&self, id: TypeId) -> Result<bool, RegistryError> {
        Ok(self.entry(id)?.type_def == TypeDef::Primitive(Primitive::U8))
    }

    fn unsupported(&self, kind: &'static str, id: TypeId) -> RegistryError {
        RegistryError::UnsupportedType {
            kind,
            id,
            path: self.walk.join(" -> "),
        }
    }

    /// Verify every indirection slot was back-patched.
    fn finish(self) -> Result<DecoderArena, RegistryError> {
        if let Some((&id, _)) = self.pending.iter().next() {
            return Err(RegistryError::UnresolvedRecursiveType(id));
        }
        for (node_id, node) in self.arena.iter() {
            if let DecoderNode::Indirection { target: None } = node {
                let owner = self.slot_owner.get(&node_id).copied().unwrap_or_default();
                return Err(RegistryError::UnresolvedRecursiveType(owner));
            }
        }
        Ok(self.arena)
    }
}

fn walk_label(entry: &TypeEntry) -> String {
    let shape = match &entry.type_def {
        TypeDef::Primitive(_) => "primitive",
        TypeDef::Composite { .. } => "composite",
        TypeDef::Variant { .. } => "variant",
        TypeDef::Sequence(_) => "sequence",
        TypeDef::Array { .. } => "array",
        TypeDef::Tuple(_) => "tuple",
        TypeDef::Compact(_) => "compact",
        TypeDef::BitSequence { .. } => "bit_sequence",
        TypeDef::HistoricMetaCompat => "historic_meta_compat",
    };
    if entry.path.is_empty() {
        format!("{shape}({})", entry.id)
    } else {
        format!("{}({})", entry.path.join(), entry.id)
    }
}

fn primitive_node(p: Primitive) -> DecoderNode {
    match p {
        Primitive::Bool => DecoderNode::Bool,
        Primitive::Char => DecoderNode::Char,
        Primitive::Str => DecoderNode::Str,
        Primitive::U8 => DecoderNode::Uint { bits: 8 },
        Primitive::U16 => DecoderNode::Uint { bits: 16 },
        Primitive::U32 => DecoderNode::Uint { bits: 32 },
        Primitive::U64 => DecoderNode::Uint { bits: 64 },
        Primitive::U128 => DecoderNode::Uint { bits: 128 },
        Primitive::U256 => DecoderNode::U256,
        Primitive::I8 => DecoderNode::Int { bits: 8 },
        Primitive::I16 => DecoderNode::Int { bits: 16 },
        Primitive::I32 => DecoderNode::Int { bits: 32 },
        Primitive::I64 => DecoderNode::Int { bits: 64 },
        Primitive::I128 => DecoderNode::Int { bits: 128 },
        Primitive::I256 => DecoderNode::I256,
    }
}

fn compact_bits(p: Primitive) -> Option<u16> {
    match p {
        Primitive::U8 => Some(8),
        Primitive::U16 => Some(16),
        Primitive::U32 => Some(32),
        Primitive::U64 => Some(64),
        Primitive::U128 => Some(128),
        Primitive::U256 => Some(256),
        _ => None,
    }
}

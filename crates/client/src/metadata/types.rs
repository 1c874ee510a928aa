//! The type-definition side of the metadata model.
//!
//! Every type the runtime can emit is an entry in a flat table, indexed by
//! [`TypeId`]. Definitions reference each other by id, so the graph can be
//! recursive.

/// Index into the metadata type table.
pub type TypeId = u32;

/// Namespaced path of a type, e.g. `["pallet_balances", "pallet", "Event"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    pub segments: Vec<String>,
}

impl Path {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// `a::b::c` join of the segments.
    pub fn join(&self) -> String {
        self.segments.join("::")
    }

    /// Last path segment, if any.
    pub fn ident(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

/// A single field of a composite or variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Explicit field name; `None` for tuple-style fields.
    pub name: Option<String>,
    /// The field's type.
    pub ty: TypeId,
    /// Type-name hint as written in the runtime source, e.g. `"T::Balance"`.
    pub type_name: Option<String>,
}

impl Field {
    pub fn named(name: &str, ty: TypeId) -> Self {
        Self {
            name: Some(name.to_string()),
            ty,
            type_name: None,
        }
    }

    pub fn unnamed(ty: TypeId) -> Self {
        Self {
            name: None,
            ty,
            type_name: None,
        }
    }
}

/// One case of a tagged union.
///
/// `index` is the discriminator byte on the wire; it does not have to match
/// the variant's position in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub index: u8,
    pub fields: Vec<Field>,
}

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Bool,
    Char,
    Str,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    I8,
    I16,
    I32,
    I64,
    I128,
    I256,
}

/// A type definition from the metadata type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Primitive(Primitive),
    /// Product type with ordered, possibly named fields.
    Composite { fields: Vec<Field> },
    /// Tagged union with a one-byte discriminator.
    Variant { variants: Vec<Variant> },
    /// Length-prefixed list of one element type.
    Sequence(TypeId),
    /// Fixed-length array, no length prefix.
    Array { len: u32, item: TypeId },
    /// Ordered, anonymous fields.
    Tuple(Vec<TypeId>),
    /// Compact wire form of the wrapped type.
    Compact(TypeId),
    /// Bit vector; carried in the model but not decodable.
    BitSequence { bit_store: TypeId, bit_order: TypeId },
    /// Pre-v14 compatibility node; carried in the model but not decodable.
    HistoricMetaCompat,
}

/// A fully described entry in the type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub id: TypeId,
    pub path: Path,
    pub type_def: TypeDef,
}

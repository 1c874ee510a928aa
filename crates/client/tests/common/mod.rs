//! Shared fixtures: a hand-encoded metadata v14 blob for a small test
//! runtime, event-blob builders, and an in-memory mock RPC client.

// Each integration test binary compiles its own copy of this module and
// uses a different subset of it.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use substrate_retriever::codec::{encode_compact, primitives, Output};
use substrate_retriever::rpc::{ChainRpc, Header, RpcError, SignedBlock};
use substrate_retriever::types::BlockHash;

// ------------------------------------------------------------------------
// Metadata blob encoding
// ------------------------------------------------------------------------

pub struct FieldSpec {
    pub name: Option<&'static str>,
    pub ty: u32,
    pub type_name: Option<&'static str>,
}

impl FieldSpec {
    pub fn named(name: &'static str, ty: u32) -> Self {
        Self {
            name: Some(name),
            ty,
            type_name: None,
        }
    }

    pub fn unnamed(ty: u32) -> Self {
        Self {
            name: None,
            ty,
            type_name: None,
        }
    }
}

pub struct VariantSpec {
    pub name: &'static str,
    pub index: u8,
    pub fields: Vec<FieldSpec>,
}

pub enum TypeDefSpec {
    /// Discriminant of the primitive kind (3 = u8, 5 = u32, 7 = u128, ...).
    Primitive(u8),
    Composite(Vec<FieldSpec>),
    Variant(Vec<VariantSpec>),
    Sequence(u32),
    Array(u32, u32),
}

pub struct TypeSpec {
    pub id: u32,
    pub path: Vec<&'static str>,
    pub def: TypeDefSpec,
}

pub struct PalletSpec {
    pub name: &'static str,
    pub index: u8,
    pub event_type: Option<u32>,
    pub call_type: Option<u32>,
}

fn encode_option_u32(value: Option<u32>, out: &mut Output) {
    match value {
        None => out.push_byte(0),
        Some(v) => {
            out.push_byte(1);
            out.write(&v.to_le_bytes());
        }
    }
}

fn encode_fields(fields: &[FieldSpec], out: &mut Output) {
    encode_compact(fields.len() as u128, out);
    for field in fields {
        match field.name {
            None => out.push_byte(0),
            Some(name) => {
                out.push_byte(1);
                primitives::encode_string(name, out);
            }
        }
        out.write(&field.ty.to_le_bytes());
        match field.type_name {
            None => out.push_byte(0),
            Some(hint) => {
                out.push_byte(1);
                primitives::encode_string(hint, out);
            }
        }
        encode_compact(0, out); // docs
    }
}

/// Encode a full metadata v14 blob the way `state_getMetadata` returns it.
pub fn encode_metadata(types: &[TypeSpec], pallets: &[PalletSpec]) -> Vec<u8> {
    let mut out = Output::new();
    out.write(&0x6174_656du32.to_le_bytes()); // "meta"
    out.push_byte(14);

    // Type table.
    encode_compact(types.len() as u128, &mut out);
    for ty in types {
        encode_compact(ty.id as u128, &mut out);
        encode_compact(ty.path.len() as u128, &mut out);
        for segment in &ty.path {
            primitives::encode_string(segment, &mut out);
        }
        encode_compact(0, &mut out); // type params
        match &ty.def {
            TypeDefSpec::Composite(fields) => {
                out.push_byte(0);
                encode_fields(fields, &mut out);
            }
            TypeDefSpec::Variant(variants) => {
                out.push_byte(1);
                encode_compact(variants.len() as u128, &mut out);
                for variant in variants {
                    primitives::encode_string(variant.name, &mut out);
                    encode_fields(&variant.fields, &mut out);
                    out.push_byte(variant.index);
                    encode_compact(0, &mut out); // docs
                }
            }
            TypeDefSpec::Sequence(item) => {
                out.push_byte(2);
                out.write(&item.to_le_bytes());
            }
            TypeDefSpec::Array(len, item) => {
                out.push_byte(3);
                out.write(&len.to_le_bytes());
                out.write(&item.to_le_bytes());
            }
            TypeDefSpec::Primitive(kind) => {
                out.push_byte(5);
                out.push_byte(*kind);
            }
        }
        encode_compact(0, &mut out); // docs
    }

    // Pallets.
    encode_compact(pallets.len() as u128, &mut out);
    for pallet in pallets {
        primitives::encode_string(pallet.name, &mut out);
        out.push_byte(0); // storage: None
        encode_option_u32(pallet.call_type, &mut out);
        encode_option_u32(pallet.event_type, &mut out);
        encode_compact(0, &mut out); // constants
        out.push_byte(0); // error: None
        out.push_byte(pallet.index);
    }

    // Extrinsic metadata and runtime type id.
    out.write(&0u32.to_le_bytes());
    out.push_byte(4);
    encode_compact(0, &mut out);
    out.write(&0u32.to_le_bytes());

    out.into_bytes()
}

/// The standard test runtime: System (events + calls) at index 0 and
/// Balances (events) at index 6.
///
/// Type ids: 0 u8, 1 AccountId32, 2 u128, 3 u32, 4 u64, 5 bool,
/// 6 Vec<u8>, 7 DispatchInfo, 8 System events, 9 Balances events,
/// 10 System calls.
pub fn test_runtime_metadata() -> Vec<u8> {
    let types = vec![
        TypeSpec {
            id: 0,
            path: vec![],
            def: TypeDefSpec::Primitive(3), // u8
        },
        TypeSpec {
            id: 1,
            path: vec!["sp_core", "crypto", "AccountId32"],
            def: TypeDefSpec::Array(32, 0),
        },
        TypeSpec {
            id: 2,
            path: vec![],
            def: TypeDefSpec::Primitive(7), // u128
        },
        TypeSpec {
            id: 3,
            path: vec![],
            def: TypeDefSpec::Primitive(5), // u32
        },
        TypeSpec {
            id: 4,
            path: vec![],
            def: TypeDefSpec::Primitive(6), // u64
        },
        TypeSpec {
            id: 5,
            path: vec![],
            def: TypeDefSpec::Primitive(0), // bool
        },
        TypeSpec {
            id: 6,
            path: vec![],
            def: TypeDefSpec::Sequence(0),
        },
        TypeSpec {
            id: 7,
            path: vec!["frame_support", "dispatch", "DispatchInfo"],
            def: TypeDefSpec::Composite(vec![
                FieldSpec::named("weight", 4),
                FieldSpec::named("class", 0),
                FieldSpec::named("pays_fee", 5),
            ]),
        },
        TypeSpec {
            id: 8,
            path: vec!["frame_system", "pallet", "Event"],
            def: TypeDefSpec::Variant(vec![VariantSpec {
                name: "ExtrinsicSuccess",
                index: 0,
                fields: vec![FieldSpec::named("dispatch_info", 7)],
            }]),
        },
        TypeSpec {
            id: 9,
            path: vec!["pallet_balances", "pallet", "Event"],
            def: TypeDefSpec::Variant(vec![VariantSpec {
                name: "Transfer",
                index: 0,
                fields: vec![
                    FieldSpec::named("from", 1),
                    FieldSpec::named("to", 1),
                    FieldSpec::named("amount", 2),
                ],
            }]),
        },
        TypeSpec {
            id: 10,
            path: vec!["frame_system", "pallet", "Call"],
            def: TypeDefSpec::Variant(vec![VariantSpec {
                name: "remark",
                index: 0,
                fields: vec![FieldSpec::named("remark", 6)],
            }]),
        },
    ];

    let pallets = vec![
        PalletSpec {
            name: "System",
            index: 0,
            event_type: Some(8),
            call_type: Some(10),
        },
        PalletSpec {
            name: "Balances",
            index: 6,
            event_type: Some(9),
            call_type: None,
        },
    ];

    encode_metadata(&types, &pallets)
}

/// Like [`test_runtime_metadata`] but without the Balances pallet, so
/// `(6, 0)` events are unknown to a registry built from it.
pub fn test_runtime_metadata_without_balances() -> Vec<u8> {
    let types = vec![
        TypeSpec {
            id: 0,
            path: vec![],
            def: TypeDefSpec::Primitive(3),
        },
        TypeSpec {
            id: 4,
            path: vec![],
            def: TypeDefSpec::Primitive(6),
        },
        TypeSpec {
            id: 5,
            path: vec![],
            def: TypeDefSpec::Primitive(0),
        },
        TypeSpec {
            id: 7,
            path: vec!["frame_support", "dispatch", "DispatchInfo"],
            def: TypeDefSpec::Composite(vec![
                FieldSpec::named("weight", 4),
                FieldSpec::named("class", 0),
                FieldSpec::named("pays_fee", 5),
            ]),
        },
        TypeSpec {
            id: 8,
            path: vec!["frame_system", "pallet", "Event"],
            def: TypeDefSpec::Variant(vec![VariantSpec {
                name: "ExtrinsicSuccess",
                index: 0,
                fields: vec![FieldSpec::named("dispatch_info", 7)],
            }]),
        },
    ];

    let pallets = vec![PalletSpec {
        name: "System",
        index: 0,
        event_type: Some(8),
        call_type: None,
    }];

    encode_metadata(&types, &pallets)
}

// ------------------------------------------------------------------------
// Event blob building
// ------------------------------------------------------------------------

pub enum PhaseSpec {
    ApplyExtrinsic(u32),
    Finalization,
    Initialization,
}

pub struct EventRecordSpec {
    pub phase: PhaseSpec,
    pub pallet: u8,
    pub variant: u8,
    pub fields: Vec<u8>,
    pub topics: Vec<[u8; 32]>,
}

/// Encode a `System.Events` storage blob from record specs.
pub fn encode_events_blob(records: &[EventRecordSpec]) -> Vec<u8> {
    let mut out = Output::new();
    encode_compact(records.len() as u128, &mut out);
    for record in records {
        match record.phase {
            PhaseSpec::ApplyExtrinsic(index) => {
                out.push_byte(0);
                out.write(&index.to_le_bytes());
            }
            PhaseSpec::Finalization => out.push_byte(1),
            PhaseSpec::Initialization => out.push_byte(2),
        }
        out.push_byte(record.pallet);
        out.push_byte(record.variant);
        out.write(&record.fields);
        encode_compact(record.topics.len() as u128, &mut out);
        for topic in &record.topics {
            out.write(topic);
        }
    }
    out.into_bytes()
}

// ------------------------------------------------------------------------
// Mock RPC client
// ------------------------------------------------------------------------

type Queued<T> = Mutex<VecDeque<Result<T, RpcError>>>;

/// In-memory `ChainRpc` serving queued responses.
///
/// Each queue is drained in order; the last response is repeated once the
/// queue is down to one element, so single-response tests need no
/// repetition. Call counters let tests assert on retry behavior.
#[derive(Default)]
pub struct MockRpc {
    metadata_responses: Queued<Vec<u8>>,
    storage_responses: Queued<Option<Vec<u8>>>,
    block_responses: Queued<SignedBlock>,
    pub metadata_calls: AtomicUsize,
    pub storage_calls: AtomicUsize,
    pub block_calls: AtomicUsize,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_metadata(&self, blob: Vec<u8>) {
        self.metadata_responses
            .lock()
            .unwrap()
            .push_back(Ok(blob));
    }

    pub fn queue_storage(&self, value: Option<Vec<u8>>) {
        self.storage_responses
            .lock()
            .unwrap()
            .push_back(Ok(value));
    }

    pub fn queue_storage_error(&self, message: &str) {
        self.storage_responses
            .lock()
            .unwrap()
            .push_back(Err(RpcError::Transport(message.to_string())));
    }

    pub fn queue_block(&self, block: SignedBlock) {
        self.block_responses.lock().unwrap().push_back(Ok(block));
    }

    fn next<T: Clone>(queue: &Queued<T>, what: &str) -> Result<T, RpcError> {
        let mut queue = queue.lock().unwrap();
        match queue.len() {
            0 => Err(RpcError::Transport(format!(
                "mock has no {what} response queued"
            ))),
            1 => queue.front().cloned().unwrap(),
            _ => queue.pop_front().unwrap(),
        }
    }
}

#[async_trait]
impl ChainRpc for MockRpc {
    async fn state_get_metadata(&self, _at: Option<BlockHash>) -> Result<Vec<u8>, RpcError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.metadata_responses, "metadata")
    }

    async fn state_get_storage(
        &self,
        _key: &[u8],
        _at: Option<BlockHash>,
    ) -> Result<Option<Vec<u8>>, RpcError> {
        self.storage_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.storage_responses, "storage")
    }

    async fn chain_get_block(&self, _at: Option<BlockHash>) -> Result<SignedBlock, RpcError> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.block_responses, "block")
    }

    async fn chain_get_block_hash(
        &self,
        _number: Option<u64>,
    ) -> Result<Option<BlockHash>, RpcError> {
        Ok(Some(BlockHash::from([0u8; 32])))
    }

    async fn chain_get_header(&self, _at: Option<BlockHash>) -> Result<Header, RpcError> {
        let block = Self::next(&self.block_responses, "block")?;
        Ok(block.block.header)
    }
}

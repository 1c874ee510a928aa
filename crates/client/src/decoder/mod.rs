// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Compiled decoder registries.
//!
//! [`DecoderRegistry::build`] walks a metadata snapshot once and compiles a
//! field-decoder tree for every event and call the runtime can emit. The
//! result is immutable and shared read-only for the lifetime of its
//! snapshot; decoding allocates values, never decoder nodes.

mod error;
mod factory;
mod node;
mod value;

pub use error::{DecodeError, RegistryError};
pub use node::NodeId;
pub use value::DecodedValue;

use crate::codec::Source;
use crate::metadata::Metadata;
use node::DecoderArena;
use std::collections::HashMap;
use std::fmt;

/// Identifies an event type: pallet wire index and variant discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId {
    pub pallet: u8,
    pub variant: u8,
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.pallet, self.variant)
    }
}

/// Identifies a dispatchable call: pallet wire index and call discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallIndex {
    pub pallet: u8,
    pub call: u8,
}

impl fmt::Display for CallIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.pallet, self.call)
    }
}

/// Compiled decoder for one event or call variant.
#[derive(Debug, Clone)]
pub struct ItemDecoder {
    pub pallet: String,
    pub variant: String,
    pub(crate) fields: Vec<(String, NodeId)>,
}

impl ItemDecoder {
    /// `Pallet.Variant` display name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.pallet, self.variant)
    }

    /// Display names of the fields, in wire order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

/// The compiled registries of one metadata snapshot.
#[derive(Debug, Clone)]
pub struct DecoderRegistry {
    pub(crate) arena: DecoderArena,
    pub(crate) events: HashMap<EventId, ItemDecoder>,
    pub(crate) calls: HashMap<CallIndex, ItemDecoder>,
}

impl DecoderRegistry {
    /// Compile both registries from a metadata snapshot.
    ///
    /// Pure: the same metadata always yields registries that decode any
    /// input to equal value trees.
    pub fn build(metadata: &Metadata) -> Result<Self, RegistryError> {
        factory::build_registry(metadata)
    }

    pub fn event_decoder(&self, id: EventId) -> Option<&ItemDecoder> {
        self.events.get(&id)
    }

    pub fn call_decoder(&self, index: CallIndex) -> Option<&ItemDecoder> {
        self.calls.get(&index)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// Decode the field payload of an event, after its two id bytes.
    pub fn decode_event_fields<S: Source + ?Sized>(
        &self,
        id: EventId,
        src: &mut S,
    ) -> Result<(&ItemDecoder, DecodedValue), DecodeError> {
        let decoder = self.events.get(&id).ok_or(DecodeError::UnknownEvent(id))?;
        let fields = self.arena.decode_fields(&decoder.fields, src)?;
        Ok((decoder, fields))
    }

    /// Decode the argument payload of a call, after its two index bytes.
    pub fn decode_call_fields<S: Source + ?Sized>(
        &self,
        index: CallIndex,
        src: &mut S,
    ) -> Result<(&ItemDecoder, DecodedValue), DecodeError> {
        let decoder = self
            .calls
            .get(&index)
            .ok_or(DecodeError::UnknownCall(index))?;
        let fields = self.arena.decode_fields(&decoder.fields, src)?;
        Ok((decoder, fields))
    }
}

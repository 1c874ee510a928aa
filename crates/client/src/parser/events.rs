//! Event parsing.
//!
//! The `System.Events` storage value is a length-prefixed list of event
//! records: `(phase, event-id, fields, topics)`. Records are decoded in
//! wire order; any failure aborts the whole parse because the stream is no
//! longer aligned after an undecodable record.

use primitive_types::H256;
use serde::Serialize;
use thiserror::Error;

use crate::codec::{decode_compact_len, primitives, CodecError, SliceSource, Source};
use crate::decoder::{DecodeError, DecodedValue, DecoderRegistry, EventId};

/// Lifecycle stage at which an event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// During application of the extrinsic at this index.
    ApplyExtrinsic(u32),
    Finalization,
    Initialization,
}

/// A decoded event record.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// `Pallet.Variant` display name.
    pub name: String,
    pub pallet: String,
    pub variant: String,
    pub phase: Phase,
    /// Ordered map of the event's named fields.
    pub fields: DecodedValue,
    pub topics: Vec<H256>,
}

#[derive(Debug, Error)]
pub enum EventsError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("failed to decode event record {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: DecodeError,
    },

    #[error("event record {index} names {id}, which is not in the registry")]
    UnknownEvent { id: EventId, index: usize },

    #[error("invalid event phase discriminant 0x{0:02x}")]
    InvalidPhase(u8),

    #[error("{remaining} trailing byte(s) after the final event record")]
    TrailingBytes { remaining: usize },
}

/// Decode a `System.Events` storage blob against a compiled registry.
///
/// The returned list preserves on-wire order. Either every record decodes
/// or an error is returned; no partial list is ever produced.
pub fn decode_events(
    registry: &DecoderRegistry,
    bytes: &[u8],
) -> Result<Vec<Event>, EventsError> {
    let mut src = SliceSource::new(bytes);
    let count = decode_compact_len(&mut src)?;
    let mut events = Vec::with_capacity(count.min(1024));

    for index in 0..count {
        let phase = decode_phase(&mut src)?;

        let pallet = src.read_byte()?;
        let variant = src.read_byte()?;
        let id = EventId { pallet, variant };

        let (decoder, fields) =
            registry
                .decode_event_fields(id, &mut src)
                .map_err(|e| match e {
                    DecodeError::UnknownEvent(id) => EventsError::UnknownEvent { id, index },
                    source => EventsError::Decode { index, source },
                })?;

        let topics = decode_topics(&mut src)?;

        tracing::trace!(index, event = %decoder.name(), "decoded event record");
        events.push(Event {
            name: decoder.name(),
            pallet: decoder.pallet.clone(),
            variant: decoder.variant.clone(),
            phase,
            fields,
            topics,
        });
    }

    if src.remaining() > 0 {
        return Err(EventsError::TrailingBytes {
            remaining: src.remaining(),
        });
    }

    Ok(events)
}

fn decode_phase<S: Source + ?Sized>(src: &mut S) -> Result<Phase, EventsError> {
    match src.read_byte()? {
        0 => Ok(Phase::ApplyExtrinsic(primitives::decode_u32(src)?)),
        1 => Ok(Phase::Finalization),
        2 => Ok(Phase::Initialization),
        other => Err(EventsError::InvalidPhase(other)),
    }
}

fn decode_topics<S: Source + ?Sized>(src: &mut S) -> Result<Vec<H256>, EventsError> {
    let count = decode_compact_len(src)?;
    let mut topics = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let hash = primitives::decode_byte_array::<32, S>(src)?;
        topics.push(H256::from(hash));
    }
    Ok(topics)
}

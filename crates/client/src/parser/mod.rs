//! Parsers turning raw chain blobs into decoded events and extrinsics
//! using a compiled decoder registry.

pub mod events;
pub mod extrinsics;

pub use events::{decode_events, Event, EventsError, Phase};
pub use extrinsics::{
    decode_extrinsic, decode_extrinsics, DefaultExtrinsic, Era, Extrinsic, ExtrinsicError,
    ExtrinsicSignature, MultiAddress, MultiSignature, SignaturePart, Tip, TipWithAssetId,
    EXTRINSIC_VERSION,
};

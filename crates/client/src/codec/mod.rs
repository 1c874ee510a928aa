// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! SCALE codec primitives.
//!
//! Everything in this crate that touches wire bytes goes through this
//! module: the [`Source`]/[`Output`] byte cursors, the compact
//! unsigned-integer encoding, and the fixed-shape primitive codecs.

pub mod compact;
mod error;
pub mod primitives;
mod source;

pub use compact::{
    compact_bytes, decode_compact_len, decode_compact_u32, decode_compact_u64,
    decode_compact_u128, decode_compact_u128_strict, decode_compact_u256, encode_compact,
};
pub use error::CodecError;
pub use primitives::StringOrBytes;
pub use source::{IoSource, Output, SliceSource, Source};

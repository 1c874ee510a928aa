//! Byte sources the codec reads from.
//!
//! Decoding works against the [`Source`] trait so the same decoders run over
//! an in-memory slice (the common case: hex-decoded RPC blobs) or any
//! `std::io::Read` stream.

use super::error::CodecError;

/// A cursor over SCALE-encoded bytes.
pub trait Source {
    /// Read exactly `buf.len()` bytes into `buf`.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), CodecError>;

    /// Read a single byte.
    fn read_byte(&mut self) -> Result<u8, CodecError> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Look at the next byte without consuming it. `None` at end of input.
    fn peek_byte(&mut self) -> Result<Option<u8>, CodecError>;

    /// Whether the input is exhausted.
    fn at_eof(&mut self) -> Result<bool, CodecError> {
        Ok(self.peek_byte()?.is_none())
    }

    /// Number of bytes left, when the source knows it.
    ///
    /// Used to reject length prefixes that promise more data than the input
    /// holds before allocating for them.
    fn remaining_hint(&self) -> Option<usize> {
        None
    }
}

/// In-memory byte source over a slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Borrow the next `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::UnexpectedEof);
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }
}

impl Source for SliceSource<'_> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), CodecError> {
        let bytes = self.read_bytes(buf.len())?;
        buf.copy_from_slice(bytes);
        Ok(())
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, CodecError> {
        Ok(self.data.get(self.pos).copied())
    }

    fn remaining_hint(&self) -> Option<usize> {
        Some(self.remaining())
    }
}

/// Streaming byte source over any `std::io::Read`.
///
/// Keeps a one-byte lookahead so `peek_byte`/`at_eof` work on non-seekable
/// streams.
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
    lookahead: Option<u8>,
}

impl<R: std::io::Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lookahead: None,
        }
    }
}

impl<R: std::io::Read> Source for IoSource<R> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), CodecError> {
        if buf.is_empty() {
            return Ok(());
        }
        let mut start = 0;
        if let Some(byte) = self.lookahead.take() {
            buf[0] = byte;
            start = 1;
        }
        self.inner.read_exact(&mut buf[start..]).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                CodecError::UnexpectedEof
            } else {
                CodecError::Io(e.to_string())
            }
        })
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, CodecError> {
        if self.lookahead.is_none() {
            let mut buf = [0u8; 1];
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => self.lookahead = Some(buf[0]),
                Err(e) => return Err(CodecError::Io(e.to_string())),
            }
        }
        Ok(self.lookahead)
    }
}

/// Growable output buffer the encoders write into.
#[derive(Debug, Default, Clone)]
pub struct Output {
    bytes: Vec<u8>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

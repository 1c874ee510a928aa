use thiserror::Error;

/// Errors produced while reading or writing SCALE-encoded bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("decoded value does not fit into {target}")]
    OutOfRange { target: &'static str },

    #[error("I/O error while reading input: {0}")]
    Io(String),
}

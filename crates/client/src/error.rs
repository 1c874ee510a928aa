use thiserror::Error;

use crate::decoder::RegistryError;
use crate::metadata::MetadataError;
use crate::parser::{EventsError, ExtrinsicError};
use crate::retry::RetryError;
use crate::rpc::RpcError;
use crate::types::BlockHash;

/// Top-level error of the retriever.
#[derive(Debug, Error)]
pub enum RetrieverError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Events(#[from] EventsError),

    #[error(transparent)]
    Extrinsics(#[from] ExtrinsicError),

    #[error("operation cancelled")]
    Cancelled,

    /// Every retry attempt failed; carries the failing block hash and the
    /// full attempt history.
    #[error("failed to retrieve {what} at block {at}: {source}")]
    Retrieval {
        what: &'static str,
        at: BlockHash,
        #[source]
        source: Box<RetryError<RetrieverError>>,
    },
}

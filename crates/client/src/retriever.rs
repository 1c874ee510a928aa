// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! The retriever state machine.
//!
//! Holds the current `(Metadata, DecoderRegistry)` snapshot and drives the
//! fetch-then-parse flow through the retry executor. On any failure the
//! fallback refreshes the snapshot against the offending block's own
//! metadata and the operation is retried. Snapshots are swapped atomically:
//! readers holding the previous `Arc` keep decoding against it, new
//! readers see the new one, and no partially-installed state is ever
//! observable.

use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;

use crate::decoder::DecoderRegistry;
use crate::error::RetrieverError;
use crate::metadata::Metadata;
use crate::parser::{self, DefaultExtrinsic, Event, Extrinsic, SignaturePart};
use crate::retry::{retry_with_fallback, RetryError, RetryPolicy};
use crate::rpc::ChainRpc;
use crate::storage;
use crate::types::BlockHash;

/// An immutable metadata + compiled-registry pair.
#[derive(Debug)]
pub struct Snapshot {
    pub metadata: Metadata,
    pub registry: DecoderRegistry,
}

impl Snapshot {
    /// Compile a snapshot from decoded metadata.
    pub fn compile(metadata: Metadata) -> Result<Self, RetrieverError> {
        let registry = DecoderRegistry::build(&metadata)?;
        Ok(Self { metadata, registry })
    }
}

/// Retrieves and decodes events and extrinsics from a chain.
pub struct Retriever<R> {
    rpc: R,
    snapshot: RwLock<Arc<Snapshot>>,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl<R: ChainRpc> Retriever<R> {
    /// Connect: fetch the latest metadata, compile the registry and install
    /// the initial snapshot. Failure propagates without retries.
    pub async fn new(rpc: R) -> Result<Self, RetrieverError> {
        Self::with_policy(rpc, RetryPolicy::default()).await
    }

    pub async fn with_policy(rpc: R, policy: RetryPolicy) -> Result<Self, RetrieverError> {
        let snapshot = fetch_snapshot(&rpc, None).await?;
        tracing::info!(
            events = snapshot.registry.event_count(),
            calls = snapshot.registry.call_count(),
            "installed initial metadata snapshot"
        );
        Ok(Self {
            rpc,
            snapshot: RwLock::new(Arc::new(snapshot)),
            policy,
            cancel: CancellationToken::new(),
        })
    }

    pub async fn with_config(
        rpc: R,
        config: &config::RetrieverConfig,
    ) -> Result<Self, RetrieverError> {
        Self::with_policy(rpc, RetryPolicy::from(&config.retry)).await
    }

    /// Build a retriever around already-decoded metadata, skipping the
    /// initial RPC fetch. Useful offline and in tests.
    pub fn from_parts(
        rpc: R,
        metadata: Metadata,
        policy: RetryPolicy,
    ) -> Result<Self, RetrieverError> {
        let snapshot = Snapshot::compile(metadata)?;
        Ok(Self {
            rpc,
            snapshot: RwLock::new(Arc::new(snapshot)),
            policy,
            cancel: CancellationToken::new(),
        })
    }

    /// Use an externally owned cancellation handle for all operations.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The injected RPC capability.
    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    /// The currently installed snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            // A poisoned lock only means a panic elsewhere; the data is an
            // immutable Arc and still safe to hand out.
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn install(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }

    /// Fetch metadata at `at` (or the latest when `None`), compile a fresh
    /// registry and atomically replace the snapshot.
    pub async fn refresh(&self, at: Option<BlockHash>) -> Result<(), RetrieverError> {
        tracing::warn!(?at, "refreshing metadata snapshot");
        let snapshot = fetch_snapshot(&self.rpc, at).await?;
        tracing::info!(
            events = snapshot.registry.event_count(),
            calls = snapshot.registry.call_count(),
            "installed refreshed metadata snapshot"
        );
        self.install(snapshot);
        Ok(())
    }

    /// Decoded events of the block at `at`, in on-wire order.
    pub async fn events_at(&self, at: BlockHash) -> Result<Vec<Event>, RetrieverError> {
        let rpc = &self.rpc;
        let key = storage::system_events_key();
        let key_ref = &key[..];

        let blob = retry_with_fallback(
            &self.policy,
            &self.cancel,
            || async move {
                rpc.state_get_storage(key_ref, Some(at))
                    .await
                    .map_err(RetrieverError::from)
            },
            || async move { self.refresh(Some(at)).await },
        )
        .await
        .map_err(|e| self.retrieval_error("events", at, e))?;

        let Some(blob) = blob else {
            tracing::debug!(at = %at, "events storage is empty");
            return Ok(Vec::new());
        };
        let blob_ref = &blob[..];

        let events = retry_with_fallback(
            &self.policy,
            &self.cancel,
            || async move {
                let snapshot = self.snapshot();
                parser::decode_events(&snapshot.registry, blob_ref).map_err(RetrieverError::from)
            },
            || async move { self.refresh(Some(at)).await },
        )
        .await
        .map_err(|e| self.retrieval_error("events", at, e))?;

        Ok(events)
    }

    /// Decoded extrinsics of the block at `at`, for the common-chain
    /// signature shape.
    pub async fn extrinsics_at(
        &self,
        at: BlockHash,
    ) -> Result<Vec<DefaultExtrinsic>, RetrieverError> {
        self.typed_extrinsics_at(at).await
    }

    /// Decoded extrinsics with chain-specific signer/signature/payment
    /// types.
    pub async fn typed_extrinsics_at<A, Sg, P>(
        &self,
        at: BlockHash,
    ) -> Result<Vec<Extrinsic<A, Sg, P>>, RetrieverError>
    where
        A: SignaturePart,
        Sg: SignaturePart,
        P: SignaturePart,
    {
        let rpc = &self.rpc;

        let extrinsics = retry_with_fallback(
            &self.policy,
            &self.cancel,
            || async move {
                let block = rpc.chain_get_block(Some(at)).await?;
                block.block.extrinsic_bytes().map_err(RetrieverError::from)
            },
            || async move { self.refresh(Some(at)).await },
        )
        .await
        .map_err(|e| self.retrieval_error("extrinsics", at, e))?;

        let extrinsics_ref = &extrinsics[..];

        let decoded = retry_with_fallback(
            &self.policy,
            &self.cancel,
            || async move {
                let snapshot = self.snapshot();
                parser::decode_extrinsics(&snapshot.registry, extrinsics_ref)
                    .map_err(RetrieverError::from)
            },
            || async move { self.refresh(Some(at)).await },
        )
        .await
        .map_err(|e| self.retrieval_error("extrinsics", at, e))?;

        Ok(decoded)
    }

    /// Hash of the block at `number` (or the head).
    pub async fn block_hash(&self, number: Option<u64>) -> Result<Option<BlockHash>, RetrieverError> {
        Ok(self.rpc.chain_get_block_hash(number).await?)
    }

    /// Header of the block at `at` (or the head).
    pub async fn header_at(
        &self,
        at: Option<BlockHash>,
    ) -> Result<crate::rpc::Header, RetrieverError> {
        Ok(self.rpc.chain_get_header(at).await?)
    }

    fn retrieval_error(
        &self,
        what: &'static str,
        at: BlockHash,
        error: RetryError<RetrieverError>,
    ) -> RetrieverError {
        match error {
            RetryError::Cancelled => RetrieverError::Cancelled,
            other => RetrieverError::Retrieval {
                what,
                at,
                source: Box::new(other),
            },
        }
    }
}

async fn fetch_snapshot<R: ChainRpc>(
    rpc: &R,
    at: Option<BlockHash>,
) -> Result<Snapshot, RetrieverError> {
    let bytes = rpc.state_get_metadata(at).await?;
    let metadata = Metadata::from_bytes(&bytes)?;
    Snapshot::compile(metadata)
}

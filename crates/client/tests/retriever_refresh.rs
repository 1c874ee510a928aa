//! Snapshot refresh behavior: decode failures trigger exactly one
//! metadata refresh and retry; persistent failures surface an aggregate.

mod common;

use common::{
    encode_events_blob, test_runtime_metadata, test_runtime_metadata_without_balances,
    EventRecordSpec, MockRpc, PhaseSpec,
};
use std::sync::atomic::Ordering;
use substrate_retriever::{BlockHash, DecodedValue, RetrieverError, Retriever, RetryPolicy};

fn transfer_record() -> EventRecordSpec {
    let mut fields = Vec::new();
    fields.extend_from_slice(&[0xaa; 32]);
    fields.extend_from_slice(&[0xbb; 32]);
    fields.extend_from_slice(&777u128.to_le_bytes());
    EventRecordSpec {
        phase: PhaseSpec::ApplyExtrinsic(0),
        pallet: 6,
        variant: 0,
        fields,
        topics: vec![],
    }
}

#[tokio::test]
async fn test_registry_miss_refreshes_exactly_once() {
    let rpc = MockRpc::new();
    // First metadata snapshot does not know the Balances pallet; the
    // refresh serves one that does.
    rpc.queue_metadata(test_runtime_metadata_without_balances());
    rpc.queue_metadata(test_runtime_metadata());
    rpc.queue_storage(Some(encode_events_blob(&[transfer_record()])));

    let retriever = Retriever::new(rpc).await.unwrap();
    let events = retriever
        .events_at(BlockHash::from([0x02; 32]))
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "Balances.Transfer");
    assert_eq!(
        events[0].fields.get("amount").and_then(DecodedValue::as_uint),
        Some(777)
    );

    // One init fetch plus exactly one refresh.
    let rpc = retriever.rpc();
    assert_eq!(rpc.metadata_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_persistent_miss_exhausts_and_aggregates() {
    let rpc = MockRpc::new();
    // Every snapshot lacks the Balances pallet, so the parse keeps failing.
    rpc.queue_metadata(test_runtime_metadata_without_balances());
    rpc.queue_storage(Some(encode_events_blob(&[transfer_record()])));

    let policy = RetryPolicy {
        max_attempts: 3,
        ..Default::default()
    };
    let retriever = Retriever::with_policy(rpc, policy).await.unwrap();
    let at = BlockHash::from([0x03; 32]);
    let result = retriever.events_at(at).await;

    match result {
        Err(RetrieverError::Retrieval {
            what,
            at: failed_at,
            source,
        }) => {
            assert_eq!(what, "events");
            assert_eq!(failed_at, at);
            assert_eq!(source.causes().len(), 3);
        }
        other => panic!("expected Retrieval error, got {other:?}"),
    }

    // Init fetch + one refresh between each of the three attempts.
    let rpc = retriever.rpc();
    assert_eq!(rpc.metadata_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_transport_failure_then_success_is_transparent() {
    let rpc = MockRpc::new();
    rpc.queue_metadata(test_runtime_metadata());
    rpc.queue_storage_error("connection reset by peer");
    rpc.queue_storage(Some(encode_events_blob(&[transfer_record()])));

    let retriever = Retriever::new(rpc).await.unwrap();
    let events = retriever
        .events_at(BlockHash::from([0x04; 32]))
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    let rpc = retriever.rpc();
    assert_eq!(rpc.storage_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cancellation_surfaces_distinct_kind() {
    let rpc = MockRpc::new();
    rpc.queue_metadata(test_runtime_metadata());
    rpc.queue_storage(Some(encode_events_blob(&[])));

    let retriever = Retriever::new(rpc).await.unwrap();
    retriever.cancellation_token().cancel();

    let result = retriever.events_at(BlockHash::from([0x05; 32])).await;
    assert!(matches!(result, Err(RetrieverError::Cancelled)));
}

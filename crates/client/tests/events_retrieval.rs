//! End-to-end event retrieval against a mock node: metadata blob in,
//! decoded, named events out.

mod common;

use common::{
    encode_events_blob, test_runtime_metadata, EventRecordSpec, MockRpc, PhaseSpec,
};
use substrate_retriever::{BlockHash, DecodedValue, Phase, Retriever};

fn transfer_fields(from: [u8; 32], to: [u8; 32], amount: u128) -> Vec<u8> {
    let mut fields = Vec::new();
    fields.extend_from_slice(&from);
    fields.extend_from_slice(&to);
    fields.extend_from_slice(&amount.to_le_bytes());
    fields
}

fn extrinsic_success_fields(weight: u64, class: u8, pays_fee: bool) -> Vec<u8> {
    let mut fields = Vec::new();
    fields.extend_from_slice(&weight.to_le_bytes());
    fields.push(class);
    fields.push(pays_fee as u8);
    fields
}

#[tokio::test]
async fn test_two_event_stream_decodes_in_order() {
    let rpc = MockRpc::new();
    rpc.queue_metadata(test_runtime_metadata());
    rpc.queue_storage(Some(encode_events_blob(&[
        EventRecordSpec {
            phase: PhaseSpec::ApplyExtrinsic(7),
            pallet: 6,
            variant: 0,
            fields: transfer_fields([0xaa; 32], [0xbb; 32], 12345),
            topics: vec![],
        },
        EventRecordSpec {
            phase: PhaseSpec::Finalization,
            pallet: 0,
            variant: 0,
            fields: extrinsic_success_fields(1_000_000, 0, true),
            topics: vec![],
        },
    ])));

    let retriever = Retriever::new(rpc).await.unwrap();
    let events = retriever
        .events_at(BlockHash::from([0x01; 32]))
        .await
        .unwrap();

    assert_eq!(events.len(), 2);

    let transfer = &events[0];
    assert_eq!(transfer.name, "Balances.Transfer");
    assert_eq!(transfer.pallet, "Balances");
    assert_eq!(transfer.variant, "Transfer");
    assert_eq!(transfer.phase, Phase::ApplyExtrinsic(7));
    assert!(transfer.topics.is_empty());
    assert_eq!(
        transfer.fields.get("amount").and_then(DecodedValue::as_uint),
        Some(12345)
    );
    assert_eq!(
        transfer.fields.get("from").and_then(DecodedValue::as_bytes),
        Some(&[0xaa; 32][..])
    );
    assert_eq!(
        transfer.fields.get("to").and_then(DecodedValue::as_bytes),
        Some(&[0xbb; 32][..])
    );

    let success = &events[1];
    assert_eq!(success.name, "System.ExtrinsicSuccess");
    assert_eq!(success.phase, Phase::Finalization);
    let info = success.fields.get("dispatch_info").unwrap();
    assert_eq!(info.get("weight").and_then(DecodedValue::as_uint), Some(1_000_000));
    assert_eq!(info.get("pays_fee"), Some(&DecodedValue::Bool(true)));
}

#[tokio::test]
async fn test_event_json_rendering() {
    let rpc = MockRpc::new();
    rpc.queue_metadata(test_runtime_metadata());
    rpc.queue_storage(Some(encode_events_blob(&[EventRecordSpec {
        phase: PhaseSpec::Initialization,
        pallet: 6,
        variant: 0,
        fields: transfer_fields([0x11; 32], [0x22; 32], u128::MAX),
        topics: vec![[0x42; 32]],
    }])));

    let retriever = Retriever::new(rpc).await.unwrap();
    let events = retriever
        .events_at(BlockHash::from([0x01; 32]))
        .await
        .unwrap();

    let rendered = serde_json::to_value(&events[0].fields).unwrap();
    assert_eq!(
        rendered["from"],
        serde_json::json!(format!("0x{}", "11".repeat(32)))
    );
    // 128-bit amounts render as decimal strings.
    assert_eq!(
        rendered["amount"],
        serde_json::json!("340282366920938463463374607431768211455")
    );
    assert_eq!(events[0].topics.len(), 1);
}

#[tokio::test]
async fn test_absent_storage_is_an_empty_block() {
    let rpc = MockRpc::new();
    rpc.queue_metadata(test_runtime_metadata());
    rpc.queue_storage(None);

    let retriever = Retriever::new(rpc).await.unwrap();
    let events = retriever
        .events_at(BlockHash::from([0x01; 32]))
        .await
        .unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_zero_count_blob_is_empty() {
    let rpc = MockRpc::new();
    rpc.queue_metadata(test_runtime_metadata());
    rpc.queue_storage(Some(encode_events_blob(&[])));

    let retriever = Retriever::new(rpc).await.unwrap();
    let events = retriever
        .events_at(BlockHash::from([0x01; 32]))
        .await
        .unwrap();
    assert!(events.is_empty());
}

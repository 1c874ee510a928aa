//! Recursive type graphs through the whole pipeline: metadata blob decode,
//! registry compilation with cycle breaking, and value decoding.

mod common;

use common::{
    encode_events_blob, encode_metadata, EventRecordSpec, FieldSpec, MockRpc, PalletSpec,
    PhaseSpec, TypeDefSpec, TypeSpec, VariantSpec,
};
use substrate_retriever::codec::{compact_bytes, Output};
use substrate_retriever::{BlockHash, Retriever};

/// A runtime with `X = A(u32) | B(Vec<X>)` in an event field.
fn recursive_runtime_metadata() -> Vec<u8> {
    let types = vec![
        TypeSpec {
            id: 0,
            path: vec![],
            def: TypeDefSpec::Primitive(5), // u32
        },
        TypeSpec {
            id: 1,
            path: vec![],
            def: TypeDefSpec::Sequence(2),
        },
        TypeSpec {
            id: 2,
            path: vec!["xcm", "Message"],
            def: TypeDefSpec::Variant(vec![
                VariantSpec {
                    name: "A",
                    index: 0,
                    fields: vec![FieldSpec::named("field_0", 0)],
                },
                VariantSpec {
                    name: "B",
                    index: 1,
                    fields: vec![FieldSpec::named("field_0", 1)],
                },
            ]),
        },
        TypeSpec {
            id: 3,
            path: vec!["pallet_xcm", "pallet", "Event"],
            def: TypeDefSpec::Variant(vec![VariantSpec {
                name: "Sent",
                index: 0,
                fields: vec![FieldSpec::named("message", 2)],
            }]),
        },
    ];

    let pallets = vec![PalletSpec {
        name: "XcmPallet",
        index: 30,
        event_type: Some(3),
        call_type: None,
    }];

    encode_metadata(&types, &pallets)
}

/// Wire bytes of `B([A(1), B([A(2)])])`.
fn nested_message() -> Vec<u8> {
    let mut out = Output::new();
    out.push_byte(1); // B
    out.write(&compact_bytes(2)); // two items
    out.push_byte(0); // A
    out.write(&1u32.to_le_bytes());
    out.push_byte(1); // B
    out.write(&compact_bytes(1)); // one item
    out.push_byte(0); // A
    out.write(&2u32.to_le_bytes());
    out.into_bytes()
}

#[tokio::test]
async fn test_recursive_value_decodes_to_nested_tree() {
    let rpc = MockRpc::new();
    rpc.queue_metadata(recursive_runtime_metadata());
    rpc.queue_storage(Some(encode_events_blob(&[EventRecordSpec {
        phase: PhaseSpec::Initialization,
        pallet: 30,
        variant: 0,
        fields: nested_message(),
        topics: vec![],
    }])));

    let retriever = Retriever::new(rpc).await.unwrap();
    let events = retriever
        .events_at(BlockHash::from([0x01; 32]))
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "XcmPallet.Sent");

    let message = events[0].fields.get("message").unwrap();
    assert_eq!(
        serde_json::to_value(message).unwrap(),
        serde_json::json!({
            "B": {"field_0": [
                {"A": {"field_0": 1}},
                {"B": {"field_0": [{"A": {"field_0": 2}}]}}
            ]}
        })
    );
}

#[tokio::test]
async fn test_deeply_nested_recursive_value() {
    // B(B(B(A(9)))) with single-element lists at each level.
    let mut bytes = Vec::new();
    for _ in 0..3 {
        bytes.push(1); // B
        bytes.extend_from_slice(&compact_bytes(1));
    }
    bytes.push(0); // A
    bytes.extend_from_slice(&9u32.to_le_bytes());

    let rpc = MockRpc::new();
    rpc.queue_metadata(recursive_runtime_metadata());
    rpc.queue_storage(Some(encode_events_blob(&[EventRecordSpec {
        phase: PhaseSpec::Finalization,
        pallet: 30,
        variant: 0,
        fields: bytes,
        topics: vec![],
    }])));

    let retriever = Retriever::new(rpc).await.unwrap();
    let events = retriever
        .events_at(BlockHash::from([0x01; 32]))
        .await
        .unwrap();

    let mut value = events[0].fields.get("message").unwrap();
    for _ in 0..3 {
        assert_eq!(value.variant_name(), Some("B"));
        let inner = match value {
            substrate_retriever::DecodedValue::Variant {
                fields: Some(fields),
                ..
            } => fields.get("field_0").unwrap().as_sequence().unwrap(),
            other => panic!("expected variant with fields, got {other:?}"),
        };
        assert_eq!(inner.len(), 1);
        value = &inner[0];
    }
    assert_eq!(value.variant_name(), Some("A"));
}

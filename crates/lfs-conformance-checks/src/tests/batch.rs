// crates/lfs-conformance-checks/src/tests/batch.rs
// ============================================================================
// Module: Batch Wire Tests
// Description: Unit tests for batch request encoding and response decoding.
// Purpose: Pin the JSON shapes exchanged with the batch endpoint.
// Dependencies: lfs-conformance-checks batch module, serde_json
// ============================================================================

use lfs_conformance_core::ContentId;
use serde_json::json;

use crate::batch::BatchRequest;
use crate::batch::BatchResponse;
use crate::batch::Operation;

#[test]
fn request_uses_basic_transfer_and_zero_sizes() {
    let first = ContentId::new("aa");
    let second = ContentId::new("bb");
    let request = BatchRequest::new(Operation::Download, &[&first, &second]);
    let value = serde_json::to_value(&request).expect("encode");
    assert_eq!(
        value,
        json!({
            "operation": "download",
            "transfers": ["basic"],
            "objects": [
                {"oid": "aa", "size": 0},
                {"oid": "bb", "size": 0}
            ]
        })
    );
}

#[test]
fn upload_operation_is_lowercase() {
    let oid = ContentId::new("cc");
    let request = BatchRequest::new(Operation::Upload, &[&oid]);
    let value = serde_json::to_value(&request).expect("encode");
    assert_eq!(value["operation"], "upload");
}

#[test]
fn response_tolerates_unknown_fields_and_absent_actions() {
    let body = json!({
        "transfer": "basic",
        "hash_algo": "sha256",
        "objects": [
            {
                "oid": "aa",
                "size": 12,
                "authenticated": true,
                "actions": {
                    "download": {"href": "https://cdn.test/aa", "expires_in": 3600}
                }
            },
            {
                "oid": "bb",
                "error": {"code": 404, "message": "Object does not exist"}
            }
        ]
    });
    let response: BatchResponse = serde_json::from_value(body).expect("decode");
    assert_eq!(response.transfer.as_deref(), Some("basic"));

    let present = response.object(&ContentId::new("aa")).expect("aa");
    assert!(present.has_action("download"));
    assert!(!present.has_action("upload"));
    assert_eq!(present.size, Some(12));
    assert_eq!(present.actions["download"].href, "https://cdn.test/aa");

    let missing = response.object(&ContentId::new("bb")).expect("bb");
    assert!(missing.actions.is_empty());
    assert_eq!(missing.error.as_ref().map(|error| error.code), Some(404));

    assert!(response.object(&ContentId::new("cc")).is_none());
}

#[test]
fn response_without_objects_decodes_empty() {
    let response: BatchResponse = serde_json::from_str("{}").expect("decode");
    assert!(response.objects.is_empty());
}

use serde_json::json;

use crate::offline::error::OfflineSyncError;
use crate::offline::remote::{HttpMethod, MutationRequest};
use crate::offline::types::{OfflineData, Operation};

#[test]
fn test_id_format_and_collection() {
    let entry = OfflineData::new("line_items", Operation::Create, json!({"qty": 2}), 1234);

    let (prefix, suffix) = entry.id.rsplit_once('_').expect("suffix");
    assert_eq!(prefix, "line_items_1234");
    assert_eq!(suffix.len(), 9);
    assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    assert_eq!(entry.collection().expect("collection"), "line_items");
    assert_eq!(entry.retry_count, 0);
}

#[test]
fn test_ids_are_unique() {
    let a = OfflineData::new("orders", Operation::Create, json!({}), 1);
    let b = OfflineData::new("orders", Operation::Create, json!({}), 1);
    assert_ne!(a.id, b.id);
}

#[test]
fn test_wire_shape() {
    let mut entry = OfflineData::new("orders", Operation::Update, json!({"id": 7}), 99);
    entry.id = "orders_99_abcdefghi".to_string();
    entry.retry_count = 2;

    assert_eq!(
        serde_json::to_value(&entry).expect("serialize"),
        json!({"id": "orders_99_abcdefghi", "type": "update", "data": {"id": 7}, "timestamp": 99, "retryCount": 2})
    );
}

#[test]
fn test_operation_parsing() {
    assert_eq!("DELETE".parse::<Operation>().expect("parse"), Operation::Delete);
    assert!(matches!(
        "upsert".parse::<Operation>(),
        Err(OfflineSyncError::UnknownOperation(_))
    ));
}

#[test]
fn test_request_mapping() {
    let create = OfflineData::new("orders", Operation::Create, json!({"total": 12.5}), 1);
    let request = MutationRequest::for_entry(&create).expect("create");
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.path(), "/api/orders");
    assert_eq!(request.body, Some(json!({"total": 12.5})));

    let update = OfflineData::new("orders", Operation::Update, json!({"id": "o-1", "total": 3}), 1);
    assert_eq!(MutationRequest::for_entry(&update).expect("update").to_string(), "PUT /api/orders/o-1");

    let delete = OfflineData::new("staff_shifts", Operation::Delete, json!({"id": 42}), 1);
    let request = MutationRequest::for_entry(&delete).expect("delete");
    assert_eq!(request.to_string(), "DELETE /api/staff_shifts/42");
    assert_eq!(request.body, None);
}

#[test]
fn test_payload_id_is_encoded_as_one_segment() {
    let update = OfflineData::new("orders", Operation::Update, json!({"id": "a/b?c#d"}), 1);
    let request = MutationRequest::for_entry(&update).expect("update");

    let url = request.url("http://localhost:3000/").expect("url");
    assert_eq!(url.as_str(), "http://localhost:3000/api/orders/a%2Fb%3Fc%23d");
    assert_eq!(url.query(), None);
    assert_eq!(url.fragment(), None);

    let nested = request.url("https://example.com/v1").expect("url");
    assert_eq!(nested.path(), "/v1/api/orders/a%2Fb%3Fc%23d");

    assert!(matches!(
        request.url("not a url"),
        Err(OfflineSyncError::InvalidBaseUrl { .. })
    ));
}

#[test]
fn test_update_without_payload_id_is_rejected() {
    let update = OfflineData::new("orders", Operation::Update, json!({"total": 3}), 1);
    assert!(matches!(
        MutationRequest::for_entry(&update),
        Err(OfflineSyncError::MissingPayloadId { .. })
    ));

    let mut malformed = OfflineData::new("orders", Operation::Create, json!({}), 1);
    malformed.id = "orders".to_string();
    assert!(matches!(
        MutationRequest::for_entry(&malformed),
        Err(OfflineSyncError::MalformedEntryId(_))
    ));
}

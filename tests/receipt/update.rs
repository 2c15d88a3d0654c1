//! Expiration extraction and persisted-max maintenance.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;

use storekit_sdk::receipt::{ReceiptUpdateService, VerifyReceiptResponse};
use storekit_sdk::storage::{keys, MemoryStorage, StorageAdapter};
use storekit_sdk::StoreKitErrorCode;

use crate::common::*;

fn parse_response(value: serde_json::Value) -> VerifyReceiptResponse {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_future_entries_retained_past_and_unparseable_skipped() {
    let storage = Arc::new(MemoryStorage::new());
    let service = ReceiptUpdateService::new(storage.clone());

    let response = parse_response(success_response(vec![
        receipt_entry("com.example.pro", FUTURE_DATE),
        receipt_entry("com.example.basic", PAST_DATE),
        receipt_entry("com.example.family", "never"),
        json!({"product_id": "com.example.missing_date"}),
        json!({"expires_date": FUTURE_DATE}),
    ]));

    let expirations = service.update_receipt_info(&response).unwrap();

    assert_eq!(expirations.len(), 1);
    let expected = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(expirations.get("com.example.pro"), Some(&expected));
}

#[test]
fn test_extraction_is_idempotent() {
    let storage = Arc::new(MemoryStorage::new());
    let service = ReceiptUpdateService::new(storage.clone());

    let response = parse_response(success_response(vec![
        receipt_entry("com.example.pro", FUTURE_DATE),
        receipt_entry("com.example.basic", "2998-06-15 12:00:00 Etc/GMT"),
    ]));

    let first = service.update_receipt_info(&response).unwrap();
    let second = service.update_receipt_info(&response).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        storage.get(keys::MAX_EXPIRES_DATE),
        Some("2999-01-01T00:00:00Z".to_string())
    );
}

#[test]
fn test_persisted_max_equals_max_of_retained_entries() {
    let storage = Arc::new(MemoryStorage::new());
    let service = ReceiptUpdateService::new(storage.clone());

    let response = parse_response(success_response(vec![
        receipt_entry("com.example.basic", "2998-01-01 00:00:00 UTC"),
        receipt_entry("com.example.pro", FUTURE_DATE),
        // Past entry must not contribute to the max
        receipt_entry("com.example.family", PAST_DATE),
    ]));

    let expirations = service.update_receipt_info(&response).unwrap();

    let max = expirations.values().max().copied().unwrap();
    assert_eq!(max, Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(
        storage.get(keys::MAX_EXPIRES_DATE),
        Some("2999-01-01T00:00:00Z".to_string())
    );
}

#[test]
fn test_single_future_entry_scenario() {
    let storage = Arc::new(MemoryStorage::new());
    let service = ReceiptUpdateService::new(storage.clone());

    let response = parse_response(json!({
        "status": 0,
        "latest_receipt_info": [
            {"product_id": "P1", "expires_date": "2999-01-01 00:00:00 UTC"}
        ],
    }));

    let expirations = service.update_receipt_info(&response).unwrap();

    let expected = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(expirations.len(), 1);
    assert_eq!(expirations.get("P1"), Some(&expected));
    assert_eq!(
        storage.get(keys::MAX_EXPIRES_DATE),
        Some("2999-01-01T00:00:00Z".to_string())
    );
}

#[test]
fn test_empty_array_clears_persisted_max() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(keys::MAX_EXPIRES_DATE, "2999-01-01T00:00:00Z");

    let service = ReceiptUpdateService::new(storage.clone());
    let response = parse_response(json!({"status": 0, "latest_receipt_info": []}));

    let expirations = service.update_receipt_info(&response).unwrap();

    assert!(expirations.is_empty());
    assert_eq!(storage.get(keys::MAX_EXPIRES_DATE), None);
}

#[test]
fn test_missing_array_is_hard_failure_and_leaves_storage_untouched() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(keys::MAX_EXPIRES_DATE, "2999-01-01T00:00:00Z");
    storage.set(&keys::expires_date("com.example.pro"), "2999-01-01T00:00:00Z");

    let service = ReceiptUpdateService::new(storage.clone());
    let response = parse_response(json!({"status": 21003}));

    let err = service.update_receipt_info(&response).unwrap_err();

    assert_eq!(err.code, StoreKitErrorCode::InvalidResponse);
    assert_eq!(
        storage.get(keys::MAX_EXPIRES_DATE),
        Some("2999-01-01T00:00:00Z".to_string())
    );
    assert_eq!(
        storage.get(&keys::expires_date("com.example.pro")),
        Some("2999-01-01T00:00:00Z".to_string())
    );
}

#[test]
fn test_duplicate_product_id_last_entry_wins() {
    let storage = Arc::new(MemoryStorage::new());
    let service = ReceiptUpdateService::new(storage);

    let response = parse_response(success_response(vec![
        receipt_entry("com.example.pro", "2998-01-01 00:00:00 UTC"),
        receipt_entry("com.example.pro", FUTURE_DATE),
    ]));

    let expirations = service.update_receipt_info(&response).unwrap();

    assert_eq!(expirations.len(), 1);
    assert_eq!(
        expirations.get("com.example.pro"),
        Some(&Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap())
    );
}

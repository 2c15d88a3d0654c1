//! Receipt acquisition: local read, bounded refresh, caching.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use storekit_sdk::receipt::ReceiptFetchService;
use storekit_sdk::StoreKitErrorCode;

use crate::common::*;

#[tokio::test]
async fn test_local_receipt_returned_without_refresh() {
    let provider = Arc::new(MockReceiptProvider::with_receipt(b"signed-receipt".to_vec()));
    let mut service = ReceiptFetchService::new(provider.clone());

    let blob = service.fetch_receipt().await.unwrap();

    assert_eq!(blob, b"signed-receipt");
    assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    assert_eq!(service.receipt_data(), Some(&b"signed-receipt"[..]));
}

#[tokio::test]
async fn test_receipt_appearing_after_refreshes_is_returned() {
    let provider = Arc::new(MockReceiptProvider::installs_after(2, b"refreshed".to_vec()));
    let mut service = ReceiptFetchService::new(provider.clone());

    let blob = service.fetch_receipt().await.unwrap();

    assert_eq!(blob, b"refreshed");
    assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_fetch_fails_after_four_refresh_attempts() {
    let provider = Arc::new(MockReceiptProvider::empty());
    let mut service = ReceiptFetchService::new(provider.clone());

    let err = service.fetch_receipt().await.unwrap_err();

    assert_eq!(err.code, StoreKitErrorCode::ReceiptFetchFailed);
    assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 4);
    assert_eq!(service.receipt_data(), None);
}

#[tokio::test]
async fn test_failed_refreshes_count_against_the_same_ceiling() {
    let provider = Arc::new(MockReceiptProvider::failing());
    let mut service = ReceiptFetchService::new(provider.clone());

    let err = service.fetch_receipt().await.unwrap_err();

    assert_eq!(err.code, StoreKitErrorCode::ReceiptFetchFailed);
    assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_attempt_counter_resets_between_calls() {
    let provider = Arc::new(MockReceiptProvider::installs_after(3, b"late".to_vec()));
    let mut service = ReceiptFetchService::new(provider.clone());

    assert!(service.fetch_receipt().await.is_ok());
    // A second run starts over and succeeds immediately from the local read
    assert!(service.fetch_receipt().await.is_ok());
    assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 3);
}

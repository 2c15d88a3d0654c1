//! Platform purchase API seam
//!
//! The platform's delegate/observer callbacks are exposed here as single-fire
//! async operations: each call resolves exactly once with success or failure.
//! Host applications implement these traits over the native purchase API (or
//! over mocks in tests); the SDK never talks to the platform directly.

use async_trait::async_trait;

use crate::error::Result;

/// A product handle returned by the platform store, carrying localized
/// price metadata the catalog itself does not know.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreProduct {
    /// Platform product identifier
    pub product_id: String,
    /// Localized display title
    pub localized_title: String,
    /// Localized description
    pub localized_description: String,
    /// Formatted, locale-aware price string (e.g. "$4.99")
    pub price: String,
    /// ISO 4217 currency code
    pub currency: String,
}

/// Terminal state of a completed platform transaction.
///
/// Failed and cancelled transactions surface as errors from the single-fire
/// future instead of as states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// A new purchase completed
    Purchased,
    /// A prior purchase was restored
    Restored,
}

/// A completed platform transaction
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Identifier of the purchased product
    pub product_id: String,
    /// How the transaction completed
    pub state: TransactionState,
}

/// Access to the locally stored signed receipt and its refresh mechanism.
#[async_trait]
pub trait ReceiptProvider: Send + Sync {
    /// Returns the locally stored signed receipt blob, if one exists.
    fn local_receipt(&self) -> Option<Vec<u8>>;

    /// Asks the platform to refresh the local receipt.
    ///
    /// Resolves once the platform signals completion; the caller re-reads
    /// [`local_receipt`](Self::local_receipt) afterwards.
    async fn refresh_receipt(&self) -> Result<()>;
}

/// Product query, payment and restore operations of the platform store.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Queries the store for product handles matching the given identifiers.
    ///
    /// Identifiers unknown to the store are silently absent from the result.
    async fn query_products(&self, product_ids: &[String]) -> Result<Vec<StoreProduct>>;

    /// Starts a payment for the given product and resolves with the
    /// completed transaction.
    async fn purchase(&self, product_id: &str) -> Result<Transaction>;

    /// Restores previously completed transactions.
    async fn restore(&self) -> Result<Vec<Transaction>>;
}

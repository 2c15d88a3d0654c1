//! In-app purchase SDK: product catalog loading, purchase and restore,
//! and receipt validation with per-product entitlement tracking.
//!
//! The platform purchase API and durable storage are reached through the
//! traits in [`platform`] and [`storage`]. Everything else lives in this
//! crate: receipt acquisition with bounded refresh, remote verification
//! with sandbox fallback, and expiration extraction and aggregation.
//!
//! Entry point is [`PurchaseService`]: construct it with a product
//! catalog, a [`ServiceConfig`] and the platform collaborators, then drive
//! it with `load_products`, `purchase`, `restore` and `fetch_receipt`.

pub mod config;
pub mod error;
pub mod models;
pub mod platform;
pub mod receipt;
pub mod service;
pub mod storage;

pub use config::ServiceConfig;
pub use error::{Result, StoreKitError, StoreKitErrorCode};
pub use models::{ExpirationMap, Product, Purchase, PurchaseListExt, ReceiptInfo, ValidationMode};
pub use platform::{ProductStore, ReceiptProvider, StoreProduct, Transaction, TransactionState};
pub use service::{PurchaseCallback, PurchaseService};
pub use storage::{MemoryStorage, StorageAdapter};

#[cfg(feature = "native-storage")]
pub use storage::FileStorage;

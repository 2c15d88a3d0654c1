//! Purchase service: catalog loading, purchase/restore, receipt cycle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as AsyncMutex;

use crate::config::ServiceConfig;
use crate::error::{Result, StoreKitError, StoreKitErrorCode};
use crate::models::{ExpirationMap, Product, Purchase, PurchaseListExt, ReceiptInfo, ValidationMode};
use crate::platform::{ProductStore, ReceiptProvider, StoreProduct};
use crate::receipt::ReceiptRequest;
use crate::storage::{self, keys, StorageAdapter};

/// Completion callback carrying the affected purchase list.
pub type PurchaseCallback = Box<dyn Fn(Result<Vec<Purchase>>) + Send + Sync>;

#[derive(Default)]
struct Callbacks {
    did_update_products: Option<PurchaseCallback>,
    did_complete_purchase: Option<PurchaseCallback>,
    did_restore_purchases: Option<PurchaseCallback>,
}

#[derive(Clone, Copy)]
enum CallbackSlot {
    ProductsUpdated,
    PurchaseCompleted,
    PurchasesRestored,
}

/// Manages in-app purchases: loading products, handling purchases and
/// restores, and deriving entitlement state from validated receipts.
///
/// All async entry points also report through the callbacks registered via
/// [`setup_callbacks`](Self::setup_callbacks), so UI layers can observe
/// completions without owning the futures.
pub struct PurchaseService {
    catalog: Vec<Product>,
    config: ServiceConfig,
    store: Arc<dyn ProductStore>,
    storage: Arc<dyn StorageAdapter>,
    receipt_request: AsyncMutex<ReceiptRequest>,
    purchases: Mutex<Vec<Purchase>>,
    callbacks: Mutex<Callbacks>,
    /// Concurrent purchase/restore attempts are rejected while set.
    transaction_in_flight: AtomicBool,
}

impl PurchaseService {
    /// Create a service over the given catalog and platform collaborators.
    pub fn new(
        catalog: Vec<Product>,
        config: ServiceConfig,
        store: Arc<dyn ProductStore>,
        receipt_provider: Arc<dyn ReceiptProvider>,
        storage: Arc<dyn StorageAdapter>,
    ) -> Self {
        let receipt_request = ReceiptRequest::new(receipt_provider, storage.clone(), &config);
        Self {
            catalog,
            config,
            store,
            storage,
            receipt_request: AsyncMutex::new(receipt_request),
            purchases: Mutex::new(Vec::new()),
            callbacks: Mutex::new(Callbacks::default()),
            transaction_in_flight: AtomicBool::new(false),
        }
    }

    /// Register completion callbacks for product-list updates, purchases
    /// and restores. Passing `None` leaves a slot unset.
    pub fn setup_callbacks(
        &self,
        did_update_products: Option<PurchaseCallback>,
        did_complete_purchase: Option<PurchaseCallback>,
        did_restore_purchases: Option<PurchaseCallback>,
    ) {
        let mut callbacks = self.lock_callbacks();
        callbacks.did_update_products = did_update_products;
        callbacks.did_complete_purchase = did_complete_purchase;
        callbacks.did_restore_purchases = did_restore_purchases;
    }

    /// Load the platform product handles for the configured catalog and
    /// rebuild the purchase list.
    ///
    /// Handles without a catalog entry are dropped; each purchase restores
    /// its last persisted expiration date. The result is also delivered to
    /// the products-updated callback.
    pub async fn load_products(&self) -> Result<Vec<Purchase>> {
        let product_ids: Vec<String> = self
            .catalog
            .iter()
            .map(|product| product.product_id.clone())
            .collect();
        tracing::debug!(count = product_ids.len(), "loading products");

        let result = match self.store.query_products(&product_ids).await {
            Ok(store_products) => Ok(self.merge_loaded_products(store_products)),
            Err(err) => {
                tracing::warn!(%err, "product query failed");
                Err(err)
            }
        };

        self.notify(CallbackSlot::ProductsUpdated, &result);
        result
    }

    /// Fetch and validate the receipt, then merge the extracted expiration
    /// info into the purchase list.
    ///
    /// Purchases without a matching entry keep their prior expiration
    /// state; a failure at any pipeline stage leaves the list untouched.
    pub async fn fetch_receipt(&self, mode: ValidationMode) -> Result<ReceiptInfo> {
        let info = self.receipt_request.lock().await.start(mode).await?;
        self.apply_expirations(&info.expirations);
        Ok(info)
    }

    /// Purchase the given product.
    ///
    /// On platform success the receipt cycle runs with the configured
    /// validation mode before the currently active purchases are reported.
    /// A concurrent purchase or restore is rejected with
    /// [`StoreKitErrorCode::RequestInProgress`].
    pub async fn purchase(&self, product_id: &str) -> Result<Vec<Purchase>> {
        self.begin_transaction()?;
        tracing::debug!(product_id, "purchase started");

        let result = self.purchase_inner(product_id).await;
        self.transaction_in_flight.store(false, Ordering::SeqCst);

        self.notify(CallbackSlot::PurchaseCompleted, &result);
        result
    }

    /// Restore previously purchased products.
    ///
    /// On platform success the receipt cycle runs with the configured
    /// validation mode before the full purchase list is reported.
    pub async fn restore(&self) -> Result<Vec<Purchase>> {
        self.begin_transaction()?;
        tracing::debug!("restore started");

        let result = self.restore_inner().await;
        self.transaction_in_flight.store(false, Ordering::SeqCst);

        self.notify(CallbackSlot::PurchasesRestored, &result);
        result
    }

    /// Snapshot of the current purchase list.
    pub fn purchases(&self) -> Vec<Purchase> {
        self.lock_purchases().clone()
    }

    /// The raw receipt data from the most recent successful fetch.
    pub async fn receipt_data(&self) -> Option<Vec<u8>> {
        self.receipt_request
            .lock()
            .await
            .receipt_data()
            .map(<[u8]>::to_vec)
    }

    /// The persisted maximum expiration date across all entitlements.
    pub fn receipt_max_expires_date(&self) -> Option<DateTime<Utc>> {
        storage::get_date(self.storage.as_ref(), keys::MAX_EXPIRES_DATE)
    }

    /// Whether any entitlement is still valid according to the persisted
    /// maximum expiration date.
    pub fn purchase_available(&self) -> bool {
        match self.receipt_max_expires_date() {
            Some(date) => date > Utc::now(),
            None => false,
        }
    }

    fn merge_loaded_products(&self, store_products: Vec<StoreProduct>) -> Vec<Purchase> {
        let mut purchases: Vec<Purchase> = Vec::new();
        for store_product in store_products {
            let Some(product) = self
                .catalog
                .iter()
                .find(|product| product.product_id == store_product.product_id)
            else {
                tracing::warn!(
                    product_id = %store_product.product_id,
                    "store returned a product missing from the catalog"
                );
                continue;
            };
            purchases.push(Purchase::restored_from(
                product.clone(),
                store_product,
                self.storage.as_ref(),
            ));
        }
        purchases.sort_default();

        *self.lock_purchases() = purchases.clone();
        purchases
    }

    /// Merge extracted expiration info into the purchase list and re-sort.
    ///
    /// Absence of an entry means "no new information", not "expired": such
    /// purchases keep whatever expiration they already held.
    fn apply_expirations(&self, expirations: &ExpirationMap) {
        let mut purchases = self.lock_purchases();
        for (product_id, expires_date) in expirations {
            if let Some(purchase) = purchases
                .iter_mut()
                .find(|purchase| &purchase.product.product_id == product_id)
            {
                purchase.save_expires_date(Some(*expires_date), self.storage.as_ref());
            }
        }
        purchases.sort_default();
    }

    async fn purchase_inner(&self, product_id: &str) -> Result<Vec<Purchase>> {
        let transaction = self.store.purchase(product_id).await?;
        tracing::debug!(
            product_id = %transaction.product_id,
            state = ?transaction.state,
            "purchase transaction completed"
        );

        self.fetch_receipt(self.config.validation_mode).await?;
        Ok(self.lock_purchases().active_products())
    }

    async fn restore_inner(&self) -> Result<Vec<Purchase>> {
        let transactions = self.store.restore().await?;
        tracing::debug!(count = transactions.len(), "restore completed");

        self.fetch_receipt(self.config.validation_mode).await?;
        Ok(self.purchases())
    }

    fn begin_transaction(&self) -> Result<()> {
        if self.transaction_in_flight.swap(true, Ordering::SeqCst) {
            return Err(StoreKitError::new(
                StoreKitErrorCode::RequestInProgress,
                "a purchase or restore is already running",
            ));
        }
        Ok(())
    }

    fn notify(&self, slot: CallbackSlot, result: &Result<Vec<Purchase>>) {
        let callbacks = self.lock_callbacks();
        let callback = match slot {
            CallbackSlot::ProductsUpdated => callbacks.did_update_products.as_ref(),
            CallbackSlot::PurchaseCompleted => callbacks.did_complete_purchase.as_ref(),
            CallbackSlot::PurchasesRestored => callbacks.did_restore_purchases.as_ref(),
        };
        if let Some(callback) = callback {
            callback(result.clone());
        }
    }

    fn lock_purchases(&self) -> std::sync::MutexGuard<'_, Vec<Purchase>> {
        self.purchases.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_callbacks(&self) -> std::sync::MutexGuard<'_, Callbacks> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

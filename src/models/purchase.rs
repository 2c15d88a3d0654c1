use chrono::{DateTime, Utc};

use crate::models::Product;
use crate::platform::StoreProduct;
use crate::storage::{self, keys, StorageAdapter};

/// A catalog product paired with its platform store handle, carrying the
/// last-known expiration date for the entitlement it represents.
///
/// Created when the loaded store products are merged with the catalog and
/// held for the session lifetime. Identity is the product identifier only.
#[derive(Debug, Clone)]
pub struct Purchase {
    /// The catalog product
    pub product: Product,
    /// The platform store handle with price metadata
    pub store_product: StoreProduct,
    expires_date: Option<DateTime<Utc>>,
}

impl Purchase {
    pub fn new(product: Product, store_product: StoreProduct) -> Self {
        Self {
            product,
            store_product,
            expires_date: None,
        }
    }

    /// Create a purchase, restoring its expiration date from storage.
    pub(crate) fn restored_from(
        product: Product,
        store_product: StoreProduct,
        storage: &dyn StorageAdapter,
    ) -> Self {
        let expires_date =
            storage::get_date(storage, &keys::expires_date(&product.product_id));
        Self {
            product,
            store_product,
            expires_date,
        }
    }

    /// The last-known expiration date of this entitlement, if any.
    pub fn expires_date(&self) -> Option<DateTime<Utc>> {
        self.expires_date
    }

    /// Whether the entitlement is currently active: an expiration date is
    /// known and lies in the future.
    pub fn is_active(&self) -> bool {
        match self.expires_date {
            Some(date) => date > Utc::now(),
            None => false,
        }
    }

    /// Set and persist the expiration date, or clear both when `None`.
    pub(crate) fn save_expires_date(
        &mut self,
        date: Option<DateTime<Utc>>,
        storage: &dyn StorageAdapter,
    ) {
        let key = keys::expires_date(&self.product.product_id);
        match date {
            Some(date) => storage::set_date(storage, &key, date),
            None => storage.remove(&key),
        }
        self.expires_date = date;
    }
}

impl PartialEq for Purchase {
    fn eq(&self, other: &Self) -> bool {
        self.product.product_id == other.product.product_id
    }
}

impl Eq for Purchase {}

/// Slice helpers mirroring how the purchase list is consumed by hosts.
pub trait PurchaseListExt {
    /// Stable sort by ascending catalog sort index.
    fn sort_default(&mut self);

    /// Look up a purchase by product identifier.
    fn get_product(&self, product_id: &str) -> Option<&Purchase>;

    /// The purchases whose entitlement is currently active.
    fn active_products(&self) -> Vec<Purchase>;
}

impl PurchaseListExt for Vec<Purchase> {
    fn sort_default(&mut self) {
        self.sort_by_key(|purchase| purchase.product.sort_index);
    }

    fn get_product(&self, product_id: &str) -> Option<&Purchase> {
        self.iter()
            .find(|purchase| purchase.product.product_id == product_id)
    }

    fn active_products(&self) -> Vec<Purchase> {
        self.iter()
            .filter(|purchase| purchase.is_active())
            .cloned()
            .collect()
    }
}

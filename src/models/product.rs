use serde::{Deserialize, Serialize};

/// A purchasable product as configured by the host application.
///
/// Immutable once constructed; the full catalog is handed to
/// [`PurchaseService`](crate::service::PurchaseService) at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Platform product identifier
    pub product_id: String,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// Position in the host application's product list
    pub sort_index: u32,
}

impl Product {
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        sort_index: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            description: description.into(),
            sort_index,
        }
    }
}

// Identity is the product identifier only.
impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.product_id == other.product_id
    }
}

impl Eq for Product {}

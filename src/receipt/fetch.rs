//! Receipt acquisition with bounded platform refresh

use std::sync::Arc;

use crate::error::{Result, StoreKitError};
use crate::platform::ReceiptProvider;

/// Maximum number of refresh attempts before a fetch is declared failed.
const MAX_REFRESH_ATTEMPTS: u32 = 4;

/// Fetches the signed receipt blob from local storage, asking the platform
/// to refresh it when absent.
pub struct ReceiptFetchService {
    provider: Arc<dyn ReceiptProvider>,
    /// Last successfully read blob
    receipt_data: Option<Vec<u8>>,
}

impl ReceiptFetchService {
    pub fn new(provider: Arc<dyn ReceiptProvider>) -> Self {
        Self {
            provider,
            receipt_data: None,
        }
    }

    /// Read the local receipt, refreshing and retrying while it is absent.
    ///
    /// The attempt counter is local to each call, so repeated fetches start
    /// from a clean slate. A failed refresh is retried like a successful
    /// one: the local read is attempted again and the failure counts
    /// against the same ceiling. No backoff is applied.
    pub async fn fetch_receipt(&mut self) -> Result<Vec<u8>> {
        tracing::debug!("fetching receipt");

        let mut refresh_attempts = 0u32;
        loop {
            if let Some(blob) = self.provider.local_receipt() {
                tracing::debug!(len = blob.len(), "local receipt read");
                self.receipt_data = Some(blob.clone());
                return Ok(blob);
            }

            if refresh_attempts >= MAX_REFRESH_ATTEMPTS {
                tracing::warn!(refresh_attempts, "receipt refresh attempts exhausted");
                return Err(StoreKitError::receipt_fetch_failed());
            }
            refresh_attempts += 1;

            tracing::debug!(refresh_attempts, "no local receipt, requesting refresh");
            if let Err(err) = self.provider.refresh_receipt().await {
                tracing::warn!(%err, "receipt refresh failed, retrying read");
            }
        }
    }

    /// The raw receipt data from the most recent successful fetch.
    pub fn receipt_data(&self) -> Option<&[u8]> {
        self.receipt_data.as_deref()
    }
}

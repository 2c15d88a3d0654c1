//! Receipt fetch/validate/extract pipeline

pub mod fetch;
pub mod update;
pub mod validate;

use std::sync::Arc;

pub use fetch::ReceiptFetchService;
pub use update::ReceiptUpdateService;
pub use validate::{ReceiptValidationService, VerifyReceiptResponse};

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::models::{ExpirationMap, ReceiptInfo, ValidationMode};
use crate::platform::ReceiptProvider;
use crate::storage::StorageAdapter;

/// Orchestrates one receipt cycle: acquisition, then (for remote
/// validation) verification and expiration extraction.
///
/// Running it twice with no purchase activity in between is safe; the only
/// internal counter is acquisition's refresh ceiling, which is local to
/// each run.
pub struct ReceiptRequest {
    fetch_service: ReceiptFetchService,
    validation_service: ReceiptValidationService,
    update_service: ReceiptUpdateService,
}

impl ReceiptRequest {
    pub fn new(
        provider: Arc<dyn ReceiptProvider>,
        storage: Arc<dyn StorageAdapter>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            fetch_service: ReceiptFetchService::new(provider),
            validation_service: ReceiptValidationService::new(
                config.shared_secret.clone(),
                config.production_verify_url.clone(),
                config.sandbox_verify_url.clone(),
            ),
            update_service: ReceiptUpdateService::new(storage),
        }
    }

    /// Run the pipeline with the given validation mode.
    ///
    /// Manual mode returns the raw blob with an empty expiration map and
    /// performs no network call. Any stage failure, including an
    /// extraction failure after successful verification, short-circuits
    /// and propagates unmodified.
    pub async fn start(&mut self, mode: ValidationMode) -> Result<ReceiptInfo> {
        tracing::debug!(mode = mode.as_str(), "receipt request started");

        let receipt = self.fetch_service.fetch_receipt().await?;

        match mode {
            ValidationMode::Manual => Ok(ReceiptInfo {
                expirations: ExpirationMap::new(),
                receipt,
            }),
            ValidationMode::AppStore => {
                let response = self.validation_service.validate_receipt(&receipt).await?;
                let expirations = self.update_service.update_receipt_info(&response)?;
                Ok(ReceiptInfo {
                    expirations,
                    receipt,
                })
            }
        }
    }

    /// The raw receipt data from the most recent successful fetch.
    pub fn receipt_data(&self) -> Option<&[u8]> {
        self.fetch_service.receipt_data()
    }
}

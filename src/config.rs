use url::Url;

use crate::models::ValidationMode;
use crate::receipt::validate::{PRODUCTION_VERIFY_URL, SANDBOX_VERIFY_URL};

/// Configuration for [`PurchaseService`](crate::service::PurchaseService).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Shared secret authenticating receipt verification requests
    pub shared_secret: String,
    /// Validation mode used after purchase and restore
    pub validation_mode: ValidationMode,
    /// Production verification endpoint
    pub production_verify_url: Url,
    /// Sandbox verification endpoint, used on the sandbox-receipt status
    pub sandbox_verify_url: Url,
}

impl ServiceConfig {
    /// Configuration with the default App Store endpoints and remote
    /// validation.
    pub fn new(shared_secret: impl Into<String>) -> Self {
        Self {
            shared_secret: shared_secret.into(),
            validation_mode: ValidationMode::AppStore,
            production_verify_url: Url::parse(PRODUCTION_VERIFY_URL)
                .expect("static verify URL"),
            sandbox_verify_url: Url::parse(SANDBOX_VERIFY_URL).expect("static verify URL"),
        }
    }

    /// Use manual (out-of-band) validation after purchase and restore.
    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    /// Override both verification endpoints, e.g. for a local test server.
    pub fn with_verify_urls(mut self, production: Url, sandbox: Url) -> Self {
        self.production_verify_url = production;
        self.sandbox_verify_url = sandbox;
        self
    }
}

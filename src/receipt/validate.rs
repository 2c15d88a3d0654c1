//! Receipt validation against the App Store verification endpoints

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, StoreKitError};

/// Production verification endpoint
pub const PRODUCTION_VERIFY_URL: &str = "https://buy.itunes.apple.com/verifyReceipt";
/// Sandbox verification endpoint
pub const SANDBOX_VERIFY_URL: &str = "https://sandbox.itunes.apple.com/verifyReceipt";

/// Status signalling a sandbox receipt sent to the production endpoint.
const STATUS_SANDBOX_RECEIPT: i64 = 21007;

#[derive(Debug, Serialize)]
struct VerifyReceiptRequest<'a> {
    #[serde(rename = "receipt-data")]
    receipt_data: String,
    password: &'a str,
    #[serde(rename = "exclude-old-transactions")]
    exclude_old_transactions: bool,
}

/// Parsed verification response.
///
/// Only the fields the SDK consumes are typed; receipt entries stay loose
/// JSON so a single malformed entry cannot poison the whole response.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyReceiptResponse {
    /// Application-level status code; `0` is success. Non-zero statuses
    /// other than the sandbox sentinel are returned as-is and not
    /// interpreted at this layer.
    pub status: i64,
    /// Per-transaction receipt entries, absent on malformed responses
    #[serde(default)]
    pub latest_receipt_info: Option<Vec<serde_json::Value>>,
}

/// Validates receipt blobs against the remote verification service,
/// falling back from production to sandbox on the sandbox-receipt status.
pub struct ReceiptValidationService {
    client: Client,
    shared_secret: String,
    production_url: Url,
    sandbox_url: Url,
}

impl ReceiptValidationService {
    pub fn new(shared_secret: String, production_url: Url, sandbox_url: Url) -> Self {
        Self {
            client: Client::new(),
            shared_secret,
            production_url,
            sandbox_url,
        }
    }

    /// Validate a receipt blob, returning the parsed response.
    ///
    /// The production endpoint is tried first; if it reports the receipt
    /// came from the sandbox environment, the identical request is repeated
    /// against the sandbox endpoint and that response is used instead.
    pub async fn validate_receipt(&self, receipt_data: &[u8]) -> Result<VerifyReceiptResponse> {
        if receipt_data.is_empty() {
            return Err(StoreKitError::validation("receipt data is empty"));
        }

        let body = VerifyReceiptRequest {
            receipt_data: BASE64.encode(receipt_data),
            password: &self.shared_secret,
            exclude_old_transactions: false,
        };

        let response = self.send(&self.production_url, &body).await?;
        if response.status == STATUS_SANDBOX_RECEIPT {
            tracing::debug!("sandbox receipt, retrying against sandbox endpoint");
            return self.send(&self.sandbox_url, &body).await;
        }

        Ok(response)
    }

    async fn send(
        &self,
        url: &Url,
        body: &VerifyReceiptRequest<'_>,
    ) -> Result<VerifyReceiptResponse> {
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| StoreKitError::network(format!("verification request failed: {e}")))?;

        let status = response.status().as_u16();
        response.json().await.map_err(|e| {
            StoreKitError::with_status(
                crate::error::StoreKitErrorCode::NetworkError,
                format!("failed to decode verification response: {e}"),
                status,
            )
        })
    }
}

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Expiration dates extracted from one validation response, keyed by
/// product identifier.
///
/// Produced per validation call and consumed immediately by aggregation;
/// within one response the last-parsed entry wins for a given identifier.
pub type ExpirationMap = HashMap<String, DateTime<Utc>>;

/// Result of a completed receipt request: the expiration info extracted by
/// validation (empty in manual mode) plus the raw signed receipt blob.
#[derive(Debug, Clone)]
pub struct ReceiptInfo {
    /// Extracted per-product expiration dates
    pub expirations: ExpirationMap,
    /// The raw signed receipt
    pub receipt: Vec<u8>,
}

/// How a fetched receipt is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// The receipt is returned as-is for out-of-band validation by the
    /// host's own backend; no expiration info is extracted.
    Manual,
    /// The receipt is verified against the App Store verification endpoints.
    AppStore,
}

impl ValidationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMode::Manual => "manual",
            ValidationMode::AppStore => "appstore",
        }
    }
}

//! Expiration extraction from a verification response

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::error::{Result, StoreKitError};
use crate::models::ExpirationMap;
use crate::receipt::validate::VerifyReceiptResponse;
use crate::storage::{self, keys, StorageAdapter};

/// Wire format of `expires_date`, minus the trailing timezone name.
const EXPIRES_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Extracts per-product expiration dates from a verification response and
/// maintains the persisted maximum expiration across all entitlements.
pub struct ReceiptUpdateService {
    storage: Arc<dyn StorageAdapter>,
}

impl ReceiptUpdateService {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Extract expiration info from a parsed verification response.
    ///
    /// A missing `latest_receipt_info` array is a hard failure; an empty
    /// array is a successful empty result. Entries with missing fields or
    /// unparseable dates are skipped, entries with past dates dropped, and
    /// the last entry wins for a repeated product identifier.
    ///
    /// On success the maximum retained date is persisted as the aggregate
    /// entitlement ceiling, or the ceiling is cleared when nothing remains.
    /// Failure leaves previously persisted state untouched.
    pub fn update_receipt_info(&self, response: &VerifyReceiptResponse) -> Result<ExpirationMap> {
        let entries = response.latest_receipt_info.as_ref().ok_or_else(|| {
            StoreKitError::invalid_response("verification response has no latest_receipt_info")
        })?;

        let now = Utc::now();
        let mut expirations = ExpirationMap::new();

        for entry in entries {
            let Some((product_id, expires_date)) = parse_entry(entry) else {
                tracing::warn!(%entry, "skipping unparseable receipt entry");
                continue;
            };

            if expires_date > now {
                expirations.insert(product_id, expires_date);
            }
        }

        self.update_max_expires_date(&expirations);

        tracing::debug!(count = expirations.len(), "extracted expiration info");
        Ok(expirations)
    }

    /// Persist the maximum date among the retained entries, removing the
    /// key entirely when no entitlement remains.
    fn update_max_expires_date(&self, expirations: &ExpirationMap) {
        match expirations.values().max() {
            Some(max) => storage::set_date(self.storage.as_ref(), keys::MAX_EXPIRES_DATE, *max),
            None => self.storage.remove(keys::MAX_EXPIRES_DATE),
        }
    }
}

fn parse_entry(entry: &serde_json::Value) -> Option<(String, DateTime<Utc>)> {
    let product_id = entry.get("product_id")?.as_str()?;
    let raw_date = entry.get("expires_date")?.as_str()?;
    let expires_date = parse_expires_date(raw_date)?;
    Some((product_id.to_string(), expires_date))
}

/// Parse an `expires_date` field (`yyyy-MM-dd HH:mm:ss <zone>`).
///
/// The verification service emits GMT wall-clock times with a named zone
/// suffix; anything other than a GMT/UTC name fails the parse and the
/// entry is skipped by the caller.
pub(crate) fn parse_expires_date(raw: &str) -> Option<DateTime<Utc>> {
    let (datetime, zone) = raw.rsplit_once(' ')?;
    let naive = NaiveDateTime::parse_from_str(datetime, EXPIRES_DATE_FORMAT).ok()?;
    match zone {
        "Etc/GMT" | "GMT" | "UTC" | "Z" => Some(Utc.from_utc_datetime(&naive)),
        _ => None,
    }
}

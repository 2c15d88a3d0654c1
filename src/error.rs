//! Error types for the StoreKit SDK

use thiserror::Error;

/// Error codes for StoreKit SDK errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKitErrorCode {
    /// Receipt missing after exhausting refresh attempts
    ReceiptFetchFailed,
    /// Network request failed or response was not JSON
    NetworkError,
    /// Verification response is missing the receipt info array
    InvalidResponse,
    /// User cancelled the purchase or restore
    PurchaseCancelled,
    /// Platform rejected the transaction
    PurchaseFailed,
    /// Platform product query failed
    StoreUnavailable,
    /// A purchase or restore is already running
    RequestInProgress,
    /// Invalid request parameters
    ValidationError,
}

impl std::fmt::Display for StoreKitErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReceiptFetchFailed => write!(f, "RECEIPT_FETCH_FAILED"),
            Self::NetworkError => write!(f, "NETWORK_ERROR"),
            Self::InvalidResponse => write!(f, "INVALID_RESPONSE"),
            Self::PurchaseCancelled => write!(f, "PURCHASE_CANCELLED"),
            Self::PurchaseFailed => write!(f, "PURCHASE_FAILED"),
            Self::StoreUnavailable => write!(f, "STORE_UNAVAILABLE"),
            Self::RequestInProgress => write!(f, "REQUEST_IN_PROGRESS"),
            Self::ValidationError => write!(f, "VALIDATION_ERROR"),
        }
    }
}

/// StoreKit SDK error
#[derive(Debug, Clone, Error)]
#[error("{message} (code: {code})")]
pub struct StoreKitError {
    /// Error code
    pub code: StoreKitErrorCode,
    /// Human-readable message
    pub message: String,
    /// HTTP status code (for verification endpoint errors)
    pub status_code: Option<u16>,
}

impl StoreKitError {
    /// Create a new error
    pub fn new(code: StoreKitErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a new error with HTTP status code
    pub fn with_status(
        code: StoreKitErrorCode,
        message: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StoreKitErrorCode::ValidationError, message)
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(StoreKitErrorCode::NetworkError, message)
    }

    /// Create a receipt fetch error
    pub fn receipt_fetch_failed() -> Self {
        Self::new(
            StoreKitErrorCode::ReceiptFetchFailed,
            "No receipt available after refresh attempts were exhausted",
        )
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(StoreKitErrorCode::InvalidResponse, message)
    }

    /// Create a user-cancelled error
    pub fn cancelled() -> Self {
        Self::new(
            StoreKitErrorCode::PurchaseCancelled,
            "The user cancelled the transaction",
        )
    }

    /// Whether the error was caused by the user cancelling a transaction.
    ///
    /// Callers typically suppress cancelled errors from user-visible
    /// reporting while surfacing every other code.
    pub fn is_cancelled(&self) -> bool {
        self.code == StoreKitErrorCode::PurchaseCancelled
    }
}

/// Result type for StoreKit SDK operations
pub type Result<T> = std::result::Result<T, StoreKitError>;

//! Errors raised while reconciling an inbound payment result.
//!
//! Expected business outcomes (declines, duplicates, amount mismatches) are
//! not errors; they are `Outcome` variants. These are the cases where the
//! message is rejected or could not be processed at all.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, OrderId};

#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// Signature missing or wrong, or a required identity field is absent.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authenticated, but a signed field could not be parsed.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The order named by the result does not exist.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// Order or transaction storage failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ReconciliationError {
    /// True if the provider should redeliver the notification.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReconciliationError::Storage(_))
    }

    /// Maps the error to the status returned on the notify endpoint.
    ///
    /// MoMo retries the IPN on anything but a 2xx, so only storage
    /// failures are reported as 5xx.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReconciliationError::Authentication(_) => StatusCode::FORBIDDEN,
            ReconciliationError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ReconciliationError::NotFound(_) => StatusCode::NOT_FOUND,
            ReconciliationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ReconciliationError {
    fn from(err: DomainError) -> Self {
        ReconciliationError::Storage(err.to_string())
    }
}

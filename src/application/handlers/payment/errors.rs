//! Errors returned by the payment gateway façade.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::payment::{ReconciliationError, ResultCode};
use crate::ports::ProviderError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    #[error("Order {0} is already paid")]
    AlreadyPaid(OrderId),

    #[error("Order {0} has no payment attempt")]
    NoPaymentAttempt(OrderId),

    #[error("Order {0} has no MoMo transaction to refund")]
    NotRefundable(OrderId),

    #[error("Invalid refund amount: {0}")]
    InvalidAmount(String),

    /// The provider could not be reached or answered unintelligibly.
    /// The outcome of the call is unknown.
    #[error("MoMo unavailable: {0}")]
    Transport(String),

    /// The provider answered with a non-zero result code.
    #[error("MoMo rejected the request ({code}): {message}")]
    ProviderRejected { code: ResultCode, message: String },

    #[error("Order {0} was modified concurrently")]
    Conflict(OrderId),

    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::NotFound(_) | GatewayError::NoPaymentAttempt(_) => StatusCode::NOT_FOUND,
            GatewayError::AlreadyPaid(_)
            | GatewayError::NotRefundable(_)
            | GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            GatewayError::Transport(_) => StatusCode::BAD_GATEWAY,
            GatewayError::ProviderRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Reconciliation(e) => e.status_code(),
            GatewayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::NotFound(_) => "ORDER_NOT_FOUND",
            GatewayError::AlreadyPaid(_) => "ALREADY_PAID",
            GatewayError::NoPaymentAttempt(_) => "NO_PAYMENT_ATTEMPT",
            GatewayError::NotRefundable(_) => "NOT_REFUNDABLE",
            GatewayError::InvalidAmount(_) => "INVALID_AMOUNT",
            GatewayError::Transport(_) => "PROVIDER_UNAVAILABLE",
            GatewayError::ProviderRejected { .. } => "PROVIDER_REJECTED",
            GatewayError::Conflict(_) => "CONFLICT",
            GatewayError::Reconciliation(_) => "RECONCILIATION_FAILED",
            GatewayError::Storage(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show a customer.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Transport(_) => {
                "Unable to connect to MoMo. Please try again.".to_string()
            }
            GatewayError::ProviderRejected { message, .. } => {
                format!("Payment error: {}", message)
            }
            GatewayError::Storage(_) | GatewayError::Reconciliation(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<DomainError> for GatewayError {
    fn from(err: DomainError) -> Self {
        GatewayError::Storage(err.to_string())
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_maps_to_bad_gateway() {
        let err = GatewayError::from(ProviderError::transport("timed out"));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "PROVIDER_UNAVAILABLE");
    }

    #[test]
    fn reconciliation_errors_keep_their_status() {
        let err = GatewayError::from(ReconciliationError::Authentication("bad".into()));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn storage_details_are_not_shown_to_customers() {
        let err = GatewayError::Storage("connection refused on 10.0.0.5".into());
        assert!(!err.user_message().contains("10.0.0.5"));
    }

    #[test]
    fn provider_rejection_message_is_customer_facing() {
        let err = GatewayError::ProviderRejected {
            code: ResultCode::new(1001),
            message: "Insufficient balance".into(),
        };
        assert_eq!(err.user_message(), "Payment error: Insufficient balance");
    }
}

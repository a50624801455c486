//! HTTP DTOs for payment endpoints.
//!
//! The notify acknowledgment uses MoMo's field names; everything else is
//! the gateway's own snake_case API.

use serde::{Deserialize, Serialize};

use crate::application::{CheckoutRedirect, PaymentStatusView, RefundOutcome};
use crate::domain::order::OrderStatus;
use crate::domain::payment::{Outcome, TransactionStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to refund a paid order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefundOrderRequest {
    /// Amount in minor units. Omit to refund the full order total.
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub reason: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response after creating a MoMo payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    /// MoMo page the customer must be sent to.
    pub pay_url: String,
    pub request_id: String,
}

impl From<CheckoutRedirect> for CheckoutResponse {
    fn from(redirect: CheckoutRedirect) -> Self {
        Self {
            pay_url: redirect.pay_url,
            request_id: redirect.request_id.into(),
        }
    }
}

/// Acknowledgment body for MoMo's IPN.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyAck {
    pub result_code: i64,
    pub message: String,
    /// Reconciliation outcome, for operators reading access logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

impl NotifyAck {
    pub fn success(outcome: &Outcome) -> Self {
        Self {
            result_code: 0,
            message: "Success".to_string(),
            outcome: Some(outcome.label().to_string()),
        }
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub order_id: String,
    pub order_status: OrderStatus,
    pub request_id: String,
    pub transaction_status: TransactionStatus,
    pub provider_result_code: i64,
    pub provider_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_type: Option<String>,
}

impl From<PaymentStatusView> for PaymentStatusResponse {
    fn from(view: PaymentStatusView) -> Self {
        Self {
            order_id: view.order_id.into(),
            order_status: view.order_status,
            request_id: view.request_id.into(),
            transaction_status: view.transaction_status,
            provider_result_code: view.provider_result_code.value(),
            provider_message: view.provider_message,
            provider_transaction_id: view.provider_transaction_id,
            pay_type: view.pay_type,
        }
    }
}

/// Result of a refund request.
#[derive(Debug, Clone, Serialize)]
pub struct RefundResponse {
    #[serde(flatten)]
    pub outcome: RefundOutcome,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

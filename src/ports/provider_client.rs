//! Provider client port for the MoMo payment API.
//!
//! Implementations sign, transmit and parse the three outbound calls the
//! gateway makes: payment creation, status query and refund.
//!
//! A `ProviderError` means the outcome is unknown. A declined or otherwise
//! non-zero `resultCode` is a successful call and comes back as a
//! `ProviderResponse`.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{MinorUnits, OrderId, RequestId};
use crate::domain::payment::{PaymentRequest, ResultCode};

/// Port for outbound calls to the payment provider.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Create a payment and obtain the customer's checkout URL.
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Query the provider's view of a payment attempt.
    async fn query_status(&self, request: &QueryRequest) -> Result<ProviderResponse, ProviderError>;

    /// Refund all or part of a completed transaction.
    async fn refund(&self, request: &RefundRequest) -> Result<ProviderResponse, ProviderError>;
}

/// Status query for one payment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub order_id: OrderId,
    pub request_id: RequestId,
}

/// Refund of a completed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    /// Fresh request id for the refund call itself.
    pub request_id: RequestId,
    pub order_id: OrderId,
    /// MoMo transaction id of the original payment.
    pub trans_id: String,
    pub amount: MinorUnits,
    pub description: String,
}

/// Parsed response from any provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub result_code: ResultCode,
    pub message: String,

    /// Checkout URL (creation only).
    pub pay_url: Option<String>,

    /// Request id echoed by the provider.
    pub request_id: Option<String>,

    /// MoMo transaction id (query and refund).
    pub trans_id: Option<String>,

    pub amount: Option<MinorUnits>,
    pub pay_type: Option<String>,
}

impl ProviderResponse {
    /// A response carrying only a result code and message.
    pub fn new(result_code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            result_code,
            message: message.into(),
            pay_url: None,
            request_id: None,
            trans_id: None,
            amount: None,
            pay_type: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result_code.is_success()
    }
}

/// Failure to complete a provider call. The payment outcome is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Timeout, DNS, TLS, connection or non-2xx HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be parsed.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    pub fn transport(message: impl Into<String>) -> Self {
        ProviderError::Transport(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ProviderError::MalformedResponse(message.into())
    }
}

//! Mock provider client for testing.
//!
//! Configurable stand-in for `ProviderClient`. Supports:
//! - Pre-configured responses per call
//! - Error injection
//! - Call tracking

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::payment::{PaymentRequest, ResultCode};
use crate::ports::{ProviderClient, ProviderError, ProviderResponse, QueryRequest, RefundRequest};

/// Mock provider client.
///
/// # Example
///
/// ```ignore
/// let mock = MockProviderClient::new();
/// mock.set_create_response(ProviderResponse::new(ResultCode::new(41), "bad partner"));
/// mock.set_error("refund", ProviderError::transport("timed out"));
/// ```
#[derive(Default, Clone)]
pub struct MockProviderClient {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    create_response: Option<ProviderResponse>,
    query_response: Option<ProviderResponse>,
    refund_response: Option<ProviderResponse>,
    errors: Vec<(String, ProviderError)>,
    created: Vec<PaymentRequest>,
    queried: Vec<QueryRequest>,
    refunded: Vec<RefundRequest>,
}

impl MockProviderClient {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════

    /// Response for `create_payment`. Defaults to success with a pay URL.
    pub fn set_create_response(&self, response: ProviderResponse) {
        self.inner.lock().unwrap().create_response = Some(response);
    }

    /// Response for `query_status`. Defaults to success.
    pub fn set_query_response(&self, response: ProviderResponse) {
        self.inner.lock().unwrap().query_response = Some(response);
    }

    /// Response for `refund`. Defaults to success.
    pub fn set_refund_response(&self, response: ProviderResponse) {
        self.inner.lock().unwrap().refund_response = Some(response);
    }

    /// Fail calls to `method` (`create_payment`, `query_status`, `refund`).
    pub fn set_error(&self, method: &str, error: ProviderError) {
        self.inner
            .lock()
            .unwrap()
            .errors
            .push((method.to_string(), error));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════

    pub fn created(&self) -> Vec<PaymentRequest> {
        self.inner.lock().unwrap().created.clone()
    }

    pub fn queried(&self) -> Vec<QueryRequest> {
        self.inner.lock().unwrap().queried.clone()
    }

    pub fn refunded(&self) -> Vec<RefundRequest> {
        self.inner.lock().unwrap().refunded.clone()
    }

    fn check_error(state: &MockState, method: &str) -> Result<(), ProviderError> {
        match state.errors.iter().find(|(m, _)| m == method) {
            Some((_, error)) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProviderClient for MockProviderClient {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        let mut state = self.inner.lock().unwrap();
        state.created.push(request.clone());
        Self::check_error(&state, "create_payment")?;

        Ok(state.create_response.clone().unwrap_or_else(|| {
            let mut response = ProviderResponse::new(ResultCode::SUCCESS, "Successful.");
            response.pay_url = Some(format!(
                "https://test-payment.momo.vn/v2/gateway/pay?t={}",
                request.request_id
            ));
            response.request_id = Some(request.request_id.to_string());
            response
        }))
    }

    async fn query_status(&self, request: &QueryRequest) -> Result<ProviderResponse, ProviderError> {
        let mut state = self.inner.lock().unwrap();
        state.queried.push(request.clone());
        Self::check_error(&state, "query_status")?;

        Ok(state.query_response.clone().unwrap_or_else(|| {
            let mut response = ProviderResponse::new(ResultCode::SUCCESS, "Successful.");
            response.request_id = Some(request.request_id.to_string());
            response
        }))
    }

    async fn refund(&self, request: &RefundRequest) -> Result<ProviderResponse, ProviderError> {
        let mut state = self.inner.lock().unwrap();
        state.refunded.push(request.clone());
        Self::check_error(&state, "refund")?;

        Ok(state.refund_response.clone().unwrap_or_else(|| {
            let mut response = ProviderResponse::new(ResultCode::SUCCESS, "Successful.");
            response.trans_id = Some(format!("R{}", request.trans_id));
            response.amount = Some(request.amount);
            response
        }))
    }
}

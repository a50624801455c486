//! MoMo payment API client.
//!
//! Implements the `ProviderClient` port over the MoMo v2 gateway API.
//!
//! # Security
//!
//! - Every request is signed with HMAC-SHA256 over its canonical string
//! - The secret key is held as `secrecy::SecretString` and never logged
//!
//! # Configuration
//!
//! ```ignore
//! let config = MomoConfig::new(partner_code, access_key, secret_key, SANDBOX_BASE_URL)
//!     .with_timeout(Duration::from_secs(60));
//! let client = MomoProviderClient::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;

use crate::domain::payment::{
    MerchantIdentity, PaymentRequest, SignatureCodec, QUERY_FIELDS, REFUND_FIELDS,
};
use crate::ports::{ProviderClient, ProviderError, ProviderResponse, QueryRequest, RefundRequest};

use super::wire_types::{trans_id_value, CreatePaymentBody, MomoResponse, QueryBody, RefundBody};

/// Sandbox API base URL.
pub const SANDBOX_BASE_URL: &str = "https://test-payment.momo.vn/v2/gateway/api";

/// Production API base URL.
pub const PRODUCTION_BASE_URL: &str = "https://payment.momo.vn/v2/gateway/api";

/// MoMo API configuration.
#[derive(Clone)]
pub struct MomoConfig {
    partner_code: String,
    access_key: String,
    secret_key: SecretString,

    /// Base URL; `create`, `query` and `refund` are appended.
    base_url: String,

    /// Language for provider-rendered messages (`vi` or `en`).
    lang: String,

    timeout: Duration,
    max_redirects: usize,
}

impl MomoConfig {
    /// Create a configuration with the default timeout (60s) and redirect limit (5).
    pub fn new(
        partner_code: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            partner_code: partner_code.into(),
            access_key: access_key.into(),
            secret_key: SecretString::new(secret_key.into()),
            base_url: base_url.into(),
            lang: "vi".to_string(),
            timeout: Duration::from_secs(60),
            max_redirects: 5,
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// The merchant identity used in canonical strings.
    pub fn merchant(&self) -> MerchantIdentity {
        MerchantIdentity::new(&self.partner_code, &self.access_key)
    }

    /// A codec bound to the secret key.
    pub fn codec(&self) -> SignatureCodec {
        SignatureCodec::new(self.secret_key.clone())
    }
}

/// MoMo provider client.
pub struct MomoProviderClient {
    merchant: MerchantIdentity,
    codec: SignatureCodec,
    base_url: String,
    lang: String,
    http_client: reqwest::Client,
}

impl MomoProviderClient {
    /// Create a client with a bounded timeout and redirect policy.
    pub fn new(config: MomoConfig) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ProviderError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            merchant: config.merchant(),
            codec: config.codec(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            lang: config.lang,
            http_client,
        })
    }

    /// Builds the signed creation body.
    pub fn create_body(&self, request: &PaymentRequest) -> CreatePaymentBody {
        let signature = self.codec.sign(&request.canonical_string(&self.merchant));
        CreatePaymentBody {
            partner_code: self.merchant.partner_code.clone(),
            access_key: self.merchant.access_key.clone(),
            request_id: request.request_id.to_string(),
            amount: request.amount.value(),
            order_id: request.order_id.to_string(),
            order_info: request.order_info.clone(),
            redirect_url: request.redirect_url.clone(),
            ipn_url: request.ipn_url.clone(),
            request_type: request.request_type.to_string(),
            extra_data: request.extra_data.clone(),
            lang: self.lang.clone(),
            signature,
        }
    }

    /// Builds the signed query body.
    pub fn query_body(&self, request: &QueryRequest) -> QueryBody {
        let canonical = self
            .merchant
            .canonical_string(&QUERY_FIELDS, |field| match field {
                "orderId" => Some(request.order_id.as_str()),
                "requestId" => Some(request.request_id.as_str()),
                _ => None,
            });
        QueryBody {
            partner_code: self.merchant.partner_code.clone(),
            access_key: self.merchant.access_key.clone(),
            request_id: request.request_id.to_string(),
            order_id: request.order_id.to_string(),
            lang: self.lang.clone(),
            signature: self.codec.sign(&canonical),
        }
    }

    /// Builds the signed refund body.
    pub fn refund_body(&self, request: &RefundRequest) -> RefundBody {
        let amount = request.amount.to_string();
        let canonical = self
            .merchant
            .canonical_string(&REFUND_FIELDS, |field| match field {
                "amount" => Some(amount.as_str()),
                "description" => Some(request.description.as_str()),
                "orderId" => Some(request.order_id.as_str()),
                "requestId" => Some(request.request_id.as_str()),
                "transId" => Some(request.trans_id.as_str()),
                _ => None,
            });
        RefundBody {
            partner_code: self.merchant.partner_code.clone(),
            access_key: self.merchant.access_key.clone(),
            request_id: request.request_id.to_string(),
            amount: request.amount.value(),
            order_id: request.order_id.to_string(),
            trans_id: trans_id_value(&request.trans_id),
            lang: self.lang.clone(),
            description: request.description.clone(),
            signature: self.codec.sign(&canonical),
        }
    }

    async fn post<B: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ProviderResponse, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(endpoint, error = %e, "MoMo request failed");
                ProviderError::transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                endpoint,
                status = status.as_u16(),
                error = %error_text,
                "MoMo API returned an error status"
            );
            return Err(ProviderError::transport(format!(
                "MoMo API returned HTTP {}",
                status.as_u16()
            )));
        }

        let parsed: MomoResponse = response.json().await.map_err(|e| {
            tracing::error!(endpoint, error = %e, "Failed to parse MoMo response");
            ProviderError::malformed(e.to_string())
        })?;
        let parsed = parsed.into_provider_response()?;

        tracing::debug!(
            endpoint,
            result_code = parsed.result_code.value(),
            message = %parsed.message,
            "MoMo API response"
        );
        Ok(parsed)
    }
}

#[async_trait]
impl ProviderClient for MomoProviderClient {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        tracing::info!(
            order_id = %request.order_id,
            request_id = %request.request_id,
            amount = request.amount.value(),
            "Creating MoMo payment"
        );
        self.post("create", &self.create_body(request)).await
    }

    async fn query_status(&self, request: &QueryRequest) -> Result<ProviderResponse, ProviderError> {
        self.post("query", &self.query_body(request)).await
    }

    async fn refund(&self, request: &RefundRequest) -> Result<ProviderResponse, ProviderError> {
        tracing::info!(
            order_id = %request.order_id,
            request_id = %request.request_id,
            amount = request.amount.value(),
            "Submitting MoMo refund"
        );
        self.post("refund", &self.refund_body(request)).await
    }
}

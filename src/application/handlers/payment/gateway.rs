//! PaymentGateway - façade over the provider client and reconciliation.
//!
//! Outbound: `process_payment`, `check_payment_status`, `refund`.
//! Inbound: `handle_return` (browser) and `handle_notify` (IPN), both of
//! which delegate to the `ReconciliationEngine`.

use std::sync::Arc;

use super::errors::GatewayError;
use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::order::Order;
use crate::domain::payment::{
    MerchantIdentity, Outcome, RawPaymentResult, ReconciliationEngine, ReconciliationError,
    RequestType, SignatureCodec,
};
use crate::ports::{CommitOutcome, OrderRepository, ProviderClient, TransactionStore};

/// Reload-and-retry budget for `amend_order`.
const MAX_AMEND_ATTEMPTS: u32 = 3;

/// Merchant-side settings the façade needs per request.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Public browser-return URL sent to MoMo as `redirectUrl`.
    pub redirect_url: String,
    /// Public notify URL sent to MoMo as `ipnUrl`.
    pub ipn_url: String,
    /// Where customers land after a confirmed payment.
    pub confirmation_url: String,
    /// Where customers land after a failed or unverifiable payment.
    pub checkout_url: String,
    pub request_type: RequestType,
    /// False for account tiers without API refunds.
    pub refunds_supported: bool,
}

/// Gateway between the order platform and MoMo.
pub struct PaymentGateway {
    pub(super) orders: Arc<dyn OrderRepository>,
    pub(super) transactions: Arc<dyn TransactionStore>,
    pub(super) provider: Arc<dyn ProviderClient>,
    pub(super) engine: ReconciliationEngine,
    pub(super) settings: GatewaySettings,
}

impl PaymentGateway {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        transactions: Arc<dyn TransactionStore>,
        provider: Arc<dyn ProviderClient>,
        merchant: MerchantIdentity,
        codec: SignatureCodec,
        settings: GatewaySettings,
    ) -> Self {
        let engine =
            ReconciliationEngine::new(orders.clone(), transactions.clone(), merchant, codec);
        Self {
            orders,
            transactions,
            provider,
            engine,
            settings,
        }
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Resolves an IPN delivery.
    ///
    /// Every `Ok` outcome, including `AlreadyProcessed`, is acknowledged to
    /// MoMo. Errors other than storage failures are final for this payload.
    pub async fn handle_notify(
        &self,
        raw: &RawPaymentResult,
    ) -> Result<Outcome, ReconciliationError> {
        match self.engine.resolve(raw).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if err.is_retryable() {
                    tracing::error!(
                        order_id = raw.order_id.as_deref().unwrap_or_default(),
                        error = %err,
                        "IPN processing failed, MoMo will retry"
                    );
                }
                Err(err)
            }
        }
    }

    pub(super) async fn load_order(&self, order_id: &OrderId) -> Result<Order, GatewayError> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| GatewayError::NotFound(order_id.clone()))
    }

    pub(super) async fn commit(&self, order: &Order) -> Result<(), GatewayError> {
        match self.orders.commit(order).await? {
            CommitOutcome::Committed => Ok(()),
            CommitOutcome::Conflict => {
                tracing::warn!(order_id = %order.id(), "Order changed while updating");
                Err(GatewayError::Conflict(order.id().clone()))
            }
        }
    }

    /// Applies `change` to a freshly loaded order and commits it, reloading
    /// on version conflicts.
    ///
    /// For changes that follow a provider call which already took effect, so
    /// a concurrent writer must not make them fail.
    pub(super) async fn amend_order<F>(
        &self,
        order_id: &OrderId,
        change: F,
    ) -> Result<Order, GatewayError>
    where
        F: Fn(&mut Order) -> Result<(), DomainError>,
    {
        for attempt in 1..=MAX_AMEND_ATTEMPTS {
            let mut order = self.load_order(order_id).await?;
            change(&mut order)?;
            match self.orders.commit(&order).await? {
                CommitOutcome::Committed => return Ok(order.committed()),
                CommitOutcome::Conflict => {
                    tracing::debug!(order_id = %order_id, attempt, "Order changed concurrently, reloading");
                }
            }
        }
        tracing::warn!(order_id = %order_id, "Order kept changing, giving up");
        Err(GatewayError::Conflict(order_id.clone()))
    }
}

/// Appends query parameters to a configured URL.
///
/// Falls back to the bare URL if it does not parse; configuration is
/// validated at startup.
pub(super) fn url_with_params(base: &str, params: &[(&str, &str)]) -> String {
    reqwest::Url::parse_with_params(base, params)
        .map(String::from)
        .unwrap_or_else(|_| base.to_string())
}

#[cfg(test)]
pub(super) mod test_support {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use secrecy::SecretString;

    use super::*;
    use crate::adapters::memory::{InMemoryOrderRepository, InMemoryTransactionStore};
    use crate::adapters::momo::MockProviderClient;
    use crate::domain::foundation::MinorUnits;

    pub const SECRET: &str = "K951B6PE1waDMi640xX08PD3vg6EkVlz";

    pub struct Fixture {
        pub gateway: PaymentGateway,
        pub orders: InMemoryOrderRepository,
        pub transactions: InMemoryTransactionStore,
        pub provider: MockProviderClient,
    }

    pub fn merchant() -> MerchantIdentity {
        MerchantIdentity::new("MOMOBKUN20180529", "klm05TvNBzhg7h7j")
    }

    pub fn codec() -> SignatureCodec {
        SignatureCodec::new(SecretString::new(SECRET.to_string()))
    }

    pub fn settings() -> GatewaySettings {
        GatewaySettings {
            redirect_url: "https://shop.example/payments/momo/return".to_string(),
            ipn_url: "https://shop.example/payments/momo/notify".to_string(),
            confirmation_url: "https://shop.example/checkout/order-received".to_string(),
            checkout_url: "https://shop.example/checkout".to_string(),
            request_type: RequestType::CaptureWallet,
            refunds_supported: true,
        }
    }

    /// Order repository that lets a fixed number of commits through and
    /// reports every later one as lost to a concurrent writer.
    pub struct ConflictingOrders {
        inner: InMemoryOrderRepository,
        commits_left: Mutex<usize>,
    }

    #[async_trait]
    impl OrderRepository for ConflictingOrders {
        async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
            self.inner.find_by_id(id).await
        }

        async fn commit(&self, order: &Order) -> Result<CommitOutcome, DomainError> {
            {
                let mut left = self.commits_left.lock().unwrap();
                if *left == 0 {
                    return Ok(CommitOutcome::Conflict);
                }
                *left -= 1;
            }
            self.inner.commit(order).await
        }
    }

    pub async fn fixture_with(settings: GatewaySettings) -> Fixture {
        build_fixture(settings, None).await
    }

    /// A fixture whose gateway sees commits conflict after `commits_allowed`.
    /// `Fixture::orders` still reads and writes the underlying store.
    pub async fn conflicting_fixture(settings: GatewaySettings, commits_allowed: usize) -> Fixture {
        build_fixture(settings, Some(commits_allowed)).await
    }

    async fn build_fixture(settings: GatewaySettings, commits_allowed: Option<usize>) -> Fixture {
        let orders = InMemoryOrderRepository::new();
        let transactions = InMemoryTransactionStore::new();
        let provider = MockProviderClient::new();

        orders
            .insert(Order::new(
                OrderId::new("1001").unwrap(),
                MinorUnits::new(100_000).unwrap(),
            ))
            .await;

        let gateway_orders: Arc<dyn OrderRepository> = match commits_allowed {
            Some(allowed) => Arc::new(ConflictingOrders {
                inner: orders.clone(),
                commits_left: Mutex::new(allowed),
            }),
            None => Arc::new(orders.clone()),
        };

        let gateway = PaymentGateway::new(
            gateway_orders,
            Arc::new(transactions.clone()),
            Arc::new(provider.clone()),
            merchant(),
            codec(),
            settings,
        );

        Fixture {
            gateway,
            orders,
            transactions,
            provider,
        }
    }

    pub async fn fixture() -> Fixture {
        fixture_with(settings()).await
    }

    pub fn order_id() -> OrderId {
        OrderId::new("1001").unwrap()
    }

    /// A result for order 1001 signed with the merchant secret.
    pub fn signed_result(request_id: &str, result_code: i64, amount: i64) -> RawPaymentResult {
        let mut raw = RawPaymentResult {
            partner_code: Some("MOMOBKUN20180529".to_string()),
            order_id: Some("1001".to_string()),
            request_id: Some(request_id.to_string()),
            amount: Some(amount.to_string()),
            order_info: Some("Payment for order #1001".to_string()),
            order_type: Some("momo_wallet".to_string()),
            trans_id: Some("2147483647".to_string()),
            result_code: Some(result_code.to_string()),
            message: Some(if result_code == 0 {
                "Successful.".to_string()
            } else {
                "Transaction denied by user.".to_string()
            }),
            pay_type: Some("qr".to_string()),
            response_time: Some("1704067200000".to_string()),
            extra_data: Some(String::new()),
            signature: None,
        };
        raw.signature = Some(codec().sign(&raw.canonical_string(&merchant())));
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::domain::order::OrderStatus;

    #[tokio::test]
    async fn notify_completes_a_pending_order() {
        let f = fixture().await;

        let outcome = f
            .gateway
            .handle_notify(&signed_result("1001_1", 0, 100_000))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Completed);
        let order = f.orders.find_by_id(&order_id()).await.unwrap().unwrap();
        assert_eq!(order.status(), OrderStatus::Paid);
    }

    #[tokio::test]
    async fn notify_rejects_tampered_payload() {
        let f = fixture().await;
        let mut raw = signed_result("1001_1", 1006, 100_000);
        raw.result_code = Some("0".to_string());

        let err = f.gateway.handle_notify(&raw).await.unwrap_err();

        assert!(matches!(err, ReconciliationError::Authentication(_)));
        let order = f.orders.find_by_id(&order_id()).await.unwrap().unwrap();
        assert_eq!(order.status(), OrderStatus::PendingPayment);
    }

    #[test]
    fn url_with_params_encodes_values() {
        let url = url_with_params(
            "https://shop.example/checkout",
            &[("payment_notice", "Payment failed: try again")],
        );
        assert_eq!(
            url,
            "https://shop.example/checkout?payment_notice=Payment+failed%3A+try+again"
        );
    }

    #[test]
    fn url_with_params_keeps_unparseable_base() {
        assert_eq!(url_with_params("not a url", &[("a", "b")]), "not a url");
    }
}

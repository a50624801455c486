//! Reconciliation engine - applies authenticated payment results to orders.
//!
//! Both inbound channels (browser return and IPN) funnel through
//! [`ReconciliationEngine::resolve`]. Either, both, or neither may arrive, in
//! any order and any number of times, so resolution is idempotent:
//!
//! 1. Reject results missing `signature`, `orderId` or `requestId`
//! 2. Verify the signature over the result canonical string
//! 3. Load the order (unknown order is rejected, nothing is written)
//! 4. Return `AlreadyProcessed` if the order is already paid
//! 5. Branch on `resultCode` and commit the order conditionally on its version
//! 6. Resolve the pending transaction record
//!
//! A version conflict on commit restarts from step 3, so a racing delivery
//! observes the winner's terminal state.

use std::sync::Arc;

use super::errors::ReconciliationError;
use super::outcome::Outcome;
use super::result::{PaymentResult, RawPaymentResult};
use super::signature::{MerchantIdentity, SignatureCodec};
use super::transaction::{ProviderFields, TransactionStatus};
use crate::domain::order::{Order, OrderStatus};
use crate::ports::{CommitOutcome, OrderRepository, TransactionStore};

/// Attempts at the read-check-write cycle before giving up.
const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Validates inbound payment results and drives order state.
pub struct ReconciliationEngine {
    orders: Arc<dyn OrderRepository>,
    transactions: Arc<dyn TransactionStore>,
    merchant: MerchantIdentity,
    codec: SignatureCodec,
}

impl ReconciliationEngine {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        transactions: Arc<dyn TransactionStore>,
        merchant: MerchantIdentity,
        codec: SignatureCodec,
    ) -> Self {
        Self {
            orders,
            transactions,
            merchant,
            codec,
        }
    }

    /// Authenticates a raw result and applies it to its order.
    pub async fn resolve(&self, raw: &RawPaymentResult) -> Result<Outcome, ReconciliationError> {
        let result = self.authenticate(raw)?;

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            if let Some(outcome) = self.apply(&result).await? {
                tracing::info!(
                    order_id = %result.order_id,
                    request_id = %result.request_id,
                    result_code = result.result_code.value(),
                    outcome = outcome.label(),
                    "Payment result reconciled"
                );
                return Ok(outcome);
            }
            tracing::debug!(
                order_id = %result.order_id,
                attempt,
                "Order changed concurrently, reloading"
            );
        }

        Err(ReconciliationError::Storage(format!(
            "order {} kept changing during reconciliation",
            result.order_id
        )))
    }

    /// Checks required fields and the signature, then parses the result.
    ///
    /// No storage is touched.
    pub fn authenticate(&self, raw: &RawPaymentResult) -> Result<PaymentResult, ReconciliationError> {
        if let Err(err) = raw.require_identity() {
            tracing::warn!(
                order_id = raw.order_id.as_deref().unwrap_or_default(),
                error = %err,
                "Rejected payment result"
            );
            return Err(err);
        }

        let canonical = raw.canonical_string(&self.merchant);
        let signature = raw.signature.as_deref().unwrap_or_default();
        if !self.codec.verify(signature, &canonical) {
            tracing::warn!(
                order_id = raw.order_id.as_deref().unwrap_or_default(),
                request_id = raw.request_id.as_deref().unwrap_or_default(),
                "Invalid payment result signature"
            );
            return Err(ReconciliationError::Authentication(
                "invalid signature".to_string(),
            ));
        }

        raw.parse()
    }

    /// One read-check-write pass. `None` means the commit lost a race.
    async fn apply(&self, result: &PaymentResult) -> Result<Option<Outcome>, ReconciliationError> {
        let mut order = self
            .orders
            .find_by_id(&result.order_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(order_id = %result.order_id, "Payment result for unknown order");
                ReconciliationError::NotFound(result.order_id.clone())
            })?;

        if order.is_terminal() {
            tracing::info!(
                order_id = %result.order_id,
                request_id = %result.request_id,
                "Order already paid, ignoring duplicate result"
            );
            self.complete_interrupted_record(&order, result).await?;
            return Ok(Some(Outcome::AlreadyProcessed));
        }

        if result.result_code.is_success() {
            self.apply_success(&mut order, result).await
        } else {
            self.apply_failure(&mut order, result).await
        }
    }

    async fn apply_success(
        &self,
        order: &mut Order,
        result: &PaymentResult,
    ) -> Result<Option<Outcome>, ReconciliationError> {
        let expected = order.total_amount();
        if result.amount != expected {
            order.annotate(format!(
                "MoMo payment amount mismatch. Expected: {}, Received: {}",
                expected, result.amount
            ));
            if self.orders.commit(order).await? == CommitOutcome::Conflict {
                return Ok(None);
            }
            tracing::warn!(
                order_id = %result.order_id,
                request_id = %result.request_id,
                expected = expected.value(),
                received = result.amount.value(),
                "Payment amount mismatch, order left unpaid"
            );
            return Ok(Some(Outcome::AmountMismatch {
                expected,
                received: result.amount,
            }));
        }

        let trans_id = result.trans_id.clone().ok_or_else(|| {
            ReconciliationError::MalformedPayload("successful result without transId".to_string())
        })?;

        order.mark_paid(trans_id.clone(), result.pay_type.clone())?;
        order.annotate(format!(
            "MoMo payment completed. Transaction ID: {}",
            trans_id
        ));
        if self.orders.commit(order).await? == CommitOutcome::Conflict {
            return Ok(None);
        }

        self.resolve_record(result, TransactionStatus::Completed).await?;
        Ok(Some(Outcome::Completed))
    }

    async fn apply_failure(
        &self,
        order: &mut Order,
        result: &PaymentResult,
    ) -> Result<Option<Outcome>, ReconciliationError> {
        if order.status() == OrderStatus::Failed {
            tracing::info!(
                order_id = %result.order_id,
                result_code = result.result_code.value(),
                "Order already failed, ignoring duplicate failure"
            );
            return Ok(Some(Outcome::AlreadyProcessed));
        }

        let message = if result.message.trim().is_empty() {
            result.result_code.message().to_string()
        } else {
            result.message.clone()
        };

        order.mark_failed(format!(
            "MoMo payment failed. Error code: {}, Message: {}",
            result.result_code, message
        ))?;
        if self.orders.commit(order).await? == CommitOutcome::Conflict {
            return Ok(None);
        }

        self.resolve_record(result, TransactionStatus::Failed).await?;
        Ok(Some(Outcome::Failed {
            code: result.result_code,
            message,
        }))
    }

    async fn resolve_record(
        &self,
        result: &PaymentResult,
        status: TransactionStatus,
    ) -> Result<bool, ReconciliationError> {
        let updated = self
            .transactions
            .update_status(
                &result.order_id,
                Some(&result.request_id),
                status,
                provider_fields(result),
            )
            .await?;
        if !updated {
            tracing::warn!(
                order_id = %result.order_id,
                request_id = %result.request_id,
                status = status.as_str(),
                "No pending transaction record to resolve"
            );
        }
        Ok(updated)
    }

    /// A delivery that failed between the order commit and the record update
    /// leaves the record pending. A redelivery of the same success finishes it.
    async fn complete_interrupted_record(
        &self,
        order: &Order,
        result: &PaymentResult,
    ) -> Result<(), ReconciliationError> {
        let same_payment = result.result_code.is_success()
            && result.trans_id.is_some()
            && result.trans_id.as_deref() == order.provider_transaction_id();
        if !same_payment {
            return Ok(());
        }

        let updated = self
            .transactions
            .update_status(
                &result.order_id,
                Some(&result.request_id),
                TransactionStatus::Completed,
                provider_fields(result),
            )
            .await?;
        if updated {
            tracing::info!(order_id = %result.order_id, "Completed interrupted transaction record");
        }
        Ok(())
    }
}

fn provider_fields(result: &PaymentResult) -> ProviderFields {
    ProviderFields {
        provider_transaction_id: result.trans_id.clone(),
        result_code: Some(result.result_code.value()),
        message: Some(result.message.clone()),
    }
}

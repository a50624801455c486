//! Order aggregate - the local view of an order the gateway reconciles.

use crate::domain::foundation::{
    DomainError, ErrorCode, MinorUnits, OrderId, RequestId, StateMachine, Timestamp,
};
use serde::{Deserialize, Serialize};

use super::OrderStatus;

/// Payment-relevant projection of an order owned by the order-management
/// platform.
///
/// Mutations stage their changes in memory. Nothing is durable until the
/// aggregate is handed to `OrderRepository::commit`, which persists status,
/// metadata, and staged notes together, guarded by `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    total: MinorUnits,
    status: OrderStatus,
    provider_transaction_id: Option<String>,
    pay_type: Option<String>,
    request_id: Option<RequestId>,
    /// Sum of refunds submitted to MoMo and not rejected.
    #[serde(default)]
    refunded: MinorUnits,
    version: i64,
    updated_at: Timestamp,
    #[serde(skip)]
    staged_notes: Vec<String>,
}

impl Order {
    /// Creates a new order awaiting payment.
    pub fn new(id: OrderId, total: MinorUnits) -> Self {
        Self {
            id,
            total,
            status: OrderStatus::PendingPayment,
            provider_transaction_id: None,
            pay_type: None,
            request_id: None,
            refunded: MinorUnits::zero(),
            version: 0,
            updated_at: Timestamp::now(),
            staged_notes: Vec::new(),
        }
    }

    /// Reconstitutes an order from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: OrderId,
        total: MinorUnits,
        status: OrderStatus,
        provider_transaction_id: Option<String>,
        pay_type: Option<String>,
        request_id: Option<RequestId>,
        version: i64,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            total,
            status,
            provider_transaction_id,
            pay_type,
            request_id,
            refunded: MinorUnits::zero(),
            version,
            updated_at,
            staged_notes: Vec::new(),
        }
    }

    /// Sets the refunded total read from persistence.
    pub fn with_refunded_amount(mut self, refunded: MinorUnits) -> Self {
        self.refunded = refunded;
        self
    }

    // ════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Total amount the customer must pay, in minor units.
    pub fn total_amount(&self) -> MinorUnits {
        self.total
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// True once payment has been confirmed.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn provider_transaction_id(&self) -> Option<&str> {
        self.provider_transaction_id.as_deref()
    }

    pub fn pay_type(&self) -> Option<&str> {
        self.pay_type.as_deref()
    }

    /// Request id of the most recent payment attempt.
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn refunded_amount(&self) -> MinorUnits {
        self.refunded
    }

    /// What can still be refunded: the total less refunds already submitted.
    pub fn refundable_amount(&self) -> MinorUnits {
        self.total.saturating_sub(self.refunded)
    }

    /// Version read from storage; used as the compare-and-set guard.
    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Notes added since the order was loaded.
    pub fn staged_notes(&self) -> &[String] {
        &self.staged_notes
    }

    /// The order as storage holds it after a successful commit.
    pub fn committed(&self) -> Self {
        let mut next = self.clone();
        next.version += 1;
        next.staged_notes.clear();
        next
    }

    // ════════════════════════════════════════════════════════════════════════
    // Mutations
    // ════════════════════════════════════════════════════════════════════════

    /// Starts a new payment attempt.
    pub fn await_payment(&mut self, request_id: RequestId) -> Result<(), DomainError> {
        self.transition_to(OrderStatus::PendingPayment)?;
        self.annotate(format!(
            "Awaiting MoMo payment confirmation. Request ID: {}",
            request_id
        ));
        self.request_id = Some(request_id);
        Ok(())
    }

    /// Records a confirmed payment.
    pub fn mark_paid(
        &mut self,
        provider_transaction_id: impl Into<String>,
        pay_type: Option<String>,
    ) -> Result<(), DomainError> {
        self.transition_to(OrderStatus::Paid)?;
        self.provider_transaction_id = Some(provider_transaction_id.into());
        self.pay_type = pay_type;
        Ok(())
    }

    /// Records a failed attempt with a human-readable reason.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        self.transition_to(OrderStatus::Failed)?;
        self.annotate(reason);
        Ok(())
    }

    /// Reserves part of a paid order's total for a refund.
    ///
    /// Reserved before the provider is called, so concurrent or repeated
    /// requests can never refund more than was paid.
    pub fn reserve_refund(&mut self, amount: MinorUnits) -> Result<(), DomainError> {
        if !self.is_terminal() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Order {} is not paid", self.id),
            ));
        }
        let refundable = self.refundable_amount();
        if amount.value() == 0 || amount > refundable {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                format!(
                    "Refund of {} is not between 1 and the refundable {}",
                    amount, refundable
                ),
            )
            .with_detail("refundable", refundable.to_string()));
        }
        self.refunded = self.refunded.checked_add(amount).ok_or_else(|| {
            DomainError::new(ErrorCode::ValidationFailed, "Refund total overflows")
        })?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Returns a reservation the provider rejected.
    pub fn release_refund(&mut self, amount: MinorUnits) {
        self.refunded = self.refunded.saturating_sub(amount);
        self.updated_at = Timestamp::now();
    }

    /// Stages a note for the order's history.
    pub fn annotate(&mut self, note: impl Into<String>) {
        self.staged_notes.push(note.into());
        self.updated_at = Timestamp::now();
    }

    fn transition_to(&mut self, target: OrderStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition order {} from {:?} to {:?}",
                    self.id, self.status, target
                ),
            )
            .with_detail("from", self.status.as_str())
            .with_detail("to", target.as_str())
        })?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

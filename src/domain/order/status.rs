//! Order payment status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Payment-relevant status of an order in the order-management platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created or re-attempted; awaiting a payment result.
    PendingPayment,

    /// Payment confirmed. Terminal.
    Paid,

    /// Last attempt failed. A new attempt moves it back to pending.
    Failed,
}

impl OrderStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_payment" => Some(OrderStatus::PendingPayment),
            "paid" => Some(OrderStatus::Paid),
            "failed" => Some(OrderStatus::Failed),
            _ => None,
        }
    }
}

impl StateMachine for OrderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            // From PENDING_PAYMENT
            (PendingPayment, Paid)
                | (PendingPayment, Failed)
                | (PendingPayment, PendingPayment) // Re-submitted attempt
            // From FAILED
                | (Failed, PendingPayment)
                | (Failed, Paid) // Late success for money already taken
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            PendingPayment => vec![Paid, Failed, PendingPayment],
            Failed => vec![PendingPayment, Paid],
            Paid => vec![],
        }
    }
}

//! Result of reconciling an authenticated payment result.

use serde::Serialize;

use super::result_code::ResultCode;
use crate::domain::foundation::MinorUnits;

/// What reconciliation did with a verified payment result.
///
/// Every variant is acknowledged to MoMo as delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Order marked paid and the transaction record completed.
    Completed,

    /// Order was already resolved; nothing changed.
    AlreadyProcessed,

    /// Success reported for the wrong amount. Order left unpaid and annotated.
    AmountMismatch {
        expected: MinorUnits,
        received: MinorUnits,
    },

    /// Provider reported a non-success code. Order marked failed.
    Failed { code: ResultCode, message: String },
}

impl Outcome {
    /// Short label for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::AlreadyProcessed => "already_processed",
            Outcome::AmountMismatch { .. } => "amount_mismatch",
            Outcome::Failed { .. } => "failed",
        }
    }
}

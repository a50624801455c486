//! Transaction records - one per payment attempt.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    MinorUnits, OrderId, RequestId, StateMachine, Timestamp, TransactionRecordId,
};

/// Lifecycle of a transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

impl StateMachine for TransactionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TransactionStatus::*;
        matches!((self, target), (Pending, Completed) | (Pending, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionStatus::*;
        match self {
            Pending => vec![Completed, Failed],
            Completed | Failed => vec![],
        }
    }
}

/// Provider-reported fields written when a record is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderFields {
    pub provider_transaction_id: Option<String>,
    pub result_code: Option<i64>,
    pub message: Option<String>,
}

/// A persisted payment attempt and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub id: TransactionRecordId,
    pub order_id: OrderId,
    pub request_id: RequestId,
    /// Request id echoed back by MoMo on creation.
    pub reference_id: Option<String>,
    pub amount: MinorUnits,
    pub status: TransactionStatus,
    pub provider_transaction_id: Option<String>,
    pub result_code: Option<i64>,
    pub message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TransactionRecord {
    /// Creates a pending record for an acknowledged creation request.
    pub fn pending(
        order_id: OrderId,
        request_id: RequestId,
        reference_id: Option<String>,
        amount: MinorUnits,
        creation: ProviderFields,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: TransactionRecordId::new(),
            order_id,
            request_id,
            reference_id,
            amount,
            status: TransactionStatus::Pending,
            provider_transaction_id: creation.provider_transaction_id,
            result_code: creation.result_code,
            message: creation.message,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves a pending record to its final status.
    ///
    /// Returns false, leaving the record untouched, if it was already resolved.
    pub fn resolve(&mut self, status: TransactionStatus, fields: ProviderFields) -> bool {
        let Ok(next) = self.status.transition_to(status) else {
            return false;
        };
        self.status = next;
        if fields.provider_transaction_id.is_some() {
            self.provider_transaction_id = fields.provider_transaction_id;
        }
        self.result_code = fields.result_code;
        self.message = fields.message;
        self.updated_at = Timestamp::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_record() -> TransactionRecord {
        TransactionRecord::pending(
            OrderId::new("1001").unwrap(),
            RequestId::new("1001_1").unwrap(),
            Some("1001_1".to_string()),
            MinorUnits::new(100_000).unwrap(),
            ProviderFields {
                result_code: Some(0),
                message: Some("Successful.".to_string()),
                ..Default::default()
            },
        )
    }

    #[test]
    fn new_record_is_pending() {
        let record = pending_record();
        assert_eq!(record.status, TransactionStatus::Pending);
        assert_eq!(record.result_code, Some(0));
        assert_eq!(record.provider_transaction_id, None);
    }

    #[test]
    fn resolve_completes_pending_record() {
        let mut record = pending_record();
        let changed = record.resolve(
            TransactionStatus::Completed,
            ProviderFields {
                provider_transaction_id: Some("T1".to_string()),
                result_code: Some(0),
                message: Some("Successful.".to_string()),
            },
        );

        assert!(changed);
        assert_eq!(record.status, TransactionStatus::Completed);
        assert_eq!(record.provider_transaction_id.as_deref(), Some("T1"));
    }

    #[test]
    fn resolve_is_a_no_op_once_resolved() {
        let mut record = pending_record();
        record.resolve(TransactionStatus::Failed, ProviderFields::default());

        let changed = record.resolve(
            TransactionStatus::Completed,
            ProviderFields {
                provider_transaction_id: Some("T2".to_string()),
                ..Default::default()
            },
        );

        assert!(!changed);
        assert_eq!(record.status, TransactionStatus::Failed);
        assert_eq!(record.provider_transaction_id, None);
    }

    #[test]
    fn status_storage_form_round_trips() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Failed,
        ] {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
    }
}

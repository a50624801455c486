//! Transaction store port - one record per payment attempt.
//!
//! Updates are keyed by order id. This is correct only because an order has
//! at most one pending attempt: `insert` refuses a second one, and the
//! gateway supersedes the old attempt before recording a new one. Passing a
//! request id narrows the update to that attempt.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId, RequestId};
use crate::domain::payment::{ProviderFields, TransactionRecord, TransactionStatus};

/// Repository port for transaction records.
///
/// Implementations must be safe under concurrent `update_status` calls for
/// the same order: only records still `pending` may change.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Insert a new record.
    ///
    /// Fails if the request id exists, or if the record is pending while
    /// another attempt for the order is still pending.
    async fn insert(&self, record: &TransactionRecord) -> Result<(), DomainError>;

    /// Resolve the most recent pending record for an order.
    ///
    /// Returns `false` if no pending record matched.
    async fn update_status(
        &self,
        order_id: &OrderId,
        request_id: Option<&RequestId>,
        status: TransactionStatus,
        fields: ProviderFields,
    ) -> Result<bool, DomainError>;

    /// Most recent record for an order.
    async fn find_by_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<TransactionRecord>, DomainError>;

    /// Record for a specific attempt.
    async fn find_by_request_id(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<TransactionRecord>, DomainError>;
}

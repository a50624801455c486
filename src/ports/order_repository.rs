//! Order repository port.
//!
//! The gateway never creates or deletes orders. It reads the payment-relevant
//! view of an order and commits state changes back with an optimistic
//! version check, so two concurrent reconciliations cannot both win.
//!
//! # Example
//!
//! ```ignore
//! let mut order = repo.find_by_id(&order_id).await?.ok_or(NotFound)?;
//! order.mark_paid("2147483647", Some("qr".into()))?;
//! match repo.commit(&order).await? {
//!     CommitOutcome::Committed => { /* done */ }
//!     CommitOutcome::Conflict => { /* reload and re-check */ }
//! }
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::order::Order;

/// Result of a conditional commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Changes persisted; stored version advanced.
    Committed,
    /// Stored version no longer matches the one that was read.
    Conflict,
}

/// Port to the order-management platform's orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Find an order by id.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Persist status, payment metadata and staged notes.
    ///
    /// Succeeds only if the stored version equals `order.version()`.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order no longer exists
    /// - `DatabaseError` on persistence failure
    async fn commit(&self, order: &Order) -> Result<CommitOutcome, DomainError>;
}

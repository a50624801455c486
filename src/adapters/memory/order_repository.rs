//! In-memory order repository.
//!
//! Stands in for the order-management platform in tests and local
//! development. Commits honor the same version guard as PostgreSQL.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId};
use crate::domain::order::Order;
use crate::ports::{CommitOutcome, OrderRepository};

/// In-memory storage for orders and their notes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    notes: Arc<RwLock<HashMap<OrderId, Vec<String>>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an order, as the platform would when a customer checks out.
    pub async fn insert(&self, order: Order) {
        self.orders.write().await.insert(order.id().clone(), order);
    }

    /// Notes committed for an order, oldest first.
    pub async fn notes(&self, id: &OrderId) -> Vec<String> {
        self.notes.read().await.get(id).cloned().unwrap_or_default()
    }

    /// Number of stored orders
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn commit(&self, order: &Order) -> Result<CommitOutcome, DomainError> {
        let mut orders = self.orders.write().await;
        let stored = orders.get(order.id()).ok_or_else(|| {
            DomainError::new(
                ErrorCode::OrderNotFound,
                format!("Order not found: {}", order.id()),
            )
        })?;

        if stored.version() != order.version() {
            return Ok(CommitOutcome::Conflict);
        }

        self.notes
            .write()
            .await
            .entry(order.id().clone())
            .or_default()
            .extend(order.staged_notes().iter().cloned());
        orders.insert(order.id().clone(), order.committed());

        Ok(CommitOutcome::Committed)
    }
}

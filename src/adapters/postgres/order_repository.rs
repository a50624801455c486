//! PostgreSQL implementation of OrderRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{
    DomainError, ErrorCode, MinorUnits, OrderId, RequestId, Timestamp,
};
use crate::domain::order::{Order, OrderStatus};
use crate::ports::{CommitOutcome, OrderRepository};

/// PostgreSQL implementation of the OrderRepository port.
///
/// The `orders` table is owned by the order-management platform; this
/// adapter only reads it and updates payment columns. Commits are guarded by
/// `version` and write staged notes in the same database transaction.
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    total_minor_units: i64,
    status: String,
    provider_transaction_id: Option<String>,
    pay_type: Option<String>,
    request_id: Option<String>,
    refunded_minor_units: i64,
    version: i64,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let id = OrderId::new(row.id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid order id: {}", e))
        })?;
        let total = MinorUnits::new(row.total_minor_units).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid order total: {}", e))
        })?;
        let request_id = row
            .request_id
            .filter(|r| !r.trim().is_empty())
            .map(RequestId::new)
            .transpose()
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid request id: {}", e))
            })?;

        let refunded = MinorUnits::new(row.refunded_minor_units).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid refunded amount: {}", e))
        })?;

        Ok(Order::reconstitute(
            id,
            total,
            parse_status(&row.status)?,
            row.provider_transaction_id,
            row.pay_type,
            request_id,
            row.version,
            Timestamp::from_datetime(row.updated_at),
        )
        .with_refunded_amount(refunded))
    }
}

fn parse_status(s: &str) -> Result<OrderStatus, DomainError> {
    OrderStatus::parse(s).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid order status value: {}", s),
        )
    })
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, total_minor_units, status, provider_transaction_id,
                   pay_type, request_id, refunded_minor_units, version, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find order", e))?;

        row.map(Order::try_from).transpose()
    }

    async fn commit(&self, order: &Order) -> Result<CommitOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = $3,
                provider_transaction_id = $4,
                pay_type = $5,
                request_id = $6,
                refunded_minor_units = $7,
                version = version + 1,
                updated_at = $8
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(order.id().as_str())
        .bind(order.version())
        .bind(order.status().as_str())
        .bind(order.provider_transaction_id())
        .bind(order.pay_type())
        .bind(order.request_id().map(|r| r.as_str()))
        .bind(order.refunded_amount().value())
        .bind(order.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to update order", e))?;

        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT version FROM orders WHERE id = $1")
                .bind(order.id().as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| DomainError::database("Failed to check order", e))?;

            return match exists {
                Some(_) => Ok(CommitOutcome::Conflict),
                None => Err(DomainError::new(
                    ErrorCode::OrderNotFound,
                    format!("Order not found: {}", order.id()),
                )
                .with_detail("order_id", order.id().as_str())),
            };
        }

        for note in order.staged_notes() {
            sqlx::query("INSERT INTO order_notes (order_id, note) VALUES ($1, $2)")
                .bind(order.id().as_str())
                .bind(note)
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::database("Failed to insert order note", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;

        Ok(CommitOutcome::Committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> OrderRow {
        OrderRow {
            id: "1001".to_string(),
            total_minor_units: 100_000,
            status: status.to_string(),
            provider_transaction_id: None,
            pay_type: None,
            request_id: Some("1001_1704067200000".to_string()),
            refunded_minor_units: 0,
            version: 3,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_order() {
        let order = Order::try_from(row("pending_payment")).unwrap();
        assert_eq!(order.id().as_str(), "1001");
        assert_eq!(order.status(), OrderStatus::PendingPayment);
        assert_eq!(order.version(), 3);
        assert_eq!(order.request_id().unwrap().as_str(), "1001_1704067200000");
        assert!(order.staged_notes().is_empty());
    }

    #[test]
    fn blank_request_id_reads_as_none() {
        let mut r = row("failed");
        r.request_id = Some("  ".to_string());
        let order = Order::try_from(r).unwrap();
        assert!(order.request_id().is_none());
    }

    #[test]
    fn refunded_total_is_carried_over() {
        let mut r = row("paid");
        r.refunded_minor_units = 25_000;
        let order = Order::try_from(r).unwrap();
        assert_eq!(order.refundable_amount().value(), 75_000);
    }

    #[test]
    fn unknown_status_is_a_database_error() {
        let err = Order::try_from(row("shipped")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}

//! PostgreSQL implementation of TransactionStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, MinorUnits, OrderId, RequestId, Timestamp, TransactionRecordId,
};
use crate::domain::payment::{ProviderFields, TransactionRecord, TransactionStatus};
use crate::ports::TransactionStore;

/// PostgreSQL implementation of the TransactionStore port.
///
/// Resolution is a conditional `UPDATE ... WHERE status = 'pending'`, so
/// concurrent return and notify handlers cannot both resolve a record.
pub struct PostgresTransactionStore {
    pool: PgPool,
}

impl PostgresTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    order_id: String,
    request_id: String,
    reference_id: Option<String>,
    amount: i64,
    status: String,
    provider_transaction_id: Option<String>,
    result_code: Option<i64>,
    message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for TransactionRecord {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let invalid = |field: &str, e: String| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid {}: {}", field, e))
        };

        Ok(TransactionRecord {
            id: TransactionRecordId::from_uuid(row.id),
            order_id: OrderId::new(row.order_id).map_err(|e| invalid("order_id", e.to_string()))?,
            request_id: RequestId::new(row.request_id)
                .map_err(|e| invalid("request_id", e.to_string()))?,
            reference_id: row.reference_id,
            amount: MinorUnits::new(row.amount).map_err(|e| invalid("amount", e.to_string()))?,
            status: parse_status(&row.status)?,
            provider_transaction_id: row.provider_transaction_id,
            result_code: row.result_code,
            message: row.message,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<TransactionStatus, DomainError> {
    TransactionStatus::parse(s).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid transaction status value: {}", s),
        )
    })
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, order_id, request_id, reference_id, amount, status,
           provider_transaction_id, result_code, message, created_at, updated_at
    FROM payment_transactions
"#;

#[async_trait]
impl TransactionStore for PostgresTransactionStore {
    async fn insert(&self, record: &TransactionRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_transactions (
                id, order_id, request_id, reference_id, amount, status,
                provider_transaction_id, result_code, message, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.order_id.as_str())
        .bind(record.request_id.as_str())
        .bind(&record.reference_id)
        .bind(record.amount.value())
        .bind(record.status.as_str())
        .bind(&record.provider_transaction_id)
        .bind(record.result_code)
        .bind(&record.message)
        .bind(record.created_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to insert transaction", e))?;

        Ok(())
    }

    async fn update_status(
        &self,
        order_id: &OrderId,
        request_id: Option<&RequestId>,
        status: TransactionStatus,
        fields: ProviderFields,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payment_transactions SET
                status = $3,
                provider_transaction_id = COALESCE($4, provider_transaction_id),
                result_code = $5,
                message = $6,
                updated_at = NOW()
            WHERE id = (
                SELECT id FROM payment_transactions
                WHERE order_id = $1
                  AND ($2::VARCHAR IS NULL OR request_id = $2)
                  AND status = 'pending'
                ORDER BY created_at DESC
                LIMIT 1
                FOR UPDATE
            )
              AND status = 'pending'
            "#,
        )
        .bind(order_id.as_str())
        .bind(request_id.map(|r| r.as_str()))
        .bind(status.as_str())
        .bind(&fields.provider_transaction_id)
        .bind(fields.result_code)
        .bind(&fields.message)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to update transaction", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<TransactionRecord>, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "{} WHERE order_id = $1 ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(order_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find transaction", e))?;

        row.map(TransactionRecord::try_from).transpose()
    }

    async fn find_by_request_id(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<TransactionRecord>, DomainError> {
        let row: Option<TransactionRow> =
            sqlx::query_as(&format!("{} WHERE request_id = $1", SELECT_COLUMNS))
                .bind(request_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database("Failed to find transaction", e))?;

        row.map(TransactionRecord::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> TransactionRow {
        let now = Utc::now();
        TransactionRow {
            id: Uuid::new_v4(),
            order_id: "1001".to_string(),
            request_id: "1001_1704067200000".to_string(),
            reference_id: Some("1001_1704067200000".to_string()),
            amount: 100_000,
            status: status.to_string(),
            provider_transaction_id: None,
            result_code: Some(0),
            message: Some("Successful.".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_to_record() {
        let record = TransactionRecord::try_from(row("pending")).unwrap();
        assert_eq!(record.order_id.as_str(), "1001");
        assert_eq!(record.status, TransactionStatus::Pending);
        assert_eq!(record.amount.value(), 100_000);
    }

    #[test]
    fn unknown_status_is_a_database_error() {
        let err = TransactionRecord::try_from(row("refunded")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut bad = row("completed");
        bad.amount = -1;
        assert!(TransactionRecord::try_from(bad).is_err());
    }
}

//! In-memory transaction store.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, RequestId};
use crate::domain::payment::{ProviderFields, TransactionRecord, TransactionStatus};
use crate::ports::TransactionStore;

/// In-memory storage for transaction records, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionStore {
    records: Arc<RwLock<Vec<TransactionRecord>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records for an order, oldest first.
    pub async fn records_for(&self, order_id: &OrderId) -> Vec<TransactionRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| &r.order_id == order_id)
            .cloned()
            .collect()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, record: &TransactionRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.request_id == record.request_id) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Duplicate request id: {}", record.request_id),
            ));
        }
        if record.status == TransactionStatus::Pending
            && records
                .iter()
                .any(|r| r.order_id == record.order_id && r.status == TransactionStatus::Pending)
        {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Order {} already has a pending attempt", record.order_id),
            ));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        order_id: &OrderId,
        request_id: Option<&RequestId>,
        status: TransactionStatus,
        fields: ProviderFields,
    ) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        let latest_pending = records.iter_mut().rev().find(|r| {
            &r.order_id == order_id
                && r.status == TransactionStatus::Pending
                && request_id.map_or(true, |id| &r.request_id == id)
        });
        Ok(latest_pending.map_or(false, |record| record.resolve(status, fields)))
    }

    async fn find_by_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<TransactionRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .rev()
            .find(|r| &r.order_id == order_id)
            .cloned())
    }

    async fn find_by_request_id(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<TransactionRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| &r.request_id == request_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::MinorUnits;

    fn record(order: &str, request: &str) -> TransactionRecord {
        TransactionRecord::pending(
            OrderId::new(order).unwrap(),
            RequestId::new(request).unwrap(),
            Some(request.to_string()),
            MinorUnits::new(100_000).unwrap(),
            ProviderFields::default(),
        )
    }

    fn completed_fields() -> ProviderFields {
        ProviderFields {
            provider_transaction_id: Some("2147483647".to_string()),
            result_code: Some(0),
            message: Some("Successful.".to_string()),
        }
    }

    #[tokio::test]
    async fn duplicate_request_id_is_rejected() {
        let store = InMemoryTransactionStore::new();
        store.insert(&record("1001", "1001_1")).await.unwrap();
        assert!(store.insert(&record("1001", "1001_1")).await.is_err());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_resolves_pending_record_once() {
        let store = InMemoryTransactionStore::new();
        let order_id = OrderId::new("1001").unwrap();
        store.insert(&record("1001", "1001_1")).await.unwrap();

        let first = store
            .update_status(&order_id, None, TransactionStatus::Completed, completed_fields())
            .await
            .unwrap();
        let second = store
            .update_status(
                &order_id,
                None,
                TransactionStatus::Failed,
                ProviderFields::default(),
            )
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
        let stored = store.find_by_order(&order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Completed);
        assert_eq!(stored.provider_transaction_id.as_deref(), Some("2147483647"));
    }

    #[tokio::test]
    async fn request_id_narrows_the_update() {
        let store = InMemoryTransactionStore::new();
        let order_id = OrderId::new("1001").unwrap();
        store.insert(&record("1001", "1001_1")).await.unwrap();

        let other = RequestId::new("1001_9").unwrap();
        let missed = store
            .update_status(
                &order_id,
                Some(&other),
                TransactionStatus::Completed,
                completed_fields(),
            )
            .await
            .unwrap();
        assert!(!missed);

        let target = RequestId::new("1001_1").unwrap();
        let hit = store
            .update_status(
                &order_id,
                Some(&target),
                TransactionStatus::Completed,
                completed_fields(),
            )
            .await
            .unwrap();
        assert!(hit);
    }

    #[tokio::test]
    async fn find_by_order_returns_latest_attempt() {
        let store = InMemoryTransactionStore::new();
        let order_id = OrderId::new("1001").unwrap();
        store.insert(&record("1001", "1001_1")).await.unwrap();
        store
            .update_status(&order_id, None, TransactionStatus::Failed, ProviderFields::default())
            .await
            .unwrap();
        store.insert(&record("1001", "1001_2")).await.unwrap();

        let latest = store.find_by_order(&order_id).await.unwrap().unwrap();
        assert_eq!(latest.request_id.as_str(), "1001_2");
    }

    #[tokio::test]
    async fn find_by_request_id_misses_unknown_attempt() {
        let store = InMemoryTransactionStore::new();
        let found = store
            .find_by_request_id(&RequestId::new("nope").unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn second_pending_attempt_for_order_is_rejected() {
        let store = InMemoryTransactionStore::new();
        store.insert(&record("1001", "1001_1")).await.unwrap();

        assert!(store.insert(&record("1001", "1001_2")).await.is_err());
        store.insert(&record("1002", "1002_1")).await.unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn update_touches_only_one_record() {
        let store = InMemoryTransactionStore::new();
        let order_id = OrderId::new("1001").unwrap();
        store.insert(&record("1001", "1001_1")).await.unwrap();
        store
            .update_status(
                &order_id,
                None,
                TransactionStatus::Failed,
                ProviderFields::default(),
            )
            .await
            .unwrap();
        store.insert(&record("1001", "1001_2")).await.unwrap();

        store
            .update_status(&order_id, None, TransactionStatus::Completed, completed_fields())
            .await
            .unwrap();

        let records = store.records_for(&order_id).await;
        assert_eq!(records[0].status, TransactionStatus::Failed);
        assert_eq!(records[0].provider_transaction_id, None);
        assert_eq!(records[1].status, TransactionStatus::Completed);
    }
}

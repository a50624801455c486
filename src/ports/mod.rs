//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ProviderClient` - Outbound calls to MoMo (create, query, refund)
//! - `TransactionStore` - Per-attempt transaction records
//! - `OrderRepository` - The order-management platform's orders

mod order_repository;
mod provider_client;
mod transaction_store;

pub use order_repository::{CommitOutcome, OrderRepository};
pub use provider_client::{
    ProviderClient, ProviderError, ProviderResponse, QueryRequest, RefundRequest,
};
pub use transaction_store::TransactionStore;

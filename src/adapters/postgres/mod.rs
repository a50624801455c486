//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresOrderRepository` - Payment view of the platform's orders, with
//!   version-guarded commits and order notes
//! - `PostgresTransactionStore` - One row per payment attempt
//!
//! Schema lives in `migrations/`.

mod order_repository;
mod transaction_store;

pub use order_repository::PostgresOrderRepository;
pub use transaction_store::PostgresTransactionStore;

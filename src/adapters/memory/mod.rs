//! In-memory adapters for testing and local development.
//!
//! - `InMemoryOrderRepository` - Orders plus committed notes
//! - `InMemoryTransactionStore` - Transaction records

mod order_repository;
mod transaction_store;

pub use order_repository::InMemoryOrderRepository;
pub use transaction_store::InMemoryTransactionStore;

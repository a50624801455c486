//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `momo` - MoMo v2 gateway API client (and a mock)
//! - `postgres` - Order and transaction persistence
//! - `memory` - In-memory stores for tests and local development
//! - `http` - Axum routes for checkout, callbacks, status and refunds

pub mod http;
pub mod memory;
pub mod momo;
pub mod postgres;

pub use memory::{InMemoryOrderRepository, InMemoryTransactionStore};
pub use momo::{MockProviderClient, MomoConfig, MomoProviderClient};
pub use postgres::{PostgresOrderRepository, PostgresTransactionStore};

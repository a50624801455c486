//! MoMo payment provider adapter.
//!
//! Implements the `ProviderClient` port for the MoMo v2 gateway API:
//! - Payment creation (checkout URL)
//! - Transaction status query
//! - Refund
//!
//! # Configuration
//!
//! Partner code, access key and secret key come from the MoMo business
//! portal. Sandbox and production use different base URLs.

mod client;
mod mock;
mod wire_types;

pub use client::{MomoConfig, MomoProviderClient, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
pub use mock::MockProviderClient;
pub use wire_types::{CreatePaymentBody, MomoResponse, QueryBody, RefundBody};

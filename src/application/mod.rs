//! Application layer - use cases over the domain and ports.
//!
//! The payment gateway façade lives here; it coordinates the provider
//! client, the order repository, the transaction store and reconciliation.

pub mod handlers;

pub use handlers::{
    CheckoutRedirect, GatewayError, GatewaySettings, PaymentGateway, PaymentStatusView,
    RefundCommand, RefundOutcome, ReturnRedirect,
};

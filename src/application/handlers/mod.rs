//! Application handlers.
//!
//! Orchestrate domain operations across ports.

pub mod payment;

pub use payment::{
    CheckoutRedirect, GatewayError, GatewaySettings, PaymentGateway, PaymentStatusView,
    RefundCommand, RefundOutcome, ReturnRedirect,
};

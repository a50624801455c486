//! Payment handlers - the gateway façade.
//!
//! `PaymentGateway` is the single entry point the HTTP adapter talks to:
//!
//! - `process_payment` - create a MoMo payment and return the pay URL
//! - `handle_return` - browser return, always answered with a redirect
//! - `handle_notify` - IPN, answered with an acknowledgment
//! - `check_payment_status` - query MoMo for the latest attempt
//! - `refund` - refund a paid order, or flag it for manual refund

mod browser_return;
mod check_status;
mod errors;
mod gateway;
mod process_payment;
mod refund;

pub use browser_return::ReturnRedirect;
pub use check_status::PaymentStatusView;
pub use errors::GatewayError;
pub use gateway::{GatewaySettings, PaymentGateway};
pub use process_payment::CheckoutRedirect;
pub use refund::{RefundCommand, RefundOutcome};

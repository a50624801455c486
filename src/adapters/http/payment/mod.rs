//! HTTP adapter for payment endpoints.
//!
//! - `POST /payments/orders/:order_id/checkout` - Create a MoMo payment
//! - `GET /payments/orders/:order_id/status` - Query MoMo for the latest attempt
//! - `POST /payments/orders/:order_id/refund` - Refund a paid order
//! - `GET /payments/momo/return` - Browser return from MoMo (redirect only)
//! - `POST /payments/momo/notify` - MoMo IPN

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{PaymentApiError, PaymentAppState};
pub use routes::{momo_routes, order_routes, payment_router};

//! Axum router configuration for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_checkout, get_payment_status, momo_notify, momo_return, refund_order, PaymentAppState,
};

/// Order-facing routes, called by the order-management platform.
///
/// # Routes
/// - `POST /orders/:order_id/checkout` - Create a MoMo payment
/// - `GET /orders/:order_id/status` - Query MoMo for the latest attempt
/// - `POST /orders/:order_id/refund` - Refund a paid order
pub fn order_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/:order_id/checkout", post(create_checkout))
        .route("/:order_id/status", get(get_payment_status))
        .route("/:order_id/refund", post(refund_order))
}

/// MoMo callback routes. Public; every request is authenticated by its
/// signature.
///
/// # Routes
/// - `GET /return` - Browser return
/// - `POST /notify` - IPN
pub fn momo_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/return", get(momo_return))
        .route("/notify", post(momo_notify))
}

/// The complete payment router, suitable for mounting at the root.
///
/// ```ignore
/// let app = payment_router().with_state(PaymentAppState::new(gateway));
/// ```
pub fn payment_router() -> Router<PaymentAppState> {
    Router::new()
        .nest("/payments/orders", order_routes())
        .nest("/payments/momo", momo_routes())
}

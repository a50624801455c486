//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to the `PaymentGateway` façade.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use crate::application::{GatewayError, PaymentGateway, RefundCommand};
use crate::domain::foundation::{MinorUnits, OrderId};
use crate::domain::payment::{RawPaymentResult, ReconciliationError};

use super::dto::{
    CheckoutResponse, ErrorResponse, NotifyAck, PaymentStatusResponse, RefundOrderRequest,
    RefundResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for payment routes.
#[derive(Clone)]
pub struct PaymentAppState {
    pub gateway: Arc<PaymentGateway>,
}

impl PaymentAppState {
    pub fn new(gateway: Arc<PaymentGateway>) -> Self {
        Self { gateway }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Order Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /payments/orders/:order_id/checkout - Create a MoMo payment
pub async fn create_checkout(
    State(state): State<PaymentAppState>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let order_id = parse_order_id(&order_id)?;
    let redirect = state.gateway.process_payment(&order_id).await?;
    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(redirect))))
}

/// GET /payments/orders/:order_id/status - Query MoMo for the latest attempt
pub async fn get_payment_status(
    State(state): State<PaymentAppState>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let order_id = parse_order_id(&order_id)?;
    let view = state.gateway.check_payment_status(&order_id).await?;
    Ok(Json(PaymentStatusResponse::from(view)))
}

/// POST /payments/orders/:order_id/refund - Refund a paid order
pub async fn refund_order(
    State(state): State<PaymentAppState>,
    Path(order_id): Path<String>,
    Json(request): Json<RefundOrderRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let order_id = parse_order_id(&order_id)?;
    let amount = request
        .amount
        .map(MinorUnits::new)
        .transpose()
        .map_err(|e| PaymentApiError::bad_request(e.to_string()))?;

    let outcome = state
        .gateway
        .refund(RefundCommand {
            order_id,
            amount,
            reason: request.reason,
        })
        .await?;

    Ok(Json(RefundResponse { outcome }))
}

// ════════════════════════════════════════════════════════════════════════════════
// MoMo Callbacks (public, signature verified)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /payments/momo/return - Customer's browser coming back from MoMo
///
/// Always answers with a redirect.
pub async fn momo_return(
    State(state): State<PaymentAppState>,
    query: Result<Query<RawPaymentResult>, QueryRejection>,
) -> Redirect {
    let raw = match query {
        Ok(Query(raw)) => raw,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Unreadable MoMo return query");
            RawPaymentResult::default()
        }
    };

    let redirect = state.gateway.handle_return(&raw).await;
    Redirect::to(redirect.location())
}

/// POST /payments/momo/notify - MoMo IPN
///
/// MoMo retries until it receives a success acknowledgment, so every
/// reconciled outcome is acknowledged.
pub async fn momo_notify(
    State(state): State<PaymentAppState>,
    body: Bytes,
) -> Result<impl IntoResponse, PaymentApiError> {
    let raw: RawPaymentResult = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Unreadable MoMo IPN body");
        ReconciliationError::MalformedPayload(e.to_string())
    })?;

    let outcome = state.gateway.handle_notify(&raw).await?;
    Ok((StatusCode::OK, Json(NotifyAck::success(&outcome))))
}

fn parse_order_id(raw: &str) -> Result<OrderId, PaymentApiError> {
    OrderId::new(raw).map_err(|e| PaymentApiError::bad_request(e.to_string()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts gateway errors to HTTP responses.
pub enum PaymentApiError {
    Gateway(GatewayError),
    BadRequest(String),
}

impl PaymentApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        PaymentApiError::BadRequest(message.into())
    }
}

impl From<GatewayError> for PaymentApiError {
    fn from(err: GatewayError) -> Self {
        PaymentApiError::Gateway(err)
    }
}

impl From<ReconciliationError> for PaymentApiError {
    fn from(err: ReconciliationError) -> Self {
        PaymentApiError::Gateway(GatewayError::Reconciliation(err))
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            PaymentApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_FAILED", message),
            ),
            PaymentApiError::Gateway(err) => {
                (err.status_code(), ErrorResponse::new(err.code(), err.user_message()))
            }
        };
        (status, Json(body)).into_response()
    }
}

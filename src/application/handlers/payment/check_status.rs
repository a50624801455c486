//! Status query against MoMo for the latest attempt on an order.

use serde::Serialize;

use super::errors::GatewayError;
use super::gateway::PaymentGateway;
use crate::domain::foundation::{OrderId, RequestId};
use crate::domain::order::OrderStatus;
use crate::domain::payment::{ResultCode, TransactionStatus};
use crate::ports::QueryRequest;

/// Local and provider view of an order's latest payment attempt.
///
/// Informational only. The provider's answer is not applied to the order;
/// only signed results do that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentStatusView {
    pub order_id: OrderId,
    pub order_status: OrderStatus,
    pub request_id: RequestId,
    pub transaction_status: TransactionStatus,
    pub provider_result_code: ResultCode,
    pub provider_message: String,
    pub provider_transaction_id: Option<String>,
    pub pay_type: Option<String>,
}

impl PaymentGateway {
    pub async fn check_payment_status(
        &self,
        order_id: &OrderId,
    ) -> Result<PaymentStatusView, GatewayError> {
        let order = self.load_order(order_id).await?;
        let record = self
            .transactions
            .find_by_order(order_id)
            .await?
            .ok_or_else(|| GatewayError::NoPaymentAttempt(order_id.clone()))?;

        let response = self
            .provider
            .query_status(&QueryRequest {
                order_id: order_id.clone(),
                request_id: record.request_id.clone(),
            })
            .await
            .map_err(|e| {
                tracing::error!(order_id = %order_id, error = %e, "MoMo status query failed");
                GatewayError::from(e)
            })?;

        tracing::debug!(
            order_id = %order_id,
            request_id = %record.request_id,
            result_code = response.result_code.value(),
            "MoMo status queried"
        );

        Ok(PaymentStatusView {
            order_id: order_id.clone(),
            order_status: order.status(),
            request_id: record.request_id,
            transaction_status: record.status,
            provider_result_code: response.result_code,
            provider_message: response.message,
            provider_transaction_id: response.trans_id,
            pay_type: response.pay_type,
        })
    }
}

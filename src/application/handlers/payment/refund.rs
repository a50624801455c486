//! Refund of a paid order through MoMo.

use serde::Serialize;

use super::errors::GatewayError;
use super::gateway::PaymentGateway;
use crate::domain::foundation::{MinorUnits, OrderId, RequestId, Timestamp};
use crate::domain::payment::ResultCode;
use crate::ports::RefundRequest;

/// Command to refund all or part of an order.
#[derive(Debug, Clone)]
pub struct RefundCommand {
    pub order_id: OrderId,
    /// `None` refunds everything still refundable.
    pub amount: Option<MinorUnits>,
    pub reason: Option<String>,
}

/// What happened to a refund request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RefundOutcome {
    /// MoMo accepted the refund.
    Refunded {
        amount: MinorUnits,
        trans_id: Option<String>,
    },
    /// The account tier has no refund API; an operator must refund in the
    /// MoMo Business portal.
    ManualRefundRequired { amount: MinorUnits },
    /// MoMo answered with a non-zero result code.
    Rejected { code: ResultCode, message: String },
}

impl PaymentGateway {
    /// Refunds part or all of what is still refundable on a paid order.
    ///
    /// The amount is reserved on the order before MoMo is called, so a
    /// retried request can never refund more than was paid. A rejection
    /// releases the reservation; a transport error keeps it until an
    /// operator has checked the MoMo portal. Once MoMo has accepted a
    /// refund the outcome is `Refunded` even if the order note cannot be
    /// written.
    pub async fn refund(&self, cmd: RefundCommand) -> Result<RefundOutcome, GatewayError> {
        let mut order = self.load_order(&cmd.order_id).await?;
        let trans_id = order
            .provider_transaction_id()
            .map(str::to_string)
            .ok_or_else(|| GatewayError::NotRefundable(cmd.order_id.clone()))?;

        let refundable = order.refundable_amount();
        let amount = cmd.amount.unwrap_or(refundable);
        if amount.value() == 0 || amount > refundable {
            return Err(GatewayError::InvalidAmount(format!(
                "{} is not between 1 and the refundable amount {}",
                amount, refundable
            )));
        }
        let reason = cmd
            .reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| format!("Refund for Order #{}", cmd.order_id));

        order.reserve_refund(amount)?;

        if !self.settings.refunds_supported {
            tracing::info!(
                order_id = %cmd.order_id,
                amount = amount.value(),
                "MoMo refund must be processed manually"
            );
            order.annotate(format!(
                "Refund of {} requested. Please process manually through MoMo Business portal. Reason: {}",
                amount, reason
            ));
            self.commit(&order).await?;
            return Ok(RefundOutcome::ManualRefundRequired { amount });
        }

        let request = RefundRequest {
            request_id: RequestId::for_refund(&cmd.order_id, Timestamp::now().as_unix_millis()),
            order_id: cmd.order_id.clone(),
            trans_id,
            amount,
            description: reason,
        };

        // Nothing has been sent yet, so losing this race is safe to retry.
        order.annotate(format!(
            "Refund of {} submitted to MoMo. Request ID: {}",
            amount, request.request_id
        ));
        self.commit(&order).await?;

        tracing::info!(
            order_id = %cmd.order_id,
            request_id = %request.request_id,
            amount = amount.value(),
            "Processing MoMo refund"
        );

        let response = match self.provider.refund(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    order_id = %cmd.order_id,
                    request_id = %request.request_id,
                    error = %e,
                    "MoMo refund call failed, outcome unknown"
                );
                let note = format!(
                    "MoMo refund {} of {} could not be confirmed: {}. Check MoMo Business portal before retrying.",
                    request.request_id, amount, e
                );
                self.annotate_after_refund(&cmd.order_id, note).await;
                return Err(GatewayError::from(e));
            }
        };

        if !response.is_success() {
            tracing::warn!(
                order_id = %cmd.order_id,
                result_code = response.result_code.value(),
                category = ?response.result_code.category(),
                provider_message = %response.message,
                "MoMo rejected refund"
            );
            let message = if response.message.trim().is_empty() {
                response.result_code.message().to_string()
            } else {
                response.message
            };
            let note = format!("MoMo rejected refund of {}: {}", amount, message);
            let released = self
                .amend_order(&cmd.order_id, |order| {
                    order.release_refund(amount);
                    order.annotate(note.clone());
                    Ok(())
                })
                .await;
            if let Err(e) = released {
                tracing::error!(
                    order_id = %cmd.order_id,
                    amount = amount.value(),
                    error = %e,
                    "Could not release rejected refund amount"
                );
            }
            return Ok(RefundOutcome::Rejected {
                code: response.result_code,
                message,
            });
        }

        let note = format!(
            "Refunded {} via MoMo. Refund ID: {}",
            amount,
            response.trans_id.as_deref().unwrap_or_default()
        );
        self.annotate_after_refund(&cmd.order_id, note).await;

        Ok(RefundOutcome::Refunded {
            amount,
            trans_id: response.trans_id,
        })
    }

    /// Writes an order note once MoMo has acted. Failure is logged only.
    async fn annotate_after_refund(&self, order_id: &OrderId, note: String) {
        let written = self
            .amend_order(order_id, |order| {
                order.annotate(note.clone());
                Ok(())
            })
            .await;
        if let Err(e) = written {
            tracing::error!(
                order_id = %order_id,
                note = %note,
                error = %e,
                "Could not record refund on order"
            );
        }
    }
}

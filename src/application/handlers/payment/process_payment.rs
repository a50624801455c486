//! Payment creation: build, sign and submit a request, then record the attempt.
//!
//! An order has at most one pending attempt. Starting a new one retires the
//! previous pending record as failed, so a later result can only resolve the
//! attempt it belongs to.

use serde::Serialize;

use super::errors::GatewayError;
use super::gateway::PaymentGateway;
use crate::domain::foundation::{OrderId, RequestId, Timestamp};
use crate::domain::payment::{
    PaymentRequest, ProviderFields, TransactionRecord, TransactionStatus,
};

/// Where to send the customer to pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRedirect {
    pub pay_url: String,
    pub request_id: RequestId,
}

impl PaymentGateway {
    /// Starts a payment attempt for an order.
    ///
    /// On a transport error nothing is written: the order keeps its state
    /// and no transaction record exists for the attempt. Once MoMo has
    /// answered, a concurrent order update never turns the answer into an
    /// error on its own.
    pub async fn process_payment(
        &self,
        order_id: &OrderId,
    ) -> Result<CheckoutRedirect, GatewayError> {
        let order = self.load_order(order_id).await?;
        if order.is_terminal() {
            return Err(GatewayError::AlreadyPaid(order_id.clone()));
        }

        let request = PaymentRequest {
            request_id: RequestId::for_attempt(order_id, Timestamp::now().as_unix_millis()),
            order_id: order_id.clone(),
            amount: order.total_amount(),
            order_info: format!("Payment for order #{}", order_id),
            redirect_url: self.settings.redirect_url.clone(),
            ipn_url: self.settings.ipn_url.clone(),
            request_type: self.settings.request_type,
            extra_data: String::new(),
        };

        tracing::info!(
            order_id = %order_id,
            request_id = %request.request_id,
            amount = request.amount.value(),
            "Creating MoMo payment"
        );

        let response = self.provider.create_payment(&request).await.map_err(|e| {
            tracing::error!(order_id = %order_id, error = %e, "MoMo payment creation failed");
            GatewayError::from(e)
        })?;

        if !response.is_success() {
            let message = response.result_code.message().to_string();
            tracing::warn!(
                order_id = %order_id,
                result_code = response.result_code.value(),
                category = ?response.result_code.category(),
                provider_message = %response.message,
                "MoMo rejected payment creation"
            );
            let note = format!("MoMo payment failed: {}", message);
            if let Err(e) = self
                .amend_order(order_id, |order| {
                    order.annotate(note.clone());
                    Ok(())
                })
                .await
            {
                tracing::error!(order_id = %order_id, error = %e, "Could not record payment rejection on order");
            }
            return Err(GatewayError::ProviderRejected {
                code: response.result_code,
                message,
            });
        }

        let pay_url = response.pay_url.clone().ok_or_else(|| {
            tracing::error!(order_id = %order_id, "MoMo acknowledged payment without payUrl");
            GatewayError::Transport("MoMo response has no payUrl".to_string())
        })?;

        let record = TransactionRecord::pending(
            order_id.clone(),
            request.request_id.clone(),
            Some(request.request_id.to_string()),
            request.amount,
            ProviderFields {
                provider_transaction_id: response.trans_id.clone(),
                result_code: Some(response.result_code.value()),
                message: Some(response.message.clone()),
            },
        );
        self.supersede_pending_attempt(order_id, &request.request_id)
            .await?;
        self.transactions.insert(&record).await?;

        let request_id = request.request_id;
        let awaited = self
            .amend_order(order_id, |order| order.await_payment(request_id.clone()))
            .await;
        if let Err(err) = awaited {
            // The customer never sees this pay URL, so its record must not
            // stay pending.
            self.retire_attempt(order_id, &request_id, "Abandoned: order could not be updated")
                .await?;
            let order = self.load_order(order_id).await?;
            if order.is_terminal() {
                return Err(GatewayError::AlreadyPaid(order_id.clone()));
            }
            return Err(err);
        }

        Ok(CheckoutRedirect {
            pay_url,
            request_id,
        })
    }

    /// Fails the order's pending attempt, if any, in favour of `next`.
    async fn supersede_pending_attempt(
        &self,
        order_id: &OrderId,
        next: &RequestId,
    ) -> Result<(), GatewayError> {
        let Some(previous) = self.transactions.find_by_order(order_id).await? else {
            return Ok(());
        };
        if previous.status != TransactionStatus::Pending {
            return Ok(());
        }
        tracing::info!(
            order_id = %order_id,
            previous_request_id = %previous.request_id,
            request_id = %next,
            "Superseding pending MoMo attempt"
        );
        self.retire_attempt(order_id, &previous.request_id, &format!("Superseded by {}", next))
            .await
    }

    async fn retire_attempt(
        &self,
        order_id: &OrderId,
        request_id: &RequestId,
        reason: &str,
    ) -> Result<(), GatewayError> {
        self.transactions
            .update_status(
                order_id,
                Some(request_id),
                TransactionStatus::Failed,
                ProviderFields {
                    provider_transaction_id: None,
                    result_code: None,
                    message: Some(reason.to_string()),
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::gateway::test_support::*;
    use super::*;
    use crate::domain::foundation::MinorUnits;
    use crate::domain::order::OrderStatus;
    use crate::domain::payment::{Outcome, ResultCode};
    use crate::ports::{OrderRepository, ProviderError, ProviderResponse, TransactionStore};

    #[tokio::test]
    async fn successful_creation_records_pending_attempt() {
        let f = fixture().await;

        let redirect = f.gateway.process_payment(&order_id()).await.unwrap();

        assert!(redirect.pay_url.starts_with("https://test-payment.momo.vn/"));
        assert!(redirect.request_id.as_str().starts_with("1001_"));

        let record = f
            .transactions
            .find_by_order(&order_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, TransactionStatus::Pending);
        assert_eq!(record.request_id, redirect.request_id);
        assert_eq!(record.amount.value(), 100_000);

        let order = f.orders.find_by_id(&order_id()).await.unwrap().unwrap();
        assert_eq!(order.request_id(), Some(&redirect.request_id));
        let notes = f.orders.notes(&order_id()).await;
        assert!(notes[0].starts_with("Awaiting MoMo payment confirmation"));
    }

    #[tokio::test]
    async fn request_carries_order_total_and_callbacks() {
        let f = fixture().await;

        f.gateway.process_payment(&order_id()).await.unwrap();

        let sent = &f.provider.created()[0];
        assert_eq!(sent.amount, MinorUnits::new(100_000).unwrap());
        assert_eq!(sent.order_info, "Payment for order #1001");
        assert_eq!(sent.redirect_url, settings().redirect_url);
        assert_eq!(sent.ipn_url, settings().ipn_url);
        assert_eq!(sent.extra_data, "");
    }

    #[tokio::test]
    async fn transport_error_leaves_everything_untouched() {
        let f = fixture().await;
        f.provider
            .set_error("create_payment", ProviderError::transport("timed out"));

        let err = f.gateway.process_payment(&order_id()).await.unwrap_err();

        assert!(matches!(err, GatewayError::Transport(_)));
        assert_eq!(f.transactions.len().await, 0);
        let order = f.orders.find_by_id(&order_id()).await.unwrap().unwrap();
        assert_eq!(order.version(), 0);
        assert!(f.orders.notes(&order_id()).await.is_empty());
    }

    #[tokio::test]
    async fn rejection_annotates_order_without_recording_attempt() {
        let f = fixture().await;
        f.provider
            .set_create_response(ProviderResponse::new(ResultCode::new(41), "Wrong partner"));

        let err = f.gateway.process_payment(&order_id()).await.unwrap_err();

        match err {
            GatewayError::ProviderRejected { code, .. } => assert_eq!(code.value(), 41),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(f.transactions.len().await, 0);
        let notes = f.orders.notes(&order_id()).await;
        assert_eq!(notes.len(), 1);
        assert!(notes[0].starts_with("MoMo payment failed:"));
    }

    #[tokio::test]
    async fn missing_pay_url_is_a_transport_error() {
        let f = fixture().await;
        f.provider
            .set_create_response(ProviderResponse::new(ResultCode::SUCCESS, "Successful."));

        let err = f.gateway.process_payment(&order_id()).await.unwrap_err();

        assert!(matches!(err, GatewayError::Transport(_)));
        assert_eq!(f.transactions.len().await, 0);
    }

    #[tokio::test]
    async fn paid_order_cannot_be_paid_again() {
        let f = fixture().await;
        let mut order = f.orders.find_by_id(&order_id()).await.unwrap().unwrap();
        order.mark_paid("2147483647", None).unwrap();
        f.orders.commit(&order).await.unwrap();

        let err = f.gateway.process_payment(&order_id()).await.unwrap_err();

        assert!(matches!(err, GatewayError::AlreadyPaid(_)));
        assert!(f.provider.created().is_empty());
    }

    #[tokio::test]
    async fn failed_order_can_start_a_new_attempt() {
        let f = fixture().await;
        let mut order = f.orders.find_by_id(&order_id()).await.unwrap().unwrap();
        order.mark_failed("declined").unwrap();
        f.orders.commit(&order).await.unwrap();

        f.gateway.process_payment(&order_id()).await.unwrap();

        let order = f.orders.find_by_id(&order_id()).await.unwrap().unwrap();
        assert_eq!(order.status(), OrderStatus::PendingPayment);
    }

    async fn two_attempts(f: &Fixture) -> (RequestId, RequestId) {
        let first = f.gateway.process_payment(&order_id()).await.unwrap();
        // Request ids carry millisecond timestamps.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = f.gateway.process_payment(&order_id()).await.unwrap();
        (first.request_id, second.request_id)
    }

    #[tokio::test]
    async fn resubmission_supersedes_pending_attempt() {
        let f = fixture().await;

        let (first, second) = two_attempts(&f).await;

        let records = f.transactions.records_for(&order_id()).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].request_id, first);
        assert_eq!(records[0].status, TransactionStatus::Failed);
        assert_eq!(
            records[0].message.as_deref(),
            Some(format!("Superseded by {}", second).as_str())
        );
        assert_eq!(records[1].request_id, second);
        assert_eq!(records[1].status, TransactionStatus::Pending);

        let order = f.orders.find_by_id(&order_id()).await.unwrap().unwrap();
        assert_eq!(order.request_id(), Some(&second));
    }

    #[tokio::test]
    async fn success_after_resubmission_completes_only_the_live_attempt() {
        let f = fixture().await;
        let (_, second) = two_attempts(&f).await;

        let outcome = f
            .gateway
            .handle_notify(&signed_result(second.as_str(), 0, 100_000))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Completed);
        let records = f.transactions.records_for(&order_id()).await;
        assert_eq!(records[0].status, TransactionStatus::Failed);
        assert_eq!(records[0].provider_transaction_id, None);
        assert_eq!(records[1].status, TransactionStatus::Completed);
        assert_eq!(
            records[1].provider_transaction_id.as_deref(),
            Some("2147483647")
        );
    }

    #[tokio::test]
    async fn late_success_for_superseded_attempt_does_not_claim_the_new_one() {
        let f = fixture().await;
        let (first, _) = two_attempts(&f).await;

        f.gateway
            .handle_notify(&signed_result(first.as_str(), 0, 100_000))
            .await
            .unwrap();

        let order = f.orders.find_by_id(&order_id()).await.unwrap().unwrap();
        assert_eq!(order.status(), OrderStatus::Paid);
        let records = f.transactions.records_for(&order_id()).await;
        assert_eq!(records[1].status, TransactionStatus::Pending);
        assert_eq!(records[1].provider_transaction_id, None);
    }

    #[tokio::test]
    async fn attempt_is_abandoned_when_order_cannot_be_updated() {
        let f = conflicting_fixture(settings(), 0).await;

        let err = f.gateway.process_payment(&order_id()).await.unwrap_err();

        assert!(matches!(err, GatewayError::Conflict(_)));
        let records = f.transactions.records_for(&order_id()).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, TransactionStatus::Failed);
        assert!(records[0].message.as_deref().unwrap().starts_with("Abandoned"));
    }

    #[tokio::test]
    async fn rejection_note_failure_still_reports_rejection() {
        let f = conflicting_fixture(settings(), 0).await;
        f.provider
            .set_create_response(ProviderResponse::new(ResultCode::new(41), "Wrong partner"));

        let err = f.gateway.process_payment(&order_id()).await.unwrap_err();

        assert!(matches!(err, GatewayError::ProviderRejected { .. }));
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let f = fixture().await;
        let missing = OrderId::new("404").unwrap();

        let err = f.gateway.process_payment(&missing).await.unwrap_err();

        assert!(matches!(err, GatewayError::NotFound(_)));
        assert!(f.provider.created().is_empty());
    }
}

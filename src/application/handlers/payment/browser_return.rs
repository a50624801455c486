//! Browser return: resolve the result carried in the query string and decide
//! where to send the customer.
//!
//! The response is always a redirect. Payment data and error details never
//! appear in a body.

use super::gateway::{url_with_params, PaymentGateway};
use crate::domain::foundation::OrderId;
use crate::domain::order::OrderStatus;
use crate::domain::payment::{Outcome, RawPaymentResult, ReconciliationError};

/// Where to send the customer's browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnRedirect {
    /// Payment confirmed.
    Confirmation { location: String },
    /// Back to checkout with a notice for the customer.
    Checkout { location: String, notice: String },
}

impl ReturnRedirect {
    pub fn location(&self) -> &str {
        match self {
            ReturnRedirect::Confirmation { location } => location.as_str(),
            ReturnRedirect::Checkout { location, .. } => location.as_str(),
        }
    }
}

impl PaymentGateway {
    /// Resolves a browser return. Never fails; every path ends in a redirect.
    pub async fn handle_return(&self, raw: &RawPaymentResult) -> ReturnRedirect {
        match self.engine.resolve(raw).await {
            Ok(Outcome::Completed) => self.confirmation(raw),
            Ok(Outcome::AlreadyProcessed) => self.after_duplicate(raw).await,
            Ok(Outcome::AmountMismatch { .. }) => self.checkout(
                "Payment amount does not match the order total. Please contact support.",
            ),
            Ok(Outcome::Failed { message, .. }) => {
                self.checkout(format!("Payment failed: {}. Please try again.", message))
            }
            Err(ReconciliationError::Authentication(_)) => {
                self.checkout("Payment could not be verified. Please try again.")
            }
            Err(ReconciliationError::NotFound(_)) => self.checkout("Order not found."),
            Err(err) => {
                tracing::error!(
                    order_id = raw.order_id.as_deref().unwrap_or_default(),
                    error = %err,
                    "Browser return could not be processed"
                );
                self.checkout("Payment failed. Please try again.")
            }
        }
    }

    /// A duplicate lands on confirmation only if the order really is paid.
    async fn after_duplicate(&self, raw: &RawPaymentResult) -> ReturnRedirect {
        let paid = match raw.order_id.as_deref().map(OrderId::new) {
            Some(Ok(id)) => matches!(
                self.orders.find_by_id(&id).await,
                Ok(Some(order)) if order.status() == OrderStatus::Paid
            ),
            _ => false,
        };

        if paid {
            self.confirmation(raw)
        } else {
            self.checkout("Payment failed. Please try again.")
        }
    }

    fn confirmation(&self, raw: &RawPaymentResult) -> ReturnRedirect {
        let order_id = raw.order_id.as_deref().unwrap_or_default();
        ReturnRedirect::Confirmation {
            location: url_with_params(&self.settings.confirmation_url, &[("order_id", order_id)]),
        }
    }

    fn checkout(&self, notice: impl Into<String>) -> ReturnRedirect {
        let notice = notice.into();
        ReturnRedirect::Checkout {
            location: url_with_params(
                &self.settings.checkout_url,
                &[("payment_notice", notice.as_str())],
            ),
            notice,
        }
    }
}

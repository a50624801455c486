//! Outbound payment creation requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::signature::{MerchantIdentity, CREATION_FIELDS};
use crate::domain::foundation::{MinorUnits, OrderId, RequestId, ValidationError};

/// Payment method requested from MoMo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RequestType {
    /// MoMo wallet (app or QR).
    #[default]
    #[serde(rename = "captureWallet")]
    CaptureWallet,
    /// Domestic ATM card via MoMo.
    #[serde(rename = "payWithATM")]
    PayWithAtm,
    /// International credit card via MoMo.
    #[serde(rename = "payWithCC")]
    PayWithCc,
    /// Customer picks the method on the MoMo page.
    #[serde(rename = "payWithMethod")]
    PayWithMethod,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::CaptureWallet => "captureWallet",
            RequestType::PayWithAtm => "payWithATM",
            RequestType::PayWithCc => "payWithCC",
            RequestType::PayWithMethod => "payWithMethod",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "captureWallet" => Ok(RequestType::CaptureWallet),
            "payWithATM" => Ok(RequestType::PayWithAtm),
            "payWithCC" => Ok(RequestType::PayWithCc),
            "payWithMethod" => Ok(RequestType::PayWithMethod),
            other => Err(ValidationError::invalid_format(
                "request_type",
                format!("unsupported request type '{}'", other),
            )),
        }
    }
}

/// One attempt to pay for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub request_id: RequestId,
    pub order_id: OrderId,
    pub amount: MinorUnits,
    pub order_info: String,
    /// Browser-return URL.
    pub redirect_url: String,
    /// IPN URL.
    pub ipn_url: String,
    pub request_type: RequestType,
    pub extra_data: String,
}

impl PaymentRequest {
    /// Canonical string over the creation field set.
    pub fn canonical_string(&self, merchant: &MerchantIdentity) -> String {
        let amount = self.amount.to_string();
        merchant.canonical_string(&CREATION_FIELDS, |field| match field {
            "amount" => Some(amount.as_str()),
            "extraData" => Some(self.extra_data.as_str()),
            "ipnUrl" => Some(self.ipn_url.as_str()),
            "orderId" => Some(self.order_id.as_str()),
            "orderInfo" => Some(self.order_info.as_str()),
            "redirectUrl" => Some(self.redirect_url.as_str()),
            "requestId" => Some(self.request_id.as_str()),
            "requestType" => Some(self.request_type.as_str()),
            _ => None,
        })
    }
}

//! Inbound payment results.
//!
//! A result arrives either as browser-return query parameters or as a JSON
//! IPN body. Both deserialize into the same [`RawPaymentResult`], which keeps
//! every field as received text so the signature can be recomputed over the
//! exact values that were signed.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::errors::ReconciliationError;
use super::result_code::ResultCode;
use super::signature::{MerchantIdentity, RESULT_FIELDS};
use crate::domain::foundation::{MinorUnits, OrderId, RequestId, ValidationError};

/// A payment result exactly as received, before authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPaymentResult {
    #[serde(deserialize_with = "text_or_number")]
    pub partner_code: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub order_id: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub request_id: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub amount: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub order_info: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub order_type: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub trans_id: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub result_code: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub message: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub pay_type: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub response_time: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub extra_data: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub signature: Option<String>,
}

impl RawPaymentResult {
    /// Looks up a signed field by its wire name.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "partnerCode" => &self.partner_code,
            "orderId" => &self.order_id,
            "requestId" => &self.request_id,
            "amount" => &self.amount,
            "orderInfo" => &self.order_info,
            "orderType" => &self.order_type,
            "transId" => &self.trans_id,
            "resultCode" => &self.result_code,
            "message" => &self.message,
            "payType" => &self.pay_type,
            "responseTime" => &self.response_time,
            "extraData" => &self.extra_data,
            "signature" => &self.signature,
            _ => return None,
        };
        value.as_deref()
    }

    /// Canonical string over the result field set.
    pub fn canonical_string(&self, merchant: &MerchantIdentity) -> String {
        merchant.canonical_string(&RESULT_FIELDS, |field| self.field(field))
    }

    /// Fails if any field needed to authenticate and route the result is
    /// absent or blank.
    pub fn require_identity(&self) -> Result<(), ReconciliationError> {
        for name in ["signature", "orderId", "requestId"] {
            if self.field(name).map_or(true, |v| v.trim().is_empty()) {
                return Err(ReconciliationError::Authentication(format!(
                    "missing required field '{}'",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Parses an authenticated result into typed form.
    pub fn parse(&self) -> Result<PaymentResult, ReconciliationError> {
        let malformed = |reason: String| ReconciliationError::MalformedPayload(reason);

        let order_id = OrderId::new(self.order_id.clone().unwrap_or_default())
            .map_err(|e| malformed(e.to_string()))?;
        let request_id = RequestId::new(self.request_id.clone().unwrap_or_default())
            .map_err(|e| malformed(e.to_string()))?;

        let result_code = self
            .result_code
            .as_deref()
            .ok_or_else(|| malformed("missing resultCode".to_string()))?
            .trim()
            .parse::<i64>()
            .map(ResultCode::new)
            .map_err(|_| malformed("resultCode is not an integer".to_string()))?;

        let amount: MinorUnits = self
            .amount
            .as_deref()
            .ok_or_else(|| malformed("missing amount".to_string()))?
            .parse()
            .map_err(|e: ValidationError| malformed(e.to_string()))?;

        Ok(PaymentResult {
            order_id,
            request_id,
            result_code,
            amount,
            trans_id: non_blank(&self.trans_id),
            pay_type: non_blank(&self.pay_type),
            message: self.message.clone().unwrap_or_default(),
            response_time: non_blank(&self.response_time),
        })
    }
}

/// An authenticated, typed payment result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentResult {
    pub order_id: OrderId,
    pub request_id: RequestId,
    pub result_code: ResultCode,
    pub amount: MinorUnits,
    /// MoMo transaction id; present on success.
    pub trans_id: Option<String>,
    pub pay_type: Option<String>,
    pub message: String,
    pub response_time: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Accepts a string, a number, or null. Numbers keep their JSON text form,
/// so `100000` stays `"100000"`.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn merchant() -> MerchantIdentity {
        MerchantIdentity::new("MOMO", "F8BBA842ECF85")
    }

    fn ipn_body() -> Value {
        json!({
            "partnerCode": "MOMO",
            "orderId": "1001",
            "requestId": "1001_1704067200000",
            "amount": 100000,
            "orderInfo": "Payment for order #1001",
            "orderType": "momo_wallet",
            "transId": 2147483647u64,
            "resultCode": 0,
            "message": "Successful.",
            "payType": "qr",
            "responseTime": 1704067260000u64,
            "extraData": "",
            "signature": "abc"
        })
    }

    // ══════════════════════════════════════════════════════════════
    // Deserialization Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn json_numbers_become_decimal_text() {
        let raw: RawPaymentResult = serde_json::from_value(ipn_body()).unwrap();
        assert_eq!(raw.amount.as_deref(), Some("100000"));
        assert_eq!(raw.result_code.as_deref(), Some("0"));
        assert_eq!(raw.trans_id.as_deref(), Some("2147483647"));
        assert_eq!(raw.response_time.as_deref(), Some("1704067260000"));
    }

    #[test]
    fn missing_and_null_fields_are_none() {
        let raw: RawPaymentResult =
            serde_json::from_value(json!({ "orderId": "1", "payType": null })).unwrap();
        assert_eq!(raw.order_id.as_deref(), Some("1"));
        assert_eq!(raw.pay_type, None);
        assert_eq!(raw.signature, None);
    }

    #[test]
    fn canonical_string_uses_configured_credentials() {
        let mut raw: RawPaymentResult = serde_json::from_value(ipn_body()).unwrap();
        raw.partner_code = Some("SOMEONE_ELSE".to_string());

        let canonical = raw.canonical_string(&merchant());
        assert!(canonical.starts_with("accessKey=F8BBA842ECF85&amount=100000&extraData=&"));
        assert!(canonical.contains("&partnerCode=MOMO&"));
        assert!(canonical.ends_with("&resultCode=0&transId=2147483647"));
    }

    // ══════════════════════════════════════════════════════════════
    // Identity and Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn require_identity_rejects_missing_signature() {
        let mut raw: RawPaymentResult = serde_json::from_value(ipn_body()).unwrap();
        raw.signature = None;
        assert!(matches!(
            raw.require_identity(),
            Err(ReconciliationError::Authentication(_))
        ));
    }

    #[test]
    fn require_identity_rejects_blank_order_id() {
        let mut raw: RawPaymentResult = serde_json::from_value(ipn_body()).unwrap();
        raw.order_id = Some("  ".to_string());
        assert!(raw.require_identity().is_err());
    }

    #[test]
    fn parse_produces_typed_result() {
        let raw: RawPaymentResult = serde_json::from_value(ipn_body()).unwrap();
        let result = raw.parse().unwrap();

        assert_eq!(result.order_id.as_str(), "1001");
        assert!(result.result_code.is_success());
        assert_eq!(result.amount.value(), 100_000);
        assert_eq!(result.trans_id.as_deref(), Some("2147483647"));
        assert_eq!(result.pay_type.as_deref(), Some("qr"));
    }

    #[test]
    fn parse_rejects_non_integer_amount() {
        let mut raw: RawPaymentResult = serde_json::from_value(ipn_body()).unwrap();
        raw.amount = Some("100000.5".to_string());
        assert!(matches!(
            raw.parse(),
            Err(ReconciliationError::MalformedPayload(_))
        ));
    }

    #[test]
    fn parse_rejects_non_integer_result_code() {
        let mut raw: RawPaymentResult = serde_json::from_value(ipn_body()).unwrap();
        raw.result_code = Some("ok".to_string());
        assert!(matches!(
            raw.parse(),
            Err(ReconciliationError::MalformedPayload(_))
        ));
    }

    #[test]
    fn parse_treats_blank_trans_id_as_absent() {
        let mut raw: RawPaymentResult = serde_json::from_value(ipn_body()).unwrap();
        raw.trans_id = Some(String::new());
        assert_eq!(raw.parse().unwrap().trans_id, None);
    }
}

//! MoMo API request and response bodies as they appear on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::MinorUnits;
use crate::domain::payment::ResultCode;
use crate::ports::{ProviderError, ProviderResponse};

/// Body of `POST {base}/create`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentBody {
    pub partner_code: String,
    pub access_key: String,
    pub request_id: String,
    pub amount: i64,
    pub order_id: String,
    pub order_info: String,
    pub redirect_url: String,
    pub ipn_url: String,
    pub request_type: String,
    pub extra_data: String,
    pub lang: String,
    pub signature: String,
}

/// Body of `POST {base}/query`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBody {
    pub partner_code: String,
    pub access_key: String,
    pub request_id: String,
    pub order_id: String,
    pub lang: String,
    pub signature: String,
}

/// Body of `POST {base}/refund`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundBody {
    pub partner_code: String,
    pub access_key: String,
    pub request_id: String,
    pub amount: i64,
    pub order_id: String,
    /// MoMo transaction ids are numeric; sent as a number when they parse.
    pub trans_id: Value,
    pub lang: String,
    pub description: String,
    pub signature: String,
}

/// Any MoMo API response. Fields not present for a call are absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoResponse {
    pub result_code: Option<i64>,
    #[serde(default)]
    pub message: String,
    pub pay_url: Option<String>,
    pub data: Option<MomoResponseData>,
    pub request_id: Option<String>,
    pub trans_id: Option<Value>,
    pub amount: Option<i64>,
    pub pay_type: Option<String>,
}

/// Nested `data` object some creation responses carry.
#[derive(Debug, Clone, Deserialize)]
pub struct MomoResponseData {
    pub target: Option<String>,
}

impl MomoResponse {
    /// Converts to the port type. A missing `resultCode` is malformed.
    pub fn into_provider_response(self) -> Result<ProviderResponse, ProviderError> {
        let result_code = self
            .result_code
            .map(ResultCode::new)
            .ok_or_else(|| ProviderError::malformed("response has no resultCode"))?;

        let pay_url = self
            .pay_url
            .filter(|url| !url.is_empty())
            .or_else(|| self.data.and_then(|d| d.target))
            .filter(|url| !url.is_empty());

        let trans_id = match self.trans_id {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Ok(ProviderResponse {
            result_code,
            message: self.message,
            pay_url,
            request_id: self.request_id,
            trans_id,
            amount: self.amount.and_then(|a| MinorUnits::new(a).ok()),
            pay_type: self.pay_type.filter(|p| !p.is_empty()),
        })
    }
}

/// Renders a transaction id as a JSON number when it is numeric.
pub fn trans_id_value(trans_id: &str) -> Value {
    trans_id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(trans_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn creation_response_uses_pay_url() {
        let response: MomoResponse = serde_json::from_value(json!({
            "partnerCode": "MOMO",
            "orderId": "1001",
            "requestId": "1001_1",
            "amount": 100000,
            "responseTime": 1704067200000u64,
            "message": "Successful.",
            "resultCode": 0,
            "payUrl": "https://test-payment.momo.vn/v2/gateway/pay?t=abc"
        }))
        .unwrap();

        let parsed = response.into_provider_response().unwrap();
        assert!(parsed.is_success());
        assert_eq!(
            parsed.pay_url.as_deref(),
            Some("https://test-payment.momo.vn/v2/gateway/pay?t=abc")
        );
        assert_eq!(parsed.request_id.as_deref(), Some("1001_1"));
    }

    #[test]
    fn creation_response_falls_back_to_data_target() {
        let response: MomoResponse = serde_json::from_value(json!({
            "resultCode": 0,
            "message": "Successful.",
            "payUrl": "",
            "data": { "target": "https://provider/pay/abc" }
        }))
        .unwrap();

        let parsed = response.into_provider_response().unwrap();
        assert_eq!(parsed.pay_url.as_deref(), Some("https://provider/pay/abc"));
    }

    #[test]
    fn numeric_trans_id_becomes_text() {
        let response: MomoResponse = serde_json::from_value(json!({
            "resultCode": 0,
            "transId": 2147483647u64,
            "payType": "qr"
        }))
        .unwrap();

        let parsed = response.into_provider_response().unwrap();
        assert_eq!(parsed.trans_id.as_deref(), Some("2147483647"));
        assert_eq!(parsed.message, "");
    }

    #[test]
    fn missing_result_code_is_malformed() {
        let response: MomoResponse =
            serde_json::from_value(json!({ "message": "oops" })).unwrap();
        assert!(matches!(
            response.into_provider_response(),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn trans_id_value_prefers_numbers() {
        assert_eq!(trans_id_value("2147483647"), json!(2147483647));
        assert_eq!(trans_id_value("T1"), json!("T1"));
    }
}

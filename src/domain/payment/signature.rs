//! MoMo request/result signatures.
//!
//! Every message exchanged with MoMo is authenticated by an HMAC-SHA256 over a
//! canonical string: `key=value` pairs joined by `&`, over a fixed field set
//! in fixed lexical order. A field missing from the message is rendered as
//! `key=` rather than omitted.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Fields signed on a payment creation request.
pub const CREATION_FIELDS: [&str; 10] = [
    "accessKey",
    "amount",
    "extraData",
    "ipnUrl",
    "orderId",
    "orderInfo",
    "partnerCode",
    "redirectUrl",
    "requestId",
    "requestType",
];

/// Fields signed on an inbound payment result (browser return or IPN).
pub const RESULT_FIELDS: [&str; 13] = [
    "accessKey",
    "amount",
    "extraData",
    "message",
    "orderId",
    "orderInfo",
    "orderType",
    "partnerCode",
    "payType",
    "requestId",
    "responseTime",
    "resultCode",
    "transId",
];

/// Fields signed on a transaction status query.
pub const QUERY_FIELDS: [&str; 4] = ["accessKey", "orderId", "partnerCode", "requestId"];

/// Fields signed on a refund request.
pub const REFUND_FIELDS: [&str; 7] = [
    "accessKey",
    "amount",
    "description",
    "orderId",
    "partnerCode",
    "requestId",
    "transId",
];

/// The merchant's public credentials.
///
/// `accessKey` and `partnerCode` in every canonical string come from here,
/// never from the message being signed or verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantIdentity {
    pub partner_code: String,
    pub access_key: String,
}

impl MerchantIdentity {
    pub fn new(partner_code: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            partner_code: partner_code.into(),
            access_key: access_key.into(),
        }
    }

    /// Builds a canonical string over `fields`, filling the merchant
    /// credentials and taking every other value from `value_of`.
    ///
    /// This is the only place where an absent field becomes an empty string.
    pub fn canonical_string<'v, F>(&self, fields: &[&str], value_of: F) -> String
    where
        F: Fn(&str) -> Option<&'v str>,
    {
        fields
            .iter()
            .map(|field| {
                let value = match *field {
                    "accessKey" => Some(self.access_key.as_str()),
                    "partnerCode" => Some(self.partner_code.as_str()),
                    other => value_of(other),
                };
                format!("{}={}", field, value.unwrap_or(""))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// HMAC-SHA256 signer/verifier bound to the merchant secret key.
#[derive(Clone)]
pub struct SignatureCodec {
    secret: SecretString,
}

impl SignatureCodec {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Signs a canonical string, returning lower-case hex.
    pub fn sign(&self, canonical: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key");
        mac.update(canonical.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verifies a candidate signature against a canonical string.
    ///
    /// Compares hex text in constant time. Case-sensitive: MoMo signs in
    /// lower-case hex.
    pub fn verify(&self, candidate: &str, canonical: &str) -> bool {
        let expected = self.sign(canonical);
        constant_time_compare(expected.as_bytes(), candidate.as_bytes())
    }
}

impl std::fmt::Debug for SignatureCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureCodec")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

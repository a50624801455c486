//! Payment module - MoMo wire contract and the reconciliation protocol.
//!
//! # Module Organization
//!
//! - `signature` - Canonical strings and HMAC-SHA256 signing
//! - `request` - Outbound payment creation requests
//! - `result` - Inbound payment results (raw and authenticated)
//! - `result_code` - `resultCode` taxonomy and messages
//! - `transaction` - Per-attempt transaction records
//! - `outcome` - What reconciliation did
//! - `reconciliation` - The engine both inbound channels share

mod errors;
mod outcome;
mod reconciliation;
mod request;
mod result;
mod result_code;
mod signature;
mod transaction;

pub use errors::ReconciliationError;
pub use outcome::Outcome;
pub use reconciliation::ReconciliationEngine;
pub use request::{PaymentRequest, RequestType};
pub use result::{PaymentResult, RawPaymentResult};
pub use result_code::{ResultCategory, ResultCode};
pub use signature::{
    MerchantIdentity, SignatureCodec, CREATION_FIELDS, QUERY_FIELDS, REFUND_FIELDS,
    RESULT_FIELDS,
};
pub use transaction::{ProviderFields, TransactionRecord, TransactionStatus};

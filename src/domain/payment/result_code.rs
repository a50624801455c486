//! MoMo `resultCode` taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad classification of a result code, for retry decisions and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCategory {
    Success,
    /// Merchant-side misconfiguration (bad signature, partner code, duplicate request).
    Configuration,
    /// Business-rule rejection (balance, locked account, limits).
    Rejected,
    /// Transaction still in flight at the provider.
    Pending,
    Unknown,
}

/// Integer result code carried by every MoMo response and payment result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCode(i64);

impl ResultCode {
    pub const SUCCESS: ResultCode = ResultCode(0);

    pub fn new(code: i64) -> Self {
        Self(code)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        self.0 == 0
    }

    pub fn category(&self) -> ResultCategory {
        match self.0 {
            0 => ResultCategory::Success,
            12 | 13 | 20 | 21 | 40 | 41 | 42 | 43 | 1005 => ResultCategory::Configuration,
            9 | 1000 | 7000 | 7002 | 9000 => ResultCategory::Pending,
            code if describe(code).is_some() => ResultCategory::Rejected,
            _ => ResultCategory::Unknown,
        }
    }

    /// Human-readable description suitable for an order note.
    pub fn message(&self) -> &'static str {
        describe(self.0).unwrap_or("Unknown error")
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn describe(code: i64) -> Option<&'static str> {
    let message = match code {
        0 => "Successful",
        9 => "Transaction authorized successfully",
        10 => "System is under maintenance",
        11 => "Access denied: service temporarily unavailable",
        12 => "Request ID is invalid",
        13 => "Transaction is duplicated",
        20 => "Bad request: request format is invalid",
        21 => "Amount is invalid",
        40 => "Request ID not found",
        41 => "Partner code is invalid",
        42 => "Checksum is invalid",
        43 => "Request ID has already been used",
        45 => "Account is locked for 5 minutes",
        46 => "Customer has not set up a PIN",
        47 => "Customer exceeded the daily transaction limit",
        48 => "Balance is insufficient",
        49 => "Customer account not found",
        50 => "Account information is invalid",
        51 => "Account is unverified",
        52 => "Customer account is temporarily locked",
        53 => "Customer account is temporarily blocked",
        54 => "Customer account could not be identified",
        99 => "Unknown error",
        1000 => "Transaction initiated, waiting for user confirmation",
        1001 => "Transaction timed out",
        1002 => "Transaction rejected by the issuer",
        1003 => "Transaction exceeds the daily or monthly limit",
        1004 => "Amount is out of the allowed range",
        1005 => "Request URL is invalid",
        1006 => "User access token has expired",
        1007 => "Transaction rejected by MoMo",
        1017 => "Balance is insufficient",
        1026 => "Transaction limit exceeded",
        1080 => "Transaction has already been refunded",
        1081 => "Transaction rejected by the merchant",
        2001 => "Transaction information is invalid",
        2007 => "Transaction failed for another reason",
        3001 => "Card binding failed",
        3002 => "Bound card rejected by its issuer",
        3003 => "Bound card is unusable",
        3004 => "Bound card exceeded its payment limit",
        4001 => "Bank code is invalid",
        7000 => "Transaction is being processed",
        7002 => "Transaction is being processed by the payment provider",
        9000 => "Transaction authorized, waiting for capture",
        _ => return None,
    };
    Some(message)
}

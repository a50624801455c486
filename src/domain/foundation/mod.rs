//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the payment gateway domain.

mod errors;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{OrderId, RequestId, TransactionRecordId};
pub use money::MinorUnits;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;

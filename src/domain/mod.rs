//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `order` - Payment-relevant view of an order
//! - `payment` - Signatures, payment messages and the reconciliation engine

pub mod foundation;
pub mod order;
pub mod payment;

//! MoMo Gateway - e-wallet payment gateway for an online shop
//!
//! Creates signed MoMo payment requests and reconciles the provider's
//! results (browser return and IPN) against shop orders. Every result is
//! authenticated with HMAC-SHA256 before it can touch an order, and
//! redelivered results are applied at most once.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

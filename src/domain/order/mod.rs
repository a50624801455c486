//! Order module - the slice of an order the payment gateway reads and writes.

mod aggregate;
mod status;

pub use aggregate::Order;
pub use status::OrderStatus;

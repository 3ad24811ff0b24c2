//! Order Domain Module
//!
//! Order records, drafts, status lifecycle and display-id formatting.

pub mod models;

pub use models::{date_stamp, Order, OrderDraft, OrderId, OrderStatus};

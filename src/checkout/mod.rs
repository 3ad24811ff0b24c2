//! Checkout Module
//!
//! Splits a unified cart into per-store order drafts and commits them
//! sequentially against the platform, with explicit partial-failure
//! reporting.

pub mod orchestrator;
pub mod splitter;

pub use orchestrator::CheckoutOrchestrator;
pub use splitter::split_cart;

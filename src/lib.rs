//! Localmart Cart & Checkout Engine
//!
//! This library provides the storefront core for a local-marketplace
//! application: guest/user cart reconciliation, multi-store order splitting
//! and checkout orchestration, exposed over a small HTTP surface.

// Domain modules
pub mod backend;
pub mod cart;
pub mod checkout;
pub mod orders;

// Infrastructure
pub mod error;
pub mod router;

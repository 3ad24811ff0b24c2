//! Platform Collaborators
//!
//! The engine delegates persistence, authentication and order sequencing to
//! a hosted backend. This module defines the narrow contracts the core needs
//! (`RemoteBackend`, `OrderLedger`, `AuthProvider`) plus an in-memory
//! implementation used by the server binary and the tests.

pub mod auth;
pub mod ledger;
pub mod memory;
pub mod tables;

use thiserror::Error;

pub use auth::{AuthProvider, AuthUser};
pub use ledger::OrderLedger;
pub use memory::{InMemoryAuth, InMemoryBackend};
pub use tables::{CartRow, RemoteBackend};

/// A failed call against the hosted platform. The message is whatever the
/// platform SDK reported; callers map this into their own error taxonomy.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

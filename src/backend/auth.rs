//! Auth provider contract
//!
//! The reconciler only needs the user id to pick the remote backing store;
//! session establishment and token handling stay inside the platform SDK.

use crate::cart::models::UserId;

/// A signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

/// Read-only view of the current auth session.
pub trait AuthProvider: Send + Sync {
    /// The currently signed-in user, or `None` for an anonymous session.
    fn current_user(&self) -> Option<AuthUser>;
}

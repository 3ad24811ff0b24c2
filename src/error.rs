//! Error taxonomy for the cart and checkout engine
//!
//! Store-level failures (`CartError`) are caught and logged at the
//! reconciler boundary and never crash a caller. Checkout failures
//! (`CheckoutError`) propagate as typed results so the caller can tell
//! "nothing happened" apart from "partially happened".

use thiserror::Error;

use crate::cart::models::StoreId;
use crate::orders::models::OrderId;

/// Failures from the local or remote cart stores.
#[derive(Debug, Error)]
pub enum CartError {
    /// An external call exceeded its timeout ceiling. Never retried
    /// automatically; surfaced as a user-visible "try again" condition.
    #[error("backend call timed out")]
    PersistenceTimeout,

    /// The backing platform rejected or failed the call. The remote store
    /// is unchanged; the in-memory view may be stale until the next fetch.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Failures from the checkout orchestrator.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A client-side precondition failed; rejected before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A checkout step exceeded the timeout ceiling before any order was
    /// persisted.
    #[error("checkout call timed out")]
    Timeout,

    /// The very first order insert failed: nothing was persisted and the
    /// cart is untouched.
    #[error("checkout failed: {0}")]
    Backend(String),

    /// One or more per-store order inserts failed after others succeeded.
    /// Orders listed in `succeeded` remain persisted (no compensating
    /// rollback); the cart retains the lines of `failed_store` and
    /// `remaining` so the buyer can retry those stores.
    #[error("checkout partially failed at store {failed_store}: {reason}")]
    PartialFailure {
        succeeded: Vec<(StoreId, OrderId)>,
        failed_store: StoreId,
        remaining: Vec<StoreId>,
        reason: String,
    },
}

impl From<CartError> for CheckoutError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::PersistenceTimeout => CheckoutError::Timeout,
            CartError::Backend(msg) => CheckoutError::Backend(msg),
        }
    }
}

//! Remote Cart Store
//!
//! Source of truth for an authenticated user's cart. Each stored row is
//! joined with the current product snapshot at read time, so the cart
//! always shows live catalog pricing rather than the price at add time.
//! Every backend call is wrapped with a fixed timeout ceiling; an
//! unresponsive platform becomes a distinguishable timeout error instead of
//! an indefinite hang.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::models::{Cart, CartLine, CartOwner, ProductId, UserId};
use crate::backend::{BackendError, RemoteBackend};
use crate::error::CartError;

/// Ceiling applied to every external call.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-user cart lines held in the platform's `cart_items` table.
#[derive(Clone)]
pub struct RemoteCartStore {
    backend: Arc<dyn RemoteBackend>,
    call_timeout: Duration,
}

impl RemoteCartStore {
    pub fn new(backend: Arc<dyn RemoteBackend>) -> Self {
        Self {
            backend,
            call_timeout: CALL_TIMEOUT,
        }
    }

    /// Overrides the timeout ceiling (tests use a short one).
    pub fn with_timeout(backend: Arc<dyn RemoteBackend>, call_timeout: Duration) -> Self {
        Self {
            backend,
            call_timeout,
        }
    }

    async fn call<T, F>(&self, fut: F) -> Result<T, CartError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(CartError::Backend(err.0)),
            Err(_) => Err(CartError::PersistenceTimeout),
        }
    }

    /// Retrieves all lines for `user`, joining each row with its current
    /// product snapshot. Rows whose product vanished from the catalog are
    /// skipped.
    pub async fn fetch(&self, user: &UserId) -> Result<Cart, CartError> {
        let rows = self.call(self.backend.cart_rows(user)).await?;

        let mut cart = Cart::empty(CartOwner::User {
            user_id: user.clone(),
        });
        for row in rows {
            let snapshot = self
                .call(self.backend.product_snapshot(&row.product_id))
                .await?;
            match snapshot {
                Some(snapshot) => cart.merge_add(CartLine::from_snapshot(&snapshot, row.quantity)),
                None => {
                    warn!(product_id = %row.product_id, "cart row references missing product, skipping");
                }
            }
        }
        Ok(cart)
    }

    /// Quantity currently stored for `(user, product)`, or `None`.
    pub async fn line_quantity(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<Option<u32>, CartError> {
        let rows = self.call(self.backend.cart_rows(user)).await?;
        Ok(rows
            .into_iter()
            .find(|r| &r.product_id == product)
            .map(|r| r.quantity))
    }

    /// Replace-or-insert the line for `(user, product)`.
    pub async fn upsert_line(
        &self,
        user: &UserId,
        product: &ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        self.call(self.backend.upsert_cart_row(user, product, quantity))
            .await
    }

    pub async fn remove_line(&self, user: &UserId, product: &ProductId) -> Result<(), CartError> {
        self.call(self.backend.delete_cart_row(user, product)).await
    }

    /// Removes all lines for the user.
    pub async fn clear(&self, user: &UserId) -> Result<(), CartError> {
        self.call(self.backend.clear_cart_rows(user)).await
    }
}

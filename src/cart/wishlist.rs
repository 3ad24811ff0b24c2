//! Wishlist toggle
//!
//! The one place where row existence is the answer rather than a default:
//! toggling checks whether the `(user, product)` row exists and flips it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::models::{ProductId, UserId};
use super::remote::CALL_TIMEOUT;
use crate::backend::{BackendError, RemoteBackend};
use crate::error::CartError;

/// Outcome of a wishlist toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistChange {
    Added,
    Removed,
}

pub struct Wishlist {
    backend: Arc<dyn RemoteBackend>,
    call_timeout: Duration,
}

impl Wishlist {
    pub fn new(backend: Arc<dyn RemoteBackend>) -> Self {
        Self {
            backend,
            call_timeout: CALL_TIMEOUT,
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

    /// Adds the product to the user's wishlist if absent, removes it if
    /// present.
    pub async fn toggle(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<WishlistChange, CartError> {
        if self.call(self.backend.wishlist_contains(user, product)).await? {
            self.call(self.backend.delete_wishlist_row(user, product))
                .await?;
            Ok(WishlistChange::Removed)
        } else {
            self.call(self.backend.insert_wishlist_row(user, product))
                .await?;
            Ok(WishlistChange::Added)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    #[tokio::test]
    async fn toggle_flips_membership() {
        let wishlist = Wishlist::new(Arc::new(InMemoryBackend::new()));
        let user: UserId = "u1".into();
        let product: ProductId = "p1".into();

        assert_eq!(
            wishlist.toggle(&user, &product).await.unwrap(),
            WishlistChange::Added
        );
        assert_eq!(
            wishlist.toggle(&user, &product).await.unwrap(),
            WishlistChange::Removed
        );
        assert_eq!(
            wishlist.toggle(&user, &product).await.unwrap(),
            WishlistChange::Added
        );
    }
}

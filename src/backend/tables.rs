//! Relational table contract
//!
//! Table-like operations over `cart_items`, `products`, `orders` and
//! `wishlist`. Absent rows come back as `None`/empty results, never as
//! errors; only transport or platform failures surface as [`BackendError`].

use async_trait::async_trait;

use super::BackendError;
use crate::cart::models::{ProductId, ProductSnapshot, UserId};
use crate::orders::models::Order;

/// One stored cart line: `(user, product)` plus quantity. Price and store
/// are joined from the product catalog at read time, so carts always show
/// live pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct CartRow {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The subset of the hosted platform's table API the engine depends on.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// All cart rows for a user, in insertion order.
    async fn cart_rows(&self, user: &UserId) -> Result<Vec<CartRow>, BackendError>;

    /// Replace-or-insert the row for `(user, product)`. Realizes the
    /// at-most-one-line-per-product invariant.
    async fn upsert_cart_row(
        &self,
        user: &UserId,
        product: &ProductId,
        quantity: u32,
    ) -> Result<(), BackendError>;

    async fn delete_cart_row(&self, user: &UserId, product: &ProductId)
        -> Result<(), BackendError>;

    async fn clear_cart_rows(&self, user: &UserId) -> Result<(), BackendError>;

    /// Current catalog snapshot for a product, or `None` if it was removed.
    async fn product_snapshot(
        &self,
        product: &ProductId,
    ) -> Result<Option<ProductSnapshot>, BackendError>;

    async fn insert_order(&self, order: &Order) -> Result<(), BackendError>;

    /// Whether `(user, product)` is on the user's wishlist. Existence is
    /// meaningful here, unlike the other reads.
    async fn wishlist_contains(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<bool, BackendError>;

    async fn insert_wishlist_row(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<(), BackendError>;

    async fn delete_wishlist_row(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<(), BackendError>;
}

//! In-memory platform backend
//!
//! DashMap-backed implementation of the collaborator contracts, used by the
//! server binary for local development and by the tests. Order inserts can
//! be failed per store to drive the checkout saga through its
//! partial-failure paths deterministically.

use dashmap::DashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::auth::{AuthProvider, AuthUser};
use super::ledger::OrderLedger;
use super::tables::{CartRow, RemoteBackend};
use super::BackendError;
use crate::cart::models::{ProductId, ProductSnapshot, StoreId, UserId};
use crate::orders::models::{Order, OrderId};

/// In-memory stand-in for the hosted platform's tables and ledger.
#[derive(Default)]
pub struct InMemoryBackend {
    /// Product catalog, keyed by product id.
    pub products: DashMap<ProductId, ProductSnapshot>,
    /// Cart rows per user, in insertion order.
    cart_items: DashMap<UserId, Vec<CartRow>>,
    /// Persisted orders, keyed by internal order id.
    pub orders: DashMap<OrderId, Order>,
    /// Wishlist membership rows.
    wishlist: DashMap<(UserId, ProductId), ()>,
    /// Orders-per-day counts backing the ledger.
    daily_counts: DashMap<String, u64>,
    /// Stores whose order inserts should fail (test hook).
    failing_stores: DashMap<StoreId, ()>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a catalog product.
    pub fn put_product(&self, snapshot: ProductSnapshot) {
        self.products.insert(snapshot.product_id.clone(), snapshot);
    }

    /// Makes every subsequent order insert for `store` fail.
    pub fn fail_order_inserts_for(&self, store: StoreId) {
        self.failing_stores.insert(store, ());
    }

    /// Orders persisted for a given store, for assertions.
    pub fn orders_for_store(&self, store: &StoreId) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|entry| &entry.value().store_id == store)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl RemoteBackend for InMemoryBackend {
    async fn cart_rows(&self, user: &UserId) -> Result<Vec<CartRow>, BackendError> {
        Ok(self
            .cart_items
            .get(user)
            .map(|rows| rows.clone())
            .unwrap_or_default())
    }

    async fn upsert_cart_row(
        &self,
        user: &UserId,
        product: &ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let mut rows = self.cart_items.entry(user.clone()).or_default();
        if let Some(existing) = rows.iter_mut().find(|r| &r.product_id == product) {
            existing.quantity = quantity;
        } else {
            rows.push(CartRow {
                product_id: product.clone(),
                quantity,
            });
        }
        Ok(())
    }

    async fn delete_cart_row(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<(), BackendError> {
        if let Some(mut rows) = self.cart_items.get_mut(user) {
            rows.retain(|r| &r.product_id != product);
        }
        Ok(())
    }

    async fn clear_cart_rows(&self, user: &UserId) -> Result<(), BackendError> {
        self.cart_items.remove(user);
        Ok(())
    }

    async fn product_snapshot(
        &self,
        product: &ProductId,
    ) -> Result<Option<ProductSnapshot>, BackendError> {
        Ok(self.products.get(product).map(|p| p.clone()))
    }

    async fn insert_order(&self, order: &Order) -> Result<(), BackendError> {
        if self.failing_stores.contains_key(&order.store_id) {
            return Err(BackendError::new(format!(
                "order insert rejected for store {}",
                order.store_id
            )));
        }
        self.orders.insert(order.order_id.clone(), order.clone());
        Ok(())
    }

    async fn wishlist_contains(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<bool, BackendError> {
        Ok(self
            .wishlist
            .contains_key(&(user.clone(), product.clone())))
    }

    async fn insert_wishlist_row(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<(), BackendError> {
        self.wishlist.insert((user.clone(), product.clone()), ());
        Ok(())
    }

    async fn delete_wishlist_row(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<(), BackendError> {
        self.wishlist.remove(&(user.clone(), product.clone()));
        Ok(())
    }
}

#[async_trait]
impl OrderLedger for InMemoryBackend {
    async fn reserve(&self, date_key: &str, count: u32) -> Result<u64, BackendError> {
        let mut entry = self.daily_counts.entry(date_key.to_string()).or_insert(0);
        let start = *entry;
        *entry += u64::from(count);
        Ok(start)
    }
}

/// Switchable auth session for local development and tests.
#[derive(Default)]
pub struct InMemoryAuth {
    session: RwLock<Option<AuthUser>>,
}

impl InMemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: AuthUser) {
        *self.session.write().expect("auth session lock poisoned") = Some(user);
    }

    pub fn sign_out(&self) {
        *self.session.write().expect("auth session lock poisoned") = None;
    }
}

impl AuthProvider for InMemoryAuth {
    fn current_user(&self) -> Option<AuthUser> {
        self.session
            .read()
            .expect("auth session lock poisoned")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn snapshot(product: &str, store: &str, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            product_id: product.into(),
            store_id: store.into(),
            name: product.to_string(),
            unit_price: Decimal::from(price),
            delivery_charge: Decimal::ZERO,
        }
    }

    #[tokio::test]
    async fn upsert_replaces_quantity_instead_of_duplicating() {
        let backend = InMemoryBackend::new();
        let user: UserId = "u1".into();
        let product: ProductId = "p1".into();

        backend.upsert_cart_row(&user, &product, 2).await.unwrap();
        backend.upsert_cart_row(&user, &product, 5).await.unwrap();

        let rows = backend.cart_rows(&user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, 5);
    }

    #[tokio::test]
    async fn cart_rows_preserve_insertion_order() {
        let backend = InMemoryBackend::new();
        let user: UserId = "u1".into();

        backend
            .upsert_cart_row(&user, &"p1".into(), 1)
            .await
            .unwrap();
        backend
            .upsert_cart_row(&user, &"p2".into(), 1)
            .await
            .unwrap();

        let rows = backend.cart_rows(&user).await.unwrap();
        let products: Vec<_> = rows.iter().map(|r| r.product_id.clone()).collect();
        assert_eq!(products, vec![ProductId::from("p1"), ProductId::from("p2")]);
    }

    #[tokio::test]
    async fn missing_product_reads_as_none_not_error() {
        let backend = InMemoryBackend::new();
        backend.put_product(snapshot("p1", "s1", 10));

        assert!(backend
            .product_snapshot(&"p1".into())
            .await
            .unwrap()
            .is_some());
        assert!(backend
            .product_snapshot(&"gone".into())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn ledger_reservations_never_overlap() {
        let backend = InMemoryBackend::new();

        let first = backend.reserve("2026-08-27", 2).await.unwrap();
        let second = backend.reserve("2026-08-27", 3).await.unwrap();
        let other_day = backend.reserve("2026-08-28", 1).await.unwrap();

        assert_eq!(first, 0);
        assert_eq!(second, 2);
        assert_eq!(other_day, 0);
    }
}

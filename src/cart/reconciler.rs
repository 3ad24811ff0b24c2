//! Cart Reconciler
//!
//! Presents one observable cart regardless of authentication state. An
//! anonymous session is backed by the [`LocalCartStore`]; an authenticated
//! session by the [`RemoteCartStore`]. The `Anonymous -> Authenticated`
//! transition fires exactly once per login: the guest cart is abandoned
//! (local storage cleared, not merged) and the unified view switches to the
//! remote contents.
//!
//! Mutations are serialized through an internal async mutex, so an
//! authenticated mutate-then-refetch pair can never interleave with another
//! one; the persisted state always reflects the last mutation. Store
//! failures are caught here and logged; the observable cart may go stale
//! until the next successful fetch but callers never see an error.

use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::local::LocalCartStore;
use super::models::{Cart, CartLine, CartOwner, ProductId, ProductSnapshot, StoreId, UserId};
use super::remote::RemoteCartStore;

enum Mode {
    Anonymous,
    Authenticated { user: UserId },
}

struct State {
    mode: Mode,
    cart: Cart,
}

/// Unified guest/user cart with one-time guest-to-user migration on login.
pub struct CartReconciler {
    local: LocalCartStore,
    remote: RemoteCartStore,
    state: Mutex<State>,
}

impl CartReconciler {
    /// Starts an anonymous session from the persisted guest cart.
    pub fn new(local: LocalCartStore, remote: RemoteCartStore) -> Self {
        let cart = local.load();
        Self {
            local,
            remote,
            state: Mutex::new(State {
                mode: Mode::Anonymous,
                cart,
            }),
        }
    }

    /// Switches the backing store to the user's remote cart. The guest cart
    /// is cleared, not merged; repeated calls for the same user are no-ops.
    pub async fn sign_in(&self, user: UserId) {
        let mut state = self.state.lock().await;
        if let Mode::Authenticated { user: current } = &state.mode {
            if current == &user {
                return;
            }
        }

        self.local.clear();
        info!(user_id = %user, "session authenticated, guest cart abandoned");

        state.cart = match self.remote.fetch(&user).await {
            Ok(cart) => cart,
            Err(err) => {
                warn!(user_id = %user, %err, "failed to fetch remote cart on login");
                Cart::empty(CartOwner::User {
                    user_id: user.clone(),
                })
            }
        };
        state.mode = Mode::Authenticated { user };
    }

    /// Returns to an anonymous session with a fresh guest cart.
    pub async fn sign_out(&self) {
        let mut state = self.state.lock().await;
        state.mode = Mode::Anonymous;
        state.cart = self.local.load();
    }

    /// Adds `quantity` of a product, merging into an existing line if one
    /// exists (quantity-sum, never a duplicate line).
    pub async fn add(&self, snapshot: &ProductSnapshot, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let mut state = self.state.lock().await;
        let state = &mut *state;
        match &state.mode {
            Mode::Anonymous => {
                state.cart.merge_add(CartLine::from_snapshot(snapshot, quantity));
                self.local.save(&state.cart);
            }
            Mode::Authenticated { user } => {
                let user = user.clone();
                let summed = match self.remote.line_quantity(&user, &snapshot.product_id).await {
                    Ok(existing) => existing.unwrap_or(0) + quantity,
                    Err(err) => {
                        warn!(%err, "failed to read existing cart line, skipping add");
                        return;
                    }
                };
                if let Err(err) = self
                    .remote
                    .upsert_line(&user, &snapshot.product_id, summed)
                    .await
                {
                    warn!(%err, "failed to upsert cart line");
                    return;
                }
                self.resync(state, &user).await;
            }
        }
    }

    /// Sets a line's quantity; anything below 1 removes the line.
    pub async fn update_quantity(&self, product_id: &ProductId, quantity: i64) {
        if quantity < 1 {
            self.remove(product_id).await;
            return;
        }
        let mut state = self.state.lock().await;
        let state = &mut *state;
        match &state.mode {
            Mode::Anonymous => {
                state.cart.set_quantity(product_id, quantity);
                self.local.save(&state.cart);
            }
            Mode::Authenticated { user } => {
                let user = user.clone();
                if let Err(err) = self
                    .remote
                    .upsert_line(&user, product_id, quantity as u32)
                    .await
                {
                    warn!(%err, "failed to update cart line quantity");
                    return;
                }
                self.resync(state, &user).await;
            }
        }
    }

    pub async fn remove(&self, product_id: &ProductId) {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        match &state.mode {
            Mode::Anonymous => {
                state.cart.remove(product_id);
                self.local.save(&state.cart);
            }
            Mode::Authenticated { user } => {
                let user = user.clone();
                if let Err(err) = self.remote.remove_line(&user, product_id).await {
                    warn!(%err, "failed to remove cart line");
                    return;
                }
                self.resync(state, &user).await;
            }
        }
    }

    /// Removes every line belonging to one of the given stores. Used by the
    /// checkout orchestrator to release only successfully-ordered stores.
    pub async fn remove_stores(&self, store_ids: &[StoreId]) {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        match &state.mode {
            Mode::Anonymous => {
                state.cart.remove_store_lines(store_ids);
                self.local.save(&state.cart);
            }
            Mode::Authenticated { user } => {
                let user = user.clone();
                let products: Vec<ProductId> = state
                    .cart
                    .lines
                    .iter()
                    .filter(|l| store_ids.contains(&l.store_id))
                    .map(|l| l.product_id.clone())
                    .collect();
                for product in &products {
                    if let Err(err) = self.remote.remove_line(&user, product).await {
                        warn!(%err, product_id = %product, "failed to remove line during store release");
                    }
                }
                self.resync(state, &user).await;
            }
        }
    }

    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        match &state.mode {
            Mode::Anonymous => {
                state.cart.clear();
                self.local.clear();
            }
            Mode::Authenticated { user } => {
                let user = user.clone();
                if let Err(err) = self.remote.clear(&user).await {
                    warn!(%err, "failed to clear remote cart");
                    return;
                }
                self.resync(state, &user).await;
            }
        }
    }

    /// Re-reads the backing store into the observable cart.
    pub async fn refresh(&self) {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        match &state.mode {
            Mode::Anonymous => state.cart = self.local.load(),
            Mode::Authenticated { user } => {
                let user = user.clone();
                self.resync(state, &user).await;
            }
        }
    }

    /// Current unified cart contents.
    pub async fn snapshot(&self) -> Cart {
        self.state.lock().await.cart.clone()
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub async fn total(&self) -> Decimal {
        self.state.lock().await.cart.total()
    }

    /// Number of distinct lines, not total units.
    pub async fn line_count(&self) -> usize {
        self.state.lock().await.cart.line_count()
    }

    pub async fn owner(&self) -> CartOwner {
        self.state.lock().await.cart.owner.clone()
    }

    async fn resync(&self, state: &mut State, user: &UserId) {
        match self.remote.fetch(user).await {
            Ok(cart) => state.cart = cart,
            // Stale view until the next successful fetch.
            Err(err) => warn!(user_id = %user, %err, "cart refetch failed, view is stale"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{InMemoryBackend, RemoteBackend};
    use crate::cart::local::{KvStore, MemoryKv};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn snapshot(product: &str, store: &str, price: i64, delivery: i64) -> ProductSnapshot {
        ProductSnapshot {
            product_id: product.into(),
            store_id: store.into(),
            name: product.to_string(),
            unit_price: Decimal::from(price),
            delivery_charge: Decimal::from(delivery),
        }
    }

    fn reconciler_with(
        backend: Arc<InMemoryBackend>,
        kv: Arc<MemoryKv>,
    ) -> CartReconciler {
        CartReconciler::new(
            LocalCartStore::new(kv, "device-1"),
            RemoteCartStore::new(backend),
        )
    }

    #[tokio::test]
    async fn anonymous_adds_merge_into_one_line() {
        let reconciler = reconciler_with(Arc::new(InMemoryBackend::new()), Arc::new(MemoryKv::new()));
        let apple = snapshot("apple", "s1", 10, 0);

        reconciler.add(&apple, 2).await;
        reconciler.add(&apple, 3).await;

        let cart = reconciler.snapshot().await;
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.line(&"apple".into()).unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn authenticated_adds_merge_into_one_remote_line() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.put_product(snapshot("apple", "s1", 10, 0));
        let reconciler = reconciler_with(backend.clone(), Arc::new(MemoryKv::new()));

        reconciler.sign_in("u1".into()).await;
        reconciler.add(&snapshot("apple", "s1", 10, 0), 2).await;
        reconciler.add(&snapshot("apple", "s1", 10, 0), 3).await;

        let rows = backend.cart_rows(&"u1".into()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, 5);
        assert_eq!(reconciler.line_count().await, 1);
    }

    #[tokio::test]
    async fn quantity_floor_removes_the_line() {
        let reconciler = reconciler_with(Arc::new(InMemoryBackend::new()), Arc::new(MemoryKv::new()));
        let apple = snapshot("apple", "s1", 10, 0);

        reconciler.add(&apple, 2).await;
        reconciler.update_quantity(&"apple".into(), 0).await;
        assert!(reconciler.snapshot().await.is_empty());

        reconciler.add(&apple, 2).await;
        reconciler.update_quantity(&"apple".into(), -1).await;
        assert!(reconciler.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn login_abandons_the_guest_cart() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.put_product(snapshot("remote-item", "s1", 10, 0));
        backend
            .upsert_cart_row(&"u1".into(), &"remote-item".into(), 4)
            .await
            .unwrap();

        let kv = Arc::new(MemoryKv::new());
        let reconciler = reconciler_with(backend, kv.clone());

        reconciler.add(&snapshot("guest-item", "s1", 10, 0), 2).await;
        reconciler.sign_in("u1".into()).await;

        // Unified view is the remote cart; guest lines are gone for good.
        let cart = reconciler.snapshot().await;
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].product_id, ProductId::from("remote-item"));
        assert!(kv.get("localmart.cart.device-1").is_none());

        reconciler.sign_out().await;
        assert!(reconciler.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn sign_in_twice_for_same_user_is_a_noop() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.put_product(snapshot("apple", "s1", 10, 0));
        let reconciler = reconciler_with(backend, Arc::new(MemoryKv::new()));

        reconciler.sign_in("u1".into()).await;
        reconciler.add(&snapshot("apple", "s1", 10, 0), 1).await;
        reconciler.sign_in("u1".into()).await;

        assert_eq!(reconciler.line_count().await, 1);
    }

    #[tokio::test]
    async fn overlapping_updates_persist_the_last_mutation() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.put_product(snapshot("apple", "s1", 10, 0));
        let reconciler = reconciler_with(backend.clone(), Arc::new(MemoryKv::new()));

        reconciler.sign_in("u1".into()).await;
        reconciler.add(&snapshot("apple", "s1", 10, 0), 1).await;

        // Two overlapping updates: serialization means the second mutation
        // is the one left in the backend, and the view agrees after refresh.
        let apple = ProductId::from("apple");
        tokio::join!(
            reconciler.update_quantity(&apple, 5),
            reconciler.update_quantity(&apple, 9),
        );

        let rows = backend.cart_rows(&"u1".into()).await.unwrap();
        assert_eq!(rows[0].quantity, 9);

        reconciler.refresh().await;
        assert_eq!(
            reconciler.snapshot().await.line(&"apple".into()).unwrap().quantity,
            9
        );
    }

    #[tokio::test]
    async fn derived_totals_count_lines_not_units() {
        let reconciler = reconciler_with(Arc::new(InMemoryBackend::new()), Arc::new(MemoryKv::new()));

        reconciler.add(&snapshot("a", "s1", 100, 0), 2).await;
        reconciler.add(&snapshot("b", "s2", 50, 0), 1).await;

        assert_eq!(reconciler.total().await, Decimal::from(250));
        assert_eq!(reconciler.line_count().await, 2);
    }
}

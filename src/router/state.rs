//! Server State Management
//!
//! Holds the platform collaborators and one cart reconciler per browser
//! session, keyed by the `cart_session` cookie.

use dashmap::DashMap;
use std::sync::Arc;

use crate::backend::{AuthProvider, OrderLedger, RemoteBackend};
use crate::cart::local::{KvStore, LocalCartStore};
use crate::cart::reconciler::CartReconciler;
use crate::cart::remote::RemoteCartStore;
use crate::cart::wishlist::Wishlist;
use crate::checkout::CheckoutOrchestrator;

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// Core application state: collaborators plus per-session reconcilers.
pub struct AppState {
    pub backend: Arc<dyn RemoteBackend>,
    pub auth: Arc<dyn AuthProvider>,
    pub orchestrator: CheckoutOrchestrator,
    pub wishlist: Wishlist,
    kv: Arc<dyn KvStore>,
    /// One reconciler per `cart_session` cookie value.
    sessions: DashMap<String, Arc<CartReconciler>>,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn RemoteBackend>,
        ledger: Arc<dyn OrderLedger>,
        auth: Arc<dyn AuthProvider>,
        kv: Arc<dyn KvStore>,
    ) -> Self {
        Self {
            orchestrator: CheckoutOrchestrator::new(backend.clone(), ledger),
            wishlist: Wishlist::new(backend.clone()),
            backend,
            auth,
            kv,
            sessions: DashMap::new(),
        }
    }

    /// The reconciler for a session, created on first use. Each request then
    /// aligns it with the current auth state before touching the cart.
    pub async fn reconciler(&self, session_id: &str) -> Arc<CartReconciler> {
        let reconciler = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                Arc::new(CartReconciler::new(
                    LocalCartStore::new(self.kv.clone(), session_id),
                    RemoteCartStore::new(self.backend.clone()),
                ))
            })
            .clone();

        match self.auth.current_user() {
            Some(user) => reconciler.sign_in(user.id).await,
            None => {
                if matches!(
                    reconciler.owner().await,
                    crate::cart::models::CartOwner::User { .. }
                ) {
                    reconciler.sign_out().await;
                }
            }
        }
        reconciler
    }
}

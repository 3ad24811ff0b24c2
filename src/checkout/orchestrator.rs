//! Checkout Orchestrator
//!
//! Drives the order splitter against the live cart and commits the result
//! as one order record per store. Inserts run sequentially with per-step
//! commit tracking (a saga, not a transaction): a failure part-way through
//! leaves earlier orders persisted and is reported as a distinct
//! partial-failure error naming the store that failed, so the caller can
//! warn the buyer which stores went through. Only the lines of
//! successfully-ordered stores are released from the cart.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::splitter::split_cart;
use crate::backend::{BackendError, OrderLedger, RemoteBackend};
use crate::cart::models::{DeliveryType, ShippingInfo, StoreId};
use crate::cart::reconciler::CartReconciler;
use crate::cart::remote::CALL_TIMEOUT;
use crate::error::CheckoutError;
use crate::orders::models::{date_stamp, OrderId};

pub struct CheckoutOrchestrator {
    backend: Arc<dyn RemoteBackend>,
    ledger: Arc<dyn OrderLedger>,
    call_timeout: Duration,
}

impl CheckoutOrchestrator {
    pub fn new(backend: Arc<dyn RemoteBackend>, ledger: Arc<dyn OrderLedger>) -> Self {
        Self {
            backend,
            ledger,
            call_timeout: CALL_TIMEOUT,
        }
    }

    async fn call<T, F>(&self, fut: F) -> Result<T, CheckoutError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(CheckoutError::Backend(err.0)),
            Err(_) => Err(CheckoutError::Timeout),
        }
    }

    /// Places one order per store present in the cart and clears the ordered
    /// lines. Returns the internal ids of the created orders; an empty cart
    /// checks out as a no-op with no ids and no store mutation.
    pub async fn checkout(
        &self,
        reconciler: &CartReconciler,
        delivery_type: DeliveryType,
        shipping: &ShippingInfo,
    ) -> Result<Vec<OrderId>, CheckoutError> {
        if delivery_type == DeliveryType::Delivery && shipping.address.trim().is_empty() {
            return Err(CheckoutError::Validation(
                "a shipping address is required for delivery orders".to_string(),
            ));
        }

        let cart = reconciler.snapshot().await;
        if cart.is_empty() {
            return Ok(Vec::new());
        }

        let today = Utc::now().date_naive();
        let stamp = date_stamp(today);
        let stores = cart.store_order();

        // Reserve the whole day's sequence range for this checkout up front;
        // concurrent checkouts get disjoint ranges.
        let sequence_start = self
            .call(
                self.ledger
                    .reserve(&today.format("%Y-%m-%d").to_string(), stores.len() as u32),
            )
            .await?;

        let drafts = split_cart(&cart.lines, delivery_type, &stamp, sequence_start);

        let mut succeeded: Vec<(StoreId, OrderId)> = Vec::new();
        let placed_at = Utc::now();
        for (index, draft) in drafts.into_iter().enumerate() {
            let store_id = draft.store_id.clone();
            let display_id = draft.display_id.clone();
            let order = draft.into_order(placed_at);
            let order_id = order.order_id.clone();

            match self.call(self.backend.insert_order(&order)).await {
                Ok(()) => {
                    info!(%store_id, %display_id, "order placed");
                    succeeded.push((store_id, order_id));
                }
                Err(err) => {
                    // No compensating rollback: earlier inserts stay. Release
                    // only the lines of stores that actually got an order.
                    error!(%store_id, %err, "order insert failed");
                    if succeeded.is_empty() {
                        return Err(err);
                    }
                    let released: Vec<StoreId> =
                        succeeded.iter().map(|(s, _)| s.clone()).collect();
                    reconciler.remove_stores(&released).await;
                    return Err(CheckoutError::PartialFailure {
                        succeeded,
                        failed_store: store_id,
                        remaining: stores.into_iter().skip(index + 1).collect(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        reconciler.clear().await;
        Ok(succeeded.into_iter().map(|(_, id)| id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::cart::local::{LocalCartStore, MemoryKv};
    use crate::cart::models::ProductSnapshot;
    use crate::cart::remote::RemoteCartStore;
    use rust_decimal::Decimal;

    fn snapshot(product: &str, store: &str, price: i64, delivery: i64) -> ProductSnapshot {
        ProductSnapshot {
            product_id: product.into(),
            store_id: store.into(),
            name: product.to_string(),
            unit_price: Decimal::from(price),
            delivery_charge: Decimal::from(delivery),
        }
    }

    fn harness() -> (Arc<InMemoryBackend>, CartReconciler, CheckoutOrchestrator) {
        let backend = Arc::new(InMemoryBackend::new());
        let reconciler = CartReconciler::new(
            LocalCartStore::new(Arc::new(MemoryKv::new()), "device-1"),
            RemoteCartStore::new(backend.clone()),
        );
        let orchestrator = CheckoutOrchestrator::new(backend.clone(), backend.clone());
        (backend, reconciler, orchestrator)
    }

    fn delivery_shipping() -> ShippingInfo {
        ShippingInfo {
            name: "Pat".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Market Street".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_cart_checkout_is_a_noop() {
        let (backend, reconciler, orchestrator) = harness();

        let ids = orchestrator
            .checkout(&reconciler, DeliveryType::Delivery, &delivery_shipping())
            .await
            .unwrap();

        assert!(ids.is_empty());
        assert!(backend.orders.is_empty());
        // No sequence was consumed either.
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(backend.reserve(&today, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delivery_without_address_is_rejected_before_any_call() {
        let (backend, reconciler, orchestrator) = harness();
        reconciler.add(&snapshot("p1", "store-a", 10, 2), 1).await;

        let err = orchestrator
            .checkout(&reconciler, DeliveryType::Delivery, &ShippingInfo::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Validation(_)));
        assert!(backend.orders.is_empty());
        assert_eq!(reconciler.line_count().await, 1);
    }

    #[tokio::test]
    async fn self_pick_checkout_needs_no_address() {
        let (_backend, reconciler, orchestrator) = harness();
        reconciler.add(&snapshot("p1", "store-a", 10, 2), 1).await;

        let ids = orchestrator
            .checkout(&reconciler, DeliveryType::SelfPick, &ShippingInfo::default())
            .await
            .unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn multi_store_checkout_creates_one_order_per_store_and_clears_cart() {
        let (backend, reconciler, orchestrator) = harness();

        // Five orders already exist today.
        let today = Utc::now().date_naive();
        backend
            .reserve(&today.format("%Y-%m-%d").to_string(), 5)
            .await
            .unwrap();

        reconciler.add(&snapshot("p1", "store-a", 100, 20), 2).await;
        reconciler.add(&snapshot("p2", "store-a", 50, 0), 1).await;
        reconciler.add(&snapshot("p3", "store-b", 30, 10), 1).await;

        let ids = orchestrator
            .checkout(&reconciler, DeliveryType::Delivery, &delivery_shipping())
            .await
            .unwrap();

        assert_eq!(ids.len(), 2);
        assert!(reconciler.snapshot().await.is_empty());

        let stamp = date_stamp(today);
        let order_a = &backend.orders_for_store(&"store-a".into())[0];
        let order_b = &backend.orders_for_store(&"store-b".into())[0];
        assert_eq!(order_a.display_id, format!("{stamp}6"));
        assert_eq!(order_b.display_id, format!("{stamp}7"));
        assert_eq!(order_a.total_amount, Decimal::from(270));
        assert_eq!(order_b.total_amount, Decimal::from(40));
    }

    #[tokio::test]
    async fn partial_failure_names_the_failed_store_and_keeps_its_lines() {
        let (backend, reconciler, orchestrator) = harness();
        backend.fail_order_inserts_for("store-b".into());

        reconciler.add(&snapshot("p1", "store-a", 100, 0), 1).await;
        reconciler.add(&snapshot("p2", "store-b", 50, 0), 1).await;

        let err = orchestrator
            .checkout(&reconciler, DeliveryType::Delivery, &delivery_shipping())
            .await
            .unwrap_err();

        match err {
            CheckoutError::PartialFailure {
                succeeded,
                failed_store,
                remaining,
                ..
            } => {
                assert_eq!(succeeded.len(), 1);
                assert_eq!(succeeded[0].0, StoreId::from("store-a"));
                assert_eq!(failed_store, StoreId::from("store-b"));
                assert!(remaining.is_empty());
            }
            other => panic!("expected partial failure, got {other:?}"),
        }

        // store-a's order stands; the cart now holds only store-b's line.
        assert_eq!(backend.orders_for_store(&"store-a".into()).len(), 1);
        let cart = reconciler.snapshot().await;
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].store_id, StoreId::from("store-b"));
    }

    #[tokio::test]
    async fn first_insert_failure_is_total_and_leaves_cart_untouched() {
        let (backend, reconciler, orchestrator) = harness();
        backend.fail_order_inserts_for("store-a".into());

        reconciler.add(&snapshot("p1", "store-a", 100, 0), 1).await;
        reconciler.add(&snapshot("p2", "store-b", 50, 0), 1).await;

        let err = orchestrator
            .checkout(&reconciler, DeliveryType::Delivery, &delivery_shipping())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Backend(_)));
        assert!(backend.orders.is_empty());
        assert_eq!(reconciler.line_count().await, 2);
    }
}

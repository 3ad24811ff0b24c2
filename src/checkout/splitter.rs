//! Order Splitter
//!
//! Pure function from a cart snapshot plus checkout options to a list of
//! per-store order drafts. An order never spans stores, so a multi-store
//! cart splits into one draft per distinct store, in the order the stores
//! first appear in the cart. Deterministic: no clock, no ids, no hidden
//! state; the caller supplies the date stamp and the day's running order
//! count.

use rust_decimal::Decimal;

use crate::cart::models::{CartLine, DeliveryType};
use crate::orders::models::{OrderDraft, OrderStatus};

/// Partitions `lines` by store and prices each group.
///
/// `daily_sequence_start` is the count of orders already created systemwide
/// today; drafts receive consecutive display-id sequence numbers continuing
/// from it. Display ids are unique within the day only as far as that count
/// is accurate at call time, which is why the orchestrator reserves the
/// whole range atomically before splitting.
///
/// An empty cart yields an empty draft list, never an error.
pub fn split_cart(
    lines: &[CartLine],
    delivery_type: DeliveryType,
    date_stamp: &str,
    daily_sequence_start: u64,
) -> Vec<OrderDraft> {
    let mut drafts: Vec<OrderDraft> = Vec::new();

    for line in lines {
        let index = match drafts.iter().position(|d| d.store_id == line.store_id) {
            Some(index) => index,
            None => {
                let sequence = daily_sequence_start + 1 + drafts.len() as u64;
                drafts.push(OrderDraft {
                    display_id: format!("{date_stamp}{sequence}"),
                    store_id: line.store_id.clone(),
                    lines: Vec::new(),
                    subtotal: Decimal::ZERO,
                    delivery_charges: Decimal::ZERO,
                    total_amount: Decimal::ZERO,
                    status: OrderStatus::Pending,
                });
                drafts.len() - 1
            }
        };
        let group = &mut drafts[index];

        group.subtotal += line.line_total();
        if delivery_type == DeliveryType::Delivery {
            group.delivery_charges += line.delivery_charge;
        }
        group.lines.push(line.clone());
    }

    for draft in &mut drafts {
        draft.total_amount = draft.subtotal + draft.delivery_charges;
    }
    drafts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::models::StoreId;

    fn line(product: &str, store: &str, price: i64, delivery: i64, qty: u32) -> CartLine {
        CartLine {
            product_id: product.into(),
            store_id: store.into(),
            unit_price: Decimal::from(price),
            delivery_charge: Decimal::from(delivery),
            quantity: qty,
        }
    }

    #[test]
    fn splits_by_store_in_first_seen_order_with_consecutive_sequences() {
        let lines = vec![
            line("p1", "store-a", 10, 0, 1),
            line("p2", "store-a", 10, 0, 1),
            line("p3", "store-b", 10, 0, 1),
        ];

        let drafts = split_cart(&lines, DeliveryType::Delivery, "202687", 5);

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].store_id, StoreId::from("store-a"));
        assert_eq!(drafts[1].store_id, StoreId::from("store-b"));
        assert_eq!(drafts[0].display_id, "2026876");
        assert_eq!(drafts[1].display_id, "2026877");
        assert_eq!(drafts[0].lines.len(), 2);
        assert_eq!(drafts[1].lines.len(), 1);
        assert!(drafts.iter().all(|d| d.status == OrderStatus::Pending));
    }

    #[test]
    fn self_pick_waives_delivery_charges_on_every_draft() {
        let lines = vec![
            line("p1", "store-a", 100, 20, 2),
            line("p2", "store-b", 50, 15, 1),
        ];

        let drafts = split_cart(&lines, DeliveryType::SelfPick, "202687", 0);

        assert!(drafts.iter().all(|d| d.delivery_charges == Decimal::ZERO));
        assert_eq!(drafts[0].total_amount, Decimal::from(200));
        assert_eq!(drafts[1].total_amount, Decimal::from(50));
    }

    #[test]
    fn total_includes_subtotal_plus_delivery_charges() {
        let lines = vec![
            line("p1", "store-a", 100, 20, 2),
            line("p2", "store-a", 50, 0, 1),
        ];

        let drafts = split_cart(&lines, DeliveryType::Delivery, "202687", 0);

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].subtotal, Decimal::from(250));
        assert_eq!(drafts[0].delivery_charges, Decimal::from(20));
        assert_eq!(drafts[0].total_amount, Decimal::from(270));
    }

    #[test]
    fn empty_cart_yields_no_drafts() {
        assert!(split_cart(&[], DeliveryType::Delivery, "202687", 5).is_empty());
    }

    #[test]
    fn split_is_deterministic_for_the_same_snapshot() {
        let lines = vec![
            line("p1", "store-a", 10, 5, 1),
            line("p2", "store-b", 20, 5, 2),
        ];

        let first = split_cart(&lines, DeliveryType::Delivery, "202687", 3);
        let second = split_cart(&lines, DeliveryType::Delivery, "202687", 3);
        assert_eq!(first, second);
    }
}

//! Order Domain Models
//!
//! An order is created at checkout time, one per distinct store present in
//! the cart; it is mutated only by status transitions and never deleted.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::cart::models::{CartLine, StoreId};

/// Globally unique internal order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.simple().fmt(f)
    }
}

/// Seller-facing order lifecycle. Linear: no backward transitions, no
/// skipping stages. `Pending` is initial, `Delivered` terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Dispatched,
    Delivered,
}

impl OrderStatus {
    /// The next stage in the lifecycle, or `None` from the terminal stage.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Accepted),
            OrderStatus::Accepted => Some(OrderStatus::Dispatched),
            OrderStatus::Dispatched => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    /// Whether `target` is the immediate successor of `self`.
    pub fn can_advance_to(self, target: OrderStatus) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Dispatched => "dispatched",
            OrderStatus::Delivered => "delivered",
        };
        f.write_str(s)
    }
}

/// An in-memory, not-yet-persisted order produced by the splitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    /// Human-facing identifier, unique within the calendar day: the day's
    /// date stamp followed by the systemwide 1-based daily sequence number.
    pub display_id: String,
    /// The single store this draft belongs to; an order never spans stores.
    pub store_id: StoreId,
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
    pub delivery_charges: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
}

impl OrderDraft {
    /// Promotes the draft to a persistable order record.
    pub fn into_order(self, placed_at: DateTime<Utc>) -> Order {
        Order {
            order_id: OrderId::new(),
            display_id: self.display_id,
            store_id: self.store_id,
            lines: self.lines,
            subtotal: self.subtotal,
            delivery_charges: self.delivery_charges,
            total_amount: self.total_amount,
            status: self.status,
            placed_at,
        }
    }
}

/// A persisted order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub display_id: String,
    pub store_id: StoreId,
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
    pub delivery_charges: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Applies a status transition, enforcing the linear lifecycle.
    /// Returns `false` (leaving the order unchanged) for backward moves,
    /// skipped stages, or transitions out of the terminal stage.
    pub fn advance_to(&mut self, target: OrderStatus) -> bool {
        if self.status.can_advance_to(target) {
            self.status = target;
            true
        } else {
            false
        }
    }
}

/// Date stamp used as the prefix of display ids: the year followed by the
/// unpadded month and day (e.g. 2026-08-07 stamps as `202687`).
pub fn date_stamp(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{}{}{}", date.year(), date.month(), date.day())
}

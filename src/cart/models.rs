//! Cart Domain Models
//!
//! Data structures for cart ownership, cart lines and checkout inputs.
//! A cart line is uniquely identified by `(owner, product_id)`; the
//! mutation API on [`Cart`] enforces merge-not-duplicate so at most one
//! line exists per product at any time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

id_type!(
    /// Opaque product identifier, stable across sessions.
    ProductId
);
id_type!(
    /// Identifier of a store; every product belongs to exactly one store.
    StoreId
);
id_type!(
    /// Identifier of an authenticated user.
    UserId
);

// =============================================================================
// Cart Domain Models
// =============================================================================

/// The identity a cart belongs to: a guest device or an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CartOwner {
    /// Anonymous visitor, keyed by a per-device/browser identity.
    #[serde(rename_all = "camelCase")]
    Guest { device_key: String },
    /// Authenticated user, keyed by the auth provider's user id.
    #[serde(rename_all = "camelCase")]
    User { user_id: UserId },
}

/// Current catalog truth for a product, joined into cart lines at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    /// The "online" price charged at checkout. Non-negative.
    pub unit_price: Decimal,
    /// Per-line flat delivery fee attributable to the product's store.
    pub delivery_charge: Decimal,
}

/// One product entry in a cart, with quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub unit_price: Decimal,
    pub delivery_charge: Decimal,
    /// Always >= 1; a line that would drop to 0 is removed, never stored.
    pub quantity: u32,
}

impl CartLine {
    /// Builds a line from the current catalog snapshot of a product.
    pub fn from_snapshot(snapshot: &ProductSnapshot, quantity: u32) -> Self {
        Self {
            product_id: snapshot.product_id.clone(),
            store_id: snapshot.store_id.clone(),
            unit_price: snapshot.unit_price,
            delivery_charge: snapshot.delivery_charge,
            quantity,
        }
    }

    /// `unit_price * quantity` for this line.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A cart: an owner plus its set of lines, keyed by product.
///
/// Lines preserve first-seen insertion order; the order splitter relies on
/// this to partition stores deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub owner: CartOwner,
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart for the given owner.
    pub fn empty(owner: CartOwner) -> Self {
        Self {
            owner,
            lines: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines (not total units).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    /// Merges a line into the cart: if a line for the same product already
    /// exists its quantity is increased, otherwise the line is appended.
    pub fn merge_add(&mut self, incoming: CartLine) {
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == incoming.product_id)
        {
            existing.quantity += incoming.quantity;
        } else {
            self.lines.push(incoming);
        }
    }

    /// Sets the quantity of an existing line. A quantity below 1 removes the
    /// line entirely.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if quantity < 1 {
            self.remove(product_id);
            return;
        }
        if let Some(existing) = self.lines.iter_mut().find(|l| &l.product_id == product_id) {
            existing.quantity = quantity as u32;
        }
    }

    pub fn remove(&mut self, product_id: &ProductId) {
        self.lines.retain(|l| &l.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Drops every line belonging to one of the given stores. Used after a
    /// partial checkout to release only the successfully-ordered stores.
    pub fn remove_store_lines(&mut self, store_ids: &[StoreId]) {
        self.lines.retain(|l| !store_ids.contains(&l.store_id));
    }

    /// Distinct store ids in the order their first line appears in the cart.
    pub fn store_order(&self) -> Vec<StoreId> {
        let mut stores = Vec::new();
        for line in &self.lines {
            if !stores.contains(&line.store_id) {
                stores.push(line.store_id.clone());
            }
        }
        stores
    }
}

// =============================================================================
// Checkout Inputs
// =============================================================================

/// How the buyer wants the order fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryType {
    #[serde(rename = "Delivery")]
    Delivery,
    #[serde(rename = "Self-pick")]
    SelfPick,
}

/// Shipping details collected at checkout. The address is required when the
/// delivery type is [`DeliveryType::Delivery`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

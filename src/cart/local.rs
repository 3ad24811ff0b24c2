//! Local Cart Store
//!
//! Durable key-value persistence of a guest cart across page reloads on one
//! device. The browser build backs this with localStorage; here the backing
//! is any [`KvStore`], with a DashMap implementation for the server and
//! tests. Corrupt persisted data degrades to an empty cart and is logged,
//! never surfaced to the UI.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::warn;

use super::models::{Cart, CartLine, CartOwner};

/// Minimal synchronous key-value contract for guest-cart persistence.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// In-memory [`KvStore`].
#[derive(Default)]
pub struct MemoryKv {
    entries: DashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.clone())
    }

    fn set(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Guest cart persistence keyed by a device/browser identity.
pub struct LocalCartStore {
    kv: Arc<dyn KvStore>,
    device_key: String,
}

impl LocalCartStore {
    pub fn new(kv: Arc<dyn KvStore>, device_key: impl Into<String>) -> Self {
        Self {
            kv,
            device_key: device_key.into(),
        }
    }

    pub fn device_key(&self) -> &str {
        &self.device_key
    }

    fn storage_key(&self) -> String {
        format!("localmart.cart.{}", self.device_key)
    }

    /// Returns the persisted cart for this device, or an empty cart if none
    /// exists or the persisted value fails to parse.
    pub fn load(&self) -> Cart {
        let owner = CartOwner::Guest {
            device_key: self.device_key.clone(),
        };
        let Some(raw) = self.kv.get(&self.storage_key()) else {
            return Cart::empty(owner);
        };
        match serde_json::from_str::<Vec<CartLine>>(&raw) {
            Ok(lines) => Cart { owner, lines },
            Err(err) => {
                warn!(device_key = %self.device_key, %err, "corrupt guest cart, starting empty");
                Cart::empty(owner)
            }
        }
    }

    /// Overwrites the persisted representation. Called after every mutation.
    pub fn save(&self, cart: &Cart) {
        match serde_json::to_string(&cart.lines) {
            Ok(raw) => self.kv.set(&self.storage_key(), raw),
            Err(err) => warn!(device_key = %self.device_key, %err, "failed to persist guest cart"),
        }
    }

    /// Removes all persisted lines for this device.
    pub fn clear(&self) {
        self.kv.remove(&self.storage_key());
    }
}

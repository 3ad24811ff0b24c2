//! Cart Domain Module
//!
//! Everything cart-shaped lives here:
//! - Domain models (owners, lines, carts, checkout inputs)
//! - Local (guest) and remote (user) cart stores
//! - The reconciler that unifies them across login state
//! - The wishlist toggle

pub mod local;
pub mod models;
pub mod reconciler;
pub mod remote;
pub mod wishlist;

// Re-export commonly used types for convenience
pub use local::{KvStore, LocalCartStore, MemoryKv};
pub use models::{Cart, CartLine, CartOwner, DeliveryType, ProductId, ShippingInfo, StoreId, UserId};
pub use reconciler::CartReconciler;
pub use remote::RemoteCartStore;
pub use wishlist::{Wishlist, WishlistChange};

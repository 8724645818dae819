//! Persistent shopping cart state for TurboCart.
//!
//! The cart is an ordered list of [`CartLine`]s keyed by product id. Every
//! change is written in full to a [`turbo_kv::KvStore`] before it becomes
//! visible, and the last written snapshot is restored on startup.
//!
//! - **State**: pure transitions on [`CartState`] (add, increment, decrement)
//! - **Store**: [`CartStore`], the single owner that persists then publishes
//! - **Provider**: [`CartProvider`] / [`CartHandle`], the injected access point
//! - **Subscription**: [`CartSubscription`], change notifications for the UI
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cart::prelude::*;
//!
//! let config = CartConfig::default();
//! let provider = CartProvider::mount(config.store.open().await?, &config).await?;
//! let cart = provider.handle();
//!
//! cart.add_to_cart(ProductCandidate::new("p1", "Mug", "https://cdn/mug.png", 9.99))
//!     .await?;
//! cart.increment("p1").await?;
//!
//! let mut updates = cart.subscribe();
//! let state = updates.changed().await?;
//! println!("{} item(s) in cart", state.item_count());
//! ```

pub mod config;
pub mod error;
pub mod ids;
pub mod line;
pub mod provider;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod subscription;

#[cfg(test)]
mod testing;

pub use config::{CartConfig, StoreConfig};
pub use error::CartError;
pub use ids::ProductId;
pub use line::{CartLine, ProductCandidate};
pub use provider::{CartHandle, CartProvider};
pub use snapshot::{CartSnapshot, RestoreSource, Restored};
pub use state::{CartState, Transition};
pub use store::CartStore;
pub use subscription::CartSubscription;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{CartConfig, StoreConfig};
    pub use crate::error::CartError;
    pub use crate::ids::ProductId;
    pub use crate::line::{CartLine, ProductCandidate};
    pub use crate::provider::{CartHandle, CartProvider};
    pub use crate::state::{CartState, Transition};
    pub use crate::store::CartStore;
    pub use crate::subscription::CartSubscription;
}

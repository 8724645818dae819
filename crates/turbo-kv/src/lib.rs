//! Async Key-Value persistence for TurboCart.
//!
//! The [`KvStore`] trait is the storage capability the cart depends on. It
//! knows nothing about carts: values are opaque bytes stored under string
//! keys. [`Cache`] layers automatic JSON serialization on top.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use turbo_kv::{Cache, MemoryStore};
//!
//! let cache = Cache::new(Arc::new(MemoryStore::new()));
//!
//! // Store a value
//! cache.set("cart:user123", &lines).await?;
//!
//! // Retrieve a value
//! let lines: Option<Vec<Line>> = cache.get("cart:user123").await?;
//!
//! // Delete a value
//! cache.delete("cart:user123").await?;
//! ```

mod cache;
mod error;
mod file;
mod memory;
mod store;

pub use cache::Cache;
pub use error::KvError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::KvStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, FileStore, KvError, KvStore, MemoryStore};
}

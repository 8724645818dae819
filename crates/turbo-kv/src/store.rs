//! The storage capability trait.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::KvError;

/// An async key-value store.
///
/// All methods take `&self` so a store can be shared behind an `Arc`;
/// implementations use interior mutability where they need it.
#[async_trait]
pub trait KvStore: Send + Sync + Debug {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    /// Insert or replace the value stored under `key`.
    ///
    /// The write is complete when the returned future resolves `Ok`.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError>;

    /// Remove `key`. Succeeds even if the key did not exist.
    async fn delete(&self, key: &str) -> Result<(), KvError>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        Ok(self.get(key).await?.is_some())
    }
}

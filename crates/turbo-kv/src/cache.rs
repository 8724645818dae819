//! Typed wrapper with automatic JSON serialization.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::{KvError, KvStore};

/// Type-safe cache over any [`KvStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`.
#[derive(Debug, Clone)]
pub struct Cache {
    store: Arc<dyn KvStore>,
}

impl Cache {
    /// Wrap a store.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist, and
    /// [`KvError::SerializeError`] if it exists but does not decode as `T`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let lines: Option<Vec<CartLine>> = cache.get("cart:user123").await?;
    /// ```
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KvError> {
        match self.store.get(key).await? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// cache.set("cart:user123", &lines).await?;
    /// ```
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), KvError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes).await
    }

    /// Delete a value from the cache.
    pub async fn delete(&self, key: &str) -> Result<(), KvError> {
        self.store.delete(key).await
    }

    /// Check if a key exists in the cache.
    pub async fn exists(&self, key: &str) -> Result<bool, KvError> {
        self.store.exists(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_typed_roundtrip() {
        let cache = Cache::new(Arc::new(MemoryStore::new()));
        let item = Item {
            name: "widget".to_string(),
            count: 3,
        };

        cache.set("item", &item).await.unwrap();
        let loaded: Option<Item> = cache.get("item").await.unwrap();

        assert_eq!(loaded, Some(item));
    }

    #[tokio::test]
    async fn test_absent_is_none() {
        let cache = Cache::new(Arc::new(MemoryStore::new()));
        let loaded: Option<Item> = cache.get("item").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_value_is_decode_error() {
        let store = Arc::new(MemoryStore::with_entry("item", "not json"));
        let cache = Cache::new(store);

        let err = cache.get::<Item>("item").await.unwrap_err();
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_delete_and_exists() {
        let cache = Cache::new(Arc::new(MemoryStore::new()));
        cache.set("n", &1u32).await.unwrap();
        assert!(cache.exists("n").await.unwrap());

        cache.delete("n").await.unwrap();
        assert!(!cache.exists("n").await.unwrap());
    }
}

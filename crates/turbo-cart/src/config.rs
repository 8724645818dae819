//! Cart configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use turbo_kv::{FileStore, KvStore, MemoryStore};

use crate::error::CartError;

/// Storage key the cart snapshot is written under.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketPlace:Cart";

/// Default capacity of a provider's command mailbox.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 32;

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Key holding the full cart snapshot. Owned exclusively by the cart.
    pub storage_key: String,

    /// Pending commands a provider queues before callers wait.
    pub mailbox_capacity: usize,

    /// Storage backend.
    pub store: StoreConfig,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            store: StoreConfig::default(),
        }
    }
}

impl CartConfig {
    /// Load config from a file.
    ///
    /// Paths ending in `.json` are parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CartError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| {
                CartError::Config(format!("failed to parse JSON {}: {}", path.display(), e))
            })?
        } else {
            toml::from_str(&content).map_err(|e| {
                CartError::Config(format!("failed to parse TOML {}: {}", path.display(), e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that values are usable.
    pub fn validate(&self) -> Result<(), CartError> {
        if self.storage_key.trim().is_empty() {
            return Err(CartError::Config("storage_key must not be empty".to_string()));
        }
        if self.mailbox_capacity == 0 {
            return Err(CartError::Config(
                "mailbox_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Keep the snapshot in process memory only.
    #[default]
    Memory,
    /// Keep the snapshot in files under `dir`.
    File {
        /// Directory holding the store's files.
        dir: PathBuf,
    },
}

impl StoreConfig {
    /// Open the configured backend.
    pub async fn open(&self) -> Result<Arc<dyn KvStore>, CartError> {
        let store: Arc<dyn KvStore> = match self {
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
            StoreConfig::File { dir } => Arc::new(FileStore::open(dir.clone()).await?),
        };
        Ok(store)
    }
}

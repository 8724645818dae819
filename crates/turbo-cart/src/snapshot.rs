//! Persistence synchronization for the cart snapshot.
//!
//! The whole cart is stored as one JSON array under a single fixed key.
//! It is read once at startup and rewritten in full after every change.

use std::sync::Arc;

use tracing::{error, info, warn};
use turbo_kv::{Cache, KvStore};

use crate::error::CartError;
use crate::line::CartLine;
use crate::state::CartState;

/// Where a restored state came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreSource {
    /// A valid snapshot with this many lines.
    Snapshot { lines: usize },
    /// No snapshot was stored.
    Absent,
    /// A snapshot was stored but failed to decode or validate.
    Corrupt { reason: String },
    /// The store could not be read.
    Unavailable { reason: String },
}

/// Result of a startup restore.
#[derive(Debug, Clone)]
pub struct Restored {
    /// The initial cart state. Empty unless a valid snapshot was found.
    pub state: CartState,
    /// How the state was obtained.
    pub source: RestoreSource,
}

/// Reads and writes the cart snapshot under its fixed key.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    cache: Cache,
    key: String,
}

impl CartSnapshot {
    /// Create a snapshot accessor for `key` on `store`.
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            cache: Cache::new(store),
            key: key.into(),
        }
    }

    /// The storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored cart.
    ///
    /// Never fails: a missing, corrupt or unreadable snapshot yields an empty
    /// cart so that startup is never blocked. The reason is reported in
    /// [`Restored::source`] and logged.
    pub async fn restore(&self) -> Restored {
        match self.load().await {
            Ok(Some(state)) => {
                info!(key = %self.key, lines = state.len(), "restored cart snapshot");
                let lines = state.len();
                Restored {
                    state,
                    source: RestoreSource::Snapshot { lines },
                }
            }
            Ok(None) => {
                info!(key = %self.key, "no cart snapshot, starting empty");
                Restored {
                    state: CartState::new(),
                    source: RestoreSource::Absent,
                }
            }
            Err(CartError::CorruptSnapshot(reason)) => {
                warn!(key = %self.key, %reason, "discarding corrupt cart snapshot");
                Restored {
                    state: CartState::new(),
                    source: RestoreSource::Corrupt { reason },
                }
            }
            Err(e) => {
                let reason = e.to_string();
                error!(key = %self.key, %reason, "cart snapshot unreadable, starting empty");
                Restored {
                    state: CartState::new(),
                    source: RestoreSource::Unavailable { reason },
                }
            }
        }
    }

    /// Load and validate the stored cart, reporting every failure.
    pub async fn load(&self) -> Result<Option<CartState>, CartError> {
        let lines = match self.cache.get::<Vec<CartLine>>(&self.key).await {
            Ok(lines) => lines,
            Err(e) if e.is_decode() => return Err(CartError::CorruptSnapshot(e.to_string())),
            Err(e) => return Err(e.into()),
        };

        lines
            .map(|lines| {
                CartState::from_lines(lines).map_err(|e| CartError::CorruptSnapshot(e.to_string()))
            })
            .transpose()
    }

    /// Write the full state, replacing the previous snapshot.
    pub async fn persist(&self, state: &CartState) -> Result<(), CartError> {
        self.cache.set(&self.key, state).await.map_err(|e| {
            error!(key = %self.key, error = %e, "failed to persist cart snapshot");
            CartError::from(e)
        })
    }
}

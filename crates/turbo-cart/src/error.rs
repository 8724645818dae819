//! Cart error types.

use thiserror::Error;

/// Errors that can occur in cart operations.
#[derive(Error, Debug)]
pub enum CartError {
    /// Empty or malformed argument. Rejected before any state or storage access.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The store could not read or write the cart snapshot.
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// The stored snapshot failed to decode or validate.
    #[error("Corrupt cart snapshot: {0}")]
    CorruptSnapshot(String),

    /// The cart was accessed outside a mounted provider.
    #[error("Cart used outside its provider: {0}")]
    UsedOutsideProvider(String),

    /// Incrementing would overflow the line quantity.
    #[error("Quantity overflow for product {0}")]
    QuantityOverflow(String),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<turbo_kv::KvError> for CartError {
    fn from(e: turbo_kv::KvError) -> Self {
        CartError::PersistenceUnavailable(e.to_string())
    }
}

impl CartError {
    /// Whether the error is a caller contract violation rather than a
    /// runtime condition. These are not worth retrying.
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            CartError::InvalidArgument(_) | CartError::UsedOutsideProvider(_)
        )
    }
}

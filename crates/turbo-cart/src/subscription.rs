//! Change notifications for cart observers.

use tokio::sync::watch;

use crate::error::CartError;
use crate::state::CartState;

/// A subscription to committed cart states.
///
/// Only states that have already been persisted are ever published. The
/// channel keeps the latest value: a subscriber that falls behind skips to
/// the newest state instead of replaying every intermediate one.
#[derive(Debug, Clone)]
pub struct CartSubscription {
    rx: watch::Receiver<CartState>,
}

impl CartSubscription {
    pub(crate) fn new(rx: watch::Receiver<CartState>) -> Self {
        Self { rx }
    }

    /// A new subscription that treats the current state as already seen,
    /// so its first `changed()` waits for the next commit.
    pub(crate) fn fresh(&self) -> Self {
        let mut rx = self.rx.clone();
        rx.borrow_and_update();
        Self { rx }
    }

    /// The latest committed state.
    pub fn current(&self) -> CartState {
        self.rx.borrow().clone()
    }

    /// Wait for the next committed state and return it.
    ///
    /// Fails with [`CartError::UsedOutsideProvider`] once the owning store
    /// has been dropped and no further states can arrive.
    pub async fn changed(&mut self) -> Result<CartState, CartError> {
        self.rx.changed().await.map_err(|_| {
            CartError::UsedOutsideProvider("cart store is no longer running".to_string())
        })?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Whether a state was committed since this subscription last looked.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}

//! The cart store: single owner of the cart state.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};
use turbo_kv::KvStore;

use crate::config::CartConfig;
use crate::error::CartError;
use crate::ids::ProductId;
use crate::line::ProductCandidate;
use crate::snapshot::{CartSnapshot, RestoreSource, Restored};
use crate::state::{CartState, Transition};
use crate::subscription::CartSubscription;

/// Owns the authoritative cart state.
///
/// Every mutation computes the next state, writes it in full to the store,
/// and only then commits it in memory and publishes it to subscribers. If
/// the write fails nothing is committed, so memory never runs ahead of the
/// store.
///
/// Mutations take `&mut self`: there is exactly one writer. To share the
/// cart across tasks, mount it in a [`CartProvider`](crate::CartProvider).
#[derive(Debug)]
pub struct CartStore {
    state: CartState,
    snapshot: CartSnapshot,
    publisher: watch::Sender<CartState>,
    restored_from: RestoreSource,
}

impl CartStore {
    /// Open the cart on `store`, restoring the last saved snapshot.
    pub async fn open(store: Arc<dyn KvStore>, config: &CartConfig) -> Result<Self, CartError> {
        config.validate()?;
        let snapshot = CartSnapshot::new(store, config.storage_key.clone());
        Ok(Self::restore(snapshot).await)
    }

    /// Build a store from a snapshot accessor, restoring once.
    pub async fn restore(snapshot: CartSnapshot) -> Self {
        let Restored { state, source } = snapshot.restore().await;
        let (publisher, _) = watch::channel(state.clone());

        Self {
            state,
            snapshot,
            publisher,
            restored_from: source,
        }
    }

    /// The current committed state.
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// An owned copy of the current committed state.
    pub fn snapshot(&self) -> CartState {
        self.state.clone()
    }

    /// How the initial state was obtained at startup.
    pub fn restored_from(&self) -> &RestoreSource {
        &self.restored_from
    }

    /// Subscribe to committed states.
    pub fn subscribe(&self) -> CartSubscription {
        CartSubscription::new(self.publisher.subscribe())
    }

    /// Add a product, or increment it if it is already in the cart.
    pub async fn add_to_cart(&mut self, candidate: ProductCandidate) -> Result<Transition, CartError> {
        let id = candidate.id.clone();
        let (next, transition) = self.state.with_added(candidate)?;
        self.commit(&id, next, transition).await
    }

    /// Increase a product's quantity by one.
    ///
    /// An id that is not in the cart is a no-op that still persists and
    /// publishes the unchanged state, reported as [`Transition::Unchanged`].
    pub async fn increment(&mut self, id: impl Into<ProductId>) -> Result<Transition, CartError> {
        let id = id.into();
        let (next, transition) = self.state.with_incremented(&id)?;
        self.commit(&id, next, transition).await
    }

    /// Decrease a product's quantity by one, removing the line at zero.
    ///
    /// An id that is not in the cart is a no-op, as with [`increment`](Self::increment).
    pub async fn decrement(&mut self, id: impl Into<ProductId>) -> Result<Transition, CartError> {
        let id = id.into();
        let (next, transition) = self.state.with_decremented(&id)?;
        self.commit(&id, next, transition).await
    }

    async fn commit(
        &mut self,
        id: &ProductId,
        next: CartState,
        transition: Transition,
    ) -> Result<Transition, CartError> {
        if transition == Transition::Unchanged {
            warn!(product_id = %id, "product not in cart, state unchanged");
        }

        self.snapshot.persist(&next).await?;

        self.state = next;
        self.publisher.send_replace(self.state.clone());

        debug!(
            product_id = %id,
            ?transition,
            lines = self.state.len(),
            "cart updated"
        );
        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FlakyStore;
    use turbo_kv::MemoryStore;

    fn mug() -> ProductCandidate {
        ProductCandidate::new("p1", "Mug", "https://cdn/mug.png", 9.99)
    }

    async fn open(store: Arc<dyn KvStore>) -> CartStore {
        CartStore::open(store, &CartConfig::default()).await.unwrap()
    }

    async fn persisted(store: &Arc<dyn KvStore>) -> CartState {
        CartSnapshot::new(store.clone(), CartConfig::default().storage_key)
            .load()
            .await
            .unwrap()
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_scenario_add_add_decrement_decrement() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let mut cart = open(store.clone()).await;
        let p1 = ProductId::new("p1");

        assert_eq!(cart.add_to_cart(mug()).await.unwrap(), Transition::Added);
        assert_eq!(cart.state().get(&p1).unwrap().quantity, 1);

        assert_eq!(
            cart.add_to_cart(mug()).await.unwrap(),
            Transition::Incremented { quantity: 2 }
        );
        assert_eq!(cart.state().len(), 1);
        assert_eq!(cart.state().get(&p1).unwrap().quantity, 2);

        assert_eq!(
            cart.decrement("p1").await.unwrap(),
            Transition::Decremented { quantity: 1 }
        );
        assert_eq!(cart.state().get(&p1).unwrap().quantity, 1);

        assert_eq!(cart.decrement("p1").await.unwrap(), Transition::Removed);
        assert!(cart.state().is_empty());
        assert!(persisted(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_every_operation_persists_full_state() {
        let store = Arc::new(FlakyStore::new());
        let dyn_store: Arc<dyn KvStore> = store.clone();
        let mut cart = open(dyn_store.clone()).await;

        cart.add_to_cart(mug()).await.unwrap();
        assert_eq!(&persisted(&dyn_store).await, cart.state());

        cart.increment("p1").await.unwrap();
        assert_eq!(&persisted(&dyn_store).await, cart.state());

        cart.increment("missing").await.unwrap();
        assert_eq!(&persisted(&dyn_store).await, cart.state());

        cart.decrement("missing").await.unwrap();
        assert_eq!(store.writes(), 4);
    }

    #[tokio::test]
    async fn test_publish_follows_persist() {
        let mut cart = open(Arc::new(MemoryStore::new())).await;
        let mut sub = cart.subscribe();
        assert!(sub.current().is_empty());

        cart.add_to_cart(mug()).await.unwrap();
        let published = sub.changed().await.unwrap();
        assert_eq!(&published, cart.state());

        cart.increment("nope").await.unwrap();
        assert!(sub.has_changed());
        assert_eq!(sub.changed().await.unwrap(), published);
    }

    #[tokio::test]
    async fn test_write_failure_commits_nothing() {
        let store = Arc::new(FlakyStore::new());
        let dyn_store: Arc<dyn KvStore> = store.clone();
        let mut cart = open(dyn_store.clone()).await;
        cart.add_to_cart(mug()).await.unwrap();

        let sub = cart.subscribe();
        let before = cart.snapshot();

        store.fail_writes(true);
        let err = cart.increment("p1").await.unwrap_err();
        assert!(matches!(err, CartError::PersistenceUnavailable(_)));
        assert_eq!(cart.state(), &before);
        assert_eq!(persisted(&dyn_store).await, before);
        assert!(!sub.has_changed());

        store.fail_writes(false);
        assert_eq!(
            cart.increment("p1").await.unwrap(),
            Transition::Incremented { quantity: 2 }
        );
    }

    #[tokio::test]
    async fn test_invalid_argument_never_reaches_store() {
        let store = Arc::new(FlakyStore::new());
        let mut cart = open(store.clone()).await;

        assert!(matches!(
            cart.increment("").await,
            Err(CartError::InvalidArgument(_))
        ));
        assert!(matches!(
            cart.add_to_cart(ProductCandidate::new("", "T", "u", 1.0)).await,
            Err(CartError::InvalidArgument(_))
        ));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_reopen_restores_state() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let mut cart = open(store.clone()).await;
        cart.add_to_cart(mug()).await.unwrap();
        cart.add_to_cart(ProductCandidate::new("p2", "Cup", "u", 4.5)).await.unwrap();
        cart.increment("p2").await.unwrap();
        let expected = cart.snapshot();
        drop(cart);

        let reopened = open(store).await;
        assert_eq!(reopened.state(), &expected);
        assert_eq!(reopened.restored_from(), &RestoreSource::Snapshot { lines: 2 });
    }
}

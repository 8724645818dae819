//! Provider scope and injected cart handles.
//!
//! A [`CartProvider`] moves a [`CartStore`] into its own task and serves
//! commands from a bounded mailbox, one at a time, in arrival order. Callers
//! get cloneable [`CartHandle`]s. A command that reached the mailbox runs to
//! completion even if its caller stops waiting, and its result is still
//! persisted and published.
//!
//! Once the provider is unmounted (or dropped), every handle call fails with
//! [`CartError::UsedOutsideProvider`].

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, trace};
use turbo_kv::KvStore;

use crate::config::CartConfig;
use crate::error::CartError;
use crate::ids::ProductId;
use crate::line::ProductCandidate;
use crate::snapshot::RestoreSource;
use crate::state::{CartState, Transition};
use crate::store::CartStore;
use crate::subscription::CartSubscription;

type Reply = oneshot::Sender<Result<Transition, CartError>>;

#[derive(Debug)]
enum Command {
    AddToCart {
        candidate: ProductCandidate,
        respond_to: Reply,
    },
    Increment {
        id: ProductId,
        respond_to: Reply,
    },
    Decrement {
        id: ProductId,
        respond_to: Reply,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::AddToCart { .. } => "add_to_cart",
            Command::Increment { .. } => "increment",
            Command::Decrement { .. } => "decrement",
        }
    }

    fn into_reply(self) -> Reply {
        match self {
            Command::AddToCart { respond_to, .. }
            | Command::Increment { respond_to, .. }
            | Command::Decrement { respond_to, .. } => respond_to,
        }
    }
}

/// Scope that owns the running cart.
#[derive(Debug)]
pub struct CartProvider {
    handle: CartHandle,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<CartStore>,
    restored_from: RestoreSource,
}

impl CartProvider {
    /// Open the cart on `store`, restore it, and start serving commands.
    pub async fn mount(store: Arc<dyn KvStore>, config: &CartConfig) -> Result<Self, CartError> {
        let cart = CartStore::open(store, config).await?;
        Ok(Self::from_store(cart, config.mailbox_capacity))
    }

    /// Start serving commands for an already opened store.
    pub fn from_store(cart: CartStore, mailbox_capacity: usize) -> Self {
        let (sender, mailbox) = mpsc::channel(mailbox_capacity.max(1));
        let (shutdown, shutdown_rx) = oneshot::channel();
        let states = cart.subscribe();
        let restored_from = cart.restored_from().clone();

        info!(lines = cart.state().len(), "cart provider mounted");
        let task = tokio::spawn(serve(cart, mailbox, shutdown_rx));

        Self {
            handle: CartHandle { sender, states },
            shutdown,
            task,
            restored_from,
        }
    }

    /// A handle for callers inside this scope.
    pub fn handle(&self) -> CartHandle {
        self.handle.clone()
    }

    /// How the initial state was obtained at startup.
    pub fn restored_from(&self) -> &RestoreSource {
        &self.restored_from
    }

    /// Close the scope and get the store back.
    ///
    /// A command already being applied finishes first. Commands still
    /// waiting in the mailbox, and any handle call made afterwards, fail
    /// with [`CartError::UsedOutsideProvider`].
    pub async fn unmount(self) -> Result<CartStore, CartError> {
        let Self {
            handle,
            shutdown,
            task,
            ..
        } = self;
        drop(handle);
        drop(shutdown);

        task.await
            .map_err(|e| CartError::UsedOutsideProvider(format!("cart task failed: {}", e)))
    }
}

async fn serve(
    mut cart: CartStore,
    mut mailbox: mpsc::Receiver<Command>,
    mut shutdown: oneshot::Receiver<()>,
) -> CartStore {
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            command = mailbox.recv() => match command {
                Some(command) => apply(&mut cart, command).await,
                None => break,
            },
        }
    }

    mailbox.close();
    while let Ok(command) = mailbox.try_recv() {
        let _ = command.into_reply().send(Err(outside_provider()));
    }

    info!(lines = cart.state().len(), "cart provider unmounted");
    cart
}

async fn apply(cart: &mut CartStore, command: Command) {
    let name = command.name();
    let (result, respond_to) = match command {
        Command::AddToCart {
            candidate,
            respond_to,
        } => (cart.add_to_cart(candidate).await, respond_to),
        Command::Increment { id, respond_to } => (cart.increment(id).await, respond_to),
        Command::Decrement { id, respond_to } => (cart.decrement(id).await, respond_to),
    };

    if respond_to.send(result).is_err() {
        trace!(command = name, "cart response dropped (caller gone)");
    }
}

fn outside_provider() -> CartError {
    CartError::UsedOutsideProvider("cart provider is not mounted".to_string())
}

/// Capability handle to the mounted cart.
///
/// Cheap to clone. Arguments are validated on the caller's side, so malformed
/// input never reaches the store.
#[derive(Debug, Clone)]
pub struct CartHandle {
    sender: mpsc::Sender<Command>,
    states: CartSubscription,
}

impl CartHandle {
    /// Add a product, or increment it if it is already in the cart.
    pub async fn add_to_cart(&self, candidate: ProductCandidate) -> Result<Transition, CartError> {
        candidate.validate()?;
        self.request(|respond_to| Command::AddToCart {
            candidate,
            respond_to,
        })
        .await
    }

    /// Increase a product's quantity by one.
    pub async fn increment(&self, id: impl Into<ProductId>) -> Result<Transition, CartError> {
        let id = id.into();
        id.validate()?;
        self.request(|respond_to| Command::Increment { id, respond_to })
            .await
    }

    /// Decrease a product's quantity by one, removing the line at zero.
    pub async fn decrement(&self, id: impl Into<ProductId>) -> Result<Transition, CartError> {
        let id = id.into();
        id.validate()?;
        self.request(|respond_to| Command::Decrement { id, respond_to })
            .await
    }

    /// The current committed state.
    pub fn state(&self) -> Result<CartState, CartError> {
        self.ensure_mounted()?;
        Ok(self.states.current())
    }

    /// Subscribe to committed states.
    pub fn subscribe(&self) -> Result<CartSubscription, CartError> {
        self.ensure_mounted()?;
        Ok(self.states.fresh())
    }

    /// Whether the provider is still mounted.
    pub fn is_mounted(&self) -> bool {
        !self.sender.is_closed()
    }

    fn ensure_mounted(&self) -> Result<(), CartError> {
        if self.is_mounted() {
            Ok(())
        } else {
            Err(outside_provider())
        }
    }

    async fn request<F>(&self, command: F) -> Result<Transition, CartError>
    where
        F: FnOnce(Reply) -> Command,
    {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(command(respond_to))
            .await
            .map_err(|_| outside_provider())?;

        receiver.await.map_err(|_| outside_provider())?
    }
}

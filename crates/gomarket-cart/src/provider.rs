//! # Cart Provider
//!
//! Owns the live cart for one app session and hands out [`CartHandle`]s.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CartProvider Lifecycle                            │
//! │                                                                         │
//! │  mount()                                                               │
//! │    ├── repository.load()        stored cart, or empty on any failure   │
//! │    ├── watch::channel(cart)     single source of truth                 │
//! │    └── PersistWriter::start()   background writes                      │
//! │                                                                         │
//! │  provide(&scope) ──► scope.use_cart() now returns the handle           │
//! │                                                                         │
//! │  handle.add_to_cart / increment / decrement                            │
//! │    └── send_if_modified(|cart| cart.apply(action))                     │
//! │          ├── rejected product? ──► warn!, cart unchanged               │
//! │          └── changed? ──► writer.enqueue(snapshot)                     │
//! │                                                                         │
//! │  unmount() ──► withdraw from scope, flush, stop writer                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Loading finishes before `mount` returns, so no operation can run against
//! the empty pre-load cart and no empty snapshot can overwrite the stored one.

use std::sync::Arc;

use gomarket_core::{Cart, CartAction, LineItem, Money, Product};
use gomarket_storage::{CartRepository, FileStore, KeyValueStore, MemoryStore};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::{CartConfig, PersistSettings, StorageBackend};
use crate::error::CartResult;
use crate::scope::CartScope;
use crate::writer::{NoOpListener, PersistEventListener, PersistHandle, PersistStatus, PersistWriter};

// =============================================================================
// Cart Handle
// =============================================================================

/// Cheap, cloneable access to the mounted cart.
///
/// Mutations apply synchronously: the new cart is visible to every handle and
/// watcher before the call returns. Persistence happens in the background.
#[derive(Debug, Clone)]
pub struct CartHandle {
    state: Arc<watch::Sender<Cart>>,
    writer: PersistHandle,
}

impl CartHandle {
    /// Returns the current line items in insertion order.
    pub fn products(&self) -> Vec<LineItem> {
        self.state.borrow().items().to_vec()
    }

    /// Returns a copy of the whole cart.
    pub fn cart(&self) -> Cart {
        self.state.borrow().clone()
    }

    /// Subscribes to cart changes. The receiver sees only states that differ
    /// from the previous one.
    pub fn watch(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }

    /// Adds one unit of `product`, appending a new line when it is not in the
    /// cart yet.
    ///
    /// A product with a blank id or a negative or non-finite price is logged
    /// and ignored; storage could not give it back on the next launch.
    pub fn add_to_cart(&self, product: impl Into<Product>) {
        self.dispatch(CartAction::AddToCart(product.into()));
    }

    /// Adds one unit to the line with `id`. Unknown ids are ignored.
    pub fn increment(&self, id: &str) {
        self.dispatch(CartAction::Increment(id.to_string()));
    }

    /// Removes one unit from the line with `id`, dropping the line when its
    /// last unit goes. Unknown ids are ignored.
    pub fn decrement(&self, id: &str) {
        self.dispatch(CartAction::Decrement(id.to_string()));
    }

    /// Applies `action` and queues a snapshot when the cart changed.
    ///
    /// Returns whether the cart changed.
    pub fn dispatch(&self, action: CartAction) -> bool {
        let label = action.name();

        let mut rejected = None;

        let changed = self.state.send_if_modified(|cart| match cart.apply(action) {
            Ok(true) => {
                // Queued under the cart lock: snapshots reach the writer in
                // mutation order.
                if let Err(e) = self.writer.enqueue(cart.items().to_vec()) {
                    warn!(action = label, error = %e, "Cart changed but could not be queued for storage");
                }
                true
            }
            Ok(false) => false,
            Err(e) => {
                rejected = Some(e);
                false
            }
        });

        if let Some(e) = rejected {
            warn!(action = label, error = %e, "Cart action rejected");
        }
        debug!(action = label, changed, "Cart action applied");
        changed
    }

    /// Returns the quantity of the line with `id`.
    pub fn quantity_of(&self, id: &str) -> Option<u32> {
        self.state.borrow().quantity_of(id)
    }

    /// Returns the number of units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.state.borrow().total_quantity()
    }

    /// Returns the cart subtotal.
    pub fn subtotal(&self) -> Money {
        self.state.borrow().subtotal()
    }

    /// Waits until every change made so far has been written (or has failed).
    pub async fn flush(&self) -> CartResult<()> {
        self.writer.flush().await
    }

    /// Returns the persistence counters.
    pub fn persist_status(&self) -> PersistStatus {
        self.writer.status()
    }
}

// =============================================================================
// Cart Provider
// =============================================================================

/// A mounted cart: loaded state, live handle, and its persistence writer.
#[derive(Debug)]
pub struct CartProvider {
    handle: CartHandle,
    scope: Option<CartScope>,
}

impl CartProvider {
    /// Loads the stored cart and starts persisting changes.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn mount<S>(repo: CartRepository<S>, settings: PersistSettings) -> Self
    where
        S: KeyValueStore + 'static,
    {
        Self::mount_with_listener(repo, settings, Arc::new(NoOpListener)).await
    }

    /// Like [`mount`](Self::mount), reporting write outcomes to `listener`.
    pub async fn mount_with_listener<S>(
        repo: CartRepository<S>,
        settings: PersistSettings,
        listener: Arc<dyn PersistEventListener>,
    ) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let cart = repo.load().await;
        let key = repo.key().to_string();
        let items = cart.len();

        let (state, _) = watch::channel(cart);
        let writer = PersistWriter::with_listener(repo, settings, listener).start();

        info!(key = %key, items, "Cart provider mounted");

        CartProvider {
            handle: CartHandle {
                state: Arc::new(state),
                writer,
            },
            scope: None,
        }
    }

    /// Mounts a cart using the storage backend named in `config`.
    pub async fn from_config(config: &CartConfig) -> CartResult<Self> {
        config.validate()?;
        let key = config.storage.cart_key.clone();
        let persist = config.persist.clone();

        let provider = match config.storage.backend {
            StorageBackend::File => {
                let store = FileStore::open(config.storage.resolved_data_dir()?).await?;
                Self::mount(CartRepository::new(store, key), persist).await
            }
            StorageBackend::Memory => {
                Self::mount(CartRepository::new(MemoryStore::new(), key), persist).await
            }
        };

        Ok(provider)
    }

    /// Returns a handle to the cart.
    pub fn handle(&self) -> CartHandle {
        self.handle.clone()
    }

    /// Publishes this cart in `scope` until unmount.
    pub fn provide(&mut self, scope: &CartScope) {
        scope.provide(self.handle.clone());
        self.scope = Some(scope.clone());
    }

    /// Withdraws the cart from its scope, writes pending changes and stops the
    /// writer.
    ///
    /// Handles still held elsewhere keep working in memory, but their changes
    /// are no longer persisted.
    pub async fn unmount(self) -> CartResult<()> {
        if let Some(scope) = &self.scope {
            scope.withdraw();
        }
        self.handle.writer.shutdown().await?;
        info!("Cart provider unmounted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CartError;
    use gomarket_storage::DEFAULT_CART_KEY;

    fn coffee() -> Product {
        Product::new("1", "Coffee", "https://cdn/1.png", 4.5)
    }

    fn tea() -> Product {
        Product::new("2", "Tea", "https://cdn/2.png", 3.0)
    }

    async fn mount_immediate(store: &MemoryStore) -> CartProvider {
        let repo = CartRepository::with_default_key(store.clone());
        CartProvider::mount(repo, PersistSettings::immediate()).await
    }

    #[tokio::test]
    async fn test_operations_update_cart() {
        let store = MemoryStore::new();
        let provider = mount_immediate(&store).await;
        let cart = provider.handle();

        cart.add_to_cart(coffee());
        cart.add_to_cart(tea());
        cart.add_to_cart(coffee());
        cart.increment("2");
        cart.decrement("1");

        assert_eq!(cart.quantity_of("1"), Some(1));
        assert_eq!(cart.quantity_of("2"), Some(2));
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.subtotal(), Money::from_cents(1050));

        let ids: Vec<_> = cart.products().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_ignored_and_not_persisted() {
        let store = MemoryStore::new();
        let provider = mount_immediate(&store).await;
        let cart = provider.handle();

        cart.increment("missing");
        cart.decrement("missing");
        cart.flush().await.unwrap();

        assert!(cart.products().is_empty());
        assert_eq!(store.write_count(), 0);
        assert_eq!(cart.persist_status().queued, 0);
    }

    #[tokio::test]
    async fn test_decrement_last_unit_removes_line() {
        let store = MemoryStore::new();
        let provider = mount_immediate(&store).await;
        let cart = provider.handle();

        cart.add_to_cart(coffee());
        cart.add_to_cart(tea());
        cart.decrement("1");

        let products = cart.products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "2");
    }

    #[tokio::test]
    async fn test_mount_loads_stored_cart_without_writing() {
        let blob = r#"[{"id":"9","title":"Jam","image_url":"","price":2.25,"quantity":4}]"#;
        let store = MemoryStore::with_value(DEFAULT_CART_KEY, blob);
        let provider = mount_immediate(&store).await;
        let cart = provider.handle();

        cart.flush().await.unwrap();

        assert_eq!(cart.quantity_of("9"), Some(4));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_handles_share_state_and_watchers_see_changes() {
        let store = MemoryStore::new();
        let provider = mount_immediate(&store).await;
        let first = provider.handle();
        let second = provider.handle();
        let mut rx = first.watch();

        second.add_to_cart(coffee());

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().quantity_of("1"), Some(1));
        assert_eq!(first.quantity_of("1"), Some(1));

        second.increment("missing");
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_scope_lifecycle() {
        let store = MemoryStore::new();
        let scope = CartScope::new();
        assert!(matches!(scope.use_cart(), Err(CartError::OutsideProvider)));

        let mut provider = mount_immediate(&store).await;
        provider.provide(&scope);

        scope.use_cart().unwrap().add_to_cart(coffee());
        assert_eq!(provider.handle().quantity_of("1"), Some(1));

        provider.unmount().await.unwrap();
        assert!(matches!(scope.use_cart(), Err(CartError::OutsideProvider)));
    }

    #[tokio::test]
    async fn test_unmount_flushes_pending_changes() {
        let store = MemoryStore::new();
        let repo = CartRepository::with_default_key(store.clone());
        let provider = CartProvider::mount(repo, PersistSettings::coalesced(60_000)).await;

        provider.handle().add_to_cart(coffee());
        assert_eq!(store.write_count(), 0);

        provider.unmount().await.unwrap();

        let reloaded = CartRepository::with_default_key(store.clone()).load().await;
        assert_eq!(reloaded.quantity_of("1"), Some(1));
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_memory_state() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let provider = mount_immediate(&store).await;
        let cart = provider.handle();

        cart.add_to_cart(coffee());
        cart.flush().await.unwrap();

        assert_eq!(cart.quantity_of("1"), Some(1));
        assert_eq!(cart.persist_status().failures, 1);
    }

    #[tokio::test]
    async fn test_from_config_memory_backend() {
        let mut config = CartConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.persist = PersistSettings::immediate();

        let provider = CartProvider::from_config(&config).await.unwrap();
        let cart = provider.handle();
        cart.add_to_cart(tea());
        cart.flush().await.unwrap();

        assert_eq!(cart.persist_status().writes, 1);
    }

    #[tokio::test]
    async fn test_from_config_rejects_invalid() {
        let mut config = CartConfig::default();
        config.storage.cart_key = String::new();

        let err = CartProvider::from_config(&config).await.unwrap_err();
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_rejected_products_are_not_stored() {
        let store = MemoryStore::new();
        let provider = mount_immediate(&store).await;
        let cart = provider.handle();
        let mut rx = cart.watch();

        cart.add_to_cart(Product::new("nan", "Broken", "", f64::NAN));
        cart.add_to_cart(Product::new("", "Blank", "", 1.0));
        assert!(!cart.dispatch(CartAction::AddToCart(Product::new("neg", "Refund", "", -5.0))));
        cart.flush().await.unwrap();

        assert!(cart.products().is_empty());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_after_unmount_is_memory_only() {
        let store = MemoryStore::new();
        let provider = mount_immediate(&store).await;
        let cart = provider.handle();

        provider.unmount().await.unwrap();
        cart.add_to_cart(coffee());

        assert_eq!(cart.quantity_of("1"), Some(1));
        assert_eq!(store.write_count(), 0);
        assert!(matches!(cart.flush().await, Err(CartError::WriterClosed)));
    }
}

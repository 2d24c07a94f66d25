//! # Cart Repository
//!
//! Reads and writes the cart blob under a single fixed key.
//!
//! ## Load Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CartRepository::load()                               │
//! │                                                                         │
//! │  store.get(key)                                                        │
//! │       │                                                                 │
//! │       ├── Err(..) ─────────────────────► warn!, empty cart             │
//! │       ├── Ok(None) ────────────────────► empty cart                    │
//! │       └── Ok(Some(json))                                               │
//! │              │                                                          │
//! │              ├── not a JSON array ─────► warn!, empty cart             │
//! │              ├── unreadable entry ─────► that entry dropped            │
//! │              └── Cart::hydrate(items) ─► cart (bad entries dropped,    │
//! │                                          duplicate ids merged)         │
//! │                                                                         │
//! │  Loading never fails: a cart that cannot be read is "no cart".          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gomarket_core::{Cart, CoreError, HydrationReport, LineItem};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;

/// Storage key the cart has always been saved under.
pub const DEFAULT_CART_KEY: &str = "@GoMarketplace:cart";

/// Repository for the persisted cart.
#[derive(Debug, Clone)]
pub struct CartRepository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> CartRepository<S> {
    /// Creates a repository storing the cart under `key`.
    pub fn new(store: S, key: impl Into<String>) -> Self {
        CartRepository {
            store,
            key: key.into(),
        }
    }

    /// Creates a repository using [`DEFAULT_CART_KEY`].
    pub fn with_default_key(store: S) -> Self {
        Self::new(store, DEFAULT_CART_KEY)
    }

    /// Returns the storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the stored cart, treating any failure as an empty cart.
    pub async fn load(&self) -> Cart {
        match self.try_load().await {
            Ok(Some((cart, report))) => {
                log_report(&self.key, &report);
                info!(key = %self.key, items = cart.len(), "Loaded stored cart");
                cart
            }
            Ok(None) => {
                debug!(key = %self.key, "No stored cart, starting empty");
                Cart::new()
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Could not load stored cart, starting empty");
                Cart::new()
            }
        }
    }

    /// Loads the stored cart, surfacing storage and decode errors.
    ///
    /// Returns `Ok(None)` when nothing is stored under the key.
    pub async fn try_load(&self) -> StoreResult<Option<(Cart, HydrationReport)>> {
        let Some(blob) = self.store.get(&self.key).await? else {
            return Ok(None);
        };
        let (items, unreadable) = decode(&blob)?;
        let (cart, mut report) = Cart::hydrate(items);
        report.dropped.extend(unreadable);
        Ok(Some((cart, report)))
    }

    /// Replaces the stored cart with `items`.
    pub async fn save(&self, items: &[LineItem]) -> StoreResult<()> {
        let blob = encode(items)?;
        self.store.set(&self.key, blob).await?;
        debug!(key = %self.key, items = items.len(), "Saved cart");
        Ok(())
    }

    /// Deletes the stored cart.
    pub async fn clear(&self) -> StoreResult<()> {
        self.store.remove(&self.key).await
    }
}

fn log_report(key: &str, report: &HydrationReport) {
    if report.is_clean() {
        return;
    }
    for reason in &report.dropped {
        warn!(key, reason = %reason, "Dropped invalid line item from stored cart");
    }
    for id in &report.merged {
        warn!(key, id = %id, "Merged duplicate line item in stored cart");
    }
}

/// Encodes line items as the stored JSON array.
pub fn encode(items: &[LineItem]) -> StoreResult<String> {
    serde_json::to_string(items).map_err(|e| StoreError::Encode(e.to_string()))
}

/// Decodes the stored JSON array into line items.
///
/// Only a blob that is not a JSON array fails. Entries that do not read as a
/// line item (a `null` price, a negative quantity, a missing field) are
/// returned separately so the rest of the cart survives.
pub fn decode(blob: &str) -> StoreResult<(Vec<LineItem>, Vec<CoreError>)> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(blob).map_err(|e| StoreError::Decode(e.to_string()))?;

    let mut items = Vec::with_capacity(entries.len());
    let mut unreadable = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<LineItem>(entry) {
            Ok(item) => items.push(item),
            Err(e) => unreadable.push(CoreError::MalformedEntry {
                index,
                reason: e.to_string(),
            }),
        }
    }

    Ok((items, unreadable))
}

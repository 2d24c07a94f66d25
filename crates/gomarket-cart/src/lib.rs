//! # gomarket-cart: Cart State Manager
//!
//! One shopping cart per app session, shared by every screen and kept in sync
//! with device storage.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart State Manager                               │
//! │                                                                         │
//! │   Screens                                                               │
//! │   ┌──────────┐ ┌──────────┐ ┌──────────┐                               │
//! │   │ Catalog  │ │ Cart     │ │ Header   │   scope.use_cart()?           │
//! │   └────┬─────┘ └────┬─────┘ └────┬─────┘                               │
//! │        └────────────┼────────────┘                                      │
//! │                     ▼                                                   │
//! │   ┌───────────────────────────────────┐                                 │
//! │   │ CartHandle                        │  products / add_to_cart /      │
//! │   │  watch::Sender<Cart> (in memory)  │  increment / decrement         │
//! │   └─────────────────┬─────────────────┘                                 │
//! │                     │ snapshot after each change                        │
//! │                     ▼                                                   │
//! │   ┌───────────────────────────────────┐                                 │
//! │   │ PersistWriter (background task)   │  coalesced or immediate        │
//! │   └─────────────────┬─────────────────┘                                 │
//! │                     ▼                                                   │
//! │   CartRepository ──► KeyValueStore ("@GoMarketplace:cart")             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`provider`] - Mounting, the shared handle, cart operations
//! - [`scope`] - Where screens look the cart up
//! - [`writer`] - Background persistence
//! - [`config`] - Storage and write settings
//! - [`error`] - Error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gomarket_cart::{CartConfig, CartProvider, CartScope};
//!
//! let scope = CartScope::new();
//! let mut provider = CartProvider::from_config(&CartConfig::load_or_default(None)).await?;
//! provider.provide(&scope);
//!
//! let cart = scope.use_cart()?;
//! cart.add_to_cart(product);
//! println!("{} items, {}", cart.total_quantity(), cart.subtotal());
//!
//! provider.unmount().await?;
//! ```

use tracing_subscriber::EnvFilter;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod provider;
pub mod scope;
pub mod writer;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CartConfig, PersistSettings, StorageBackend, StorageSettings, WriteMode};
pub use error::{CartError, CartResult};
pub use provider::{CartHandle, CartProvider};
pub use scope::CartScope;
pub use writer::{NoOpListener, PersistEventListener, PersistHandle, PersistStatus, PersistWriter};

pub use gomarket_core::{Cart, CartAction, LineItem, Money, Product};

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,gomarket=debug";

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - ERROR: Failed cart writes
/// - WARN: Unreadable stored carts, repaired entries
/// - INFO: Provider mount/unmount, writer start/stop
/// - DEBUG: Individual cart actions and storage writes
///
/// ## Environment Variable
/// Set `RUST_LOG` to control log level:
/// ```bash
/// RUST_LOG=debug cargo run -p gomarket-cart --bin seed
/// RUST_LOG=gomarket_cart=trace cargo run -p gomarket-cart --bin seed
/// ```
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

//! # gomarket-storage: Device Storage Layer
//!
//! Persists the cart to local device storage so it survives app restarts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Persistence Flow                            │
//! │                                                                         │
//! │  Cart State Manager (gomarket-cart)                                    │
//! │       │  load() once at mount, save(items) after mutations             │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  gomarket-storage (THIS CRATE)                  │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐        ┌──────────────────────────────┐   │   │
//! │  │   │ CartRepository │ ─────► │ KeyValueStore (trait)        │   │   │
//! │  │   │ JSON blob      │        │ ├── FileStore  (device disk) │   │   │
//! │  │   │ under one key  │        │ └── MemoryStore (tests)      │   │   │
//! │  │   └────────────────┘        └──────────────────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`kv`] - The async key-value contract
//! - [`file`] - One-file-per-key store under a data directory
//! - [`memory`] - In-process store with write-failure injection
//! - [`repository`] - Cart blob codec under a fixed key
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gomarket_storage::{CartRepository, FileStore};
//!
//! let store = FileStore::open("/data/app").await?;
//! let repo = CartRepository::with_default_key(store);
//!
//! let cart = repo.load().await;           // empty on absence or corruption
//! repo.save(cart.items()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod file;
pub mod kv;
pub mod memory;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use repository::{CartRepository, DEFAULT_CART_KEY};

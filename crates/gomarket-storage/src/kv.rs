//! # Key-Value Storage Contract
//!
//! The device storage the cart is mirrored to. Values are plain strings;
//! encoding is the caller's concern.

use std::future::Future;

use crate::error::StoreResult;

/// Async string key-value storage.
///
/// ## Implementation Notes
/// - Implementations must be thread-safe (`Send + Sync`); the persistence
///   writer owns the store on a background task
/// - `get` returns `Ok(None)` for a missing key, never an error
/// - `remove` of a missing key succeeds
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = StoreResult<Option<String>>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> impl Future<Output = StoreResult<()>> + Send;

    /// Deletes the value stored under `key`.
    fn remove(&self, key: &str) -> impl Future<Output = StoreResult<()>> + Send;
}

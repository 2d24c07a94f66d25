//! # Cart Scope
//!
//! The slot a mounted [`CartProvider`](crate::CartProvider) publishes its
//! handle into. Screens hold a clone of the scope and call
//! [`CartScope::use_cart`]; asking before a provider is mounted, or after it
//! has been unmounted, is a usage error rather than a silently empty cart.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::{CartError, CartResult};
use crate::provider::CartHandle;

/// Shared slot holding the active cart handle, if any.
#[derive(Debug, Clone, Default)]
pub struct CartScope {
    slot: Arc<RwLock<Option<CartHandle>>>,
}

impl CartScope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle of the provider mounted in this scope.
    pub fn use_cart(&self) -> CartResult<CartHandle> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CartError::OutsideProvider)
    }

    /// Returns true while a provider is mounted in this scope.
    pub fn is_provided(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn provide(&self, handle: CartHandle) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.replace(handle).is_some() {
            debug!("Replaced cart provider in scope");
        }
    }

    pub(crate) fn withdraw(&self) {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

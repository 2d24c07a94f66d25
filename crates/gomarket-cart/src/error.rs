//! # Cart Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Usage       │  │  Configuration  │  │     Persistence         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  OutsideProvider│  │  InvalidConfig  │  │  Store                  │ │
//! │  │                 │  │  ConfigLoad     │  │  WriterClosed           │ │
//! │  │                 │  │  ConfigSave     │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart operations (`add_to_cart`, `increment`, `decrement`) never return
//! these; persistence failures behind them are reported through the writer's
//! listener instead.

use gomarket_storage::StoreError;
use thiserror::Error;

/// Result type alias for cart state operations.
pub type CartResult<T> = Result<T, CartError>;

/// Errors raised by the Cart State Manager.
#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Usage Errors
    // =========================================================================
    /// The cart was requested from a scope no `CartProvider` is mounted in.
    #[error("use_cart must be used within a CartProvider")]
    OutsideProvider,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid cart configuration.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// Device storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// The persistence writer has stopped and no longer accepts snapshots.
    #[error("Persistence writer has shut down")]
    WriterClosed,
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::ConfigSaveFailed(err.to_string())
    }
}

impl CartError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CartError::InvalidConfig(_)
                | CartError::ConfigLoadFailed(_)
                | CartError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if this error indicates a programming mistake rather than
    /// a runtime condition.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, CartError::OutsideProvider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_provider_names_wrapper() {
        let err = CartError::OutsideProvider;
        assert!(err.to_string().contains("CartProvider"));
        assert!(err.is_usage_error());
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_config_errors() {
        assert!(CartError::InvalidConfig("x".into()).is_config_error());
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        assert!(CartError::from(toml_err).is_config_error());
    }

    #[test]
    fn test_store_error_converts() {
        let err: CartError = StoreError::Unavailable("quota".into()).into();
        assert!(matches!(err, CartError::Store(_)));
        assert_eq!(err.to_string(), "Storage error: Storage unavailable: quota");
    }
}

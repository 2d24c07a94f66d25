//! # Storage Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds key context and categorization        │
//! │       │                                                                 │
//! │       ├── load path  → logged, cart starts empty                       │
//! │       └── write path → logged, reported to PersistEventListener        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Device storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("Storage I/O failed for key {key:?}: {message}")]
    Io { key: String, message: String },

    /// The key cannot be mapped to a storage location.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The cart could not be serialized.
    #[error("Failed to encode cart: {0}")]
    Encode(String),

    /// The stored blob is not a valid cart.
    #[error("Failed to decode stored cart: {0}")]
    Decode(String),

    /// The store refused the operation (e.g. injected failure, quota).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Creates an Io error for a key.
    pub fn io(key: impl Into<String>, err: &std::io::Error) -> Self {
        StoreError::Io {
            key: key.into(),
            message: err.to_string(),
        }
    }

    /// Returns true if repeating the same operation later may succeed.
    ///
    /// A decode failure is permanent for the stored bytes; an I/O failure may
    /// be a full disk or a transient lock.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Io { .. } | StoreError::Unavailable(_))
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(StoreError::io("k", &io).is_retryable());
        assert!(StoreError::Unavailable("quota".into()).is_retryable());

        assert!(!StoreError::Decode("bad json".into()).is_retryable());
        assert!(!StoreError::InvalidKey(String::new()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = StoreError::io("@GoMarketplace:cart", &io);
        assert_eq!(
            err.to_string(),
            "Storage I/O failed for key \"@GoMarketplace:cart\": disk full"
        );
    }
}

//! # Error Types
//!
//! Domain-specific error types for gomarket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gomarket-core errors (this file)                                      │
//! │  ├── CoreError        - Cart invariant violations                      │
//! │  └── ValidationError  - Line item field failures                       │
//! │                                                                         │
//! │  gomarket-storage errors (separate crate)                              │
//! │  └── StoreError       - Device storage failures                        │
//! │                                                                         │
//! │  gomarket-cart errors                                                  │
//! │  └── CartError        - Scope misuse, config, writer channel           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Incrementing and decrementing never fail. Adding rejects a product the
//! stored cart could not hold (see [`crate::validation`]), and building a cart
//! from stored data or a fixture reports every entry it had to drop.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart invariant violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The same product id appears twice in a sequence that must be unique.
    #[error("Duplicate line item: {id}")]
    DuplicateItem { id: String },

    /// A line item failed field validation.
    #[error("Invalid line item {id:?}: {source}")]
    InvalidItem {
        id: String,
        #[source]
        source: ValidationError,
    },

    /// A stored entry could not be read as a line item at all.
    #[error("Unreadable stored entry #{index}: {reason}")]
    MalformedEntry { index: usize, reason: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Line item field validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be at least one.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be below zero.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

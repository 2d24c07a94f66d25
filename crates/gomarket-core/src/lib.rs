//! # gomarket-core: Pure Cart Logic for GoMarketplace
//!
//! This crate is the **heart** of the cart. It holds the line item types and
//! the cart reducer as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      GoMarketplace Cart Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile UI (consumers)                        │   │
//! │  │      Dashboard ──► Product card ──► Cart screen                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartScope::use_cart()                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                gomarket-cart (Cart State Manager)               │   │
//! │  │      CartProvider, CartHandle, persistence writer               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gomarket-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │   money   │  │ validation│  │   │
//! │  │   │ LineItem  │  │   Cart    │  │   Money   │  │   rules   │  │   │
//! │  │   │ Product   │  │CartAction │  │  totals   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO RUNTIME • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              gomarket-storage (Device Storage Layer)            │   │
//! │  │            key-value contract, file and memory stores           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire types (`LineItem`, `Product`)
//! - [`cart`] - The ordered, id-unique cart and its reducer
//! - [`money`] - Integer-cent money for totals
//! - [`error`] - Domain error types
//! - [`validation`] - Line item validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use gomarket_core::{Cart, CartAction, Product};
//!
//! let mut cart = Cart::new();
//! let coffee = Product::new("1", "Coffee", "https://cdn/coffee.png", 4.5);
//!
//! cart.apply(CartAction::AddToCart(coffee.clone()))?;
//! cart.apply(CartAction::AddToCart(coffee))?;
//!
//! assert_eq!(cart.quantity_of("1"), Some(2));
//! assert_eq!(cart.subtotal().cents(), 900);
//! # Ok::<(), gomarket_core::CoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartAction, HydrationReport};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::{LineItem, Product};

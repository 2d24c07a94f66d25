//! # Validation Module
//!
//! Field rules for line items.
//!
//! The same rules guard both ends of persistence: `add_to_cart` refuses a
//! product that breaks them, and rebuilding a cart from the stored blob drops
//! entries that break them. Anything the cart holds therefore survives a
//! save and reload unchanged.
//!
//! ## Usage
//! ```rust
//! use gomarket_core::validation::{validate_item_id, validate_price};
//!
//! assert!(validate_item_id("sku-1").is_ok());
//! assert!(validate_price(-1.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{LineItem, Product};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a product id.
///
/// ## Rules
/// - Must not be empty or whitespace only
pub fn validate_item_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be a finite number
/// - Must be non-negative (zero is allowed for free items)
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "price".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a line item quantity. Items at zero must not exist in a cart.
pub fn validate_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a product about to be added to the cart.
///
/// Quantity is not checked; the cart assigns it.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_item_id(&product.id)?;
    validate_price(product.price)?;
    Ok(())
}

/// Validates every field of a stored line item.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_item_id(&item.id)?;
    validate_price(item.price)?;
    validate_quantity(item.quantity)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64, quantity: u32) -> LineItem {
        LineItem {
            id: id.to_string(),
            title: "Mug".to_string(),
            image_url: "https://cdn/mug.png".to_string(),
            price,
            quantity,
        }
    }

    #[test]
    fn test_validate_item_id() {
        assert!(validate_item_id("1").is_ok());
        assert!(validate_item_id("").is_err());
        assert!(validate_item_id("   ").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(1099.9).is_ok());
        assert_eq!(
            validate_price(-0.01),
            Err(ValidationError::Negative {
                field: "price".to_string()
            })
        );
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_line_item() {
        assert!(validate_line_item(&item("1", 9.9, 1)).is_ok());
        assert!(validate_line_item(&item("1", 9.9, 0)).is_err());
        assert!(validate_line_item(&item("", 9.9, 2)).is_err());
    }

    #[test]
    fn test_validate_product_matches_line_item_rules() {
        for (id, price) in [("1", 9.9), ("", 9.9), (" ", 1.0), ("2", -5.0), ("3", f64::NAN)] {
            let product = Product::new(id, "Mug", "", price);
            assert_eq!(
                validate_product(&product).is_ok(),
                validate_line_item(&item(id, price, 1)).is_ok(),
                "id {:?} price {}",
                id,
                price
            );
        }
    }
}

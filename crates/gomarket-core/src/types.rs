//! # Domain Types
//!
//! Wire types shared by the cart, device storage and the mobile UI.
//!
//! ## Wire Format
//! The stored cart is a JSON array of line items. Field names are fixed
//! because older app builds read the same blob:
//! ```json
//! [{ "id": "1", "title": "Coffee", "image_url": "https://...", "price": 4.5, "quantity": 2 }]
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog product as handed to `add_to_cart`.
///
/// It carries no quantity: the cart decides the quantity when the product is
/// added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique product identifier.
    pub id: String,

    /// Display name.
    pub title: String,

    /// Product image shown on the cart screen.
    pub image_url: String,

    /// Unit price in currency units (e.g. `4.5` = $4.50).
    pub price: f64,
}

impl Product {
    /// Creates a product.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Product {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

/// Dropping the quantity: a line item handed back to `add_to_cart` is added as
/// a product, whatever quantity it carried.
impl From<LineItem> for Product {
    fn from(item: LineItem) -> Self {
        Product {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart with its accumulated quantity.
///
/// ## Invariant
/// `quantity >= 1` while the item is in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Unique product identifier (unique within a cart).
    pub id: String,

    /// Display name.
    pub title: String,

    /// Product image shown on the cart screen.
    pub image_url: String,

    /// Unit price in currency units.
    pub price: f64,

    /// Quantity in cart.
    pub quantity: u32,
}

impl LineItem {
    /// Creates a line item with quantity 1 from a product.
    pub fn from_product(product: Product) -> Self {
        LineItem {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity: 1,
        }
    }

    /// Returns the unit price in cents.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_decimal(self.price)
    }

    /// Calculates the line total (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price() * i64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_json_field_names() {
        let item = LineItem::from_product(Product::new("1", "Coffee", "https://cdn/c.png", 4.5));
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "1",
                "title": "Coffee",
                "image_url": "https://cdn/c.png",
                "price": 4.5,
                "quantity": 1
            })
        );
    }

    #[test]
    fn test_line_item_into_product_drops_quantity() {
        let item = LineItem {
            id: "9".to_string(),
            title: "Tea".to_string(),
            image_url: String::new(),
            price: 2.0,
            quantity: 17,
        };
        let product: Product = item.into();
        assert_eq!(product, Product::new("9", "Tea", "", 2.0));
    }

    #[test]
    fn test_line_total() {
        let mut item = LineItem::from_product(Product::new("1", "Coffee", "", 4.99));
        item.quantity = 3;
        assert_eq!(item.line_total().cents(), 1497);
    }
}

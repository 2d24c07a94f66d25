//! # Cart
//!
//! The ordered, id-unique collection of line items and the reducer that
//! mutates it.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Reducer                                         │
//! │                                                                         │
//! │  UI Action              CartAction                 Cart State Change    │
//! │  ─────────              ──────────                 ─────────────────    │
//! │                                                                         │
//! │  Tap "Add" ────────────► AddToCart(product) ─┬───► items[i].qty += 1    │
//! │                                              └───► items.push(qty = 1)  │
//! │                                                                         │
//! │  Tap "+" ──────────────► Increment(id) ──────────► items[i].qty += 1    │
//! │                                                                         │
//! │  Tap "-" ──────────────► Decrement(id) ──────┬───► items[i].qty -= 1    │
//! │                                              └───► items.remove(i)      │
//! │                                                    (when qty was 1)     │
//! │                                                                         │
//! │  Every action reports whether the cart changed, so callers only        │
//! │  notify observers and persist when something actually happened.         │
//! │  AddToCart refuses products the stored cart could not hold back.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{LineItem, Product};
use crate::validation::{validate_line_item, validate_product};

// =============================================================================
// Cart Action
// =============================================================================

/// A single mutation of the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add one unit of a product (appends it when not yet in the cart).
    AddToCart(Product),
    /// Add one unit to every item with this id.
    Increment(String),
    /// Remove one unit from the item with this id, dropping it at zero.
    Decrement(String),
}

impl CartAction {
    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            CartAction::AddToCart(_) => "add_to_cart",
            CartAction::Increment(_) => "increment",
            CartAction::Decrement(_) => "decrement",
        }
    }
}

// =============================================================================
// Hydration Report
// =============================================================================

/// What was repaired while rebuilding a cart from stored items.
#[derive(Debug, Default)]
pub struct HydrationReport {
    /// Entries that were dropped, with the reason.
    pub dropped: Vec<CoreError>,
    /// Ids that appeared more than once and were merged into the first entry.
    pub merged: Vec<String>,
}

impl HydrationReport {
    /// Returns true if the stored items were used as-is.
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.merged.is_empty()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `id` (adding the same product increases quantity)
/// - Quantity is >= 1 for every item (an item reaching 0 is removed)
/// - Items keep insertion order
///
/// Serializes as a bare JSON array of line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from items that must already satisfy every invariant.
    ///
    /// Used for trusted fixtures; stored data goes through [`Cart::hydrate`].
    pub fn try_from_items(items: Vec<LineItem>) -> CoreResult<Self> {
        let mut cart = Cart::new();
        for item in items {
            validate_line_item(&item).map_err(|source| CoreError::InvalidItem {
                id: item.id.clone(),
                source,
            })?;
            if cart.position(&item.id).is_some() {
                return Err(CoreError::DuplicateItem { id: item.id });
            }
            cart.items.push(item);
        }
        Ok(cart)
    }

    /// Rebuilds a cart from stored items, repairing what it can.
    ///
    /// ## Repairs
    /// - Items failing validation (empty id, zero quantity, bad price) are dropped
    /// - Repeated ids are merged into the first occurrence by summing quantities
    pub fn hydrate(items: Vec<LineItem>) -> (Self, HydrationReport) {
        let mut report = HydrationReport::default();
        let mut index: HashMap<String, usize> = HashMap::with_capacity(items.len());
        let mut kept: Vec<LineItem> = Vec::with_capacity(items.len());

        for item in items {
            if let Err(source) = validate_line_item(&item) {
                report.dropped.push(CoreError::InvalidItem {
                    id: item.id,
                    source,
                });
                continue;
            }

            match index.get(&item.id) {
                Some(&at) => {
                    let existing = &mut kept[at];
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                    report.merged.push(item.id);
                }
                None => {
                    index.insert(item.id.clone(), kept.len());
                    kept.push(item);
                }
            }
        }

        (Cart { items: kept }, report)
    }

    /// Applies an action. Returns `Ok(true)` if the cart changed.
    ///
    /// Only `AddToCart` can fail; a rejected product leaves the cart untouched.
    pub fn apply(&mut self, action: CartAction) -> CoreResult<bool> {
        match action {
            CartAction::AddToCart(product) => self.add_to_cart(product).map(|()| true),
            CartAction::Increment(id) => Ok(self.increment(&id)),
            CartAction::Decrement(id) => Ok(self.decrement(&id)),
        }
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - Already in cart: quantity + 1, every other field left as stored
    /// - Not in cart: appended with quantity 1
    ///
    /// ## Errors
    /// `CoreError::InvalidItem` when the id is blank or the price is negative
    /// or not finite. [`Cart::hydrate`] would drop such an item on reload.
    pub fn add_to_cart(&mut self, product: Product) -> CoreResult<()> {
        validate_product(&product).map_err(|source| CoreError::InvalidItem {
            id: product.id.clone(),
            source,
        })?;

        if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return Ok(());
        }

        self.items.push(LineItem::from_product(product));
        Ok(())
    }

    /// Adds one unit to every item with a matching id. Returns false if none matched.
    pub fn increment(&mut self, id: &str) -> bool {
        let mut changed = false;
        for item in self.items.iter_mut().filter(|i| i.id == id) {
            item.quantity = item.quantity.saturating_add(1);
            changed = true;
        }
        changed
    }

    /// Removes one unit from the item with this id.
    ///
    /// At quantity 1 the item is removed; the items after it keep their order.
    /// A missing id leaves the cart untouched and returns false.
    pub fn decrement(&mut self, id: &str) -> bool {
        let Some(at) = self.position(id) else {
            return false;
        };

        if self.items[at].quantity <= 1 {
            self.items.remove(at);
        } else {
            self.items[at].quantity -= 1;
        }
        true
    }

    /// Returns the line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consumes the cart, returning its line items.
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Looks up an item by id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Returns the quantity of an item, if present.
    pub fn quantity_of(&self, id: &str) -> Option<u32> {
        self.get(id).map(|i| i.quantity)
    }

    /// Returns the number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of every line total.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn product(id: &str) -> Product {
        Product::new(id, format!("Product {}", id), format!("https://cdn/{}.png", id), 10.0)
    }

    fn item(id: &str, quantity: u32) -> LineItem {
        LineItem {
            quantity,
            ..LineItem::from_product(product(id))
        }
    }

    fn ids_and_quantities(cart: &Cart) -> Vec<(&str, u32)> {
        cart.items().iter().map(|i| (i.id.as_str(), i.quantity)).collect()
    }

    #[test]
    fn test_add_distinct_products_counts_calls() {
        let mut cart = Cart::new();
        let calls = ["a", "b", "a", "c", "a", "b"];

        for id in calls {
            cart.add_to_cart(product(id)).unwrap();
        }

        assert_eq!(cart.len(), 3);
        assert_eq!(ids_and_quantities(&cart), vec![("a", 3), ("b", 2), ("c", 1)]);
    }

    #[test]
    fn test_add_existing_leaves_other_items_unchanged() {
        let mut cart = Cart::new();
        cart.add_to_cart(product("a")).unwrap();
        cart.add_to_cart(product("b")).unwrap();
        let before_b = cart.get("b").cloned();

        // A changed title on re-add does not overwrite the stored entry.
        let mut renamed = product("a");
        renamed.title = "Renamed".to_string();
        cart.add_to_cart(renamed).unwrap();

        assert_eq!(cart.quantity_of("a"), Some(2));
        assert_eq!(cart.get("a").map(|i| i.title.as_str()), Some("Product a"));
        assert_eq!(cart.get("b").cloned(), before_b);
    }

    #[test]
    fn test_add_ignores_caller_quantity() {
        let mut cart = Cart::new();
        cart.apply(CartAction::AddToCart(item("a", 40).into())).unwrap();
        assert_eq!(cart.quantity_of("a"), Some(1));
    }

    #[test]
    fn test_increment_missing_is_noop() {
        let mut cart = Cart::new();
        cart.add_to_cart(product("a")).unwrap();
        let before = cart.clone();

        assert!(!cart.increment("zzz"));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrement_above_one() {
        let mut cart = Cart::try_from_items(vec![item("a", 3), item("b", 1)]).unwrap();

        assert!(cart.decrement("a"));
        assert_eq!(ids_and_quantities(&cart), vec![("a", 2), ("b", 1)]);
    }

    #[test]
    fn test_decrement_at_one_removes_only_that_item() {
        let mut cart =
            Cart::try_from_items(vec![item("a", 2), item("b", 1), item("c", 4), item("d", 1)])
                .unwrap();

        assert!(cart.decrement("b"));

        assert_eq!(ids_and_quantities(&cart), vec![("a", 2), ("c", 4), ("d", 1)]);
    }

    #[test]
    fn test_decrement_missing_is_noop() {
        let mut cart = Cart::try_from_items(vec![item("a", 1)]).unwrap();
        assert!(!cart.decrement("nope"));
        assert_eq!(cart.len(), 1);

        let mut empty = Cart::new();
        assert!(!empty.decrement("a"));
    }

    #[test]
    fn test_full_scenario() {
        let mut cart = Cart::new();

        cart.apply(CartAction::AddToCart(product("a"))).unwrap();
        assert_eq!(ids_and_quantities(&cart), vec![("a", 1)]);

        cart.apply(CartAction::AddToCart(product("a"))).unwrap();
        assert_eq!(ids_and_quantities(&cart), vec![("a", 2)]);

        cart.apply(CartAction::Increment("a".into())).unwrap();
        assert_eq!(ids_and_quantities(&cart), vec![("a", 3)]);

        cart.apply(CartAction::Decrement("a".into())).unwrap();
        assert_eq!(ids_and_quantities(&cart), vec![("a", 2)]);

        cart.apply(CartAction::Decrement("a".into())).unwrap();
        cart.apply(CartAction::Decrement("a".into())).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_apply_reports_changes() {
        let mut cart = Cart::new();
        assert!(cart.apply(CartAction::AddToCart(product("a"))).unwrap());
        assert!(cart.apply(CartAction::Increment("a".into())).unwrap());
        assert!(!cart.apply(CartAction::Increment("b".into())).unwrap());
        assert!(!cart.apply(CartAction::Decrement("b".into())).unwrap());
    }

    #[test]
    fn test_serializes_as_bare_array() {
        let cart = Cart::try_from_items(vec![item("a", 2)]).unwrap();
        let json = serde_json::to_string(&cart).unwrap();
        assert!(json.starts_with('['));

        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_try_from_items_rejects_duplicates_and_zero() {
        let err = Cart::try_from_items(vec![item("a", 1), item("a", 2)]).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateItem { ref id } if id == "a"));

        let err = Cart::try_from_items(vec![item("a", 0)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidItem {
                source: ValidationError::MustBePositive { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_hydrate_repairs_stored_items() {
        let mut negative = item("neg", 1);
        negative.price = -3.0;

        let (cart, report) = Cart::hydrate(vec![
            item("a", 1),
            item("zero", 0),
            item("b", 2),
            item("a", 4),
            negative,
        ]);

        assert_eq!(ids_and_quantities(&cart), vec![("a", 5), ("b", 2)]);
        assert_eq!(report.dropped.len(), 2);
        assert_eq!(report.merged, vec!["a".to_string()]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_add_sequences() {
        enum Step {
            Add(&'static str),
            Dec(&'static str),
        }
        use Step::{Add, Dec};

        let cases: Vec<(Vec<Step>, Vec<(&str, u32)>)> = vec![
            (vec![], vec![]),
            (vec![Add("a")], vec![("a", 1)]),
            (vec![Add("a"), Add("a"), Add("a")], vec![("a", 3)]),
            (
                vec![Add("c"), Add("b"), Add("a"), Add("b")],
                vec![("c", 1), ("b", 2), ("a", 1)],
            ),
            (
                vec![Add("a"), Add("b"), Dec("a"), Add("a")],
                vec![("b", 1), ("a", 1)],
            ),
            (
                vec![Add("a"), Add("a"), Add("b"), Dec("a"), Dec("a"), Add("c"), Add("a")],
                vec![("b", 1), ("c", 1), ("a", 1)],
            ),
            (
                vec![Add("a"), Dec("a"), Add("a"), Add("a"), Dec("a")],
                vec![("a", 1)],
            ),
        ];

        for (steps, expected) in cases {
            let mut cart = Cart::new();
            for step in &steps {
                match step {
                    Add(id) => cart.add_to_cart(product(id)).unwrap(),
                    Dec(id) => {
                        cart.decrement(id);
                    }
                }
            }
            assert_eq!(ids_and_quantities(&cart), expected);
            assert_eq!(
                cart.total_quantity(),
                expected.iter().map(|(_, q)| u64::from(*q)).sum::<u64>()
            );
        }
    }

    #[test]
    fn test_add_rejects_what_hydrate_would_drop() {
        let mut cart = Cart::new();
        cart.add_to_cart(product("a")).unwrap();
        let before = cart.clone();

        let rejected = [
            Product::new("", "Blank", "", 1.0),
            Product::new("  ", "Spaces", "", 1.0),
            Product::new("n", "NaN", "", f64::NAN),
            Product::new("i", "Inf", "", f64::INFINITY),
            Product::new("d", "Negative", "", -5.0),
        ];
        for bad in rejected {
            let err = cart.apply(CartAction::AddToCart(bad)).unwrap_err();
            assert!(matches!(err, CoreError::InvalidItem { .. }));
        }
        assert_eq!(cart, before);

        // Whatever the cart accepted comes back intact through hydrate
        cart.add_to_cart(Product::new("free", "Sticker", "", 0.0)).unwrap();
        let (reloaded, report) = Cart::hydrate(cart.items().to_vec());
        assert!(report.is_clean());
        assert_eq!(reloaded, cart);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::try_from_items(vec![item("a", 2), item("b", 1)]).unwrap();
        cart.add_to_cart(Product::new("c", "Gum", "", 0.99)).unwrap();

        assert_eq!(cart.total_quantity(), 4);
        assert_eq!(cart.subtotal().cents(), 3099);
    }
}

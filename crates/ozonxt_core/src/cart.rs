//! crates/ozonxt_core/src/cart.rs
//!
//! The shopping cart. It lives entirely on the client; the JSON helpers stand
//! in for the browser's local storage.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Quantity too large for product {0}")]
    QuantityTooLarge(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> u64 {
        self.product.price.saturating_mul(u64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds one unit of `product`, inserting it at quantity 1 if absent.
    /// The quantity stops at `u32::MAX`.
    pub fn add(&mut self, product: Product) {
        match self.items.iter_mut().find(|i| i.product.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(CartItem {
                product,
                quantity: 1,
            }),
        }
    }

    pub fn remove(&mut self, product_id: &str) {
        self.items.retain(|i| i.product.id != product_id);
    }

    /// Sets the quantity for `product_id`; zero or less removes the item.
    /// Unknown ids are ignored.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn total(&self) -> u64 {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(0, u64::saturating_add)
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Merges lines for the same product and drops zero-quantity lines.
impl TryFrom<Vec<CartItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        let mut cart = Cart::new();
        for item in items.into_iter().filter(|i| i.quantity > 0) {
            match cart.items.iter_mut().find(|c| c.product.id == item.product.id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(item.quantity)
                        .ok_or_else(|| CartError::QuantityTooLarge(item.product.id.clone()))?;
                }
                None => cart.items.push(item),
            }
        }
        Ok(cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_product;

    fn product(id: &str) -> Product {
        find_product(id).unwrap()
    }

    #[test]
    fn add_increments_existing_items() {
        let mut cart = Cart::new();
        cart.add(product("1"));
        cart.add(product("1"));
        cart.add(product("2"));
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), 7499 * 2 + 8999);
    }

    #[test]
    fn update_to_zero_removes_item() {
        let mut cart = Cart::new();
        cart.add(product("1"));
        cart.update_quantity("1", 5);
        assert_eq!(cart.items()[0].quantity, 5);
        cart.update_quantity("1", 0);
        assert!(cart.is_empty());

        cart.add(product("2"));
        cart.update_quantity("2", -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn remove_and_clear() {
        let mut cart = Cart::new();
        cart.add(product("1"));
        cart.add(product("3"));
        cart.remove("1");
        assert_eq!(cart.items().len(), 1);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
    }

    #[test]
    fn merging_lines_rejects_quantity_overflow() {
        let lines = vec![
            CartItem {
                product: product("1"),
                quantity: u32::MAX,
            },
            CartItem {
                product: product("1"),
                quantity: 1,
            },
        ];
        assert_eq!(
            Cart::try_from(lines),
            Err(CartError::QuantityTooLarge("1".to_string()))
        );
    }

    #[test]
    fn merging_lines_sums_quantities_and_skips_zero() {
        let lines = vec![
            CartItem {
                product: product("1"),
                quantity: 2,
            },
            CartItem {
                product: product("2"),
                quantity: 0,
            },
            CartItem {
                product: product("1"),
                quantity: 3,
            },
        ];
        let cart = Cart::try_from(lines).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn repeated_adds_stop_at_the_maximum_quantity() {
        let mut cart = Cart::new();
        cart.add(product("3"));
        cart.update_quantity("3", i64::MAX);
        assert_eq!(cart.items()[0].quantity, u32::MAX);
        cart.add(product("3"));
        assert_eq!(cart.items()[0].quantity, u32::MAX);
        assert_eq!(cart.total(), 16999 * u64::from(u32::MAX));
    }

    #[test]
    fn survives_local_storage() {
        let mut cart = Cart::new();
        cart.add(product("4"));
        cart.update_quantity("4", 3);
        let restored = Cart::from_json(&cart.to_json().unwrap()).unwrap();
        assert_eq!(restored, cart);
    }
}

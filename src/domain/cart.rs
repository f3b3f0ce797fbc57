use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::format_amount;

/// One line of the shopper's cart. The name, price and image are denormalized
/// at add-time purely for display; checkout re-prices every line from the
/// canonical catalog and ignores whatever the client stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: BigDecimal,
    pub quantity: u32,
    pub product_image: Option<String>,
}

/// The anonymous shopper's cart.
///
/// Lives entirely in client-local storage, serialized under
/// [`SessionCart::storage_key`]; the server never trusts its contents. The
/// session identifier only needs to be collision-free, it is not an
/// authorization token and cart contents are not sensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCart {
    pub session_id: String,
    pub items: Vec<CartItem>,
}

impl SessionCart {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().simple().to_string(),
            items: Vec::new(),
        }
    }

    /// Key under which the serialized cart is kept in client-local storage.
    pub fn storage_key(&self) -> String {
        format!("cart:{}", self.session_id)
    }

    /// Add an item. Adding a product already in the cart merges quantities
    /// instead of duplicating the line.
    pub fn add(&mut self, item: CartItem) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity.max(1));
        } else {
            let mut item = item;
            item.quantity = item.quantity.max(1);
            self.items.push(item);
        }
    }

    /// Set a line's quantity, clamped to a floor of 1. Unknown products are
    /// ignored; removal is explicit via [`SessionCart::remove`].
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: u32) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity.max(1);
        }
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.items.retain(|i| i.product_id != product_id);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of price × quantity over all lines. Exact decimal arithmetic;
    /// rounding happens only in [`SessionCart::display_subtotal`].
    pub fn subtotal(&self) -> BigDecimal {
        self.items.iter().fold(BigDecimal::from(0), |acc, i| {
            acc + &i.unit_price * BigDecimal::from(i.quantity)
        })
    }

    /// Subtotal rendered with two decimal places for display.
    pub fn display_subtotal(&self) -> String {
        format_amount(&self.subtotal())
    }
}

impl Default for SessionCart {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn item(name: &str, price: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: Uuid::new_v4(),
            product_name: name.to_string(),
            unit_price: BigDecimal::from_str(price).expect("valid decimal"),
            quantity,
            product_image: None,
        }
    }

    #[test]
    fn subtotal_sums_price_times_quantity() {
        let mut cart = SessionCart::new();
        cart.add(item("Tote Bag", "150.00", 2));
        cart.add(item("Mug", "80.00", 1));
        assert_eq!(cart.display_subtotal(), "380.00");
    }

    #[test]
    fn adding_same_product_merges_quantities() {
        let mut cart = SessionCart::new();
        let tote = item("Tote Bag", "150.00", 1);
        cart.add(tote.clone());
        cart.add(tote);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[test]
    fn quantity_is_clamped_to_a_floor_of_one() {
        let mut cart = SessionCart::new();
        let mug = item("Mug", "80.00", 1);
        let product_id = mug.product_id;
        cart.add(mug);
        cart.set_quantity(product_id, 0);
        assert_eq!(cart.items[0].quantity, 1);
        cart.set_quantity(product_id, 5);
        assert_eq!(cart.items[0].quantity, 5);
    }

    #[test]
    fn add_with_zero_quantity_stores_one() {
        let mut cart = SessionCart::new();
        cart.add(item("Sticker", "5.00", 0));
        assert_eq!(cart.items[0].quantity, 1);
    }

    #[test]
    fn remove_deletes_the_line() {
        let mut cart = SessionCart::new();
        let mug = item("Mug", "80.00", 1);
        let product_id = mug.product_id;
        cart.add(mug);
        cart.remove(product_id);
        assert!(cart.is_empty());
        assert_eq!(cart.display_subtotal(), "0.00");
    }

    #[test]
    fn session_ids_do_not_collide_in_practice() {
        let a = SessionCart::new();
        let b = SessionCart::new();
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(a.storage_key(), format!("cart:{}", a.session_id));
    }

    #[test]
    fn cart_serializes_for_client_storage() {
        let mut cart = SessionCart::new();
        cart.add(item("Mug", "80.00", 2));
        let json = serde_json::to_string(&cart).expect("serialize");
        let restored: SessionCart = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.session_id, cart.session_id);
        assert_eq!(restored.items.len(), 1);
        assert_eq!(restored.display_subtotal(), "160.00");
    }
}

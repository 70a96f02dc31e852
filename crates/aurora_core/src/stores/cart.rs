//! Cart store persisted under `aurora_cart`.
//!
//! # Invariants
//! - Readers always see an item list; absent, `null` or corrupt storage reads
//!   as the empty cart.
//! - A `None` write is normalized to the empty cart before it is persisted,
//!   so the stored root is never `null`.
//! - At most one line per `product_id`.
//! - Every committed line has a finite, non-negative price. JSON has no
//!   representation for NaN or infinity, so such a line would make the whole
//!   stored cart unreadable on the next hydration.

use super::CART_KEY;
use crate::events::{EventBus, UiEvent};
use crate::reactive::{Atom, Derived, Subscription, WriteThrough};
use crate::storage::StorageAdapter;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub title: String,
    pub price: f64,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(
        product_id: impl Into<String>,
        title: impl Into<String>,
        price: f64,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            title: title.into(),
            price,
            quantity,
        }
    }

    /// Whether the price can be stored and summed.
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price >= 0.0
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |total, item| total.saturating_add(item.quantity))
    }

    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map_or(0, |item| item.quantity)
    }

    /// Adds `item`, merging quantity into an existing line for the product.
    ///
    /// An item without a valid price leaves the cart unchanged.
    pub fn with_item(&self, item: CartItem) -> Cart {
        let mut next = self.clone();
        if !item.has_valid_price() {
            return next;
        }
        let quantity = item.quantity.max(1);
        match next
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => next.items.push(CartItem { quantity, ..item }),
        }
        next
    }

    pub fn without(&self, product_id: &str) -> Cart {
        Cart {
            items: self
                .items
                .iter()
                .filter(|item| item.product_id != product_id)
                .cloned()
                .collect(),
        }
    }

    /// Sets a line's quantity; zero removes the line. Unknown products are
    /// left untouched.
    pub fn with_quantity(&self, product_id: &str, quantity: u32) -> Cart {
        if quantity == 0 {
            return self.without(product_id);
        }
        let mut next = self.clone();
        if let Some(line) = next
            .items
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            line.quantity = quantity;
        }
        next
    }

    /// Drops lines whose price is not storable; returns how many were dropped.
    fn retain_valid_prices(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(CartItem::has_valid_price);
        before - self.items.len()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<CartItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<CartItem>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Session-persisted cart.
///
/// Writers pass either a literal next cart or an updater of the committed
/// cart; `None` in either form means "empty cart".
#[derive(Clone)]
pub struct CartStore {
    cell: WriteThrough<Cart, Option<Cart>>,
    item_count: Derived<Cart, u32>,
}

impl CartStore {
    pub fn new(storage: &StorageAdapter, bus: &EventBus) -> Self {
        let initial = storage
            .load::<Option<Cart>>(CART_KEY, None)
            .unwrap_or_default();
        let base = Atom::new(CART_KEY, initial);

        let writer = storage.clone();
        let cell = WriteThrough::new(base.clone(), move |next: Option<Cart>| {
            let mut cart = next.unwrap_or_default();
            let dropped = cart.retain_valid_prices();
            if dropped > 0 {
                warn!("event=cart_write module=stores status=dropped_invalid_price lines={dropped}");
            }
            writer.save(CART_KEY, &cart);
            cart
        });

        let bus = bus.clone();
        let _badge = base.subscribe(move |cart: &Cart| {
            bus.publish(UiEvent::CartChanged {
                item_count: cart.item_count(),
            });
        });

        Self {
            item_count: base.map(Cart::item_count),
            cell,
        }
    }

    pub fn get(&self) -> Cart {
        self.cell.get()
    }

    /// Replaces the whole cart.
    pub fn replace(&self, next: Option<Cart>) {
        self.cell.set(next);
    }

    /// Recomputes the cart from the committed one.
    pub fn update(&self, updater: impl FnOnce(&Cart) -> Option<Cart>) {
        self.cell.update(updater);
    }

    /// Adds `item` to the cart. Returns `false`, leaving the cart untouched,
    /// when the price is NaN, infinite or negative.
    pub fn add_item(&self, item: CartItem) -> bool {
        if !item.has_valid_price() {
            warn!("event=cart_add module=stores status=rejected reason=invalid_price");
            return false;
        }
        self.update(move |cart| Some(cart.with_item(item)));
        true
    }

    pub fn remove_item(&self, product_id: &str) {
        self.update(|cart| Some(cart.without(product_id)));
    }

    pub fn set_quantity(&self, product_id: &str, quantity: u32) {
        self.update(|cart| Some(cart.with_quantity(product_id, quantity)));
    }

    pub fn clear(&self) {
        self.replace(None);
    }

    pub fn item_count(&self) -> u32 {
        self.item_count.get()
    }

    pub fn subtotal(&self) -> f64 {
        self.cell.with(Cart::subtotal)
    }

    pub fn subscribe(&self, listener: impl Fn(&Cart) + Send + Sync + 'static) -> Subscription {
        self.cell.subscribe(listener)
    }

    /// Read-only item-count projection for badges.
    pub fn item_count_atom(&self) -> &Derived<Cart, u32> {
        &self.item_count
    }
}

#[cfg(test)]
mod tests {
    use super::{Cart, CartItem};

    fn lamp(quantity: u32) -> CartItem {
        CartItem::new("p-lamp", "Lamp", 20.0, quantity)
    }

    #[test]
    fn with_item_merges_existing_line() {
        let cart = Cart::default().with_item(lamp(1)).with_item(lamp(2));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.quantity_of("p-lamp"), 3);
        assert_eq!(cart.subtotal(), 60.0);
    }

    #[test]
    fn with_item_ignores_unstorable_price() {
        let cart = Cart::default().with_item(lamp(1));
        for price in [f64::NAN, f64::INFINITY, -1.0] {
            let next = cart.with_item(CartItem::new("p-bad", "Bad", price, 1));
            assert_eq!(next, cart);
        }
    }

    #[test]
    fn zero_quantity_add_counts_as_one() {
        let cart = Cart::default().with_item(lamp(0));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn with_quantity_zero_removes_line() {
        let cart = Cart::default().with_item(lamp(2)).with_quantity("p-lamp", 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn deserializes_null_or_missing_items_as_empty() {
        let from_null: Cart = serde_json::from_str(r#"{"items":null}"#).unwrap();
        let from_missing: Cart = serde_json::from_str("{}").unwrap();
        assert!(from_null.items.is_empty());
        assert!(from_missing.items.is_empty());
    }

    #[test]
    fn serializes_camel_case_fields() {
        let json = serde_json::to_value(Cart::default().with_item(lamp(1))).unwrap();
        assert_eq!(json["items"][0]["productId"], "p-lamp");
        assert_eq!(json["items"][0]["quantity"], 1);
    }
}

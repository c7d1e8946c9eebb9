//! Shopping cart aggregate.
//!
//! The cart lives on the client and is persisted under `cart-storage` after
//! every mutation. It is the only place client-side totals are computed:
//!
//! - `item_count = Σ quantity`
//! - `total = Σ quantity × (discounted_price ?? price)`
//!
//! Mutations cannot fail. Persistence problems are logged and the in-memory
//! cart stays authoritative for the rest of the process.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use avira_vastra_core::{Price, ProductId};

use crate::models::Product;
use crate::store::{self, StateStore, keys};

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    #[serde(rename = "_id")]
    pub product_id: ProductId,
    pub name: String,
    #[serde(rename = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(
        rename = "discountedPrice",
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discounted_unit_price: Option<Decimal>,
    pub quantity: u32,
    #[serde(rename = "image", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl CartLineItem {
    /// Snapshot a product into a new line item.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            discounted_unit_price: product.discounted_price,
            quantity,
            image_ref: product.primary_image().map(str::to_string),
        }
    }

    /// Price charged per unit.
    #[must_use]
    pub fn effective_unit_price(&self) -> Decimal {
        self.discounted_unit_price.unwrap_or(self.unit_price)
    }

    /// Price for the whole line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.effective_unit_price() * Decimal::from(self.quantity)
    }
}

/// Ordered line items, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartLineItem>,
}

impl Cart {
    /// Sum of all quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of every line total.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    fn add(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartLineItem::from_product(product, quantity));
        }
    }

    fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.items.len() != before
    }

    fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        let Ok(quantity) = u32::try_from(quantity) else {
            // Negative quantities remove; anything above u32::MAX saturates
            return if quantity <= 0 {
                self.remove(product_id)
            } else {
                self.set_quantity(product_id, i64::from(u32::MAX))
            };
        };
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self.items.iter_mut().find(|i| &i.product_id == product_id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                true
            }
            _ => false,
        }
    }
}

/// Shared handle to the persisted cart.
///
/// Cloning the handle shares the same cart. Every mutation holds the write
/// lock until the new state has been persisted, so a read issued after a
/// mutation returns always observes it.
#[derive(Clone)]
pub struct CartHandle {
    inner: Arc<CartInner>,
}

struct CartInner {
    cart: RwLock<Cart>,
    store: Arc<dyn StateStore>,
}

impl std::fmt::Debug for CartHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartHandle")
            .field("cart", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl CartHandle {
    /// Rehydrate the cart from `store`.
    #[must_use]
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        let cart: Cart = store::rehydrate(store.as_ref(), keys::CART);
        tracing::debug!(items = cart.items.len(), "Cart rehydrated");
        Self {
            inner: Arc::new(CartInner {
                cart: RwLock::new(cart),
                store,
            }),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Cart> {
        self.inner
            .cart
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, cart: &Cart) {
        store::persist(self.inner.store.as_ref(), keys::CART, cart);
    }

    /// Add `quantity` units of `product`.
    ///
    /// Merges into the existing line for the same product. Stock is not
    /// checked here; callers check `product.stock` first. A zero quantity
    /// is ignored.
    pub fn add_item(&self, product: &Product, quantity: u32) {
        let mut cart = self.write();
        cart.add(product, quantity);
        self.persist(&cart);
    }

    /// Remove the line for `product_id`. Absent products are ignored.
    pub fn remove_item(&self, product_id: &ProductId) {
        let mut cart = self.write();
        if cart.remove(product_id) {
            self.persist(&cart);
        }
    }

    /// Set the absolute quantity of a line. Zero or less removes it.
    pub fn update_quantity(&self, product_id: &ProductId, quantity: i64) {
        let mut cart = self.write();
        if cart.set_quantity(product_id, quantity) {
            self.persist(&cart);
        }
    }

    /// Empty the cart.
    pub fn clear_cart(&self) {
        let mut cart = self.write();
        cart.items.clear();
        self.persist(&cart);
    }

    /// Sum of all quantities, computed on every call.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.read(Cart::item_count)
    }

    /// Cart total, computed on every call.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.read(Cart::total)
    }

    /// Cart total as a rupee price.
    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::inr(self.total())
    }

    /// Copy of the current line items.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.read(|cart| cart.items.clone())
    }

    /// Copy of the whole cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.read(Cart::clone)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read(|cart| cart.items.is_empty())
    }

    fn read<T>(&self, f: impl FnOnce(&Cart) -> T) -> T {
        let cart = self
            .inner
            .cart
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::store::MemoryStore;

    pub(crate) fn product(id: &str, price: i64, discounted: Option<i64>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Saree {id}"),
            description: None,
            price: Decimal::from(price),
            discounted_price: discounted.map(Decimal::from),
            images: vec![format!("https://cdn.example/{id}.jpg")],
            image: None,
            stock: 10,
            category: None,
            weave_type: None,
            is_active: Some(true),
        }
    }

    fn cart() -> (CartHandle, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (CartHandle::load(store.clone()), store)
    }

    #[test]
    fn test_repeated_add_merges_into_one_line() {
        let (cart, _) = cart();
        let a = product("a", 1000, None);

        for _ in 0..4 {
            cart.add_item(&a, 1);
        }
        cart.add_item(&a, 3);

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 7);
    }

    #[test]
    fn test_add_zero_quantity_is_ignored() {
        let (cart, _) = cart();
        cart.add_item(&product("a", 1000, None), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_and_count_scenario() {
        let (cart, _) = cart();
        cart.add_item(&product("a", 1000, None), 1);
        cart.add_item(&product("b", 600, Some(500)), 2);

        assert_eq!(cart.total(), Decimal::from(2000));
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total_price().to_string(), "₹2000");
    }

    #[test]
    fn test_total_tracks_every_mutation() {
        let (cart, _) = cart();
        let a = product("a", 1000, None);
        let b = product("b", 600, Some(500));
        let c = product("c", 250, None);

        cart.add_item(&a, 2);
        cart.add_item(&b, 1);
        cart.add_item(&c, 4);
        cart.update_quantity(&a.id, 1);
        cart.remove_item(&c.id);
        cart.add_item(&b, 2);

        let expected: Decimal = cart
            .items()
            .iter()
            .map(|i| i.discounted_unit_price.unwrap_or(i.unit_price) * Decimal::from(i.quantity))
            .sum();
        assert_eq!(cart.total(), expected);
        assert_eq!(cart.total(), Decimal::from(2500));
    }

    #[test]
    fn test_update_quantity_is_absolute_and_non_positive_removes() {
        let (cart, _) = cart();
        let a = product("a", 1000, None);
        let b = product("b", 400, None);
        cart.add_item(&a, 3);
        cart.add_item(&b, 1);

        cart.update_quantity(&a.id, 5);
        assert_eq!(cart.items()[0].quantity, 5);

        cart.update_quantity(&a.id, 0);
        assert_eq!(cart.items().len(), 1);

        cart.update_quantity(&b.id, -1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (cart, _) = cart();
        cart.add_item(&product("a", 1000, None), 2);
        let before = cart.snapshot();

        cart.remove_item(&ProductId::new("missing"));
        cart.update_quantity(&ProductId::new("missing"), 3);

        assert_eq!(cart.snapshot(), before);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (cart, _) = cart();
        cart.add_item(&product("a", 1000, None), 2);
        cart.clear_cart();
        assert!(cart.is_empty());
        cart.clear_cart();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_cart_survives_reload() {
        let (cart, store) = cart();
        cart.add_item(&product("b", 600, Some(500)), 2);

        let reloaded = CartHandle::load(store);
        assert_eq!(reloaded.snapshot(), cart.snapshot());
        assert_eq!(reloaded.total(), Decimal::from(1000));
    }

    #[test]
    fn test_persisted_shape() {
        let (cart, store) = cart();
        cart.add_item(&product("b", 600, Some(500)), 2);

        let raw = store.load(keys::CART).unwrap().unwrap();
        let line = &raw["state"]["items"][0];
        assert_eq!(line["_id"], "b");
        assert_eq!(line["quantity"], 2);
        assert_eq!(line["discountedPrice"], 500.0);
        assert_eq!(line["image"], "https://cdn.example/b.jpg");
    }

    #[test]
    fn test_clones_share_state() {
        let (cart, _) = cart();
        let other = cart.clone();
        other.add_item(&product("a", 1000, None), 1);
        assert_eq!(cart.item_count(), 1);
    }
}

//! Cart Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::Product;
use crate::domain::value_objects::{clamp_quantity, Money};

#[derive(Clone, Debug, Serialize)]
pub struct Cart {
    items: Vec<CartItem>,
    currency: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn product_id(&self) -> &str { self.product.id() }
    pub fn line_total(&self) -> Money { self.product.price().multiply(self.quantity) }
}

/// Persisted shape of one cart line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    pub product_id: String,
    pub quantity: u32,
}

/// Shipping and tax rules applied to a subtotal
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingPolicy {
    pub currency: String,
    pub free_shipping_threshold: Decimal,
    pub flat_shipping_fee: Decimal,
    pub tax_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            free_shipping_threshold: Decimal::new(100, 0),
            flat_shipping_fee: Decimal::new(10, 0),
            tax_rate: Decimal::new(7, 2),
        }
    }
}

impl PricingPolicy {
    pub fn shipping_for(&self, subtotal: &Money) -> Money {
        if subtotal.is_zero() || subtotal.amount() >= self.free_shipping_threshold {
            Money::zero(subtotal.currency())
        } else {
            Money::new(self.flat_shipping_fee, subtotal.currency())
        }
    }

    pub fn tax_for(&self, subtotal: &Money) -> Money { subtotal.scale(self.tax_rate) }
}

/// Derived totals. Never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub item_count: u32,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub grand_total: Money,
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { items: vec![], currency: currency.to_string() }
    }

    /// Rebuild a cart from persisted records against the live catalog.
    ///
    /// Records whose product no longer exists, is out of stock or is priced in
    /// another currency are dropped, as are records with a zero quantity. The
    /// number of dropped records is returned alongside the cart.
    pub fn restore<'a, F>(currency: &str, records: &[CartRecord], lookup: F) -> (Self, usize)
    where
        F: Fn(&str) -> Option<&'a Product>,
    {
        let mut cart = Self::new(currency);
        let mut dropped = 0;
        for record in records {
            let restored = lookup(&record.product_id)
                .filter(|product| record.quantity > 0 && product.price().currency() == currency)
                .and_then(|product| clamp_quantity(record.quantity, product.stock()).map(|quantity| (product, quantity)));
            match restored {
                Some((product, quantity)) if cart.find(product.id()).is_none() => {
                    cart.items.push(CartItem { product: product.clone(), quantity });
                }
                _ => dropped += 1,
            }
        }
        (cart, dropped)
    }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn line_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn find(&self, product_id: &str) -> Option<&CartItem> { self.items.iter().find(|i| i.product_id() == product_id) }
    pub fn quantity_of(&self, product_id: &str) -> Option<u32> { self.find(product_id).map(|i| i.quantity) }

    /// Adds `quantity` units, merging with an existing line. Returns the stored quantity.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> Result<u32, CartError> {
        if product.price().currency() != self.currency { return Err(CartError::CurrencyMismatch); }
        if !product.is_in_stock() { return Err(CartError::OutOfStock); }
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id() == product.id()) {
            if existing.quantity >= product.stock() { return Err(CartError::OutOfStock); }
            existing.quantity = existing.quantity.saturating_add(quantity).min(product.stock());
            existing.product = product.clone();
            return Ok(existing.quantity);
        }
        let quantity = clamp_quantity(quantity, product.stock()).ok_or(CartError::OutOfStock)?;
        self.items.push(CartItem { product: product.clone(), quantity });
        Ok(quantity)
    }

    /// Sets a line's quantity. Anything below one removes the line and yields `None`.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<Option<u32>, CartError> {
        let item = self.items.iter_mut().find(|i| i.product_id() == product_id).ok_or(CartError::ItemNotFound)?;
        let stored = quantity.min(item.product.stock());
        if stored == 0 {
            self.items.retain(|i| i.product_id() != product_id);
            return Ok(None);
        }
        item.quantity = stored;
        Ok(Some(stored))
    }

    /// Removes a line if present. Returns whether anything changed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id() != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) { self.items.clear(); }

    /// Re-check every line against the live catalog: refresh the product
    /// snapshot, clamp the quantity to current stock and drop lines whose
    /// product is gone or sold out. Returns whether the persisted shape changed.
    pub fn reconcile<'a, F>(&mut self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<&'a Product>,
    {
        let before = self.to_records();
        let currency = self.currency.clone();
        self.items.retain_mut(|item| match lookup(item.product_id()) {
            Some(live) if live.is_in_stock() && live.price().currency() == currency => {
                item.quantity = item.quantity.min(live.stock());
                item.product = live.clone();
                true
            }
            _ => false,
        });
        self.to_records() != before
    }

    /// Every line shares the cart currency; `add_item` and `restore` enforce it.
    pub fn totals(&self, policy: &PricingPolicy) -> CartTotals {
        let item_count = self.items.iter().map(|i| i.quantity).sum();
        let subtotal = Money::new(self.items.iter().map(|i| i.line_total().amount()).sum(), &self.currency);
        let shipping = policy.shipping_for(&subtotal);
        let tax = policy.tax_for(&subtotal);
        let grand_total = Money::new(subtotal.amount() + shipping.amount() + tax.amount(), &self.currency);
        CartTotals { item_count, subtotal, shipping, tax, grand_total }
    }

    pub fn to_records(&self) -> Vec<CartRecord> {
        self.items.iter().map(|i| CartRecord { product_id: i.product_id().to_string(), quantity: i.quantity }).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { ItemNotFound, OutOfStock, CurrencyMismatch }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::ItemNotFound => write!(f, "Item not found"), Self::OutOfStock => write!(f, "Out of stock"), Self::CurrencyMismatch => write!(f, "Currency mismatch") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Category, Role, User};

    fn product(id: &str, price: i64, stock: u32) -> Product {
        let category = Category::new("1", "Living Room").unwrap();
        let seller = User::new("2", "Admin User", "admin@example.com", Role::Admin);
        Product::create(format!("Item {}", id), Money::usd(Decimal::new(price, 0)), category, seller)
            .unwrap()
            .with_id(id)
            .with_images(vec!["/placeholder.svg".into()])
            .with_stock(stock)
    }

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new("USD");
        let widget = product("P1", 10, 20);
        cart.add_item(&widget, 2).unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.totals(&PricingPolicy::default()).subtotal.amount(), Decimal::new(20, 0));
        cart.add_item(&widget, 1).unwrap();
        assert_eq!(cart.items()[0].quantity, 3); // Merged
    }

    #[test]
    fn test_add_clamps_to_stock() {
        let mut cart = Cart::new("USD");
        let chair = product("P1", 349, 4);
        assert_eq!(cart.add_item(&chair, 10), Ok(4));
        assert_eq!(cart.add_item(&chair, 1), Err(CartError::OutOfStock));
        assert_eq!(cart.quantity_of("P1"), Some(4));
    }

    #[test]
    fn test_add_zero_quantity_inserts_one() {
        let mut cart = Cart::new("USD");
        assert_eq!(cart.add_item(&product("P1", 5, 3), 0), Ok(1));
    }

    #[test]
    fn test_add_out_of_stock_is_rejected() {
        let mut cart = Cart::new("USD");
        assert_eq!(cart.add_item(&product("P1", 5, 0), 1), Err(CartError::OutOfStock));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_bounds() {
        let mut cart = Cart::new("USD");
        cart.add_item(&product("P1", 5, 8), 1).unwrap();
        assert_eq!(cart.update_quantity("P1", 50), Ok(Some(8)));
        assert_eq!(cart.update_quantity("P1", 0), Ok(None));
        assert!(cart.find("P1").is_none());
        assert_eq!(cart.update_quantity("P1", 2), Err(CartError::ItemNotFound));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new("USD");
        cart.add_item(&product("P1", 5, 8), 1).unwrap();
        cart.add_item(&product("P2", 7, 8), 1).unwrap();
        assert!(cart.remove_item("P1"));
        let once = cart.to_records();
        assert!(!cart.remove_item("P1"));
        assert_eq!(cart.to_records(), once);
    }

    #[test]
    fn test_totals_with_free_shipping() {
        let mut cart = Cart::new("USD");
        cart.add_item(&product("P1", 50, 8), 3).unwrap();
        let totals = cart.totals(&PricingPolicy::default());
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.subtotal.amount(), Decimal::new(150, 0));
        assert!(totals.shipping.is_zero());
        assert_eq!(totals.tax.amount(), Decimal::new(1050, 2));
        assert_eq!(totals.grand_total.amount(), Decimal::new(16050, 2));
    }

    #[test]
    fn test_totals_with_flat_shipping() {
        let mut cart = Cart::new("USD");
        cart.add_item(&product("P1", 40, 8), 2).unwrap();
        let totals = cart.totals(&PricingPolicy::default());
        assert_eq!(totals.shipping.amount(), Decimal::new(10, 0));
        assert_eq!(totals.tax.amount(), Decimal::new(560, 2));
        assert_eq!(totals.grand_total.amount(), Decimal::new(9560, 2));
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let totals = Cart::new("USD").totals(&PricingPolicy::default());
        assert!(totals.grand_total.is_zero());
    }

    #[test]
    fn test_restore_drops_missing_products() {
        let sofa = product("P1", 1299, 15);
        let records = vec![
            CartRecord { product_id: "P1".into(), quantity: 20 },
            CartRecord { product_id: "gone".into(), quantity: 1 },
        ];
        let (cart, dropped) = Cart::restore("USD", &records, |id| (id == "P1").then_some(&sofa));
        assert_eq!(dropped, 1);
        assert_eq!(cart.quantity_of("P1"), Some(15));
    }

    #[test]
    fn test_restore_drops_zero_quantity_records() {
        let sofa = product("P1", 1299, 15);
        let records = vec![CartRecord { product_id: "P1".into(), quantity: 0 }];
        let (cart, dropped) = Cart::restore("USD", &records, |id| (id == "P1").then_some(&sofa));
        assert_eq!(dropped, 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_foreign_currency_product_is_rejected() {
        let mut cart = Cart::new("EUR");
        let lamp = product("P1", 80, 5);
        assert_eq!(cart.add_item(&lamp, 1), Err(CartError::CurrencyMismatch));
        let (restored, dropped) = Cart::restore("EUR", &[CartRecord { product_id: "P1".into(), quantity: 1 }], |_| Some(&lamp));
        assert_eq!(dropped, 1);
        assert!(restored.totals(&PricingPolicy::default()).subtotal.is_zero());
    }

    #[test]
    fn test_reconcile_follows_live_stock() {
        let mut cart = Cart::new("USD");
        cart.add_item(&product("P1", 1299, 15), 10).unwrap();
        cart.add_item(&product("P2", 449, 20), 1).unwrap();
        let restocked = product("P1", 1199, 2);
        let sold_out = product("P2", 449, 0);

        assert!(cart.reconcile(|id| match id { "P1" => Some(&restocked), _ => Some(&sold_out) }));
        assert_eq!(cart.to_records(), vec![CartRecord { product_id: "P1".into(), quantity: 2 }]);
        assert_eq!(cart.totals(&PricingPolicy::default()).subtotal.amount(), Decimal::new(2398, 0));
        assert_eq!(cart.update_quantity("P1", 5), Ok(Some(2)));
        assert!(!cart.reconcile(|_| Some(&restocked)));
    }
}

//! Cart engine: the session cart plus its persistence.
//!
//! Every mutation writes the `{productId, quantity}` list back to the store
//! before returning, so a reload always sees the latest cart.

use crate::catalog::Catalog;
use crate::domain::{Cart, CartError, CartRecord, CartTotals, PricingPolicy, Product};
use crate::storage::{load_json, save_json, KeyValueStore, CART_KEY};
use crate::{Result, StorefrontError};

impl From<CartError> for StorefrontError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::ItemNotFound => StorefrontError::ItemNotFound,
            CartError::OutOfStock => StorefrontError::OutOfStock,
            CartError::CurrencyMismatch => StorefrontError::CurrencyMismatch,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CartEngine {
    cart: Cart,
    policy: PricingPolicy,
}

impl CartEngine {
    pub fn new(policy: PricingPolicy) -> Self {
        Self { cart: Cart::new(&policy.currency), policy }
    }

    /// Reload the persisted cart against the live catalog.
    ///
    /// Lines whose product has disappeared are dropped, quantities are clamped
    /// to stock, and the result is written back whenever it differs from what
    /// was stored. An unreadable record starts an empty cart.
    pub fn load<S: KeyValueStore + ?Sized>(store: &mut S, catalog: &Catalog, policy: PricingPolicy) -> Result<Self> {
        let records: Vec<CartRecord> = match load_json(&*store, CART_KEY) {
            Ok(records) => records.unwrap_or_default(),
            Err(StorefrontError::Serialization(e)) => {
                tracing::warn!(error = %e, "discarding unreadable cart record");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let (cart, dropped) = Cart::restore(&policy.currency, &records, |id| catalog.product(id));
        let engine = Self { cart, policy };
        if dropped > 0 {
            tracing::warn!(dropped, "dropped cart lines that no longer match the catalog");
        }
        if engine.cart.to_records() != records {
            engine.persist(store)?;
        }
        Ok(engine)
    }

    /// Bring the cart in line with the current catalog after inventory edits.
    pub fn reconcile<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, catalog: &Catalog) -> Result<()> {
        if self.cart.reconcile(|id| catalog.product(id)) {
            tracing::info!(lines = self.cart.line_count(), "cart adjusted to current stock");
            self.persist(store)?;
        }
        Ok(())
    }

    pub fn cart(&self) -> &Cart { &self.cart }
    pub fn policy(&self) -> &PricingPolicy { &self.policy }
    pub fn totals(&self) -> CartTotals { self.cart.totals(&self.policy) }
    pub fn is_empty(&self) -> bool { self.cart.is_empty() }

    pub fn add_item<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, product: &Product, quantity: u32) -> Result<u32> {
        let stored = self.cart.add_item(product, quantity)?;
        tracing::debug!(product_id = product.id(), requested = quantity, stored, "added to cart");
        self.persist(store)?;
        Ok(stored)
    }

    /// `None` means the line was removed.
    pub fn update_quantity<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, product_id: &str, quantity: u32) -> Result<Option<u32>> {
        let stored = self.cart.update_quantity(product_id, quantity)?;
        tracing::debug!(product_id, requested = quantity, ?stored, "updated cart quantity");
        self.persist(store)?;
        Ok(stored)
    }

    pub fn remove_item<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, product_id: &str) -> Result<()> {
        if self.cart.remove_item(product_id) {
            tracing::debug!(product_id, "removed from cart");
        }
        self.persist(store)
    }

    pub fn clear<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<()> {
        self.cart.clear();
        self.persist(store)
    }

    fn persist<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        save_json(store, CART_KEY, &self.cart.to_records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_mutations_are_persisted() {
        let catalog = Catalog::seeded().unwrap();
        let mut store = MemoryStore::new();
        let mut engine = CartEngine::new(PricingPolicy::default());
        engine.add_item(&mut store, catalog.product("1").unwrap(), 2).unwrap();
        engine.add_item(&mut store, catalog.product("7").unwrap(), 1).unwrap();

        let reloaded = CartEngine::load(&mut store, &catalog, PricingPolicy::default()).unwrap();
        assert_eq!(reloaded.cart().line_count(), 2);
        assert_eq!(reloaded.cart().quantity_of("1"), Some(2));
        assert_eq!(reloaded.cart().quantity_of("7"), Some(1));
    }

    #[test]
    fn test_load_drops_products_missing_from_catalog() {
        let mut catalog = Catalog::seeded().unwrap();
        let mut store = MemoryStore::new();
        let mut engine = CartEngine::new(PricingPolicy::default());
        engine.add_item(&mut store, catalog.product("2").unwrap(), 1).unwrap();
        engine.add_item(&mut store, catalog.product("3").unwrap(), 1).unwrap();
        catalog.remove("3");

        let reloaded = CartEngine::load(&mut store, &catalog, PricingPolicy::default()).unwrap();
        assert_eq!(reloaded.cart().line_count(), 1);
        let records: Vec<CartRecord> = load_json(&store, CART_KEY).unwrap().unwrap();
        assert_eq!(records, vec![CartRecord { product_id: "2".into(), quantity: 1 }]);
    }

    #[test]
    fn test_load_writes_back_clamped_quantities() {
        let catalog = Catalog::seeded().unwrap();
        let mut store = MemoryStore::new();
        save_json(&mut store, CART_KEY, &[CartRecord { product_id: "1".into(), quantity: 99 }]).unwrap();

        let reloaded = CartEngine::load(&mut store, &catalog, PricingPolicy::default()).unwrap();
        assert_eq!(reloaded.cart().quantity_of("1"), Some(15));
        let records: Vec<CartRecord> = load_json(&store, CART_KEY).unwrap().unwrap();
        assert_eq!(records, vec![CartRecord { product_id: "1".into(), quantity: 15 }]);
    }

    #[test]
    fn test_reconcile_persists_adjusted_lines() {
        let mut catalog = Catalog::seeded().unwrap();
        let mut store = MemoryStore::new();
        let mut engine = CartEngine::new(PricingPolicy::default());
        engine.add_item(&mut store, catalog.product("4").unwrap(), 3).unwrap();
        engine.add_item(&mut store, catalog.product("7").unwrap(), 1).unwrap();
        catalog.remove("7");

        engine.reconcile(&mut store, &catalog).unwrap();
        let records: Vec<CartRecord> = load_json(&store, CART_KEY).unwrap().unwrap();
        assert_eq!(records, vec![CartRecord { product_id: "4".into(), quantity: 3 }]);
    }

    #[test]
    fn test_unreadable_cart_starts_empty() {
        let catalog = Catalog::seeded().unwrap();
        let mut store = MemoryStore::new();
        store.set(CART_KEY, "oops".into()).unwrap();
        let engine = CartEngine::load(&mut store, &catalog, PricingPolicy::default()).unwrap();
        assert!(engine.is_empty());
    }

    #[test]
    fn test_update_missing_item_signals_not_found() {
        let mut store = MemoryStore::new();
        let mut engine = CartEngine::new(PricingPolicy::default());
        let err = engine.update_quantity(&mut store, "1", 3).unwrap_err();
        assert!(matches!(err, StorefrontError::ItemNotFound));
        engine.remove_item(&mut store, "1").unwrap();
    }
}

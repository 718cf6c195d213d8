//! Order recorder: turns the session cart into a persisted order.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::cart::CartEngine;
use crate::domain::{generate_order_id, Order, OrderError, OrderStatus, User};
use crate::storage::{load_json, save_json, KeyValueStore, ORDERS_KEY};
use crate::{Result, StorefrontError};

/// Attempts at drawing an order id not already used by a stored order.
const MAX_ID_ATTEMPTS: usize = 16;

impl From<OrderError> for StorefrontError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NoItems => StorefrontError::EmptyCart,
        }
    }
}

#[derive(Debug)]
pub struct OrderRecorder<R: Rng = StdRng> {
    rng: R,
}

impl OrderRecorder<StdRng> {
    pub fn from_entropy() -> Self { Self::new(StdRng::from_entropy()) }
}

impl<R: Rng> OrderRecorder<R> {
    pub fn new(rng: R) -> Self { Self { rng } }

    /// Record the cart as a new order, then clear the cart.
    ///
    /// The order list is rewritten in full; there is a single writer.
    pub fn place_order<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, cart: &mut CartEngine, customer: Option<&User>) -> Result<Order> {
        let customer = customer.ok_or(StorefrontError::Unauthenticated)?;
        if cart.is_empty() { return Err(StorefrontError::EmptyCart); }

        let mut orders = all_orders(&*store)?;
        let id = self.fresh_id(&orders);
        let order = Order::from_cart(id, customer, cart.cart(), cart.totals())?;
        orders.push(order.clone());
        save_json(store, ORDERS_KEY, &orders)?;
        cart.clear(store)?;

        tracing::info!(order_id = order.id(), customer_id = %customer.id, total = %order.total(), items = order.item_count(), "order placed");
        Ok(order)
    }

    fn fresh_id(&mut self, existing: &[Order]) -> String {
        let mut id = generate_order_id(&mut self.rng);
        for _ in 1..MAX_ID_ATTEMPTS {
            if !existing.iter().any(|o| o.id() == id) { break; }
            id = generate_order_id(&mut self.rng);
        }
        id
    }
}

pub fn all_orders<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<Order>> {
    Ok(load_json(store, ORDERS_KEY)?.unwrap_or_default())
}

/// A customer's orders, newest first, optionally limited to one status tab.
pub fn order_history<S: KeyValueStore + ?Sized>(store: &S, customer_id: &str, status: Option<OrderStatus>) -> Result<Vec<Order>> {
    let mut orders: Vec<Order> = all_orders(store)?
        .into_iter()
        .filter(|o| o.customer_id() == customer_id)
        .filter(|o| status.map_or(true, |s| o.status() == s))
        .collect();
    orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::domain::{PricingPolicy, Role};
    use crate::storage::MemoryStore;
    use rust_decimal::Decimal;

    fn customer() -> User { User::new("1", "Demo User", "user@example.com", Role::User) }

    fn recorder() -> OrderRecorder<StdRng> { OrderRecorder::new(StdRng::seed_from_u64(42)) }

    #[test]
    fn test_place_order_records_and_clears_cart() {
        let catalog = Catalog::seeded().unwrap();
        let mut store = MemoryStore::new();
        let mut cart = CartEngine::new(PricingPolicy::default());
        cart.add_item(&mut store, catalog.product("4").unwrap(), 2).unwrap();

        let order = recorder().place_order(&mut store, &mut cart, Some(&customer())).unwrap();
        assert!(order.id().starts_with("ORD-"));
        assert_eq!(order.status(), OrderStatus::Processing);
        assert_eq!(order.total().amount(), Decimal::new(74686, 2));
        assert!(cart.is_empty());

        let stored = all_orders(&store).unwrap();
        assert_eq!(stored, vec![order]);
    }

    #[test]
    fn test_checkout_requires_session() {
        let catalog = Catalog::seeded().unwrap();
        let mut store = MemoryStore::new();
        let mut cart = CartEngine::new(PricingPolicy::default());
        cart.add_item(&mut store, catalog.product("4").unwrap(), 1).unwrap();
        let err = recorder().place_order(&mut store, &mut cart, None).unwrap_err();
        assert!(matches!(err, StorefrontError::Unauthenticated));
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let mut store = MemoryStore::new();
        let mut cart = CartEngine::new(PricingPolicy::default());
        let err = recorder().place_order(&mut store, &mut cart, Some(&customer())).unwrap_err();
        assert!(matches!(err, StorefrontError::EmptyCart));
        assert!(all_orders(&store).unwrap().is_empty());
    }

    #[test]
    fn test_orders_snapshot_survives_catalog_edits() {
        let mut catalog = Catalog::seeded().unwrap();
        let mut store = MemoryStore::new();
        let mut cart = CartEngine::new(PricingPolicy::default());
        let mut recorder = recorder();
        cart.add_item(&mut store, catalog.product("7").unwrap(), 1).unwrap();
        recorder.place_order(&mut store, &mut cart, Some(&customer())).unwrap();
        catalog.remove("7");
        cart.add_item(&mut store, catalog.product("1").unwrap(), 1).unwrap();
        recorder.place_order(&mut store, &mut cart, Some(&customer())).unwrap();

        let history = order_history(&store, "1", None).unwrap();
        assert_eq!(history.len(), 2);
        assert_ne!(history[0].id(), history[1].id());
        assert!(history.iter().any(|o| o.products()[0].name == "Decorative Wall Mirror"));
        assert!(order_history(&store, "1", Some(OrderStatus::Delivered)).unwrap().is_empty());
        assert!(order_history(&store, "2", None).unwrap().is_empty());
    }
}

//! Session-scoped storefront context.
//!
//! Owns the catalog, the persisted store and the session engines, and hands
//! them to each other by reference. There is no global state: one
//! `Storefront` is one browsing session.

use rand::{rngs::StdRng, SeedableRng};

use crate::admin::{self, ProductDraft, SalesOverview};
use crate::cart::CartEngine;
use crate::catalog::Catalog;
use crate::domain::{CartTotals, Order, OrderStatus, PricingPolicy, Product, Role, User};
use crate::identity::{IdentityStore, Registration};
use crate::orders::{self, OrderRecorder};
use crate::storage::KeyValueStore;
use crate::{Result, StorefrontError};

#[derive(Debug)]
pub struct Storefront<S: KeyValueStore> {
    catalog: Catalog,
    store: S,
    cart: CartEngine,
    identity: IdentityStore,
    orders: OrderRecorder,
}

impl<S: KeyValueStore> Storefront<S> {
    /// Start a session, restoring the signed-in user and cart from `store`.
    pub fn open(mut store: S, catalog: Catalog, pricing: PricingPolicy) -> Result<Self> {
        let identity = IdentityStore::load(&store)?;
        let cart = CartEngine::load(&mut store, &catalog, pricing)?;
        tracing::info!(
            signed_in = identity.current_user().is_some(),
            cart_lines = cart.cart().line_count(),
            "storefront session opened"
        );
        Ok(Self { catalog, store, cart, identity, orders: OrderRecorder::from_entropy() })
    }

    /// Deterministic order ids.
    pub fn with_order_seed(mut self, seed: u64) -> Self {
        self.orders = OrderRecorder::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub fn store(&self) -> &S { &self.store }
    pub fn cart(&self) -> &CartEngine { &self.cart }
    pub fn cart_totals(&self) -> CartTotals { self.cart.totals() }
    pub fn current_user(&self) -> Option<&User> { self.identity.current_user() }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn add_to_cart(&mut self, product_id: &str, quantity: u32) -> Result<u32> {
        self.cart.reconcile(&mut self.store, &self.catalog)?;
        let product = self.catalog.product(product_id).ok_or(StorefrontError::ProductNotFound)?;
        self.cart.add_item(&mut self.store, product, quantity)
    }

    pub fn update_cart_quantity(&mut self, product_id: &str, quantity: u32) -> Result<Option<u32>> {
        self.cart.reconcile(&mut self.store, &self.catalog)?;
        self.cart.update_quantity(&mut self.store, product_id, quantity)
    }

    pub fn remove_from_cart(&mut self, product_id: &str) -> Result<()> {
        self.cart.remove_item(&mut self.store, product_id)
    }

    pub fn clear_cart(&mut self) -> Result<()> {
        self.cart.clear(&mut self.store)
    }

    // =========================================================================
    // Checkout & orders
    // =========================================================================

    pub fn checkout(&mut self) -> Result<Order> {
        self.cart.reconcile(&mut self.store, &self.catalog)?;
        self.orders.place_order(&mut self.store, &mut self.cart, self.identity.current_user())
    }

    pub fn order_history(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let user = self.identity.require_user()?;
        orders::order_history(&self.store, &user.id, status)
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub fn login(&mut self, email: &str, password: &str, role_hint: Option<Role>) -> Result<User> {
        self.identity.login(&mut self.store, email, password, role_hint)
    }

    pub fn register(&mut self, registration: Registration) -> Result<User> {
        self.identity.register(&mut self.store, registration)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.identity.logout(&mut self.store)
    }

    // =========================================================================
    // Admin
    // =========================================================================

    pub fn admin_inventory(&self, term: &str) -> Result<Vec<&Product>> {
        self.identity.require_admin()?;
        Ok(admin::search(&self.catalog, term))
    }

    pub fn admin_overview(&self) -> Result<SalesOverview> {
        self.identity.require_admin()?;
        Ok(admin::overview(&self.catalog))
    }

    pub fn admin_create_product(&mut self, draft: ProductDraft) -> Result<Product> {
        let user = self.identity.require_admin()?;
        admin::create_product(&mut self.catalog, user, draft)
    }

    pub fn admin_update_product(&mut self, id: &str, draft: ProductDraft) -> Result<Product> {
        let user = self.identity.require_admin()?;
        let updated = admin::update_product(&mut self.catalog, user, id, draft)?;
        self.cart.reconcile(&mut self.store, &self.catalog)?;
        Ok(updated)
    }

    pub fn admin_delete_product(&mut self, id: &str) -> Result<Product> {
        let user = self.identity.require_admin()?;
        let removed = admin::delete_product(&mut self.catalog, user, id)?;
        self.cart.reconcile(&mut self.store, &self.catalog)?;
        Ok(removed)
    }
}

//! Order Aggregate

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::{Cart, CartTotals, User};
use crate::domain::value_objects::Money;

pub const ORDER_ID_PREFIX: &str = "ORD";

/// Immutable snapshot of a completed checkout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: String,
    #[serde(rename = "date")]
    created_at: DateTime<Utc>,
    status: OrderStatus,
    customer_id: String,
    customer_email: String,
    subtotal: Money,
    shipping: Money,
    tax: Money,
    total: Money,
    item_count: u32,
    products: Vec<OrderLine>,
}

/// Product summary captured at checkout, decoupled from later catalog edits
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus { #[default] Processing, Shipped, OutForDelivery, Delivered }

impl OrderStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            "out_for_delivery" => Some(Self::OutForDelivery),
            "delivered" => Some(Self::Delivered),
            _ => None,
        }
    }
}

/// `ORD-` followed by five random digits.
pub fn generate_order_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}-{}", ORDER_ID_PREFIX, rng.gen_range(10000..=99999))
}

impl Order {
    /// Snapshot `cart` into a new order with status `Processing`.
    pub fn from_cart(id: impl Into<String>, customer: &User, cart: &Cart, totals: CartTotals) -> Result<Self, OrderError> {
        if cart.is_empty() { return Err(OrderError::NoItems); }
        let products = cart.items().iter().map(|item| OrderLine {
            id: item.product_id().to_string(),
            name: item.product.name().to_string(),
            price: item.product.price().clone(),
            quantity: item.quantity,
            image: item.product.primary_image().map(str::to_string),
        }).collect();
        Ok(Self {
            id: id.into(), created_at: Utc::now(), status: OrderStatus::Processing,
            customer_id: customer.id.clone(), customer_email: customer.email.clone(),
            subtotal: totals.subtotal, shipping: totals.shipping, tax: totals.tax, total: totals.grand_total,
            item_count: totals.item_count, products,
        })
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn customer_id(&self) -> &str { &self.customer_id }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn shipping(&self) -> &Money { &self.shipping }
    pub fn tax(&self) -> &Money { &self.tax }
    pub fn total(&self) -> &Money { &self.total }
    pub fn item_count(&self) -> u32 { self.item_count }
    pub fn products(&self) -> &[OrderLine] { &self.products }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NoItems }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "No items") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Category, PricingPolicy, Product, Role};
    use rand::{rngs::StdRng, SeedableRng};
    use rust_decimal::Decimal;

    fn customer() -> User { User::new("1", "Demo User", "user@example.com", Role::User) }

    #[test]
    fn test_order_snapshot() {
        let category = Category::new("4", "Office").unwrap();
        let chair = Product::create("Ergonomic Office Chair", Money::usd(Decimal::new(349, 0)), category, customer())
            .unwrap()
            .with_images(vec!["chair.jpg".into()])
            .with_stock(32);
        let mut cart = Cart::new("USD");
        cart.add_item(&chair, 2).unwrap();
        let totals = cart.totals(&PricingPolicy::default());
        let order = Order::from_cart("ORD-12345", &customer(), &cart, totals).unwrap();
        assert_eq!(order.status(), OrderStatus::Processing);
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.total().amount(), Decimal::new(74686, 2));
        assert_eq!(order.products()[0].image.as_deref(), Some("chair.jpg"));
    }

    #[test]
    fn test_empty_cart_cannot_become_order() {
        let cart = Cart::new("USD");
        let totals = cart.totals(&PricingPolicy::default());
        assert_eq!(Order::from_cart("ORD-1", &customer(), &cart, totals).unwrap_err(), OrderError::NoItems);
    }

    #[test]
    fn test_generate_order_id_format() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let id = generate_order_id(&mut rng);
            let digits = id.strip_prefix("ORD-").unwrap();
            assert_eq!(digits.len(), 5);
            assert!(digits.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(OrderStatus::parse("out-for-delivery"), Some(OrderStatus::OutForDelivery));
        assert_eq!(OrderStatus::parse("cancelled"), None);
    }
}

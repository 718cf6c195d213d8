//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod user;

pub use product::{Category, Product, ProductError, Review, StockLevel, LOW_STOCK_THRESHOLD};
pub use order::{generate_order_id, Order, OrderError, OrderLine, OrderStatus};
pub use cart::{Cart, CartError, CartItem, CartRecord, CartTotals, PricingPolicy};
pub use user::{Role, User};

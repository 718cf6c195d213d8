//! Furnish Storefront
//!
//! Furniture marketplace storefront engine.
//!
//! ## Features
//! - Catalog browsing, search, filtering and sorting
//! - Shopping cart with stock clamping and pricing totals
//! - Simulated checkout and order history
//! - Mocked authentication with demo and registered accounts
//! - Admin inventory editing

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod http;
pub mod identity;
pub mod orders;
pub mod storage;
pub mod storefront;

pub use storefront::Storefront;

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Please sign in to continue")]
    Unauthenticated,

    #[error("Access denied")]
    Unauthorized,

    #[error("Out of stock")]
    OutOfStock,

    #[error("Product is priced in a different currency")]
    CurrencyMismatch,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Item not found in cart")]
    ItemNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl StorefrontError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StorefrontError::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        StorefrontError::Storage(msg.into())
    }
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(errors: validator::ValidationErrors) -> Self {
        StorefrontError::Validation(format_validation_errors(&errors))
    }
}

/// Format validation errors into a user-friendly string
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

//! Admin inventory editor and sales overview.
//!
//! Edits apply to the in-memory catalog only; the seed data is untouched and a
//! restart brings the original inventory back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::catalog::{seed, Catalog, SalesPoint};
use crate::domain::{Money, Product, User, LOW_STOCK_THRESHOLD};
use crate::{Result, StorefrontError};

/// Product form as submitted from the inventory console
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[validate(length(min = 2, message = "Product name must be at least 2 characters"))]
    pub name: String,
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
    #[validate(custom = "validate_positive_price")]
    pub price: Decimal,
    #[validate(length(min = 1, message = "Please select a category"))]
    pub category_id: String,
    pub stock: u32,
    #[validate(length(min = 1, message = "At least one image is required"))]
    pub images: Vec<String>,
}

fn validate_positive_price(price: &Decimal) -> std::result::Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        let mut error = ValidationError::new("positive");
        error.message = Some("Price must be a positive number".into());
        return Err(error);
    }
    Ok(())
}

impl ProductDraft {
    /// Drop blank image URLs, then validate.
    fn cleaned(mut self) -> Result<Self> {
        self.images.retain(|url| !url.trim().is_empty());
        self.name = self.name.trim().to_string();
        self.validate()?;
        Ok(self)
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOverview {
    pub total_revenue: u64,
    pub total_products: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub monthly_sales: Vec<SalesPoint>,
}

fn ensure_admin(user: &User) -> Result<()> {
    if user.is_admin() { Ok(()) } else { Err(StorefrontError::Unauthorized) }
}

/// Inventory search box: case-insensitive product name match.
pub fn search<'a>(catalog: &'a Catalog, term: &str) -> Vec<&'a Product> {
    let term = term.trim().to_lowercase();
    catalog.products().iter().filter(|p| p.name().to_lowercase().contains(&term)).collect()
}

/// Products that are running low but not sold out.
pub fn low_stock(catalog: &Catalog) -> Vec<&Product> {
    catalog.products().iter().filter(|p| p.stock() > 0 && p.stock() <= LOW_STOCK_THRESHOLD).collect()
}

pub fn out_of_stock(catalog: &Catalog) -> Vec<&Product> {
    catalog.products().iter().filter(|p| p.stock() == 0).collect()
}

pub fn overview(catalog: &Catalog) -> SalesOverview {
    let monthly_sales = seed::sales_series();
    SalesOverview {
        total_revenue: monthly_sales.iter().map(|p| p.sales).sum(),
        total_products: catalog.products().len(),
        low_stock: low_stock(catalog).len(),
        out_of_stock: out_of_stock(catalog).len(),
        monthly_sales,
    }
}

/// Add a product at the top of the inventory, sold by `admin`.
pub fn create_product(catalog: &mut Catalog, admin: &User, draft: ProductDraft) -> Result<Product> {
    ensure_admin(admin)?;
    let draft = draft.cleaned()?;
    let category = catalog.category(&draft.category_id).cloned().ok_or(StorefrontError::CategoryNotFound)?;
    let slug = catalog.unique_slug(&draft.name, None)?;
    let mut product = Product::create(draft.name, Money::usd(draft.price), category, admin.clone())
        .map_err(|e| StorefrontError::validation(e.to_string()))?
        .with_description(draft.description)
        .with_images(draft.images)
        .with_stock(draft.stock);
    product.set_slug(slug);
    catalog.insert_front(product.clone());
    tracing::info!(product_id = product.id(), slug = %product.slug(), "product added");
    Ok(product)
}

pub fn update_product(catalog: &mut Catalog, admin: &User, id: &str, draft: ProductDraft) -> Result<Product> {
    ensure_admin(admin)?;
    let draft = draft.cleaned()?;
    let category = catalog.category(&draft.category_id).cloned().ok_or(StorefrontError::CategoryNotFound)?;
    let product = catalog.product_mut(id).ok_or(StorefrontError::ProductNotFound)?;
    product
        .update_details(draft.name, draft.description, Money::usd(draft.price), draft.stock, draft.images, category)
        .map_err(|e| StorefrontError::validation(e.to_string()))?;
    tracing::info!(product_id = id, "product updated");
    Ok(product.clone())
}

pub fn delete_product(catalog: &mut Catalog, admin: &User, id: &str) -> Result<Product> {
    ensure_admin(admin)?;
    let removed = catalog.remove(id).ok_or(StorefrontError::ProductNotFound)?;
    tracing::info!(product_id = id, "product deleted");
    Ok(removed)
}

//! Product Aggregate

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::User;
use crate::domain::value_objects::{Money, Slug, SlugError};

/// Products at or below this stock level are flagged as running low.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Product {
    id: String,
    name: String,
    slug: Slug,
    description: String,
    price: Money,
    images: Vec<String>,
    category: Category,
    stock: u32,
    rating: f32,
    reviews: Vec<Review>,
    seller: User,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: Slug,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: &str) -> Result<Self, ProductError> {
        Ok(Self { id: id.into(), name: name.to_string(), slug: Slug::from_name(name)?, image: None })
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub text: String,
    pub rating: u8,
    pub user: User,
    pub date: NaiveDate,
    pub verified: bool,
}

impl Review {
    pub fn new(id: impl Into<String>, text: impl Into<String>, rating: u8, user: User, date: NaiveDate, verified: bool) -> Result<Self, ProductError> {
        if !(1..=5).contains(&rating) { return Err(ProductError::InvalidRating); }
        Ok(Self { id: id.into(), text: text.into(), rating, user, date, verified })
    }
}

/// Stock badge shown next to a product
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "remaining", rename_all = "snake_case")]
pub enum StockLevel { InStock, Low(u32), OutOfStock }

impl Product {
    pub fn create(name: impl Into<String>, price: Money, category: Category, seller: User) -> Result<Self, ProductError> {
        let name = name.into();
        if name.trim().is_empty() { return Err(ProductError::MissingName); }
        if price.amount() <= Decimal::ZERO { return Err(ProductError::InvalidPrice); }
        Ok(Self {
            id: Uuid::new_v4().to_string(), slug: Slug::from_name(&name)?, name,
            description: String::new(), price, images: vec![], category, stock: 0,
            rating: 0.0, reviews: vec![], seller,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self { self.id = id.into(); self }
    pub fn with_description(mut self, description: impl Into<String>) -> Self { self.description = description.into(); self }
    pub fn with_images(mut self, images: Vec<String>) -> Self { self.images = images; self }
    pub fn with_stock(mut self, stock: u32) -> Self { self.stock = stock; self }
    pub fn with_rating(mut self, rating: f32) -> Self { self.rating = rating.clamp(0.0, 5.0); self }
    pub fn with_reviews(mut self, reviews: Vec<Review>) -> Self { self.reviews = reviews; self }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn slug(&self) -> &Slug { &self.slug }
    pub fn description(&self) -> &str { &self.description }
    pub fn price(&self) -> &Money { &self.price }
    pub fn images(&self) -> &[String] { &self.images }
    pub fn primary_image(&self) -> Option<&str> { self.images.first().map(String::as_str) }
    pub fn category(&self) -> &Category { &self.category }
    pub fn stock(&self) -> u32 { self.stock }
    pub fn rating(&self) -> f32 { self.rating }
    pub fn reviews(&self) -> &[Review] { &self.reviews }
    pub fn seller(&self) -> &User { &self.seller }
    pub fn is_in_stock(&self) -> bool { self.stock > 0 }

    pub fn stock_level(&self) -> StockLevel {
        match self.stock {
            0 => StockLevel::OutOfStock,
            n if n <= LOW_STOCK_THRESHOLD => StockLevel::Low(n),
            _ => StockLevel::InStock,
        }
    }

    /// Ensure the invariants a listed product must hold.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.images.is_empty() { return Err(ProductError::MissingImage); }
        Ok(())
    }

    /// Replaces the editable fields. The slug is kept so existing links keep working.
    pub fn update_details(&mut self, name: impl Into<String>, description: impl Into<String>, price: Money, stock: u32, images: Vec<String>, category: Category) -> Result<(), ProductError> {
        let name = name.into();
        if name.trim().is_empty() { return Err(ProductError::MissingName); }
        if price.amount() <= Decimal::ZERO { return Err(ProductError::InvalidPrice); }
        if images.is_empty() { return Err(ProductError::MissingImage); }
        self.name = name;
        self.description = description.into();
        self.price = price;
        self.stock = stock;
        self.images = images;
        self.category = category;
        Ok(())
    }

    pub(crate) fn set_slug(&mut self, slug: Slug) { self.slug = slug; }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { MissingName, InvalidPrice, MissingImage, InvalidRating, InvalidSlug }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "Product name is required"),
            Self::InvalidPrice => write!(f, "Price must be a positive number"),
            Self::MissingImage => write!(f, "At least one image is required"),
            Self::InvalidRating => write!(f, "Rating must be between 1 and 5"),
            Self::InvalidSlug => write!(f, "Name has no URL-safe characters"),
        }
    }
}

impl From<SlugError> for ProductError {
    fn from(_: SlugError) -> Self { ProductError::InvalidSlug }
}

//! Catalog store: the in-memory product, category and user reference data.

pub mod query;
pub mod seed;

pub use query::{ProductFilter, SortKey};
pub use seed::SalesPoint;

use crate::domain::{Category, Product, Slug, User};
use crate::{Result, StorefrontError};

pub const RELATED_PRODUCTS_LIMIT: usize = 4;
pub const SUGGESTIONS_LIMIT: usize = 5;

#[derive(Clone, Debug)]
pub struct Catalog {
    categories: Vec<Category>,
    products: Vec<Product>,
    users: Vec<User>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>, products: Vec<Product>, users: Vec<User>) -> Self {
        Self { categories, products, users }
    }

    /// The furniture catalog the storefront ships with.
    pub fn seeded() -> Result<Self> {
        let users = seed::users();
        let categories = seed::categories().map_err(|e| StorefrontError::validation(e.to_string()))?;
        let products = seed::products(&categories, &users).map_err(|e| StorefrontError::validation(e.to_string()))?;
        Ok(Self::new(categories, products, users))
    }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn categories(&self) -> &[Category] { &self.categories }
    pub fn users(&self) -> &[User] { &self.users }

    pub fn product(&self, id: &str) -> Option<&Product> { self.products.iter().find(|p| p.id() == id) }

    pub fn product_by_slug(&self, slug: &str) -> Result<&Product> {
        self.products.iter().find(|p| p.slug() == slug).ok_or(StorefrontError::ProductNotFound)
    }

    pub fn category(&self, id: &str) -> Option<&Category> { self.categories.iter().find(|c| c.id == id) }

    pub fn category_by_slug(&self, slug: &str) -> Result<&Category> {
        self.categories.iter().find(|c| c.slug == *slug).ok_or(StorefrontError::CategoryNotFound)
    }

    pub fn products_in_category(&self, slug: &str) -> Vec<&Product> {
        self.products.iter().filter(|p| p.category().slug == *slug).collect()
    }

    /// Other products from the same category.
    pub fn related_products(&self, product: &Product) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category().id == product.category().id && p.id() != product.id())
            .take(RELATED_PRODUCTS_LIMIT)
            .collect()
    }

    /// Quick matches for the header search box: product or category name only.
    pub fn suggestions(&self, query: &str) -> Vec<&Product> {
        let query = query.trim().to_lowercase();
        if query.is_empty() { return vec![]; }
        self.products
            .iter()
            .filter(|p| p.name().to_lowercase().contains(&query) || p.category().name.to_lowercase().contains(&query))
            .take(SUGGESTIONS_LIMIT)
            .collect()
    }

    /// Full text search over the catalog, in catalog order.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        query::apply(&self.products, &ProductFilter::text(query))
    }

    pub fn query(&self, filter: &ProductFilter) -> Vec<&Product> {
        query::apply(&self.products, filter)
    }

    /// Distinct category names in catalog order, as offered by the shop filters.
    pub fn category_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for p in &self.products {
            if !names.contains(&p.category().name.as_str()) {
                names.push(&p.category().name);
            }
        }
        names
    }

    /// A slug for `name` that no other product uses, suffixing `-2`, `-3`, ... on collision.
    pub fn unique_slug(&self, name: &str, except_id: Option<&str>) -> Result<Slug> {
        let base = Slug::from_name(name).map_err(|e| StorefrontError::validation(e.to_string()))?;
        let taken = |slug: &Slug| self.products.iter().any(|p| p.slug() == slug && Some(p.id()) != except_id);
        let mut candidate = base.clone();
        let mut n = 2;
        while taken(&candidate) {
            candidate = base.with_suffix(n);
            n += 1;
        }
        Ok(candidate)
    }

    pub(crate) fn insert_front(&mut self, product: Product) { self.products.insert(0, product); }

    pub(crate) fn product_mut(&mut self, id: &str) -> Option<&mut Product> { self.products.iter_mut().find(|p| p.id() == id) }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Product> {
        let index = self.products.iter().position(|p| p.id() == id)?;
        Some(self.products.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_catalog() {
        let catalog = Catalog::seeded().unwrap();
        assert_eq!(catalog.products().len(), 8);
        assert_eq!(catalog.categories().len(), 6);
        assert_eq!(catalog.category_names(), vec!["Living Room", "Bedroom", "Office", "Dining", "Outdoor", "Decor"]);
    }

    #[test]
    fn test_product_by_slug() {
        let catalog = Catalog::seeded().unwrap();
        assert_eq!(catalog.product_by_slug("dining-table-set").unwrap().id(), "5");
        assert!(matches!(catalog.product_by_slug("floating-chair"), Err(StorefrontError::ProductNotFound)));
    }

    #[test]
    fn test_category_views() {
        let catalog = Catalog::seeded().unwrap();
        assert_eq!(catalog.category_by_slug("living-room").unwrap().name, "Living Room");
        assert_eq!(catalog.products_in_category("living-room").len(), 3);
        assert!(catalog.products_in_category("garage").is_empty());
        assert!(matches!(catalog.category_by_slug("garage"), Err(StorefrontError::CategoryNotFound)));
    }

    #[test]
    fn test_related_products_exclude_self() {
        let catalog = Catalog::seeded().unwrap();
        let sofa = catalog.product("1").unwrap();
        let related: Vec<&str> = catalog.related_products(sofa).iter().map(|p| p.id()).collect();
        assert_eq!(related, vec!["2", "8"]);
    }

    #[test]
    fn test_suggestions_are_capped() {
        let catalog = Catalog::seeded().unwrap();
        assert!(catalog.suggestions("  ").is_empty());
        assert_eq!(catalog.suggestions("e").len(), SUGGESTIONS_LIMIT);
        assert_eq!(catalog.suggestions("bed")[0].name(), "King Size Platform Bed");
    }

    #[test]
    fn test_unique_slug_suffixes_collisions() {
        let catalog = Catalog::seeded().unwrap();
        assert_eq!(catalog.unique_slug("Modern Leather Sofa", None).unwrap().as_str(), "modern-leather-sofa-2");
        assert_eq!(catalog.unique_slug("Modern Leather Sofa", Some("1")).unwrap().as_str(), "modern-leather-sofa");
        assert_eq!(catalog.unique_slug("Rattan Armchair", None).unwrap().as_str(), "rattan-armchair");
    }
}

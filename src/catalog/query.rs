//! Catalog query engine: text, category and price filters plus sorting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::Product;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Input order.
    #[default]
    Recommended,
    PriceLow,
    PriceHigh,
    Rating,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recommended" | "" => Ok(SortKey::Recommended),
            "price-low" => Ok(SortKey::PriceLow),
            "price-high" => Ok(SortKey::PriceHigh),
            "rating" => Ok(SortKey::Rating),
            other => Err(format!("unknown sort key `{}`", other)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub text: Option<String>,
    /// Category names; empty means any category.
    pub categories: Vec<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub sort: SortKey,
}

impl ProductFilter {
    pub fn text(query: impl Into<String>) -> Self {
        Self { text: Some(query.into()), ..Self::default() }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_price_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    pub fn sorted_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}

/// Case-insensitive substring match on name, description and category name.
pub fn matches_text(product: &Product, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() { return true; }
    [product.name(), product.description(), product.category().name.as_str()]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Filter and sort `products`. An inverted price range yields no results.
pub fn apply<'a>(products: &'a [Product], filter: &ProductFilter) -> Vec<&'a Product> {
    let observed_min = products.iter().map(|p| p.price().amount()).min().unwrap_or(Decimal::ZERO);
    let observed_max = products.iter().map(|p| p.price().amount()).max().unwrap_or(Decimal::ZERO);
    let min = filter.price_min.unwrap_or(observed_min);
    let max = filter.price_max.unwrap_or(observed_max);
    if min > max {
        tracing::debug!(%min, %max, "inverted price range");
        return vec![];
    }

    let text = filter.text.as_deref().unwrap_or("");
    let mut results: Vec<&Product> = products
        .iter()
        .filter(|p| matches_text(p, text))
        .filter(|p| filter.categories.is_empty() || filter.categories.iter().any(|c| *c == p.category().name))
        .filter(|p| (min..=max).contains(&p.price().amount()))
        .collect();

    // sort_by is stable, so ties keep their input order
    match filter.sort {
        SortKey::Recommended => {}
        SortKey::PriceLow => results.sort_by(|a, b| a.price().amount().cmp(&b.price().amount())),
        SortKey::PriceHigh => results.sort_by(|a, b| b.price().amount().cmp(&a.price().amount())),
        SortKey::Rating => results.sort_by(|a, b| b.rating().total_cmp(&a.rating())),
    }
    tracing::debug!(matched = results.len(), sort = ?filter.sort, "catalog query evaluated");
    results
}

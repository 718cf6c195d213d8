//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// URL-safe unique key derived from a name
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Lowercases the name and joins its alphanumeric runs with single hyphens.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let slug = name
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        if slug.is_empty() { return Err(SlugError::Empty); }
        Ok(Self(slug))
    }

    /// Appends a numeric suffix, used to resolve collisions.
    pub fn with_suffix(&self, n: u32) -> Self { Self(format!("{}-{}", self.0, n)) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl PartialEq<str> for Slug {
    fn eq(&self, other: &str) -> bool { self.0 == other }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum SlugError { Empty }
impl std::error::Error for SlugError {}
impl fmt::Display for SlugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Name has no URL-safe characters") }
}

/// Money value object.
///
/// Amounts keep full decimal precision; rounding to cents only happens in
/// [`Money::rounded`] for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn usd(amount: Decimal) -> Self { Self::new(amount, "USD") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_zero(&self) -> bool { self.amount.is_zero() }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
    pub fn scale(&self, rate: Decimal) -> Money { Money::new(self.amount * rate, &self.currency) }
    /// Two-decimal amount for presentation.
    pub fn rounded(&self) -> Decimal { self.amount.round_dp(2) }
}

impl Default for Money { fn default() -> Self { Self::zero("USD") } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.rounded(), self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum MoneyError { CurrencyMismatch }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Currency mismatch") }
}

/// Clamp a requested quantity into `[1, stock]`. `None` when nothing is in stock.
pub fn clamp_quantity(requested: u32, stock: u32) -> Option<u32> {
    if stock == 0 { return None; }
    Some(requested.clamp(1, stock))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_name() {
        let slug = Slug::from_name("King Size  Platform Bed!").unwrap();
        assert_eq!(slug.as_str(), "king-size-platform-bed");
        assert_eq!(Slug::from_name("  --  "), Err(SlugError::Empty));
        assert_eq!(slug.with_suffix(2).as_str(), "king-size-platform-bed-2");
    }

    #[test]
    fn test_money_add() {
        let a = Money::usd(Decimal::new(100, 0));
        let b = Money::usd(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
        assert_eq!(a.add(&Money::zero("EUR")), Err(MoneyError::CurrencyMismatch));
    }

    #[test]
    fn test_money_keeps_precision_until_rounded() {
        let tax = Money::usd(Decimal::new(1999, 2)).scale(Decimal::new(7, 2));
        assert_eq!(tax.amount(), Decimal::new(13993, 4));
        assert_eq!(tax.rounded(), Decimal::new(140, 2));
        assert_eq!(tax.to_string(), "1.40 USD");
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(0, 5), Some(1));
        assert_eq!(clamp_quantity(9, 5), Some(5));
        assert_eq!(clamp_quantity(3, 0), None);
    }
}

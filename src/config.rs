//! Storefront settings loaded from environment variables.

use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::PricingPolicy;

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_DATA_PATH: &str = "storefront-data.json";
pub const DEFAULT_PORT: u16 = 8083;
/// Catalog prices are quoted in this currency, so it is not configurable.
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: i64 = 100;
pub const DEFAULT_FLAT_SHIPPING_FEE: i64 = 10;
pub const DEFAULT_TAX_RATE_PERCENT: i64 = 7;
/// Simulated payment processing time
pub const DEFAULT_CHECKOUT_DELAY_MS: u64 = 1500;

#[derive(Clone, Debug)]
pub struct StorefrontConfig {
    pub data_path: PathBuf,
    pub port: u16,
    pub pricing: PricingPolicy,
    pub checkout_delay: Duration,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            pricing: PricingPolicy {
                currency: DEFAULT_CURRENCY.to_string(),
                free_shipping_threshold: Decimal::new(DEFAULT_FREE_SHIPPING_THRESHOLD, 0),
                flat_shipping_fee: Decimal::new(DEFAULT_FLAT_SHIPPING_FEE, 0),
                tax_rate: Decimal::new(DEFAULT_TAX_RATE_PERCENT, 2),
            },
            checkout_delay: Duration::from_millis(DEFAULT_CHECKOUT_DELAY_MS),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparseable keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            data_path: lookup("STOREFRONT_DATA_PATH").map(PathBuf::from).unwrap_or(defaults.data_path),
            port: parse_or(&lookup, "PORT", defaults.port),
            pricing: PricingPolicy {
                currency: defaults.pricing.currency,
                free_shipping_threshold: parse_or(&lookup, "FREE_SHIPPING_THRESHOLD", defaults.pricing.free_shipping_threshold),
                flat_shipping_fee: parse_or(&lookup, "FLAT_SHIPPING_FEE", defaults.pricing.flat_shipping_fee),
                tax_rate: parse_or(&lookup, "TAX_RATE", defaults.pricing.tax_rate),
            },
            checkout_delay: Duration::from_millis(parse_or(&lookup, "CHECKOUT_DELAY_MS", DEFAULT_CHECKOUT_DELAY_MS)),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparseable setting");
            default
        }),
        None => default,
    }
}

//! Ordering configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! The fee schedule is validated at load time, so a bad deployment fails on
//! startup instead of on the first order.

use plateful_core::{FeeSchedule, PricingError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DB_PATH: &str = "PLATEFUL_DB_PATH";
pub const RESTAURANT_ID: &str = "PLATEFUL_RESTAURANT_ID";
pub const SELLER_ACCOUNT_ID: &str = "PLATEFUL_SELLER_ACCOUNT_ID";
pub const BASE_URL: &str = "PLATEFUL_BASE_URL";
pub const TAX_PERCENT: &str = "PLATEFUL_TAX_PERCENT";
pub const PLATFORM_FEE_PERCENT: &str = "PLATEFUL_PLATFORM_FEE_PERCENT";
pub const PLATFORM_FEE_CAP_CENTS: &str = "PLATEFUL_PLATFORM_FEE_CAP_CENTS";
pub const PROCESSING_RATE: &str = "PLATEFUL_PROCESSING_RATE";
pub const PROCESSING_FIXED_CENTS: &str = "PLATEFUL_PROCESSING_FIXED_CENTS";
pub const TIP_SKIM_THRESHOLD_CENTS: &str = "PLATEFUL_TIP_SKIM_THRESHOLD_CENTS";
pub const TIP_SKIM_CAP_CENTS: &str = "PLATEFUL_TIP_SKIM_CAP_CENTS";

/// Ordering service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Restaurant whose orders this instance takes
    pub restaurant_id: String,

    /// Connected payment account that receives the seller's share
    pub seller_account_id: String,

    /// Where the hosted checkout page sends the customer afterwards
    pub base_url: Option<String>,

    /// Fees applied to every order
    pub fees: FeeSchedule,
}

impl OrderingConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(OrderingConfig {
            database_path: PathBuf::from(
                lookup(DB_PATH)
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| "plateful.db".to_string()),
            ),
            restaurant_id: required(&lookup, RESTAURANT_ID)?,
            seller_account_id: required(&lookup, SELLER_ACCOUNT_ID)?,
            base_url: lookup(BASE_URL)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            fees: fee_schedule_from_lookup(&lookup)?,
        })
    }
}

/// Reads only the fee schedule from the process environment.
pub fn fee_schedule_from_env() -> Result<FeeSchedule, ConfigError> {
    fee_schedule_from_lookup(&|key: &str| env::var(key).ok())
}

/// Reads the fee schedule through `lookup`, falling back to [`FeeSchedule::default`].
pub fn fee_schedule_from_lookup<F>(lookup: &F) -> Result<FeeSchedule, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let fees = FeeSchedule {
        tax_percent: parse_or(lookup, TAX_PERCENT, "9.5")?,
        platform_fee_percent: parse_or(lookup, PLATFORM_FEE_PERCENT, "7.5")?,
        platform_fee_cap_cents: match lookup(PLATFORM_FEE_CAP_CENTS) {
            None => Some(995),
            Some(v) if v.trim().eq_ignore_ascii_case("none") => None,
            Some(v) => Some(
                v.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(PLATFORM_FEE_CAP_CENTS.to_string()))?,
            ),
        },
        processing_rate: parse_or(lookup, PROCESSING_RATE, "0.029")?,
        processing_fixed_cents: parse_or(lookup, PROCESSING_FIXED_CENTS, "30")?,
        tip_skim_threshold_cents: parse_or(lookup, TIP_SKIM_THRESHOLD_CENTS, "100")?,
        tip_skim_cap_cents: parse_or(lookup, TIP_SKIM_CAP_CENTS, "100")?,
    };

    fees.validate()?;
    Ok(fees)
}

fn parse_or<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingRequired(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Fee schedule rejected: {0}")]
    InvalidFeeSchedule(#[from] PricingError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![(RESTAURANT_ID, "rest-1"), (SELLER_ACCOUNT_ID, "acct_123")]
    }

    #[test]
    fn test_defaults() {
        let config = OrderingConfig::from_lookup(lookup_from(&minimal())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("plateful.db"));
        assert_eq!(config.restaurant_id, "rest-1");
        assert_eq!(config.base_url, None);
        assert_eq!(config.fees, FeeSchedule::default());
    }

    #[test]
    fn test_overrides() {
        let mut pairs = minimal();
        pairs.extend([
            (DB_PATH, "/var/lib/plateful/orders.db"),
            (BASE_URL, " https://order.example.com "),
            (TAX_PERCENT, "8.875"),
            (PLATFORM_FEE_CAP_CENTS, "none"),
            (PROCESSING_RATE, "0.03"),
            (TIP_SKIM_THRESHOLD_CENTS, "0"),
        ]);
        let config = OrderingConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/plateful/orders.db"));
        assert_eq!(config.base_url.as_deref(), Some("https://order.example.com"));
        assert_eq!(config.fees.tax_percent, 8.875);
        assert_eq!(config.fees.platform_fee_cap_cents, None);
        assert_eq!(config.fees.processing_rate, 0.03);
        assert_eq!(config.fees.tip_skim_threshold_cents, 0);
        assert_eq!(config.fees.processing_fixed_cents, 30);
    }

    #[test]
    fn test_missing_required() {
        let err = OrderingConfig::from_lookup(lookup_from(&[(RESTAURANT_ID, "rest-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(key) if key == SELLER_ACCOUNT_ID));

        let err = OrderingConfig::from_lookup(lookup_from(&[
            (RESTAURANT_ID, "  "),
            (SELLER_ACCOUNT_ID, "acct_123"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(key) if key == RESTAURANT_ID));
    }

    #[test]
    fn test_unparseable_value() {
        let mut pairs = minimal();
        pairs.push((TAX_PERCENT, "nine"));
        let err = OrderingConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key) if key == TAX_PERCENT));
    }

    #[test]
    fn test_fee_schedule_validated_at_load() {
        let mut pairs = minimal();
        pairs.push((PROCESSING_RATE, "1.0"));
        let err = OrderingConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFeeSchedule(_)));

        let mut pairs = minimal();
        pairs.push((PROCESSING_FIXED_CENTS, "-30"));
        assert!(OrderingConfig::from_lookup(lookup_from(&pairs)).is_err());
    }
}

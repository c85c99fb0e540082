//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WP_URL` - WooCommerce store URL (e.g., `https://shop.example.com`)
//! - `WC_CONSUMER_KEY` - WooCommerce REST consumer key (`ck_...`)
//! - `WC_CONSUMER_SECRET` - WooCommerce REST consumer secret (`cs_...`)
//!
//! ## Optional
//! - `WC_API_VERSION` - REST API version path segment (default: `wc/v3`)
//! - `WOOSYNC_STORE_ID` - Store identifier used in order natural keys
//!   (default: the store URL's host)
//! - `WOOSYNC_PAGE_SIZE` - Records per page (default: 100)
//! - `WOOSYNC_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `WOOSYNC_PASS_TIMEOUT_SECS` - Wall-clock budget per pass (default: 300)
//! - `WOOSYNC_MAX_RECORDS` - Hard bound on records per pass (default: unbounded)
//! - `WOOSYNC_SYNC_ORDERS` / `WOOSYNC_SYNC_CUSTOMERS` / `WOOSYNC_SYNC_PRODUCTS`
//!   - Per-resource enable flags, `true`/`false` (default: true)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Reconciliation engine configuration.
///
/// Implements `Debug` manually to redact the consumer secret.
#[derive(Clone)]
pub struct SyncConfig {
    /// WooCommerce store base URL.
    pub store_url: Url,
    /// Store identifier embedded in order natural keys (`WOO-<store-id>-...`).
    pub store_id: String,
    /// REST consumer key.
    pub consumer_key: String,
    /// REST consumer secret.
    pub consumer_secret: SecretString,
    /// API version path segment (e.g., `wc/v3`).
    pub api_version: String,
    /// Records requested per page.
    pub page_size: u32,
    /// Per-request timeout for remote calls.
    pub request_timeout: Duration,
    /// Wall-clock budget for one sync pass.
    pub pass_timeout: Duration,
    /// Optional hard bound on records processed in one pass.
    pub max_records: Option<usize>,
    /// Per-resource enable flags.
    pub sync_orders: bool,
    pub sync_customers: bool,
    pub sync_products: bool,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("store_url", &self.store_url.as_str())
            .field("store_id", &self.store_id)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("page_size", &self.page_size)
            .field("request_timeout", &self.request_timeout)
            .field("pass_timeout", &self.pass_timeout)
            .field("max_records", &self.max_records)
            .field("sync_orders", &self.sync_orders)
            .field("sync_customers", &self.sync_customers)
            .field("sync_products", &self.sync_products)
            .finish()
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store_url = get_required_env("WP_URL")?;
        let store_url = Url::parse(&store_url)
            .map_err(|e| ConfigError::InvalidEnvVar("WP_URL".to_string(), e.to_string()))?;

        let store_id = match get_optional_env("WOOSYNC_STORE_ID") {
            Some(id) => id,
            None => store_url
                .host_str()
                .map(str::to_string)
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "WP_URL".to_string(),
                        "URL has no host to derive a store id from".to_string(),
                    )
                })?,
        };

        let page_size = parse_env_or_default("WOOSYNC_PAGE_SIZE", 100)?;
        let request_timeout_secs: u64 = parse_env_or_default("WOOSYNC_REQUEST_TIMEOUT_SECS", 30)?;
        let pass_timeout_secs: u64 = parse_env_or_default("WOOSYNC_PASS_TIMEOUT_SECS", 300)?;
        let max_records = get_optional_env("WOOSYNC_MAX_RECORDS")
            .map(|raw| {
                raw.parse::<usize>().map_err(|e| {
                    ConfigError::InvalidEnvVar("WOOSYNC_MAX_RECORDS".to_string(), e.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            store_url,
            store_id,
            consumer_key: get_required_env("WC_CONSUMER_KEY")?,
            consumer_secret: SecretString::from(get_required_env("WC_CONSUMER_SECRET")?),
            api_version: get_env_or_default("WC_API_VERSION", "wc/v3"),
            page_size,
            request_timeout: Duration::from_secs(request_timeout_secs),
            pass_timeout: Duration::from_secs(pass_timeout_secs),
            max_records,
            sync_orders: parse_env_or_default("WOOSYNC_SYNC_ORDERS", true)?,
            sync_customers: parse_env_or_default("WOOSYNC_SYNC_CUSTOMERS", true)?,
            sync_products: parse_env_or_default("WOOSYNC_SYNC_PRODUCTS", true)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable into `T`, falling back to a default when unset.
fn parse_env_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> SyncConfig {
        SyncConfig {
            store_url: Url::parse("https://shop.example.com").unwrap(),
            store_id: "shop.example.com".to_string(),
            consumer_key: "ck_test".to_string(),
            consumer_secret: SecretString::from("cs_test"),
            api_version: "wc/v3".to_string(),
            page_size: 100,
            request_timeout: Duration::from_secs(30),
            pass_timeout: Duration::from_secs(300),
            max_records: None,
            sync_orders: true,
            sync_customers: true,
            sync_products: true,
        }
    }

    #[test]
    fn test_debug_redacts_consumer_secret() {
        let config = test_config();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("shop.example.com"));
        assert!(debug_output.contains("ck_test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("cs_test"));
    }

    #[test]
    fn test_parse_env_or_default_uses_default_when_unset() {
        let value: u32 =
            parse_env_or_default("WOOSYNC_TEST_UNSET_VARIABLE", 42).expect("default applies");
        assert_eq!(value, 42);
    }
}

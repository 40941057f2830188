//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `OFF_BASE_URL` - Catalog base URL (default: <https://world.openfoodfacts.org>)
//! - `OFF_USER_AGENT` - User agent sent to the catalog (default: `food-explorer/<version>`)
//! - `OFF_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `OFF_PAGE_SIZE` - Text search page size (default: 20)
//! - `OFF_CACHE_TTL_SECS` - Response cache TTL in seconds (default: 300)
//! - `OFF_CACHE_CAPACITY` - Maximum cached responses (default: 1000)
//! - `FOOD_EXPLORER_CART_PATH` - Cart snapshot file (default: `cart.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default catalog base URL.
pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";

#[allow(clippy::expect_used)]
static DEFAULT_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_BASE_URL).expect("Invalid default base URL"));

/// Default text search page size.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound accepted by the catalog for `page_size`.
const MAX_PAGE_SIZE: u32 = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Catalog client configuration
    pub catalog: CatalogConfig,
    /// Path of the persisted cart snapshot
    pub cart_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalog client configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog API
    pub base_url: Url,
    /// User agent identifying this application to the catalog
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Page size for text search
    pub page_size: u32,
    /// Time to live of cached responses
    pub cache_ttl: Duration,
    /// Maximum number of cached responses
    pub cache_capacity: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE.clone(),
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(10),
            page_size: DEFAULT_PAGE_SIZE,
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1000,
        }
    }
}

impl ExplorerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let catalog = CatalogConfig::from_lookup(&lookup)?;
        let cart_path = lookup("FOOD_EXPLORER_CART_PATH")
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| PathBuf::from("cart.json"), PathBuf::from);

        Ok(Self {
            catalog,
            cart_path,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }
}

impl CatalogConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = match lookup("OFF_BASE_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => defaults.base_url,
        };

        let page_size = parse_or(lookup, "OFF_PAGE_SIZE", defaults.page_size)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidEnvVar(
                "OFF_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_PAGE_SIZE} (got {page_size})"),
            ));
        }

        let timeout_secs = parse_or(lookup, "OFF_TIMEOUT_SECS", defaults.timeout.as_secs())?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "OFF_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            user_agent: lookup("OFF_USER_AGENT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            timeout: Duration::from_secs(timeout_secs),
            page_size,
            cache_ttl: Duration::from_secs(parse_or(
                lookup,
                "OFF_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )?),
            cache_capacity: parse_or(lookup, "OFF_CACHE_CAPACITY", defaults.cache_capacity)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_user_agent() -> String {
    format!("food-explorer/{}", env!("CARGO_PKG_VERSION"))
}

/// Parse a variable, falling back to `default` when unset.
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// The catalog base must be an absolute http(s) URL.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("OFF_BASE_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "OFF_BASE_URL".to_string(),
            format!("must be an http(s) URL (got {raw})"),
        ));
    }

    Ok(url)
}

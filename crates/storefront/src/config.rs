//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (session store)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `WOOCOMMERCE_URL` - WordPress site URL (e.g., <https://shop.example.ru>)
//! - `WOOCOMMERCE_CONSUMER_KEY` - REST API consumer key (`ck_...`)
//! - `WOOCOMMERCE_CONSUMER_SECRET` - REST API consumer secret (`cs_...`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_CURRENCY` - Store currency (default: RUB)
//! - `STOREFRONT_LOCALE` - Price formatting locale (default: ru)
//! - `STOREFRONT_PAGE_SIZE` - Products per catalog/search page (default: 12)
//! - `WOOCOMMERCE_TIMEOUT_SECS` - Request timeout for the REST API (default: 15)
//! - `DADATA_API_KEY` - `DaData` suggestions API key (address autocomplete)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;
use woo_storefront_core::{CurrencyCode, Locale};

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const MAX_PAGE_SIZE: u32 = 100;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// WooCommerce REST API configuration
    pub woocommerce: WooCommerceConfig,
    /// `DaData` configuration; address autocomplete is off without it
    pub dadata: Option<DadataConfig>,
    /// Catalog presentation settings
    pub catalog: CatalogConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// WooCommerce REST API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct WooCommerceConfig {
    /// WordPress site URL without trailing slash
    pub url: String,
    /// REST API consumer key
    pub consumer_key: String,
    /// REST API consumer secret (server-side only)
    pub consumer_secret: SecretString,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for WooCommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooCommerceConfig")
            .field("url", &self.url)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// `DaData` suggestions API configuration.
#[derive(Clone)]
pub struct DadataConfig {
    pub api_key: SecretString,
}

impl std::fmt::Debug for DadataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DadataConfig")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Catalog presentation settings.
#[derive(Debug, Clone, Copy)]
pub struct CatalogConfig {
    pub currency: CurrencyCode,
    pub locale: Locale,
    /// Products per page in catalog and search listings
    pub page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::RUB,
            locale: Locale::Ru,
            page_size: 12,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            woocommerce: WooCommerceConfig::from_env()?,
            dadata: DadataConfig::from_env()?,
            catalog: CatalogConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl WooCommerceConfig {
    /// Load the WooCommerce section on its own (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let url = normalize_site_url(&get_required_env("WOOCOMMERCE_URL")?)?;
        let consumer_key = get_required_env("WOOCOMMERCE_CONSUMER_KEY")?;
        if !consumer_key.starts_with("ck_") {
            return Err(ConfigError::InvalidEnvVar(
                "WOOCOMMERCE_CONSUMER_KEY".to_string(),
                "must start with 'ck_'".to_string(),
            ));
        }

        Ok(Self {
            url,
            consumer_key,
            consumer_secret: get_validated_secret("WOOCOMMERCE_CONSUMER_SECRET")?,
            timeout_secs: parse_env("WOOCOMMERCE_TIMEOUT_SECS", "15")?,
        })
    }
}

impl DadataConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        if get_optional_env("DADATA_API_KEY").is_none() {
            return Ok(None);
        }
        Ok(Some(Self {
            api_key: get_validated_secret("DADATA_API_KEY")?,
        }))
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let page_size: u32 = parse_env("STOREFRONT_PAGE_SIZE", "12")?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        Ok(Self {
            currency: parse_env("STOREFRONT_CURRENCY", "RUB")?,
            locale: parse_env("STOREFRONT_LOCALE", "ru")?,
            page_size,
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

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to a default.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate the WooCommerce site URL and strip any trailing slash.
fn normalize_site_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("WOOCOMMERCE_URL".to_string(), msg);
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("must have a host".to_string()));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

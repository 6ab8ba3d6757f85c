//! WooCommerce connectivity check.
//!
//! Lists product categories with the configured consumer key and secret,
//! which fails fast on a wrong site URL, revoked keys or keys without read
//! permission.
//!
//! # Environment Variables
//!
//! - `WOOCOMMERCE_URL`
//! - `WOOCOMMERCE_CONSUMER_KEY`
//! - `WOOCOMMERCE_CONSUMER_SECRET`

use thiserror::Error;
use woo_storefront::config::{ConfigError, WooCommerceConfig};
use woo_storefront::woocommerce::{WooClient, WooError};

/// Errors that can occur during the check.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("WooCommerce error: {0}")]
    WooCommerce(#[from] WooError),
}

/// Verify the WooCommerce credentials.
///
/// # Errors
///
/// Returns an error if configuration is missing or the API call fails.
pub async fn woocommerce() -> Result<(), CheckError> {
    let config = WooCommerceConfig::from_env()?;
    tracing::info!(url = %config.url, "Checking WooCommerce REST API...");

    let client = WooClient::new(&config)?;
    let categories = client.list_categories().await?;

    tracing::info!(
        categories = categories.len(),
        "WooCommerce credentials are valid"
    );
    Ok(())
}

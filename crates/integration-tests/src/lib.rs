//! Integration tests for Woo Storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no database or WooCommerce needed)
//! cargo test -p woo-storefront-integration-tests
//!
//! # Tests against a running storefront (STOREFRONT_URL, default :3000)
//! cargo test -p woo-storefront-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `order_flow` - Cart, checkout and order payload across crates
//! - `router` - The application router driven in-process
//! - `live_server` - HTTP against a running storefront (ignored by default)

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use woo_storefront::config::{CatalogConfig, StorefrontConfig, WooCommerceConfig};
use woo_storefront::state::AppState;

/// Base URL of a running storefront for live tests.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
}

/// Configuration pointing at hosts that are never contacted.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://storefront@127.0.0.1:1/storefront_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        woocommerce: WooCommerceConfig {
            url: "http://127.0.0.1:1".to_string(),
            consumer_key: "ck_test".to_string(),
            consumer_secret: SecretString::from("cs_test"),
            timeout_secs: 1,
        },
        dadata: None,
        catalog: CatalogConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Application state with a lazy pool that fails fast when used.
///
/// # Panics
///
/// Panics if the state cannot be built from [`test_config`].
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_state() -> AppState {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(1))
        .connect_lazy("postgres://storefront@127.0.0.1:1/storefront_test")
        .expect("lazy pool from a valid URL");
    AppState::new(test_config(), pool).expect("state from test config")
}

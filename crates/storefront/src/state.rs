//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::dadata::{DadataClient, DadataError};
use crate::woocommerce::{WooClient, WooError};

/// Error creating the API clients held in state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("WooCommerce client: {0}")]
    WooCommerce(#[from] WooError),
    #[error("DaData client: {0}")]
    Dadata(#[from] DadataError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    woo: WooClient,
    dadata: Option<DadataClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The DaData client is only built when an API key is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let woo = WooClient::new(&config.woocommerce)?;
        let dadata = config.dadata.as_ref().map(DadataClient::new).transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                woo,
                dadata,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the WooCommerce API client.
    #[must_use]
    pub fn woo(&self) -> &WooClient {
        &self.inner.woo
    }

    /// The DaData client, if an API key is configured.
    #[must_use]
    pub fn dadata(&self) -> Option<&DadataClient> {
        self.inner.dadata.as_ref()
    }
}

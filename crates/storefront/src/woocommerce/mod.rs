//! WooCommerce REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over `reqwest`, authenticated with the consumer key and
//!   secret (HTTP Basic Auth, server-side only)
//! - WooCommerce is source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for catalog reads (5 minute TTL); orders
//!   are never cached
//!
//! # Endpoints
//!
//! ## `wc/v3`
//! - Products, variations, categories
//! - Order creation
//!
//! ## `ultra/v1`
//! - Catalog facets (price bounds and attribute terms) for filter forms
//!
//! # Example
//!
//! ```rust,ignore
//! use woo_storefront::woocommerce::{ProductQuery, WooClient};
//!
//! let client = WooClient::new(&config.woocommerce)?;
//!
//! let product = client.get_product_by_slug("ceramic-mug").await?;
//! let page = client
//!     .list_products(&ProductQuery::search("кружка", 1, 12))
//!     .await?;
//! ```

mod cache;
mod client;
pub mod conversions;
pub mod query;
pub mod types;

pub use client::WooClient;
pub use query::{ProductQuery, ProductSort};
pub use types::*;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when interacting with the WooCommerce API.
#[derive(Debug, Error)]
pub enum WooError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status.
    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the server.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Error body returned by the WordPress REST API.
///
/// ```json
/// {"code": "woocommerce_rest_cannot_view", "message": "...", "data": {"status": 401}}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub data: Option<ApiErrorData>,
}

/// Extra data attached to an API error.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorData {
    pub status: Option<u16>,
}

impl WooError {
    /// Build an error from a non-success status and the raw body.
    ///
    /// WordPress error bodies are decoded when present; anything else is
    /// reported with a truncated body as the message.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(err) if status == 404 => Self::NotFound(err.message),
            Ok(err) => Self::Api {
                status: err.data.and_then(|d| d.status).unwrap_or(status),
                code: err.code,
                message: err.message,
            },
            Err(_) if status == 404 => Self::NotFound(truncate(body, 200)),
            Err(_) => Self::Api {
                status,
                code: "http_error".to_string(),
                message: truncate(body, 200),
            },
        }
    }

    /// Whether the error means the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_woo_error_display() {
        let err = WooError::NotFound("product mug".to_string());
        assert_eq!(err.to_string(), "Not found: product mug");

        let err = WooError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }

    #[test]
    fn test_from_response_decodes_wordpress_error() {
        let body = r#"{"code":"woocommerce_rest_authentication_error","message":"Invalid signature","data":{"status":401}}"#;
        let err = WooError::from_response(401, body);
        assert_eq!(
            err.to_string(),
            "API error 401 (woocommerce_rest_authentication_error): Invalid signature"
        );
    }

    #[test]
    fn test_from_response_not_found() {
        let body = r#"{"code":"woocommerce_rest_product_invalid_id","message":"Invalid ID.","data":{"status":404}}"#;
        let err = WooError::from_response(404, body);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: Invalid ID.");
    }

    #[test]
    fn test_from_response_non_json_body() {
        let body = "<html>".to_string() + &"x".repeat(500);
        let err = WooError::from_response(502, &body);
        match err {
            WooError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 502);
                assert_eq!(code, "http_error");
                assert_eq!(message.chars().count(), 200);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

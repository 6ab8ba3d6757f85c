//! Unified error handling with Sentry integration.
//!
//! Page handlers return `Result<T, AppError>`; JSON endpoints under `/api`
//! return `Result<T, ApiError>`, which carries the same error but renders a
//! `{"message": ...}` body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use woo_storefront_core::checkout::FieldError;
use woo_storefront_core::{CheckoutError, CheckoutStep};

use crate::dadata::DadataError;
use crate::woocommerce::WooError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// WooCommerce API operation failed.
    #[error("WooCommerce error: {0}")]
    WooCommerce(#[from] WooError),

    /// Address suggestion lookup failed.
    #[error("DaData error: {0}")]
    Dadata(#[from] DadataError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Submitted checkout data did not validate.
    #[error("Validation error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::WooCommerce(WooError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::WooCommerce(WooError::Api {
                status: 401 | 403, ..
            })
            | Self::Session(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::WooCommerce(_) | Self::Dadata(_) => StatusCode::BAD_GATEWAY,
            Self::Checkout(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to the visitor.
    ///
    /// Upstream and internal failures are replaced by a generic message.
    /// Rejected WooCommerce credentials are a server configuration fault.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::WooCommerce(WooError::NotFound(_)) | Self::NotFound(_) => {
                "Страница не найдена".to_string()
            }
            Self::WooCommerce(WooError::Api {
                status: 401 | 403, ..
            }) => "Ошибка конфигурации магазина, попробуйте позже".to_string(),
            Self::WooCommerce(_) | Self::Dadata(_) => {
                "Сервис временно недоступен, попробуйте позже".to_string()
            }
            Self::Session(_) | Self::Internal(_) => "Внутренняя ошибка сервера".to_string(),
            Self::Checkout(err) => err
                .field_errors()
                .first()
                .map_or_else(|| err.to_string(), |e| e.message.to_string()),
            Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Capture server-side failures to Sentry.
    fn report(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        (self.status(), self.public_message()).into_response()
    }
}

/// JSON error body for `/api` routes.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    /// Checkout step that failed validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<CheckoutStep>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// An [`AppError`] rendered as JSON.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.report();
        let (step, errors) = match &self.0 {
            AppError::Checkout(err) => (Some(err.step()), err.field_errors().to_vec()),
            _ => (None, Vec::new()),
        };
        let body = ErrorBody {
            message: self.0.public_message(),
            step,
            errors,
        };
        (self.0.status(), Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<WooError> for ApiError {
    fn from(err: WooError) -> Self {
        Self(err.into())
    }
}

impl From<DadataError> for ApiError {
    fn from(err: DadataError) -> Self {
        Self(err.into())
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        Self(err.into())
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self(err.into())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for visitor actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "93")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use woo_storefront_core::CheckoutStep;
    use woo_storefront_core::checkout::FieldError;

    use super::*;

    fn invalid_checkout() -> CheckoutError {
        CheckoutError::Invalid {
            step: CheckoutStep::Personal,
            errors: vec![FieldError {
                field: "phone",
                message: "Введите номер телефона полностью",
            }],
        }
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product mug".to_string());
        assert_eq!(err.to_string(), "Not found: product mug");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::WooCommerce(WooError::NotFound("mug".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::WooCommerce(WooError::RateLimited(5))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Checkout(invalid_checkout())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rejected_credentials_are_a_server_error() {
        for status in [401, 403] {
            let body = format!(
                r#"{{"code":"woocommerce_rest_cannot_create","message":"Sorry, you are not allowed to create resources.","data":{{"status":{status}}}}}"#
            );
            let err = AppError::WooCommerce(WooError::from_response(status, &body));
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                err.public_message(),
                "Ошибка конфигурации магазина, попробуйте позже"
            );
        }

        let upstream = AppError::WooCommerce(WooError::from_response(500, "oops"));
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_public_message_hides_internal_details() {
        let err = AppError::Internal("connection refused: 10.0.0.3:5432".to_string());
        assert!(!err.public_message().contains("10.0.0.3"));

        let err = AppError::WooCommerce(WooError::Api {
            status: 401,
            code: "woocommerce_rest_cannot_create".to_string(),
            message: "Sorry, you are not allowed to create resources.".to_string(),
        });
        assert!(!err.public_message().contains("woocommerce_rest"));
    }

    #[test]
    fn test_checkout_message_uses_first_field_error() {
        let err = AppError::Checkout(invalid_checkout());
        assert_eq!(err.public_message(), "Введите номер телефона полностью");
    }

    #[tokio::test]
    async fn test_api_error_renders_json() {
        let response = ApiError(AppError::BadRequest("Корзина пуста".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"message": "Корзина пуста"}));
    }

    #[tokio::test]
    async fn test_api_error_lists_checkout_fields() {
        let response = ApiError(AppError::Checkout(invalid_checkout())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["step"], "personal");
        assert_eq!(body["errors"][0]["field"], "phone");
    }
}

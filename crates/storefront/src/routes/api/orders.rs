//! Order submission endpoint.
//!
//! Accepts the checkout fields as JSON and creates the order for the
//! session cart. WooCommerce credentials never leave the server.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;
use woo_storefront_core::checkout::CheckoutData;
use woo_storefront_core::{Checkout, OrderStatus, format_date_input, format_phone};

use crate::error::ApiError;
use crate::routes::checkout::{place_order, today};
use crate::state::AppState;

/// Created order summary.
#[derive(Debug, Serialize)]
pub struct OrderCreated {
    pub id: i64,
    pub number: String,
    pub status: OrderStatus,
    /// Formatted total.
    pub total: String,
}

/// Apply the same input masks the checkout forms use.
fn normalize(mut data: CheckoutData) -> CheckoutData {
    data.personal.phone = format_phone(&data.personal.phone);
    data.delivery.date = format_date_input(&data.delivery.date);
    data
}

/// Create an order from JSON checkout data.
#[instrument(skip(state, session, data))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(data): Json<CheckoutData>,
) -> Result<impl IntoResponse, ApiError> {
    let checkout = Checkout::with_data(normalize(data));
    let (order, summary) = place_order(&state, &session, &checkout, today()).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreated {
            id: order.id.as_i64(),
            number: summary.number,
            status: order.status,
            total: summary.total,
        }),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_json_shape() {
        let data: CheckoutData = serde_json::from_value(serde_json::json!({
            "personal": {
                "first_name": "Анна",
                "last_name": "Петрова",
                "phone": "8 916 123 45 67",
                "email": "anna@example.ru"
            },
            "delivery": {
                "method": "courier",
                "address": "Москва, ул. Тверская, д. 1",
                "apartment": "12",
                "date": "01022030",
                "time_slot": "10-14",
                "comment": ""
            },
            "payment_method": "cash_on_delivery"
        }))
        .unwrap();

        let data = normalize(data);
        assert_eq!(data.personal.phone, "+7 (916) 123-45-67");
        assert_eq!(data.delivery.date, "01.02.2030");
        assert!(data.payment_method.is_some());
    }

    #[test]
    fn test_created_body() {
        let body = serde_json::to_value(OrderCreated {
            id: 512,
            number: "512".to_string(),
            status: OrderStatus::Pending,
            total: "1\u{a0}580\u{a0}₽".to_string(),
        })
        .unwrap();
        assert_eq!(body["status"], "pending");
        assert_eq!(body["id"], 512);
    }
}

//! JSON API routes.
//!
//! Mounted under `/api` behind the rate limiter.

pub mod address;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the `/api` router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::create))
        .route("/address/suggest", get(address::suggest))
}

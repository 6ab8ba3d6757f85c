//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (database ping)
//!
//! # Catalog
//! GET  /catalog                   - Category list
//! GET  /catalog/{slug}            - Category listing (filters in the query string)
//! GET  /product/{slug}            - Product detail
//!
//! # Search
//! GET  /search?q=&page=           - Search page (first page of results)
//! GET  /search/more?q=&page=      - Next page of results (HTMX, revealed)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add to cart (returns badge, triggers cart-updated)
//! POST /cart/update               - Change quantity (returns cart_items fragment)
//! POST /cart/remove               - Remove line (returns cart_items fragment)
//! POST /cart/clear                - Empty the cart (returns cart_items fragment)
//! GET  /cart/count                - Cart badge fragment
//!
//! # Checkout
//! GET  /checkout                  - Current step
//! POST /checkout/personal         - Submit step 1
//! POST /checkout/delivery         - Submit step 2
//! POST /checkout/payment          - Submit step 3 and place the order
//! POST /checkout/back             - Previous step
//! POST /checkout/goto             - Jump to a step from the step indicator
//! GET  /checkout/success/{id}     - Order confirmation
//!
//! # JSON API (rate limited)
//! POST /api/orders                - Place an order from JSON checkout data
//! GET  /api/address/suggest?q=    - Address suggestions
//! ```

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod form;
pub mod home;
pub mod products;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::api_rate_limiter;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/{slug}", get(catalog::show))
}

/// Create the search routes router.
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search::index))
        .route("/more", get(search::more))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/personal", post(checkout::personal))
        .route("/delivery", post(checkout::delivery))
        .route("/payment", post(checkout::payment))
        .route("/back", post(checkout::back))
        .route("/goto", post(checkout::go_to))
        .route("/success/{id}", get(checkout::success))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/catalog", catalog_routes())
        .route("/product/{slug}", get(products::show))
        .nest("/search", search_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/api", api::routes().layer(api_rate_limiter()))
}

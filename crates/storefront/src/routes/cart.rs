//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every mutation loads it, applies
//! one [`CartAction`] and stores the result. HTMX requests get a fragment
//! back together with an `HX-Trigger: cart-updated` header so the header
//! badge refreshes; plain form posts are redirected to the cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use woo_storefront_core::{
    Cart, CartAction, CartItem, CartItemKey, ProductId, VariationId,
    cart::MAX_LINE_QUANTITY,
};

use crate::config::CatalogConfig;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::filters::plural_ru;
use crate::models::VisitorSession;
use crate::routes::form::{empty_string_as_none, is_htmx};
use crate::state::AppState;
use crate::woocommerce::conversions::{cart_item_from_product, cart_item_from_variation};

const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub key: String,
    pub slug: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
    pub image: Option<String>,
    pub max_quantity: u32,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
    /// "3 товара"
    pub count_label: String,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, catalog: &CatalogConfig) -> Self {
        let item_count = cart.item_count();
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView::new(item, catalog))
                .collect(),
            subtotal: cart.total_price().format(catalog.locale),
            item_count,
            count_label: format!(
                "{item_count} {}",
                plural_ru(u64::from(item_count), "товар", "товара", "товаров")
            ),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl CartItemView {
    fn new(item: &CartItem, catalog: &CatalogConfig) -> Self {
        Self {
            key: item.key().to_string(),
            slug: item.slug.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.price.format(catalog.locale),
            line_total: item.line_total().format(catalog.locale),
            image: item.image.clone(),
            max_quantity: MAX_LINE_QUANTITY,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart lines fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Header cart badge fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Forms
// =============================================================================

/// Add-to-cart form.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub variation_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub quantity: Option<u32>,
}

/// Quantity change form.
///
/// A cleared quantity box posts `quantity=`, which leaves the line as is.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub key: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub quantity: Option<u32>,
}

/// Line removal form.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub key: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Load, mutate and store the cart.
async fn mutate(state: &AppState, session: &Session, action: CartAction) -> Result<Cart> {
    let visitor = VisitorSession::new(session);
    let mut cart = visitor.cart(state.config().catalog.currency).await?;
    cart.apply(action);
    visitor.set_cart(&cart).await?;
    Ok(cart)
}

/// Respond to a mutation with the updated lines, or redirect non-HTMX posts.
fn items_response(headers: &HeaderMap, cart: &Cart, catalog: &CatalogConfig) -> Response {
    if !is_htmx(headers) {
        return Redirect::to("/cart").into_response();
    }
    (
        AppendHeaders([CART_UPDATED]),
        CartItemsTemplate {
            cart: CartView::new(cart, catalog),
        },
    )
        .into_response()
}

/// Display the cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let catalog = &state.config().catalog;
    let cart = VisitorSession::new(&session).cart(catalog.currency).await?;
    Ok(CartShowTemplate {
        cart: CartView::new(&cart, catalog),
    })
}

/// Build the cart line for a form submission, checking it can be sold.
async fn line_for(state: &AppState, form: &AddToCartForm) -> Result<CartItem> {
    let catalog = &state.config().catalog;
    let quantity = form.quantity.unwrap_or(1).clamp(1, MAX_LINE_QUANTITY);
    let product = state.woo().get_product(ProductId::new(form.product_id)).await?;

    let item = match form.variation_id.map(VariationId::new) {
        Some(variation_id) => {
            let variations = state.woo().list_variations(product.id).await?;
            let variation = variations
                .iter()
                .find(|v| v.id == variation_id)
                .ok_or_else(|| AppError::BadRequest("Выберите вариант товара".to_string()))?;
            if !variation.stock_status.is_purchasable() {
                return Err(AppError::BadRequest("Этого варианта нет в наличии".to_string()));
            }
            cart_item_from_variation(&product, variation, quantity, catalog.currency)
        }
        None if product.is_variable() => {
            return Err(AppError::BadRequest("Выберите вариант товара".to_string()));
        }
        None => {
            if !product.stock_status.is_purchasable() {
                return Err(AppError::BadRequest("Товара нет в наличии".to_string()));
            }
            cart_item_from_product(&product, quantity, catalog.currency)
        }
    };

    item.ok_or_else(|| AppError::BadRequest("Товар недоступен для заказа".to_string()))
}

/// Add an item to the cart.
///
/// Returns the updated header badge for HTMX requests.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let item = line_for(&state, &form).await?;
    let product_id = item.product_id.to_string();
    let cart = mutate(&state, &session, CartAction::Add(item)).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str())]),
    );

    if !is_htmx(&headers) {
        return Ok(Redirect::to("/cart").into_response());
    }
    Ok((
        AppendHeaders([CART_UPDATED]),
        CartCountTemplate {
            count: cart.item_count(),
        },
    )
        .into_response())
}

/// Change the quantity of a line. Zero removes it.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let catalog = &state.config().catalog;
    let Some(quantity) = form.quantity else {
        let cart = VisitorSession::new(&session).cart(catalog.currency).await?;
        return Ok(items_response(&headers, &cart, catalog));
    };
    let action = CartAction::UpdateQuantity {
        key: CartItemKey::from(form.key),
        quantity,
    };
    let cart = mutate(&state, &session, action).await?;
    Ok(items_response(&headers, &cart, catalog))
}

/// Remove a line from the cart.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let action = CartAction::Remove(CartItemKey::from(form.key));
    let cart = mutate(&state, &session, action).await?;
    Ok(items_response(&headers, &cart, &state.config().catalog))
}

/// Empty the cart.
#[instrument(skip(state, session, headers))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response> {
    let cart = mutate(&state, &session, CartAction::Clear).await?;
    add_breadcrumb("cart", "Cart cleared", None);
    Ok(items_response(&headers, &cart, &state.config().catalog))
}

/// Header badge fragment (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let cart = VisitorSession::new(&session)
        .cart(state.config().catalog.currency)
        .await?;
    Ok(CartCountTemplate {
        count: cart.item_count(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use woo_storefront_core::{CurrencyCode, Price};

    use super::*;

    fn line(product: i64, variation: Option<i64>, price: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(product),
            variation_id: variation.map(VariationId::new),
            variation_slug: None,
            name: format!("Товар {product}"),
            slug: format!("tovar-{product}"),
            quantity,
            price: Price::new(Decimal::from(price), CurrencyCode::RUB),
            image: None,
        }
    }

    #[test]
    fn test_cart_view_totals() {
        let cart = Cart::new(CurrencyCode::RUB)
            .reduce(CartAction::Add(line(1, None, 1500, 2)))
            .reduce(CartAction::Add(line(2, Some(7), 250, 1)));

        let view = CartView::new(&cart, &CatalogConfig::default());
        assert_eq!(view.item_count, 3);
        assert_eq!(view.count_label, "3 товара");
        assert_eq!(view.subtotal, "3\u{a0}250\u{a0}₽");
        assert_eq!(view.items[0].line_total, "3\u{a0}000\u{a0}₽");
        assert_eq!(view.items[1].key, "2-7");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::new(&Cart::new(CurrencyCode::RUB), &CatalogConfig::default());
        assert!(view.is_empty());
        assert_eq!(view.count_label, "0 товаров");
        assert_eq!(view.subtotal, "0\u{a0}₽");
    }

    #[test]
    fn test_add_form_tolerates_blank_fields() {
        let form: AddToCartForm =
            serde_urlencoded::from_str("product_id=12&variation_id=&quantity=").unwrap();
        assert_eq!(form.product_id, 12);
        assert_eq!(form.variation_id, None);
        assert_eq!(form.quantity, None);
    }

    #[test]
    fn test_update_form_with_cleared_quantity() {
        let form: UpdateCartForm = serde_urlencoded::from_str("key=12-7&quantity=").unwrap();
        assert_eq!(form.key, "12-7");
        assert_eq!(form.quantity, None);

        let form: UpdateCartForm = serde_urlencoded::from_str("key=12&quantity=0").unwrap();
        assert_eq!(form.quantity, Some(0));
    }

    #[test]
    fn test_items_response_redirects_plain_posts() {
        let cart = Cart::new(CurrencyCode::RUB);
        let response = items_response(&HeaderMap::new(), &cart, &CatalogConfig::default());
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);

        let mut headers = HeaderMap::new();
        headers.insert("hx-request", "true".parse().unwrap());
        let response = items_response(&headers, &cart, &CatalogConfig::default());
        assert!(response.status().is_success());
        assert_eq!(response.headers()["hx-trigger"], "cart-updated");
    }
}

//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::routes::catalog::CategoryView;
use crate::routes::products::{ProductCardView, cards};
use crate::state::AppState;
use crate::woocommerce::ProductQuery;

/// Featured products shown on the home page.
const FEATURED_COUNT: u32 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured_products: Vec<ProductCardView>,
    pub categories: Vec<CategoryView>,
}

/// Display the home page.
///
/// WooCommerce failures degrade to empty sections rather than an error page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let featured_query = ProductQuery::featured(FEATURED_COUNT);
    let (featured, categories) = tokio::join!(
        state.woo().list_products(&featured_query),
        state.woo().list_categories(),
    );

    let featured_products = featured.map_or_else(
        |e| {
            tracing::error!("Failed to fetch featured products: {e}");
            Vec::new()
        },
        |page| cards(&page.products, &state.config().catalog),
    );

    let categories = categories.map_or_else(
        |e| {
            tracing::error!("Failed to fetch categories: {e}");
            Vec::new()
        },
        |categories| {
            categories
                .iter()
                .filter(|c| c.is_top_level())
                .map(CategoryView::from)
                .collect()
        },
    );

    HomeTemplate {
        featured_products,
        categories,
    }
}

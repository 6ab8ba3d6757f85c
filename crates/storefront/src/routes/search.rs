//! Search route handlers.
//!
//! The search page renders the first page of results. Further pages are
//! appended by a sentinel element that HTMX requests once it scrolls into
//! view (`hx-trigger="revealed"`). The sentinel is synced with
//! `hx-sync="this:replace"`, so a re-trigger cancels the request in flight.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::filters::plural_ru;
use crate::routes::products::{ProductCardView, cards};
use crate::state::AppState;
use crate::woocommerce::{ProductPage, ProductQuery};

/// Longest search term forwarded to WooCommerce.
const MAX_QUERY_CHARS: usize = 100;

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub page: Option<String>,
}

impl SearchQuery {
    /// Trimmed search term, capped in length.
    #[must_use]
    pub fn term(&self) -> String {
        self.q.trim().chars().take(MAX_QUERY_CHARS).collect()
    }

    /// Requested page; anything unparsable means the first page.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
            .max(1)
    }
}

/// URL of the fragment holding the next page.
#[must_use]
pub fn more_url(term: &str, page: u32) -> String {
    format!("/search/more?q={}&page={page}", urlencoding::encode(term))
}

/// Search results fragment (HTMX): one page of cards plus the sentinel
/// for the next page.
#[derive(Template, WebTemplate)]
#[template(path = "partials/search_results.html")]
pub struct SearchResultsTemplate {
    pub products: Vec<ProductCardView>,
    pub next_url: Option<String>,
}

/// Full search page template; includes the results fragment.
#[derive(Template, WebTemplate)]
#[template(path = "search/index.html")]
pub struct SearchPageTemplate {
    pub query: String,
    pub summary: String,
    pub products: Vec<ProductCardView>,
    pub next_url: Option<String>,
}

fn results(term: &str, page: &ProductPage, state: &AppState) -> SearchResultsTemplate {
    SearchResultsTemplate {
        products: cards(&page.products, &state.config().catalog),
        next_url: page.pagination.next_page().map(|next| more_url(term, next)),
    }
}

fn summary(total: u64) -> String {
    if total == 0 {
        "Ничего не найдено".to_string()
    } else {
        let found = plural_ru(total, "Найден", "Найдено", "Найдено");
        let noun = plural_ru(total, "товар", "товара", "товаров");
        format!("{found} {total} {noun}")
    }
}

/// Display the search page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let term = query.term();
    if term.is_empty() {
        return Ok(SearchPageTemplate {
            query: String::new(),
            summary: String::new(),
            products: Vec::new(),
            next_url: None,
        });
    }

    let per_page = state.config().catalog.page_size;
    let page = state
        .woo()
        .list_products(&ProductQuery::search(&term, query.page(), per_page))
        .await?;

    let results = results(&term, &page, &state);
    Ok(SearchPageTemplate {
        summary: summary(page.pagination.total_items),
        products: results.products,
        next_url: results.next_url,
        query: term,
    })
}

/// Next page of results (HTMX fragment).
#[instrument(skip(state))]
pub async fn more(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let term = query.term();
    if term.is_empty() {
        return Ok(SearchResultsTemplate {
            products: Vec::new(),
            next_url: None,
        });
    }

    let per_page = state.config().catalog.page_size;
    let page = state
        .woo()
        .list_products(&ProductQuery::search(&term, query.page(), per_page))
        .await?;

    Ok(results(&term, &page, &state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_is_trimmed_and_capped() {
        let query = SearchQuery {
            q: format!("  {}  ", "а".repeat(150)),
            page: None,
        };
        assert_eq!(query.term().chars().count(), MAX_QUERY_CHARS);
    }

    #[test]
    fn test_page_parsing() {
        let page = |p: Option<&str>| {
            SearchQuery {
                q: String::new(),
                page: p.map(ToString::to_string),
            }
            .page()
        };
        assert_eq!(page(None), 1);
        assert_eq!(page(Some("")), 1);
        assert_eq!(page(Some("0")), 1);
        assert_eq!(page(Some("abc")), 1);
        assert_eq!(page(Some("3")), 3);
    }

    #[test]
    fn test_more_url_encodes_term() {
        assert_eq!(
            more_url("чай & кофе", 2),
            "/search/more?q=%D1%87%D0%B0%D0%B9%20%26%20%D0%BA%D0%BE%D1%84%D0%B5&page=2"
        );
    }

    #[test]
    fn test_summary() {
        assert_eq!(summary(0), "Ничего не найдено");
        assert_eq!(summary(1), "Найден 1 товар");
        assert_eq!(summary(22), "Найдено 22 товара");
        assert_eq!(summary(15), "Найдено 15 товаров");
    }
}

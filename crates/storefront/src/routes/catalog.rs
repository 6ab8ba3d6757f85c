//! Catalog route handlers.
//!
//! Category listings keep their filters in the query string, so a filtered
//! view can be bookmarked, shared and navigated with the back button.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use tracing::instrument;
use woo_storefront_core::{CategoryId, Pagination};

use crate::error::Result;
use crate::filters;
use crate::routes::form::{checkbox, empty_string_as_none};
use crate::routes::products::{ProductCardView, cards};
use crate::state::AppState;
use crate::woocommerce::{CatalogFacets, Category, ProductQuery, ProductSort};

// =============================================================================
// Query Parameters
// =============================================================================

/// Unknown sort values fall back to the default order.
fn lenient_sort<'de, D>(deserializer: D) -> std::result::Result<Option<ProductSort>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.as_deref().and_then(|v| ProductSort::parse(v.trim())))
}

/// Category listing filters, mirrored in the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogFilters {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "checkbox")]
    pub in_stock: bool,
    #[serde(default, deserialize_with = "lenient_sort")]
    pub sort: Option<ProductSort>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
}

impl CatalogFilters {
    /// Current page, 1-based.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn sort(&self) -> ProductSort {
        self.sort.unwrap_or_default()
    }

    /// Price bounds with a reversed range put back in order.
    #[must_use]
    pub fn price_range(&self) -> (Option<Decimal>, Option<Decimal>) {
        match (self.min_price, self.max_price) {
            (Some(min), Some(max)) if min > max => (Some(max), Some(min)),
            range => range,
        }
    }

    /// Whether any filter narrows the listing.
    #[must_use]
    pub const fn is_filtered(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some() || self.in_stock
    }

    /// The same filters on another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }

    /// Product query for a category.
    #[must_use]
    pub fn to_product_query(&self, category: CategoryId, per_page: u32) -> ProductQuery {
        let (min_price, max_price) = self.price_range();
        ProductQuery {
            min_price,
            max_price,
            in_stock_only: self.in_stock,
            sort: self.sort(),
            ..ProductQuery::category(category, self.page(), per_page)
        }
    }

    /// Canonical query string (without `?`), listing only non-default values.
    #[must_use]
    pub fn to_query(&self) -> String {
        let (min_price, max_price) = self.price_range();
        let mut parts = Vec::new();
        if let Some(min) = min_price {
            parts.push(format!("min_price={}", min.normalize()));
        }
        if let Some(max) = max_price {
            parts.push(format!("max_price={}", max.normalize()));
        }
        if self.in_stock {
            parts.push("in_stock=1".to_string());
        }
        if let Some(sort) = self.sort.filter(|s| *s != ProductSort::default()) {
            parts.push(format!("sort={}", urlencoding::encode(sort.as_str())));
        }
        if self.page() > 1 {
            parts.push(format!("page={}", self.page()));
        }
        parts.join("&")
    }
}

// =============================================================================
// Views
// =============================================================================

/// Category tile.
#[derive(Clone)]
pub struct CategoryView {
    pub slug: String,
    pub name: String,
    pub image: Option<String>,
    pub count: u32,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            slug: category.slug.clone(),
            name: category.name.clone(),
            image: category.image.as_ref().map(|i| i.src.clone()),
            count: category.count,
        }
    }
}

/// Top-level category with its subcategories.
#[derive(Clone)]
pub struct CategoryGroupView {
    pub category: CategoryView,
    pub children: Vec<CategoryView>,
}

/// Group categories under their top-level parents, keeping API order.
#[must_use]
pub fn group_categories(categories: &[Category]) -> Vec<CategoryGroupView> {
    categories
        .iter()
        .filter(|c| c.is_top_level())
        .map(|parent| CategoryGroupView {
            category: CategoryView::from(parent),
            children: categories
                .iter()
                .filter(|c| c.parent == parent.id.as_i64())
                .map(CategoryView::from)
                .collect(),
        })
        .collect()
}

/// Link to a page of the listing.
#[derive(Clone)]
pub struct PageLink {
    pub number: u32,
    pub url: String,
    pub current: bool,
}

/// Pagination controls.
#[derive(Clone)]
pub struct PaginationView {
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    pub pages: Vec<PageLink>,
}

/// Pages either side of the current one shown in the pager.
const PAGER_WINDOW: u32 = 2;

impl PaginationView {
    fn new(pagination: &Pagination, url_for: impl Fn(u32) -> String) -> Self {
        let first = pagination.page.saturating_sub(PAGER_WINDOW).max(1);
        let last = pagination
            .page
            .saturating_add(PAGER_WINDOW)
            .min(pagination.total_pages);
        Self {
            prev_url: pagination.prev_page().map(&url_for),
            next_url: pagination.next_page().map(&url_for),
            pages: (first..=last)
                .map(|number| PageLink {
                    number,
                    url: url_for(number),
                    current: number == pagination.page,
                })
                .collect(),
        }
    }

    /// Whether there is more than one page.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.pages.len() > 1
    }
}

/// Sort dropdown option.
#[derive(Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

// =============================================================================
// Templates
// =============================================================================

/// Category list template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogIndexTemplate {
    pub groups: Vec<CategoryGroupView>,
}

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/show.html")]
pub struct CatalogShowTemplate {
    pub category: CategoryView,
    pub description: String,
    pub products: Vec<ProductCardView>,
    pub total_items: u64,
    pub pagination: PaginationView,
    pub min_price: String,
    pub max_price: String,
    pub in_stock: bool,
    pub is_filtered: bool,
    pub sort_options: Vec<SortOption>,
    /// Placeholder bounds from the facets endpoint.
    pub price_floor: String,
    pub price_ceiling: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display all categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.woo().list_categories().await?;
    Ok(CatalogIndexTemplate {
        groups: group_categories(&categories),
    })
}

/// Display a category listing with filters.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(filters): Query<CatalogFilters>,
) -> Result<impl IntoResponse> {
    let category = state.woo().get_category_by_slug(&slug).await?;
    let catalog = &state.config().catalog;

    let query = filters.to_product_query(category.id, catalog.page_size);
    let (page, facets) = tokio::join!(
        state.woo().list_products(&query),
        state.woo().get_catalog_filters(Some(category.id)),
    );
    let page = page?;
    let facets = facets.unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch catalog filters for {slug}: {e}");
        CatalogFacets::default()
    });

    let base = format!("/catalog/{}", category.slug);
    let pagination = PaginationView::new(&page.pagination, |number| {
        let query = filters.with_page(number).to_query();
        if query.is_empty() {
            base.clone()
        } else {
            format!("{base}?{query}")
        }
    });

    let (min_price, max_price) = filters.price_range();
    let sort = filters.sort();

    Ok(CatalogShowTemplate {
        category: CategoryView::from(&category),
        description: category.description.clone(),
        products: cards(&page.products, catalog),
        total_items: page.pagination.total_items,
        pagination,
        min_price: min_price.map(|d| d.normalize().to_string()).unwrap_or_default(),
        max_price: max_price.map(|d| d.normalize().to_string()).unwrap_or_default(),
        in_stock: filters.in_stock,
        is_filtered: filters.is_filtered(),
        sort_options: ProductSort::ALL
            .into_iter()
            .map(|s| SortOption {
                value: s.as_str(),
                label: s.label(),
                selected: s == sort,
            })
            .collect(),
        price_floor: facets
            .price
            .map(|p| p.min.normalize().to_string())
            .unwrap_or_default(),
        price_ceiling: facets
            .price
            .map(|p| p.max.normalize().to_string())
            .unwrap_or_default(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(query: &str) -> CatalogFilters {
        serde_urlencoded::from_str(query).unwrap()
    }

    #[test]
    fn test_empty_values_are_absent() {
        let filters = parse("min_price=&max_price=&sort=&page=");
        assert_eq!(filters, CatalogFilters::default());
        assert_eq!(filters.to_query(), "");
        assert_eq!(filters.page(), 1);
    }

    #[test]
    fn test_filters_round_trip_through_url() {
        let filters = parse("min_price=500&max_price=3000.00&in_stock=on&sort=price_asc&page=2");
        assert_eq!(filters.min_price, Some(Decimal::from(500)));
        assert!(filters.in_stock);
        assert_eq!(filters.sort, Some(ProductSort::PriceAsc));
        assert_eq!(
            filters.to_query(),
            "min_price=500&max_price=3000&in_stock=1&sort=price_asc&page=2"
        );
        assert_eq!(parse(&filters.to_query()), filters.with_page(2));
    }

    #[test]
    fn test_default_sort_and_first_page_are_omitted() {
        let filters = parse("sort=popularity&page=1&in_stock=0");
        assert_eq!(filters.to_query(), "");
        assert!(!filters.is_filtered());
    }

    #[test]
    fn test_unknown_sort_is_ignored() {
        let filters = parse("sort=cheapest");
        assert_eq!(filters.sort, None);
        assert_eq!(filters.sort(), ProductSort::Popularity);
    }

    #[test]
    fn test_invalid_price_is_rejected() {
        assert!(serde_urlencoded::from_str::<CatalogFilters>("min_price=abc").is_err());
    }

    #[test]
    fn test_reversed_price_range_is_swapped() {
        let filters = parse("min_price=5000&max_price=1000");
        assert_eq!(
            filters.price_range(),
            (Some(Decimal::from(1000)), Some(Decimal::from(5000)))
        );
        let query = filters.to_product_query(CategoryId::new(4), 12);
        assert_eq!(query.min_price, Some(Decimal::from(1000)));
        assert_eq!(query.category, Some(CategoryId::new(4)));
    }

    #[test]
    fn test_pagination_view_window() {
        let pagination = Pagination::from_total(5, 10, 200);
        let view = PaginationView::new(&pagination, |n| format!("/catalog/x?page={n}"));
        let numbers: Vec<u32> = view.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![3, 4, 5, 6, 7]);
        assert!(view.pages[2].current);
        assert_eq!(view.prev_url.as_deref(), Some("/catalog/x?page=4"));
        assert_eq!(view.next_url.as_deref(), Some("/catalog/x?page=6"));
    }

    #[test]
    fn test_pagination_view_single_page() {
        let view = PaginationView::new(&Pagination::from_total(1, 12, 3), |n| n.to_string());
        assert!(!view.is_visible());
        assert!(view.prev_url.is_none());
        assert!(view.next_url.is_none());
    }

    #[test]
    fn test_group_categories() {
        let categories: Vec<Category> = serde_json::from_value(serde_json::json!([
            {"id": 1, "name": "Посуда", "slug": "dishes", "parent": 0, "count": 10},
            {"id": 2, "name": "Кружки", "slug": "mugs", "parent": 1, "count": 4},
            {"id": 3, "name": "Текстиль", "slug": "textile", "parent": 0, "count": 6}
        ]))
        .unwrap();
        let groups = group_categories(&categories);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].children.len(), 1);
        assert_eq!(groups[0].children[0].slug, "mugs");
        assert!(groups[1].children.is_empty());
    }
}

//! Product listing queries.
//!
//! A [`ProductQuery`] is both the request description and the cache key for
//! product listings, so it derives `Hash` and `Eq`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use woo_storefront_core::{CategoryId, ProductId};

/// Largest page size the REST API accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Search relevance. Only meaningful together with a search term.
    Relevance,
    #[default]
    Popularity,
    PriceAsc,
    PriceDesc,
    Newest,
    Rating,
}

impl ProductSort {
    pub const ALL: [Self; 5] = [
        Self::Popularity,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::Newest,
        Self::Rating,
    ];

    /// Parse a query-string value, `None` for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "relevance" => Some(Self::Relevance),
            "popularity" => Some(Self::Popularity),
            "price_asc" => Some(Self::PriceAsc),
            "price_desc" => Some(Self::PriceDesc),
            "newest" => Some(Self::Newest),
            "rating" => Some(Self::Rating),
            _ => None,
        }
    }

    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Popularity => "popularity",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Newest => "newest",
            Self::Rating => "rating",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Relevance => "По релевантности",
            Self::Popularity => "По популярности",
            Self::PriceAsc => "Сначала дешевле",
            Self::PriceDesc => "Сначала дороже",
            Self::Newest => "Новинки",
            Self::Rating => "По рейтингу",
        }
    }

    /// `orderby` and `order` parameters for the REST API.
    #[must_use]
    pub const fn order_params(self) -> (&'static str, &'static str) {
        match self {
            Self::Relevance => ("relevance", "desc"),
            Self::Popularity => ("popularity", "desc"),
            Self::PriceAsc => ("price", "asc"),
            Self::PriceDesc => ("price", "desc"),
            Self::Newest => ("date", "desc"),
            Self::Rating => ("rating", "desc"),
        }
    }
}

/// Parameters for `GET wc/v3/products`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock_only: bool,
    pub featured: bool,
    pub sort: ProductSort,
    /// Restrict to these IDs (related products).
    pub include: Vec<ProductId>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 12,
            search: None,
            category: None,
            min_price: None,
            max_price: None,
            in_stock_only: false,
            featured: false,
            sort: ProductSort::default(),
            include: Vec::new(),
        }
    }
}

impl ProductQuery {
    /// Full-text search, ordered by relevance.
    #[must_use]
    pub fn search(term: &str, page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            search: Some(term.trim().to_string()),
            sort: ProductSort::Relevance,
            ..Self::default()
        }
    }

    /// Products in a category.
    #[must_use]
    pub fn category(id: CategoryId, page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            category: Some(id),
            ..Self::default()
        }
    }

    /// Featured products for the home page.
    #[must_use]
    pub fn featured(per_page: u32) -> Self {
        Self {
            per_page,
            featured: true,
            ..Self::default()
        }
    }

    /// Products with the given IDs.
    #[must_use]
    pub fn by_ids(ids: &[ProductId]) -> Self {
        Self {
            per_page: u32::try_from(ids.len()).unwrap_or(MAX_PER_PAGE),
            include: ids.to_vec(),
            ..Self::default()
        }
    }

    /// Query-string pairs for the REST API.
    ///
    /// Only published products are listed. `per_page` is clamped to the
    /// range the API accepts and `page` starts at 1.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("status", "publish".to_string()),
            ("page", self.page.max(1).to_string()),
            ("per_page", self.per_page.clamp(1, MAX_PER_PAGE).to_string()),
        ];

        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("search", term.to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", min.normalize().to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", max.normalize().to_string()));
        }
        if self.in_stock_only {
            pairs.push(("stock_status", "instock".to_string()));
        }
        if self.featured {
            pairs.push(("featured", "true".to_string()));
        }
        if !self.include.is_empty() {
            let ids = self
                .include
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("include", ids));
        }

        // Relevance ordering needs a search term; fall back to the default.
        let sort = if self.sort == ProductSort::Relevance && self.search.is_none() {
            ProductSort::default()
        } else {
            self.sort
        };
        let (orderby, order) = sort.order_params();
        pairs.push(("orderby", orderby.to_string()));
        pairs.push(("order", order.to_string()));

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(pairs: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_search_query_pairs() {
        let pairs = ProductQuery::search("  кружка ", 2, 12).to_query_pairs();
        assert_eq!(get(&pairs, "status"), Some("publish"));
        assert_eq!(get(&pairs, "search"), Some("кружка"));
        assert_eq!(get(&pairs, "page"), Some("2"));
        assert_eq!(get(&pairs, "orderby"), Some("relevance"));
        assert_eq!(get(&pairs, "category"), None);
    }

    #[test]
    fn test_category_filters() {
        let query = ProductQuery {
            min_price: Some(Decimal::new(50000, 2)),
            max_price: Some(Decimal::from(3000)),
            in_stock_only: true,
            sort: ProductSort::PriceAsc,
            ..ProductQuery::category(CategoryId::new(9), 1, 24)
        };
        let pairs = query.to_query_pairs();
        assert_eq!(get(&pairs, "category"), Some("9"));
        assert_eq!(get(&pairs, "min_price"), Some("500"));
        assert_eq!(get(&pairs, "max_price"), Some("3000"));
        assert_eq!(get(&pairs, "stock_status"), Some("instock"));
        assert_eq!(get(&pairs, "orderby"), Some("price"));
        assert_eq!(get(&pairs, "order"), Some("asc"));
    }

    #[test]
    fn test_per_page_clamped() {
        let query = ProductQuery {
            per_page: 500,
            page: 0,
            ..ProductQuery::default()
        };
        let pairs = query.to_query_pairs();
        assert_eq!(get(&pairs, "per_page"), Some("100"));
        assert_eq!(get(&pairs, "page"), Some("1"));

        let query = ProductQuery {
            per_page: 0,
            ..ProductQuery::default()
        };
        assert_eq!(get(&query.to_query_pairs(), "per_page"), Some("1"));
    }

    #[test]
    fn test_relevance_without_search_falls_back() {
        let query = ProductQuery {
            sort: ProductSort::Relevance,
            ..ProductQuery::default()
        };
        assert_eq!(get(&query.to_query_pairs(), "orderby"), Some("popularity"));
    }

    #[test]
    fn test_include_ids() {
        let query = ProductQuery::by_ids(&[ProductId::new(3), ProductId::new(7)]);
        let pairs = query.to_query_pairs();
        assert_eq!(get(&pairs, "include"), Some("3,7"));
        assert_eq!(get(&pairs, "per_page"), Some("2"));
    }

    #[test]
    fn test_sort_parse_roundtrip() {
        for sort in ProductSort::ALL {
            assert_eq!(ProductSort::parse(sort.as_str()), Some(sort));
        }
        assert_eq!(ProductSort::parse("cheapest"), None);
    }
}

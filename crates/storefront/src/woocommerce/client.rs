//! WooCommerce REST client implementation.
//!
//! Catalog reads are cached with `moka` (5-minute TTL). Order creation
//! always goes to the API.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use woo_storefront_core::{CategoryId, Pagination, ProductId};

use crate::config::WooCommerceConfig;

use super::WooError;
use super::cache::{CacheKey, CacheValue};
use super::query::{MAX_PER_PAGE, ProductQuery};
use super::types::{CatalogFacets, Category, NewOrder, Order, Product, ProductPage, Variation};

const TOTAL_HEADER: &str = "x-wp-total";
const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// Client for the WooCommerce REST API.
///
/// Cheap to clone; all clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct WooClient {
    inner: Arc<WooClientInner>,
}

struct WooClientInner {
    client: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: SecretString,
    cache: Cache<CacheKey, CacheValue>,
}

/// Decoded body plus the pagination headers WordPress sends with lists.
struct ApiResponse<T> {
    body: T,
    headers: HeaderMap,
}

impl<T> ApiResponse<T> {
    fn header_u64(&self, name: &str) -> Option<u64> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    }
}

impl WooClient {
    /// Create a new WooCommerce client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &WooCommerceConfig) -> Result<Self, WooError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("woo-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(WooClientInner {
                client,
                base_url: config.url.clone(),
                consumer_key: config.consumer_key.clone(),
                consumer_secret: SecretString::from(
                    config.consumer_secret.expose_secret().to_owned(),
                ),
                cache,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/wp-json/{path}", self.inner.base_url)
    }

    /// Send a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>, WooError> {
        let response = request
            .basic_auth(
                &self.inner.consumer_key,
                Some(self.inner.consumer_secret.expose_secret()),
            )
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(WooError::RateLimited(retry_after));
        }

        let headers = response.headers().clone();
        let response_text = response.text().await?;

        if !status.is_success() {
            if status != reqwest::StatusCode::NOT_FOUND {
                tracing::error!(
                    status = %status,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "WooCommerce API returned non-success status"
                );
            }
            return Err(WooError::from_response(status.as_u16(), &response_text));
        }

        let body = match serde_json::from_str(&response_text) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse WooCommerce response"
                );
                return Err(WooError::Parse(e));
            }
        };

        Ok(ApiResponse { body, headers })
    }

    async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<ApiResponse<T>, WooError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.inner.client.get(self.endpoint(path)).query(query);
        self.execute(request).await
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products matching a query.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(page = query.page, search = ?query.search))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, WooError> {
        let cache_key = CacheKey::Products(query.clone());

        if let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let response = self
            .get::<Vec<Product>, _>("wc/v3/products", &query.to_query_pairs())
            .await?;

        let per_page = query.per_page.clamp(1, MAX_PER_PAGE);
        let page = query.page.max(1);
        let pagination = match (
            response.header_u64(TOTAL_HEADER),
            response.header_u64(TOTAL_PAGES_HEADER),
        ) {
            (Some(total), Some(pages)) => Pagination::new(
                page,
                per_page,
                total,
                u32::try_from(pages).unwrap_or(u32::MAX),
            ),
            (Some(total), None) => Pagination::from_total(page, per_page, total),
            // Headers stripped by a proxy: assume a short page is the last one.
            _ => {
                let seen = u64::from(page - 1) * u64::from(per_page)
                    + response.body.len() as u64;
                let total = if response.body.len() as u64 >= u64::from(per_page) {
                    seen + 1
                } else {
                    seen
                };
                Pagination::from_total(page, per_page, total)
            }
        };

        let result = ProductPage {
            products: response.body,
            pagination,
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(result.clone()))
            .await;

        Ok(result)
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `WooError::NotFound` if no published product has this slug.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Product, WooError> {
        let cache_key = CacheKey::ProductBySlug(slug.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let response = self
            .get::<Vec<Product>, _>(
                "wc/v3/products",
                &[("slug", slug), ("status", "publish")],
            )
            .await?;

        let product = response
            .body
            .into_iter()
            .next()
            .ok_or_else(|| WooError::NotFound(format!("Product not found: {slug}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, WooError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let response = self
            .get::<Product, _>(&format!("wc/v3/products/{id}"), &[] as &[(&str, &str)])
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(response.body.clone())))
            .await;

        Ok(response.body)
    }

    /// List all variations of a variable product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn list_variations(&self, product_id: ProductId) -> Result<Vec<Variation>, WooError> {
        let cache_key = CacheKey::Variations(product_id);

        if let Some(CacheValue::Variations(variations)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for variations");
            return Ok(variations);
        }

        let response = self
            .get::<Vec<Variation>, _>(
                &format!("wc/v3/products/{product_id}/variations"),
                &[("per_page", MAX_PER_PAGE)],
            )
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Variations(response.body.clone()))
            .await;

        Ok(response.body)
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// List non-empty categories, ordered by menu order then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, WooError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let response = self
            .get::<Vec<Category>, _>(
                "wc/v3/products/categories",
                &[("per_page", "100"), ("hide_empty", "true")],
            )
            .await?;

        let mut categories = response.body;
        categories.sort_by(|a, b| {
            a.menu_order
                .cmp(&b.menu_order)
                .then_with(|| a.name.cmp(&b.name))
        });

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Find a category by slug.
    ///
    /// # Errors
    ///
    /// Returns `WooError::NotFound` if no category has this slug.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Category, WooError> {
        self.list_categories()
            .await?
            .into_iter()
            .find(|c| c.slug == slug)
            .ok_or_else(|| WooError::NotFound(format!("Category not found: {slug}")))
    }

    /// Filter options (price bounds, attribute terms) for a category.
    ///
    /// Served by the `ultra/v1/filters` endpoint of the companion plugin.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_catalog_filters(
        &self,
        category: Option<CategoryId>,
    ) -> Result<CatalogFacets, WooError> {
        let cache_key = CacheKey::Facets(category);

        if let Some(CacheValue::Facets(facets)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for facets");
            return Ok(facets);
        }

        let params: Vec<(&str, String)> = category
            .map(|id| vec![("category", id.to_string())])
            .unwrap_or_default();
        let response = self
            .get::<CatalogFacets, _>("ultra/v1/filters", &params)
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Facets(response.body.clone()))
            .await;

        Ok(response.body)
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns an error if WooCommerce rejects the order or the request fails.
    #[instrument(skip(self, order), fields(line_items = order.line_items.len()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, WooError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("wc/v3/orders"))
            .json(order);

        let response = self.execute::<Order>(request).await?;

        info!(
            order_id = %response.body.id,
            status = ?response.body.status,
            total = %response.body.total,
            "Order created"
        );

        Ok(response.body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> WooCommerceConfig {
        WooCommerceConfig {
            url: "https://shop.test".to_string(),
            consumer_key: "ck_0123456789abcdef".to_string(),
            consumer_secret: SecretString::from("cs_9f8e7d6c5b4a39281706"),
            timeout_secs: 15,
        }
    }

    #[test]
    fn test_endpoint() {
        let client = WooClient::new(&config()).unwrap();
        assert_eq!(
            client.endpoint("wc/v3/products"),
            "https://shop.test/wp-json/wc/v3/products"
        );
    }

    #[test]
    fn test_header_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(TOTAL_HEADER, " 42".parse().unwrap());
        headers.insert(TOTAL_PAGES_HEADER, "not-a-number".parse().unwrap());
        let response = ApiResponse { body: (), headers };
        assert_eq!(response.header_u64(TOTAL_HEADER), Some(42));
        assert_eq!(response.header_u64(TOTAL_PAGES_HEADER), None);
        assert_eq!(response.header_u64("x-missing"), None);
    }
}

//! Product route handlers and the product views shared by listings.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;
use woo_storefront_core::discount_percent;

use crate::config::CatalogConfig;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;
use crate::woocommerce::{Image, Product, ProductQuery, Variation};

/// Number of related products shown under a product.
const RELATED_LIMIT: usize = 4;

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

impl ImageView {
    fn new(image: &Image, fallback_alt: &str) -> Self {
        Self {
            url: image.src.clone(),
            alt: if image.alt.is_empty() {
                fallback_alt.to_string()
            } else {
                image.alt.clone()
            },
        }
    }
}

/// Product tile in grids (home, catalog, search).
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub image: Option<ImageView>,
    /// Current price, `None` when the product has no price.
    pub price: Option<String>,
    /// Crossed-out regular price while on sale.
    pub regular_price: Option<String>,
    pub discount_percent: Option<u32>,
    pub in_stock: bool,
    pub is_variable: bool,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, catalog: &CatalogConfig) -> Self {
        let current = product.current_price(catalog.currency);
        let regular = product.regular(catalog.currency);
        let on_sale = product.sale(catalog.currency).is_some();

        let (regular_price, discount) = match (&regular, &current) {
            (Some(regular), Some(current)) if on_sale => (
                Some(regular.format(catalog.locale)),
                discount_percent(regular, current),
            ),
            _ => (None, None),
        };

        Self {
            id: product.id.as_i64(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            image: product
                .featured_image()
                .map(|image| ImageView::new(image, &product.name)),
            price: current.map(|p| p.format(catalog.locale)),
            regular_price,
            discount_percent: discount,
            in_stock: product.stock_status.is_purchasable(),
            is_variable: product.is_variable(),
        }
    }
}

/// Map a product list to cards.
#[must_use]
pub fn cards(products: &[Product], catalog: &CatalogConfig) -> Vec<ProductCardView> {
    products
        .iter()
        .map(|p| ProductCardView::new(p, catalog))
        .collect()
}

/// Variation choice on the product page.
#[derive(Clone)]
pub struct VariationView {
    pub id: i64,
    pub label: String,
    pub price: Option<String>,
    pub in_stock: bool,
}

impl VariationView {
    fn new(variation: &Variation, catalog: &CatalogConfig) -> Self {
        Self {
            id: variation.id.as_i64(),
            label: variation.label(),
            price: variation
                .current_price(catalog.currency)
                .map(|p| p.format(catalog.locale)),
            in_stock: variation.stock_status.is_purchasable(),
        }
    }
}

/// Attribute row in the characteristics table.
#[derive(Clone)]
pub struct AttributeView {
    pub name: String,
    pub value: String,
}

/// Breadcrumb link to a category.
#[derive(Clone)]
pub struct CategoryLink {
    pub slug: String,
    pub name: String,
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub card: ProductCardView,
    /// HTML from the WooCommerce product editor.
    pub description: String,
    pub short_description: String,
    pub sku: String,
    pub stock_label: &'static str,
    pub images: Vec<ImageView>,
    pub attributes: Vec<AttributeView>,
    pub variations: Vec<VariationView>,
    pub category: Option<CategoryLink>,
}

impl ProductDetailView {
    fn new(product: &Product, variations: &[Variation], catalog: &CatalogConfig) -> Self {
        Self {
            card: ProductCardView::new(product, catalog),
            description: product.description.clone(),
            short_description: product.short_description.clone(),
            sku: product.sku.clone(),
            stock_label: product.stock_status.label(),
            images: product
                .images
                .iter()
                .map(|image| ImageView::new(image, &product.name))
                .collect(),
            attributes: product
                .attributes
                .iter()
                .filter(|a| a.visible && !a.variation)
                .map(|a| AttributeView {
                    name: a.name.clone(),
                    value: a.options.join(", "),
                })
                .collect(),
            variations: variations
                .iter()
                .map(|v| VariationView::new(v, catalog))
                .collect(),
            category: product
                .categories
                .first()
                .map(|c| CategoryLink {
                    slug: c.slug.clone(),
                    name: c.name.clone(),
                }),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
    pub related_products: Vec<ProductCardView>,
}

/// Display product detail page.
///
/// Variation and related-product lookups are best effort; the page still
/// renders when they fail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ProductShowTemplate> {
    let product = state.woo().get_product_by_slug(&slug).await?;
    let catalog = &state.config().catalog;

    let variations = if product.is_variable() {
        state
            .woo()
            .list_variations(product.id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to fetch variations for {slug}: {e}");
                Vec::new()
            })
    } else {
        Vec::new()
    };

    let related_ids: Vec<_> = product
        .related_ids
        .iter()
        .copied()
        .take(RELATED_LIMIT)
        .collect();
    let related_products = if related_ids.is_empty() {
        Vec::new()
    } else {
        state
            .woo()
            .list_products(&ProductQuery::by_ids(&related_ids))
            .await
            .map_or_else(
                |e| {
                    tracing::warn!("Failed to fetch related products for {slug}: {e}");
                    Vec::new()
                },
                |page| cards(&page.products, catalog),
            )
    };

    Ok(ProductShowTemplate {
        product: ProductDetailView::new(&product, &variations, catalog),
        related_products,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(json: serde_json::Value) -> Product {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_card_on_sale() {
        let product = product(serde_json::json!({
            "id": 1, "name": "Плед", "slug": "plaid",
            "price": "2990", "regular_price": "3990", "sale_price": "2990", "on_sale": true,
            "stock_status": "instock"
        }));
        let card = ProductCardView::new(&product, &CatalogConfig::default());
        assert_eq!(card.price.as_deref(), Some("2\u{a0}990\u{a0}₽"));
        assert_eq!(card.regular_price.as_deref(), Some("3\u{a0}990\u{a0}₽"));
        assert_eq!(card.discount_percent, Some(25));
        assert!(card.in_stock);
        assert!(card.image.is_none());
    }

    #[test]
    fn test_card_without_price_or_stock() {
        let product = product(serde_json::json!({
            "id": 2, "name": "Ваза", "slug": "vase", "price": "",
            "stock_status": "outofstock",
            "images": [{"id": 3, "src": "https://shop.test/vase.jpg", "alt": ""}]
        }));
        let card = ProductCardView::new(&product, &CatalogConfig::default());
        assert!(card.price.is_none());
        assert!(card.regular_price.is_none());
        assert!(!card.in_stock);
        assert_eq!(card.image.unwrap().alt, "Ваза");
    }

    #[test]
    fn test_detail_hides_variation_attributes() {
        let product = product(serde_json::json!({
            "id": 3, "name": "Кружка", "slug": "mug", "type": "variable", "price": "790",
            "attributes": [
                {"name": "Цвет", "visible": true, "variation": true, "options": ["Белый", "Синий"]},
                {"name": "Материал", "visible": true, "variation": false, "options": ["Керамика"]}
            ]
        }));
        let detail = ProductDetailView::new(&product, &[], &CatalogConfig::default());
        assert_eq!(detail.attributes.len(), 1);
        assert_eq!(detail.attributes[0].value, "Керамика");
        assert!(detail.card.is_variable);
    }
}

//! Wire types for the WooCommerce REST API.
//!
//! Field names follow the `wc/v3` JSON. Everything optional on the server
//! side is `#[serde(default)]` here so partial responses (e.g. `_fields`
//! filtered lists) still decode.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use woo_storefront_core::{
    CategoryId, CurrencyCode, ImageId, OrderId, OrderStatus, Pagination, Price, ProductId,
    StockStatus, VariationId,
};

// =============================================================================
// Catalog Types
// =============================================================================

/// Product or category image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub src: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alt: String,
}

/// Category reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Simple,
    Variable,
    Grouped,
    External,
    #[serde(other)]
    Other,
}

/// Product attribute with its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    /// Global attribute ID, 0 for custom attributes.
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub visible: bool,
    /// Whether the attribute is used to build variations.
    #[serde(default)]
    pub variation: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

/// A product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type", default)]
    pub kind: ProductType,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub sku: String,
    /// Current price (sale price when on sale).
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub regular_price: String,
    /// Empty when the product is not on sale.
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub average_rating: String,
    #[serde(default)]
    pub rating_count: i64,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    #[serde(default)]
    pub variations: Vec<VariationId>,
    #[serde(default)]
    pub related_ids: Vec<ProductId>,
}

impl Product {
    /// Current price, if the product has one.
    #[must_use]
    pub fn current_price(&self, currency: CurrencyCode) -> Option<Price> {
        Price::parse(&self.price, currency)
    }

    /// Regular price, if set.
    #[must_use]
    pub fn regular(&self, currency: CurrencyCode) -> Option<Price> {
        Price::parse(&self.regular_price, currency)
    }

    /// Sale price, only while the product is on sale.
    #[must_use]
    pub fn sale(&self, currency: CurrencyCode) -> Option<Price> {
        if self.on_sale {
            Price::parse(&self.sale_price, currency)
        } else {
            None
        }
    }

    /// First image, used as thumbnail.
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images.first()
    }

    #[must_use]
    pub fn is_variable(&self) -> bool {
        self.kind == ProductType::Variable
    }
}

/// Attribute value chosen by a variation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationAttribute {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub option: String,
}

/// A product variation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub id: VariationId,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub regular_price: String,
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub attributes: Vec<VariationAttribute>,
}

impl Variation {
    #[must_use]
    pub fn current_price(&self, currency: CurrencyCode) -> Option<Price> {
        Price::parse(&self.price, currency)
    }

    /// Human-readable label, e.g. "Красный / XL".
    #[must_use]
    pub fn label(&self) -> String {
        self.attributes
            .iter()
            .map(|a| a.option.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    /// Parent category ID, 0 for top-level categories.
    #[serde(default)]
    pub parent: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub menu_order: i32,
    /// Number of published products.
    #[serde(default)]
    pub count: u32,
}

impl Category {
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent == 0
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

// =============================================================================
// Facets (`ultra/v1/filters`)
// =============================================================================

/// Price bounds over the filtered product set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min: Decimal,
    pub max: Decimal,
}

/// A selectable attribute term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetTerm {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

/// An attribute and its terms, e.g. `pa_color`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetAttribute {
    /// Taxonomy slug (`pa_color`).
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub terms: Vec<FacetTerm>,
}

/// Filter options for a category listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CatalogFacets {
    #[serde(default)]
    pub price: Option<PriceBounds>,
    #[serde(default)]
    pub attributes: Vec<FacetAttribute>,
}

// =============================================================================
// Order Types
// =============================================================================

/// Billing address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Billing {
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

/// Shipping address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shipping {
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
    pub phone: String,
}

/// Key/value metadata on orders and line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData {
    pub key: String,
    pub value: String,
}

impl MetaData {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Line item in an order creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<VariationId>,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta_data: Vec<MetaData>,
}

/// Shipping line in an order creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingLine {
    pub method_id: String,
    pub method_title: String,
    /// Decimal string, e.g. `"0"`.
    pub total: String,
}

/// Order creation request body (`POST wc/v3/orders`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub payment_method: String,
    pub payment_method_title: String,
    pub set_paid: bool,
    pub billing: Billing,
    pub shipping: Shipping,
    pub line_items: Vec<NewLineItem>,
    #[serde(default)]
    pub shipping_lines: Vec<ShippingLine>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub customer_note: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta_data: Vec<MetaData>,
}

/// Line item in an order response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub name: String,
    pub product_id: ProductId,
    /// 0 when the line is not a variation.
    #[serde(default)]
    pub variation_id: i64,
    pub quantity: u32,
    #[serde(default)]
    pub total: String,
}

/// An order as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub order_key: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub payment_method_title: String,
    #[serde(default)]
    pub billing: Billing,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

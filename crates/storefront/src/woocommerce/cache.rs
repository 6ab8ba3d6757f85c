//! Cache types for catalog responses.

use woo_storefront_core::{CategoryId, ProductId};

use super::query::ProductQuery;
use super::types::{CatalogFacets, Category, Product, ProductPage, Variation};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    ProductBySlug(String),
    Products(ProductQuery),
    Variations(ProductId),
    Categories,
    Facets(Option<CategoryId>),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
    Variations(Vec<Variation>),
    Categories(Vec<Category>),
    Facets(CatalogFacets),
}

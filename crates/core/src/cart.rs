//! Shopping cart state and reducer.
//!
//! The cart is a plain value: every mutation goes through [`Cart::apply`]
//! with a [`CartAction`], and the storefront persists the resulting value
//! after each call. Lines are identified by a [`CartItemKey`] derived from
//! the product and, for variable products, the chosen variation.
//!
//! Totals are recomputed by a linear scan instead of being cached, so they
//! can never drift from the lines.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, Price, ProductId, VariationId};

/// Upper bound on the quantity of a single cart line.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Identifier that deduplicates cart lines.
///
/// - `"{product_id}"` for simple products
/// - `"{product_id}-{variation_id}"` when the variation ID is known
/// - `"{product_id}-{variation_slug}"` when only the variation slug is known
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemKey(String);

impl CartItemKey {
    /// Derive the key for a product and optional variation.
    ///
    /// The variation ID takes precedence over the slug when both are given.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        variation_id: Option<VariationId>,
        variation_slug: Option<&str>,
    ) -> Self {
        match (variation_id, variation_slug.filter(|s| !s.is_empty())) {
            (Some(variation), _) => Self(format!("{product_id}-{variation}")),
            (None, Some(slug)) => Self(format!("{product_id}-{slug}")),
            (None, None) => Self(product_id.to_string()),
        }
    }

    /// The key as submitted by cart forms.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CartItemKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CartItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub variation_id: Option<VariationId>,
    /// Slug of the chosen attribute option, for variations without an ID.
    pub variation_slug: Option<String>,
    pub name: String,
    /// Product slug, used to link back to the product page.
    pub slug: String,
    pub quantity: u32,
    /// Unit price at the time the line was last added.
    pub price: Price,
    /// Thumbnail URL.
    pub image: Option<String>,
}

impl CartItem {
    /// The key this line is stored under.
    #[must_use]
    pub fn key(&self) -> CartItemKey {
        CartItemKey::new(
            self.product_id,
            self.variation_id,
            self.variation_slug.as_deref(),
        )
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add a line, merging with an existing line of the same key.
    Add(CartItem),
    /// Remove a line. Unknown keys are ignored.
    Remove(CartItemKey),
    /// Set a line's quantity; zero removes the line. Unknown keys are ignored.
    UpdateQuantity { key: CartItemKey, quantity: u32 },
    /// Remove every line.
    Clear,
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    #[serde(default)]
    currency_code: CurrencyCode,
}

impl Cart {
    /// An empty cart priced in the given currency.
    #[must_use]
    pub const fn new(currency_code: CurrencyCode) -> Self {
        Self {
            items: Vec::new(),
            currency_code,
        }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by key.
    #[must_use]
    pub fn get(&self, key: &CartItemKey) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.key() == key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }

    /// Apply a mutation in place.
    pub fn apply(&mut self, action: CartAction) {
        match action {
            CartAction::Add(item) => self.add(item),
            CartAction::Remove(key) => self.items.retain(|item| item.key() != key),
            CartAction::UpdateQuantity { key, quantity } => {
                if quantity == 0 {
                    self.items.retain(|item| item.key() != key);
                } else if let Some(line) = self.items.iter_mut().find(|item| item.key() == key) {
                    line.quantity = quantity.min(MAX_LINE_QUANTITY);
                }
            }
            CartAction::Clear => self.items.clear(),
        }
    }

    /// Apply a mutation and return the resulting cart.
    #[must_use]
    pub fn reduce(mut self, action: CartAction) -> Self {
        self.apply(action);
        self
    }

    fn add(&mut self, item: CartItem) {
        if item.quantity == 0 {
            return;
        }
        let key = item.key();
        if let Some(line) = self.items.iter_mut().find(|line| line.key() == key) {
            line.quantity = line
                .quantity
                .saturating_add(item.quantity)
                .min(MAX_LINE_QUANTITY);
            line.price = item.price;
            line.name = item.name;
            line.image = item.image;
        } else {
            self.items.push(CartItem {
                quantity: item.quantity.min(MAX_LINE_QUANTITY),
                ..item
            });
        }
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items
            .iter()
            .fold(Price::zero(self.currency_code), |total, item| {
                total + item.line_total()
            })
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

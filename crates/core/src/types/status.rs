//! Status enums for WooCommerce entities.

use serde::{Deserialize, Serialize};

/// Product or variation stock status.
///
/// Maps to WooCommerce's `stock_status` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    OnBackorder,
}

impl StockStatus {
    /// Whether the item can be added to the cart.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        matches!(self, Self::InStock | Self::OnBackorder)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InStock => "В наличии",
            Self::OutOfStock => "Нет в наличии",
            Self::OnBackorder => "Под заказ",
        }
    }
}

/// Order status.
///
/// Maps to WooCommerce's order `status` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    CheckoutDraft,
}

impl OrderStatus {
    /// Whether payment has been received for the order.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Processing | Self::Completed)
    }
}

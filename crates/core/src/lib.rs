//! Woo Storefront Core - Shared types and pure storefront logic.
//!
//! This crate provides the domain layer used by the other Woo Storefront
//! components:
//! - `storefront` - Server-rendered shop on top of the WooCommerce REST API
//! - `cli` - Operational commands (session store migration, credential check)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. The cart reducer and the checkout state
//! machine live here so they can be tested without a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, statuses, email, and input masks
//! - [`cart`] - Cart items keyed by product/variation and the cart reducer
//! - [`checkout`] - Three-step checkout state machine with step gating

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod types;

pub use cart::{Cart, CartAction, CartItem, CartItemKey};
pub use checkout::{Checkout, CheckoutError, CheckoutStep};
pub use types::*;

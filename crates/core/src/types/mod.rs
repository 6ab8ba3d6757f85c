//! Core types for Woo Storefront.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the input masks used by the checkout forms.

pub mod date;
pub mod email;
pub mod id;
pub mod pagination;
pub mod phone;
pub mod price;
pub mod status;

pub use date::{DateInputError, format_date, format_date_input, parse_date_input};
pub use email::{Email, EmailError};
pub use id::*;
pub use pagination::Pagination;
pub use phone::{PhoneError, PhoneNumber, format_phone};
pub use price::{CurrencyCode, Locale, Price, discount_percent};
pub use status::*;

//! Type-safe price representation using decimal arithmetic.
//!
//! WooCommerce transmits prices as decimal strings (`"1990"`, `"1990.50"`,
//! or `""` when a product has no sale price). [`Price::parse`] turns those
//! into exact decimals, and [`Price::format`] renders them the same way for a
//! given locale and currency every time.

use core::fmt;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Non-breaking space used by the Russian number format.
const NBSP: char = '\u{a0}';

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (roubles, dollars, not kopecks).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero price in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Parse a WooCommerce price string.
    ///
    /// Returns `None` for empty strings (WooCommerce's "no price") and for
    /// values that are not decimal numbers.
    #[must_use]
    pub fn parse(raw: &str, currency_code: CurrencyCode) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        raw.parse::<Decimal>()
            .ok()
            .map(|amount| Self::new(amount, currency_code))
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Format for display in the given locale.
    ///
    /// The amount is rounded to two decimal places (midpoint away from zero)
    /// and the fraction is dropped when it is zero.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use woo_storefront_core::{CurrencyCode, Locale, Price};
    ///
    /// let price = Price::new(Decimal::new(199_050, 2), CurrencyCode::RUB);
    /// assert_eq!(price.format(Locale::Ru), "1\u{a0}990,50\u{a0}₽");
    ///
    /// let price = Price::new(Decimal::from(1990), CurrencyCode::USD);
    /// assert_eq!(price.format(Locale::En), "$1,990");
    /// ```
    #[must_use]
    pub fn format(&self, locale: Locale) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let abs = rounded.abs();
        let whole = abs.trunc().to_u128().unwrap_or_default();
        let cents = (abs.fract() * Decimal::ONE_HUNDRED)
            .to_u32()
            .unwrap_or_default();

        let (group_sep, decimal_sep) = match locale {
            Locale::Ru => (NBSP, ','),
            Locale::En => (',', '.'),
        };

        let mut number = group_digits(whole, group_sep);
        if cents != 0 {
            number.push(decimal_sep);
            number.push_str(&format!("{cents:02}"));
        }

        let sign = if negative { "-" } else { "" };
        let symbol = self.currency_code.symbol();
        match locale {
            Locale::Ru => format!("{sign}{number}{NBSP}{symbol}"),
            Locale::En => format!("{sign}{symbol}{number}"),
        }
    }
}

impl Add for Price {
    type Output = Self;

    /// Adds amounts, keeping the left-hand currency.
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.amount + rhs.amount, self.currency_code)
    }
}

/// Insert a separator every three digits from the right.
fn group_digits(value: u128, separator: char) -> String {
    let digits = value.to_string();
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Whole-percent discount of `sale` relative to `regular`.
///
/// Returns `None` unless the sale price is strictly lower than a positive
/// regular price.
#[must_use]
pub fn discount_percent(regular: &Price, sale: &Price) -> Option<u32> {
    if regular.amount <= Decimal::ZERO || sale.amount >= regular.amount {
        return None;
    }
    let percent = (regular.amount - sale.amount) / regular.amount * Decimal::ONE_HUNDRED;
    percent
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

/// ISO 4217 currency codes accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    RUB,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::RUB => "₽",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }

    /// ISO code as sent by WooCommerce.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::RUB => "RUB",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned for currency or locale strings the store does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported {kind}: {value}")]
pub struct UnsupportedValue {
    kind: &'static str,
    value: String,
}

impl FromStr for CurrencyCode {
    type Err = UnsupportedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RUB" | "RUR" => Ok(Self::RUB),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            _ => Err(UnsupportedValue {
                kind: "currency",
                value: s.to_string(),
            }),
        }
    }
}

/// Number formatting locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locale {
    /// `1 990,50 ₽`
    #[default]
    Ru,
    /// `$1,990.50`
    En,
}

impl FromStr for Locale {
    type Err = UnsupportedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.split(['-', '_']).next().unwrap_or_default() {
            "ru" => Ok(Self::Ru),
            "en" => Ok(Self::En),
            _ => Err(UnsupportedValue {
                kind: "locale",
                value: s.to_string(),
            }),
        }
    }
}

//! Russian phone number input mask.
//!
//! The checkout form accepts whatever the visitor types and renders it as
//! `+7 (XXX) XXX-XX-XX` while typing. [`format_phone`] applies the mask to
//! partial input and [`PhoneNumber::parse`] accepts only complete numbers.
//!
//! A leading `7` or `8` is always read as the country code, so both
//! `8 999 123-45-67` and `+7 999 123 45 67` produce the same number.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Number of digits after the country code.
pub const NATIONAL_DIGITS: usize = 10;

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// No digits were entered.
    #[error("phone number cannot be empty")]
    Empty,
    /// Fewer than ten national digits.
    #[error("phone number is incomplete ({digits} of {NATIONAL_DIGITS} digits)")]
    Incomplete {
        /// National digits entered so far.
        digits: usize,
    },
    /// More than ten national digits.
    #[error("phone number has too many digits")]
    TooLong,
}

/// Extract the national digits, dropping a leading `7`/`8` country code.
fn national_digits(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    match digits.strip_prefix(['7', '8']) {
        Some(rest) => rest.to_string(),
        None => digits,
    }
}

/// Apply the `+7 (XXX) XXX-XX-XX` mask to partial or complete input.
///
/// Non-digit characters are ignored and extra digits are dropped. Input
/// without any digits yields an empty string.
///
/// ```
/// use woo_storefront_core::format_phone;
///
/// assert_eq!(format_phone("8999"), "+7 (999");
/// assert_eq!(format_phone("89991234567"), "+7 (999) 123-45-67");
/// assert_eq!(format_phone(""), "");
/// ```
#[must_use]
pub fn format_phone(input: &str) -> String {
    if !input.chars().any(|c| c.is_ascii_digit()) {
        return String::new();
    }

    let national: Vec<char> = national_digits(input)
        .chars()
        .take(NATIONAL_DIGITS)
        .collect();

    let mut out = String::from("+7");
    for (i, c) in national.iter().enumerate() {
        match i {
            0 => out.push_str(" ("),
            3 => out.push_str(") "),
            6 | 8 => out.push('-'),
            _ => {}
        }
        out.push(*c);
    }
    out
}

/// A complete Russian phone number, stored in E.164 form (`+7XXXXXXXXXX`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a phone number from masked or raw input.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] when the input does not contain exactly ten
    /// national digits.
    pub fn parse(input: &str) -> Result<Self, PhoneError> {
        if !input.chars().any(|c| c.is_ascii_digit()) {
            return Err(PhoneError::Empty);
        }
        let national = national_digits(input);
        match national.len() {
            NATIONAL_DIGITS => Ok(Self(format!("+7{national}"))),
            n if n < NATIONAL_DIGITS => Err(PhoneError::Incomplete { digits: n }),
            _ => Err(PhoneError::TooLong),
        }
    }

    /// E.164 representation, e.g. `+79991234567`.
    #[must_use]
    pub fn e164(&self) -> &str {
        &self.0
    }

    /// Masked representation, e.g. `+7 (999) 123-45-67`.
    #[must_use]
    pub fn masked(&self) -> String {
        format_phone(&self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

//! `DD.MM.YYYY` date input mask for the delivery step.

use chrono::NaiveDate;

/// Digits in a complete `DDMMYYYY` date.
const DATE_DIGITS: usize = 8;

/// Errors that can occur when parsing a masked date.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DateInputError {
    /// Fewer than eight digits were entered.
    #[error("date is incomplete")]
    Incomplete,
    /// The digits do not form a calendar date.
    #[error("date does not exist")]
    InvalidDate,
}

/// Apply the `DD.MM.YYYY` mask to partial or complete input.
///
/// ```
/// use woo_storefront_core::format_date_input;
///
/// assert_eq!(format_date_input("0"), "0");
/// assert_eq!(format_date_input("050"), "05.0");
/// assert_eq!(format_date_input("05/03/2026"), "05.03.2026");
/// ```
#[must_use]
pub fn format_date_input(input: &str) -> String {
    let mut out = String::with_capacity(DATE_DIGITS + 2);
    for (i, c) in input
        .chars()
        .filter(char::is_ascii_digit)
        .take(DATE_DIGITS)
        .enumerate()
    {
        if i == 2 || i == 4 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Parse masked or raw date input into a calendar date.
///
/// # Errors
///
/// Returns [`DateInputError::Incomplete`] unless exactly eight digits are
/// present, and [`DateInputError::InvalidDate`] for dates like `31.02.2026`.
pub fn parse_date_input(input: &str) -> Result<NaiveDate, DateInputError> {
    let digits: Vec<u32> = input.chars().filter_map(|c| c.to_digit(10)).collect();
    let &[d1, d2, m1, m2, y1, y2, y3, y4] = digits.as_slice() else {
        return Err(DateInputError::Incomplete);
    };

    let day = d1 * 10 + d2;
    let month = m1 * 10 + m2;
    let year = y1 * 1000 + y2 * 100 + y3 * 10 + y4;
    let year = i32::try_from(year).map_err(|_| DateInputError::InvalidDate)?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(DateInputError::InvalidDate)
}

/// Render a date in the mask's format.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

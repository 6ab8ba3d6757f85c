//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Russian plural form for a count, e.g. 1 товар, 3 товара, 5 товаров.
#[must_use]
pub fn plural_ru<'a>(n: u64, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    match (n % 10, n % 100) {
        (1, m) if m != 11 => one,
        (2..=4, m) if !(12..=14).contains(&m) => few,
        _ => many,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_ru() {
        let form = |n| plural_ru(n, "товар", "товара", "товаров");
        assert_eq!(form(1), "товар");
        assert_eq!(form(21), "товар");
        assert_eq!(form(3), "товара");
        assert_eq!(form(24), "товара");
        assert_eq!(form(5), "товаров");
        assert_eq!(form(11), "товаров");
        assert_eq!(form(13), "товаров");
        assert_eq!(form(0), "товаров");
    }
}

//! Lenient deserializers for HTML form and query-string values.
//!
//! Browsers submit empty inputs as empty strings; these helpers treat them
//! as absent instead of failing the whole request.

use std::fmt::Display;
use std::str::FromStr;

use axum::http::HeaderMap;
use serde::{Deserialize, Deserializer};

/// Deserialize empty strings as `None`, parse everything else.
///
/// # Errors
///
/// Fails when a non-empty value does not parse as `T`.
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Checkbox values: present and not `0`/`false`/`off` means checked.
///
/// # Errors
///
/// Fails only if the value is not a string.
pub fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.is_some_and(|v| !matches!(v.trim(), "" | "0" | "false" | "off")))
}

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .is_some_and(|v| v.as_bytes() == b"true")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Example {
        #[serde(default, deserialize_with = "empty_string_as_none")]
        id: Option<i64>,
        #[serde(default, deserialize_with = "checkbox")]
        flag: bool,
    }

    #[test]
    fn test_empty_values() {
        let example: Example = serde_urlencoded::from_str("id=&flag=").unwrap();
        assert_eq!(example.id, None);
        assert!(!example.flag);

        let example: Example = serde_urlencoded::from_str("").unwrap();
        assert_eq!(example.id, None);
        assert!(!example.flag);
    }

    #[test]
    fn test_present_values() {
        let example: Example = serde_urlencoded::from_str("id=+42+&flag=on").unwrap();
        assert_eq!(example.id, Some(42));
        assert!(example.flag);
    }

    #[test]
    fn test_invalid_number_fails() {
        assert!(serde_urlencoded::from_str::<Example>("id=x").is_err());
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", "true".parse().unwrap());
        assert!(is_htmx(&headers));
    }
}

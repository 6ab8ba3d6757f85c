//! DaData address suggestions.
//!
//! Backs the address autocomplete on the delivery step. The API key stays on
//! the server; the browser only talks to `/api/address/suggest`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::DadataConfig;

const SUGGEST_URL: &str = "https://suggestions.dadata.ru/suggestions/api/4_1/rs/suggest/address";

/// Queries shorter than this return no suggestions.
pub const MIN_QUERY_CHARS: usize = 3;

/// Upper bound on suggestions per request accepted by the API.
pub const MAX_SUGGESTIONS: u8 = 20;

/// Errors from the DaData API.
#[derive(Debug, Error)]
pub enum DadataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("DaData returned status {status}: {message}")]
    Api { status: u16, message: String },
}

/// A suggested address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressSuggestion {
    /// Full address line, e.g. "г Москва, ул Тверская, д 1".
    pub value: String,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house: Option<String>,
    pub flat: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Serialize)]
struct SuggestRequest<'a> {
    query: &'a str,
    count: u8,
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    suggestions: Vec<RawSuggestion>,
}

#[derive(Debug, Deserialize)]
struct RawSuggestion {
    value: String,
    #[serde(default)]
    data: RawAddress,
}

#[derive(Debug, Default, Deserialize)]
struct RawAddress {
    postal_code: Option<String>,
    city: Option<String>,
    /// Settlement name for addresses outside cities.
    settlement: Option<String>,
    street: Option<String>,
    house: Option<String>,
    flat: Option<String>,
    geo_lat: Option<String>,
    geo_lon: Option<String>,
}

impl From<RawSuggestion> for AddressSuggestion {
    fn from(raw: RawSuggestion) -> Self {
        let data = raw.data;
        Self {
            value: raw.value,
            postal_code: data.postal_code,
            city: data.city.or(data.settlement),
            street: data.street,
            house: data.house,
            flat: data.flat,
            lat: data.geo_lat,
            lon: data.geo_lon,
        }
    }
}

/// Client for the DaData suggestions API.
#[derive(Clone)]
pub struct DadataClient {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
}

impl DadataClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &DadataConfig) -> Result<Self, DadataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            api_key: SecretString::from(config.api_key.expose_secret().to_owned()),
            endpoint: SUGGEST_URL.to_string(),
        })
    }

    /// Suggest addresses for a partial input.
    ///
    /// Returns an empty list without calling the API when the query is
    /// shorter than [`MIN_QUERY_CHARS`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or DaData rejects it.
    #[instrument(skip(self))]
    pub async fn suggest_address(
        &self,
        query: &str,
        count: u8,
    ) -> Result<Vec<AddressSuggestion>, DadataError> {
        let query = query.trim();
        if !is_searchable(query) {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header(
                "Authorization",
                format!("Token {}", self.api_key.expose_secret()),
            )
            .header("Accept", "application/json")
            .json(&SuggestRequest {
                query,
                count: count.clamp(1, MAX_SUGGESTIONS),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "DaData returned non-success status"
            );
            return Err(DadataError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body: SuggestResponse = response.json().await?;
        debug!(count = body.suggestions.len(), "DaData suggestions");

        Ok(body
            .suggestions
            .into_iter()
            .map(AddressSuggestion::from)
            .collect())
    }
}

/// Whether a query is long enough to send.
#[must_use]
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_searchable_counts_chars() {
        assert!(!is_searchable(""));
        assert!(!is_searchable("  мо "));
        assert!(is_searchable("мос"));
        assert!(is_searchable("Тверская 1"));
    }

    #[test]
    fn test_parse_suggestions() {
        let body = r#"{"suggestions": [
            {"value": "г Москва, ул Тверская, д 1", "unrestricted_value": "125009, г Москва, ул Тверская, д 1",
             "data": {"postal_code": "125009", "city": "Москва", "street": "Тверская", "house": "1",
                      "flat": null, "geo_lat": "55.757", "geo_lon": "37.614"}},
            {"value": "Московская обл, поселок Развилка",
             "data": {"city": null, "settlement": "Развилка"}}
        ]}"#;
        let response: SuggestResponse = serde_json::from_str(body).unwrap();
        let suggestions: Vec<AddressSuggestion> = response
            .suggestions
            .into_iter()
            .map(AddressSuggestion::from)
            .collect();

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].postal_code.as_deref(), Some("125009"));
        assert_eq!(suggestions[0].house.as_deref(), Some("1"));
        assert_eq!(suggestions[0].flat, None);
        assert_eq!(suggestions[0].lat.as_deref(), Some("55.757"));
        assert_eq!(suggestions[1].city.as_deref(), Some("Развилка"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(SuggestRequest {
            query: "Тверская",
            count: 5,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"query": "Тверская", "count": 5}));
    }

    #[tokio::test]
    async fn test_short_query_skips_request() {
        let client = DadataClient {
            client: reqwest::Client::new(),
            api_key: SecretString::from("test-key".to_string()),
            // Unroutable; a request would fail.
            endpoint: "http://127.0.0.1:9/".to_string(),
        };
        let suggestions = client.suggest_address(" ул", 5).await.unwrap();
        assert!(suggestions.is_empty());
    }
}

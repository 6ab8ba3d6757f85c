//! Address autocomplete endpoint backed by DaData.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::dadata::{AddressSuggestion, is_searchable};
use crate::error::ApiError;
use crate::state::AppState;

/// Suggestions returned per request.
const SUGGESTION_COUNT: u8 = 5;

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// Suggest addresses for a partial input.
///
/// Returns an empty list when autocomplete is not configured or the query
/// is too short.
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<Vec<AddressSuggestion>>, ApiError> {
    let Some(dadata) = state.dadata() else {
        return Ok(Json(Vec::new()));
    };
    if !is_searchable(&query.q) {
        return Ok(Json(Vec::new()));
    }

    let suggestions = dadata.suggest_address(&query.q, SUGGESTION_COUNT).await?;
    Ok(Json(suggestions))
}

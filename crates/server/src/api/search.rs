//! Title search over both movie tables.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use movono_core::{MovieSummary, MovieTable, StoreError};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<MovieSummary>,
    pub total: usize,
}

/// GET /api/v1/search?q=matrix&limit=20
///
/// Queries both tables at once. Rows present in both are reported once, from
/// `movies_mini`.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.q.unwrap_or_default().trim().to_string();
    if query.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Search query is required",
            "Pass the title to search for as ?q=",
        ));
    }
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let store = state.store();
    let (mini, full) = futures::join!(
        store.search(MovieTable::Mini, &query, limit),
        store.search(MovieTable::Full, &query, limit),
    );

    let search_failed =
        |e: StoreError| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Search failed", e);
    let mini = mini.map_err(search_failed)?;
    let full = full.map_err(search_failed)?;

    let mut seen: HashSet<String> = HashSet::new();
    let results: Vec<MovieSummary> = mini
        .into_iter()
        .chain(full)
        .filter(|hit| seen.insert(hit.imdb_id.clone()))
        .take(limit as usize)
        .collect();

    Ok(Json(SearchResponse {
        query,
        total: results.len(),
        results,
    }))
}

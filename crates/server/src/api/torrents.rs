//! Torrent lookup handler.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use movono_core::yts::TorrentLookupResult;
use movono_core::YtsError;

use super::handlers::{api_error, ApiError};
use crate::metrics::TORRENT_CACHE_LOOKUPS;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TorrentQuery {
    pub id: Option<String>,
}

/// GET /api/v1/torrents?id=tt0133093
///
/// Never fails because the index is down: an unreachable index yields an
/// empty torrent list.
pub async fn get_torrents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TorrentQuery>,
) -> Result<Json<TorrentLookupResult>, ApiError> {
    let id = query.id.unwrap_or_default();

    match state.torrents().lookup(&id).await {
        Ok(result) => {
            let outcome = if result.cached { "hit" } else { "miss" };
            TORRENT_CACHE_LOOKUPS.with_label_values(&[outcome]).inc();
            Ok(Json(result))
        }
        Err(e @ YtsError::MissingId) => Err(api_error(
            StatusCode::BAD_REQUEST,
            "Movie id is required",
            e,
        )),
        Err(e) => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch torrents",
            e,
        )),
    }
}

//! Sync trigger handler.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use movono_core::{Caller, CombinedSyncResult, SyncCounts, SyncError, SyncType, Torrent};

use super::handlers::{api_error, ApiError};
use crate::metrics::record_sync_counts;
use crate::state::AppState;

/// Request body for POST /api/v1/sync
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Defaults to a combined run.
    pub sync_type: Option<SyncType>,
    pub imdb_id: Option<String>,
    /// Older clients send the id under this name.
    pub movie_id: Option<String>,
    pub torrents: Option<Vec<Torrent>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SyncResults {
    Combined(CombinedSyncResult),
    Single(SyncCounts),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub sync_type: SyncType,
    pub results: SyncResults,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TorrentUpdateResponse {
    pub success: bool,
    pub imdb_id: String,
    pub torrent_count: usize,
}

/// POST /api/v1/sync
///
/// Runs the requested sync and answers once it finishes. `update_torrents`
/// replaces a single row's torrent list instead of running a batch.
pub async fn trigger_sync(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    body: Result<Json<SyncRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|e| {
        api_error(StatusCode::BAD_REQUEST, "Invalid sync request", e.body_text())
    })?;
    let sync_type = body.sync_type.unwrap_or(SyncType::All);
    info!("Sync '{}' triggered by {}", sync_type, caller.name);

    let orchestrator = state.sync();
    let single = |counts: SyncCounts| SyncResponse {
        success: true,
        sync_type,
        results: SyncResults::Single(counts),
        timestamp: Utc::now(),
    };

    let response = match sync_type {
        SyncType::All => {
            let result = orchestrator.run_all().await;
            record_sync_counts("upcoming", &result.upcoming);
            record_sync_counts("latest", &result.latest);
            SyncResponse {
                success: true,
                sync_type,
                timestamp: result.timestamp,
                results: SyncResults::Combined(result),
            }
        }
        SyncType::Upcoming => {
            let counts = orchestrator.sync_upcoming().await;
            record_sync_counts("upcoming", &counts);
            single(counts)
        }
        SyncType::Latest => {
            let counts = orchestrator.sync_latest().await;
            record_sync_counts("latest", &counts);
            single(counts)
        }
        SyncType::Popular => single(orchestrator.sync_popular().await),
        SyncType::UpdateTorrents => {
            let imdb_id = body.imdb_id.or(body.movie_id).unwrap_or_default();
            let torrents = body.torrents.unwrap_or_default();
            let torrent_count = orchestrator
                .update_torrents(&imdb_id, &torrents)
                .await
                .map_err(sync_error)?;

            return Ok(Json(TorrentUpdateResponse {
                success: true,
                imdb_id: imdb_id.trim().to_string(),
                torrent_count,
            })
            .into_response());
        }
    };

    Ok(Json(response).into_response())
}

fn sync_error(e: SyncError) -> ApiError {
    match e {
        SyncError::InvalidRequest(msg) => {
            api_error(StatusCode::BAD_REQUEST, "Invalid sync request", msg)
        }
        SyncError::NotFound(id) => api_error(
            StatusCode::NOT_FOUND,
            "Movie not found",
            format!("No stored movie with id {}", id),
        ),
        SyncError::Store(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, "Sync failed", e),
    }
}

//! Similar-movies handler.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use movono_core::tmdb::{CatalogError, SimilarMovie};
use movono_core::SimilarError;

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    pub id: String,
    pub results: Vec<SimilarMovie>,
}

/// GET /api/v1/similar/{id}
///
/// `id` is an IMDb id or a TMDB id.
pub async fn get_similar(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SimilarResponse>, ApiError> {
    let Some(similar) = state.similar() else {
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "TMDB is not configured",
            "Set [tmdb] api_key to enable similar movies",
        ));
    };

    match similar.similar(&id).await {
        Ok(results) => Ok(Json(SimilarResponse { id, results })),
        Err(e @ SimilarError::InvalidId) => {
            Err(api_error(StatusCode::BAD_REQUEST, "Invalid movie id", e))
        }
        Err(SimilarError::Catalog(e @ CatalogError::NotFound(_))) => {
            Err(api_error(StatusCode::NOT_FOUND, "Movie not found", e))
        }
        Err(e) => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch similar movies",
            e,
        )),
    }
}

//! Stored movie rows and TMDB details.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use movono_core::store::MovieRecord;
use movono_core::tmdb::{CatalogError, MovieDetails};
use movono_core::MovieTable;

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

/// GET /api/v1/movies/{imdb_id}
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(imdb_id): Path<String>,
) -> Result<Json<MovieRecord>, ApiError> {
    match state.store().get(MovieTable::Mini, &imdb_id).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(api_error(
            StatusCode::NOT_FOUND,
            "Movie not found",
            format!("No stored movie with id {}", imdb_id),
        )),
        Err(e) => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load movie",
            e,
        )),
    }
}

/// GET /api/v1/tmdb/movies/{tmdb_id}
///
/// Details with trailer and top-billed cast.
pub async fn get_tmdb_movie(
    State(state): State<Arc<AppState>>,
    Path(tmdb_id): Path<u32>,
) -> Result<Json<MovieDetails>, ApiError> {
    let Some(catalog) = state.catalog() else {
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "TMDB is not configured",
            "Set [tmdb] api_key to enable movie details",
        ));
    };

    match catalog.movie_details(tmdb_id).await {
        Ok(details) => Ok(Json(details)),
        Err(e @ CatalogError::NotFound(_)) => {
            Err(api_error(StatusCode::NOT_FOUND, "Movie not found", e))
        }
        Err(e) => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch movie details",
            e,
        )),
    }
}

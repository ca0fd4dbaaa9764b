use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware as mw, movies, search, session, similar, sync, torrents};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Only the sync trigger sits behind the gate.
    let gated_routes = Router::new()
        .route("/sync", post(sync::trigger_sync))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw::auth_middleware,
        ));

    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/debug/env", get(handlers::debug_env))
        // Torrent site
        .route("/session", get(session::get_session))
        .route("/session/refresh", post(session::refresh_session))
        .route("/torrents", get(torrents::get_torrents))
        // Movies
        .route("/similar/{id}", get(similar::get_similar))
        .route("/movies/{imdb_id}", get(movies::get_movie))
        .route("/tmdb/movies/{tmdb_id}", get(movies::get_tmdb_movie))
        .route("/search", get(search::search))
        .merge(gated_routes)
        .with_state(state);

    Router::new()
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(mw::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

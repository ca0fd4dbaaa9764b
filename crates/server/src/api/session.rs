//! Torrent-site session handlers.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use movono_core::yts::ObtainedSession;
use movono_core::YtsError;

use super::handlers::{api_error, ApiError};
use crate::metrics::SITE_LOGINS_TOTAL;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub cookies: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// False when this request performed the login.
    pub cached: bool,
}

fn respond(
    state: &AppState,
    result: Result<ObtainedSession, YtsError>,
) -> Result<Json<SessionResponse>, ApiError> {
    match result {
        Ok(obtained) => {
            if obtained.fresh_login {
                SITE_LOGINS_TOTAL.with_label_values(&["success"]).inc();
            }
            let expires_at = state.sessions().cache().expires_at(&obtained.session);
            Ok(Json(SessionResponse {
                success: true,
                cookies: obtained.session.cookies,
                timestamp: obtained.session.timestamp,
                expires_at,
                cached: !obtained.fresh_login,
            }))
        }
        Err(e @ YtsError::MissingCredentials) => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Torrent site login is not configured",
            e,
        )),
        Err(e) => {
            SITE_LOGINS_TOTAL.with_label_values(&["failure"]).inc();
            error!("Torrent site login failed: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to obtain torrent site session",
                e,
            ))
        }
    }
}

/// GET /api/v1/session
///
/// Cached session when one is still valid, otherwise a fresh login.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let result = state.sessions().session().await;
    respond(&state, result)
}

/// POST /api/v1/session/refresh
pub async fn refresh_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let result = state.sessions().refresh().await;
    respond(&state, result)
}

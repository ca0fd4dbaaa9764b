use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use movono_core::SanitizedConfig;

use crate::metrics::encode_metrics;
use crate::state::AppState;

/// Error body shared by every route.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

/// Error half of every handler's result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, error: impl Into<String>, details: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            details: details.to_string(),
        }),
    )
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        encode_metrics(),
    )
}

#[derive(Debug, Serialize)]
pub struct EnvVarEntry {
    pub name: String,
    pub value: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DebugEnvResponse {
    pub variables: Vec<EnvVarEntry>,
}

const REDACTED: &str = "[redacted]";

/// GET /api/v1/debug/env
///
/// Lists the process's own configuration variables. Values are never echoed.
pub async fn debug_env() -> Json<DebugEnvResponse> {
    let mut names: Vec<String> = std::env::vars_os()
        .filter_map(|(name, _)| name.into_string().ok())
        .filter(|name| name.starts_with("MOVONO_") || name == "RUST_LOG")
        .collect();
    names.sort();

    Json(DebugEnvResponse {
        variables: names
            .into_iter()
            .map(|name| EnvVarEntry {
                name,
                value: REDACTED,
            })
            .collect(),
    })
}

//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use movono_core::{AuthError, AuthRequest, Caller};
use tracing::warn;

use super::handlers::api_error;
use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Gate for the sync trigger.
///
/// Checks the request against the configured authenticator and stores the
/// resulting [`Caller`] in the request extensions. Rejections are 401 with the
/// usual error body.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let authenticator = state.authenticator();

    if authenticator.method_name() == "none" {
        request.extensions_mut().insert(Caller::anonymous());
        return next.run(request).await;
    }

    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    match authenticator.authenticate(&AuthRequest { headers }).await {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(e @ AuthError::MissingToken) => {
            AUTH_FAILURES_TOTAL.with_label_values(&["missing_token"]).inc();
            api_error(StatusCode::UNAUTHORIZED, "Unauthorized", e).into_response()
        }
        Err(e @ AuthError::InvalidToken) => {
            AUTH_FAILURES_TOTAL.with_label_values(&["invalid_token"]).inc();
            warn!("Rejected sync trigger with an invalid token");
            api_error(StatusCode::UNAUTHORIZED, "Unauthorized", e).into_response()
        }
        Err(e) => {
            AUTH_FAILURES_TOTAL.with_label_values(&["internal_error"]).inc();
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed", e)
                .into_response()
        }
    }
}

//! Prometheus metrics for observability.
//!
//! Covers HTTP traffic, the sync gate, torrent-site logins, the torrent
//! lookup cache and sync outcomes.

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use regex_lite::Regex;
use tracing::warn;

use movono_core::SyncCounts;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "movono_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("movono_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "movono_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Rejected sync trigger calls.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("movono_auth_failures_total", "Total authentication failures"),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Torrent Index Metrics
// =============================================================================

/// Login round trips against the torrent site.
pub static SITE_LOGINS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "movono_site_logins_total",
            "Torrent site login attempts by result",
        ),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

/// Torrent lookups by cache outcome.
pub static TORRENT_CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "movono_torrent_cache_lookups_total",
            "Torrent lookups by cache outcome",
        ),
        &["result"], // "hit", "miss"
    )
    .unwrap()
});

// =============================================================================
// Sync Metrics
// =============================================================================

/// Rows processed by sync passes.
pub static SYNC_ITEMS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("movono_sync_items_total", "Sync items by pass and outcome"),
        &["sync", "outcome"], // outcome: "added", "updated", "skipped", "error"
    )
    .unwrap()
});

/// Register all metrics with the registry.
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(SITE_LOGINS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(TORRENT_CACHE_LOOKUPS.clone()))
        .unwrap();
    registry
        .register(Box::new(SYNC_ITEMS_TOTAL.clone()))
        .unwrap();
}

/// Add one pass's counters to [`SYNC_ITEMS_TOTAL`].
pub fn record_sync_counts(sync: &str, counts: &SyncCounts) {
    for (outcome, value) in [
        ("added", counts.added),
        ("updated", counts.updated),
        ("skipped", counts.skipped),
        ("error", counts.errors),
    ] {
        SYNC_ITEMS_TOTAL
            .with_label_values(&[sync, outcome])
            .inc_by(value as u64);
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

static IMDB_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/tt\d+(/|$)").unwrap());
static NUMERIC_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = IMDB_ID.replace_all(path, "/{imdb_id}$1");
    let result = NUMERIC_ID.replace_all(&result, "/{id}$1");
    result.to_string()
}

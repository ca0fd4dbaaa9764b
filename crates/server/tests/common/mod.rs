//! Common test utilities for E2E testing with mocks.
//!
//! Builds the real router in-process around mock upstreams and a temporary
//! SQLite store, so every route can be exercised without network access.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use movono_core::{
    create_authenticator, load_config_from_str, tmdb::MetadataCatalog,
    testing::{MockLoginClient, MockMetadataCatalog, MockTorrentIndex},
    Authenticator, ManualClock, SqliteMovieStore,
};
use movono_server::{create_router, AppServices, AppState};

/// Re-export fixtures for test convenience
pub use movono_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_lookup() {
///     let fixture = TestFixture::new().await;
///     fixture.index.add_movie(fixtures::yts_movie("tt0133093", "The Matrix", 2)).await;
///
///     let response = fixture.get("/api/v1/torrents?id=tt0133093").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    pub router: Router,
    /// Mock torrent-site login - configure cookies or failures
    pub login: Arc<MockLoginClient>,
    /// Mock torrent index JSON API
    pub index: Arc<MockTorrentIndex>,
    /// Mock TMDB
    pub catalog: Arc<MockMetadataCatalog>,
    /// The store behind the routes, for seeding and assertions
    pub store: Arc<SqliteMovieStore>,
    pub clock: Arc<ManualClock>,
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Require this bearer token on the sync route.
    pub sync_token: Option<String>,
    /// Leave TMDB unconfigured.
    pub without_tmdb: bool,
}

impl TestConfig {
    pub fn with_sync_token(token: &str) -> Self {
        Self {
            sync_token: Some(token.to_string()),
            ..Default::default()
        }
    }

    pub fn without_tmdb() -> Self {
        Self {
            without_tmdb: true,
            ..Default::default()
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let auth = match &test_config.sync_token {
            Some(token) => format!("[auth]\nmethod = \"bearer\"\ntoken = \"{}\"\n", token),
            None => "[auth]\nmethod = \"none\"\n".to_string(),
        };
        let tmdb = if test_config.without_tmdb {
            ""
        } else {
            "[tmdb]\napi_key = \"test-key\"\n"
        };
        let config = load_config_from_str(&format!(
            "{auth}\n{tmdb}\n[yts]\nusername = \"tester\"\npassword = \"secret\"\n"
        ))
        .expect("Failed to parse test config");

        let login = Arc::new(MockLoginClient::with_cookies(vec!["PHPSESSID=abc", "uid=7"]));
        let index = Arc::new(MockTorrentIndex::new());
        let catalog = Arc::new(MockMetadataCatalog::new());
        let store = Arc::new(
            SqliteMovieStore::new(&temp_dir.path().join("movies.db"))
                .expect("Failed to create store"),
        );
        let clock = Arc::new(ManualClock::default());

        let authenticator: Arc<dyn Authenticator> =
            Arc::from(create_authenticator(&config.auth).expect("Failed to create authenticator"));

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            AppServices {
                login: login.clone(),
                index: index.clone(),
                catalog: (!test_config.without_tmdb)
                    .then(|| Arc::clone(&catalog) as Arc<dyn MetadataCatalog>),
                store: store.clone(),
                clock: clock.clone(),
            },
        ));

        Self {
            router: create_router(state),
            login,
            index,
            catalog,
            store,
            clock,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a GET request and return the raw body (for non-JSON routes).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    /// Send a POST request with JSON body and a bearer token.
    pub async fn post_with_token(&self, path: &str, body: Value, token: &str) -> TestResponse {
        self.request("POST", path, Some(body), Some(token)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            request_builder = request_builder.header("Authorization", format!("Bearer {}", token));
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

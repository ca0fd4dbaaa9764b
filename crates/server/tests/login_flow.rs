//! Torrent-site login and index clients against a fake site on loopback.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{
    extract::{Form, Query},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

use movono_core::{
    config::YtsConfig, HttpLoginClient, LoginClient, TorrentIndex, YtsApiClient, YtsError,
};

const LOGIN_PAGE: &str = r#"<html><body>
<form method="post" action="/login">
  <input type="hidden" name="csrf_token" value="tok-123">
  <input name="username"><input name="password" type="password">
</form>
</body></html>"#;

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn config(addr: SocketAddr) -> YtsConfig {
    YtsConfig {
        site_url: format!("http://{}", addr),
        api_url: format!("http://{}/api/v2", addr),
        username: Some("movono".to_string()),
        password: Some("hunter2".to_string()),
        timeout_secs: 5,
        ..Default::default()
    }
}

async fn login_page() -> Response {
    (
        [(header::SET_COOKIE, "pre_session=1; path=/")],
        Html(LOGIN_PAGE),
    )
        .into_response()
}

/// Accepts the form only when the page's token and cookie come back with it.
async fn login_submit(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    let carried_cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("pre_session=1"));
    let valid = form.get("csrf_token").map(String::as_str) == Some("tok-123")
        && form.get("username").map(String::as_str) == Some("movono")
        && form.get("password").map(String::as_str) == Some("hunter2");

    if !carried_cookie || !valid {
        return StatusCode::FORBIDDEN.into_response();
    }

    let mut response = (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response();
    let headers = response.headers_mut();
    headers.append(
        header::SET_COOKIE,
        "PHPSESSID=abc; path=/; HttpOnly".parse().unwrap(),
    );
    headers.append(
        header::SET_COOKIE,
        "remember=xyz; Max-Age=86400".parse().unwrap(),
    );
    response
}

fn site() -> Router {
    Router::new().route("/login", get(login_page).post(login_submit))
}

#[tokio::test]
async fn test_login_returns_cookie_pairs() {
    let addr = serve(site()).await;
    let client = HttpLoginClient::new(&config(addr));

    let cookies = assert_ok!(client.login().await);
    assert_eq!(cookies, vec!["PHPSESSID=abc", "remember=xyz"]);
}

#[tokio::test]
async fn test_login_without_token_on_page() {
    let router = Router::new().route(
        "/login",
        get(|| async { Html("<form><input name=\"username\"></form>") }),
    );
    let addr = serve(router).await;

    let result = HttpLoginClient::new(&config(addr)).login().await;
    assert!(matches!(result, Err(YtsError::TokenNotFound)));
}

#[tokio::test]
async fn test_login_without_cookies() {
    let router = Router::new().route(
        "/login",
        get(|| async { Html(LOGIN_PAGE) }).post(|| async { StatusCode::OK }),
    );
    let addr = serve(router).await;

    let result = HttpLoginClient::new(&config(addr)).login().await;
    assert!(matches!(result, Err(YtsError::NoCookies)));
}

#[tokio::test]
async fn test_login_rejected_by_site() {
    let addr = serve(site()).await;
    let mut config = config(addr);
    config.password = Some("wrong".to_string());

    let result = HttpLoginClient::new(&config).login().await;
    assert!(matches!(
        result,
        Err(YtsError::UpstreamStatus {
            step: "login submit",
            status: 403
        })
    ));
}

#[tokio::test]
async fn test_login_page_unavailable() {
    let router = Router::new().route(
        "/login",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let addr = serve(router).await;

    let result = HttpLoginClient::new(&config(addr)).login().await;
    assert!(matches!(
        result,
        Err(YtsError::UpstreamStatus {
            step: "login page",
            status: 503
        })
    ));
}

// =============================================================================
// Index API
// =============================================================================

fn movie_json(imdb_id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": 10,
        "imdb_code": imdb_id,
        "title": title,
        "year": 1999,
        "torrents": [{
            "url": "https://yts.example/torrent/download/AAA",
            "hash": "AAA",
            "quality": "1080p",
            "type": "bluray",
            "seeds": 12,
            "peers": 3,
            "size": "2.1 GB",
            "size_bytes": 2254857830u64
        }]
    })
}

async fn movie_details(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let imdb_id = params.get("imdb_id").cloned().unwrap_or_default();
    Json(json!({
        "status": "ok",
        "status_message": "Query was successful",
        "data": { "movie": movie_json(&imdb_id, "The Matrix") }
    }))
}

async fn list_movies(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let movies = match params.get("query_term") {
        Some(term) => vec![movie_json(term, "Search Hit")],
        None => vec![
            movie_json("tt0000002", &format!("Newest by {}", params["sort_by"])),
            movie_json("tt0000001", "Older"),
        ],
    };
    Json(json!({
        "status": "ok",
        "data": { "movie_count": movies.len(), "movies": movies }
    }))
}

fn api() -> Router {
    Router::new()
        .route("/api/v2/movie_details.json", get(movie_details))
        .route("/api/v2/list_movies.json", get(list_movies))
}

#[tokio::test]
async fn test_index_movie_details() {
    let addr = serve(api()).await;
    let client = assert_ok!(YtsApiClient::new(&config(addr)));

    let envelope = assert_ok!(client.movie_details("tt0133093").await);
    assert_eq!(envelope.status, "ok");
    let movie = envelope.data.unwrap().movie.unwrap();
    assert_eq!(movie.imdb_code, "tt0133093");
    assert_eq!(movie.torrents.unwrap()[0].hash.as_deref(), Some("AAA"));
}

#[tokio::test]
async fn test_index_search_and_latest() {
    let addr = serve(api()).await;
    let client = assert_ok!(YtsApiClient::new(&config(addr)));

    let search = assert_ok!(client.search("tt0133093", 5).await);
    let hits = search.data.unwrap().movies.unwrap();
    assert_eq!(hits[0].title, "Search Hit");

    let latest = assert_ok!(client.latest(20).await);
    let movies = latest.data.unwrap().movies.unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].title, "Newest by date_added");
}

#[tokio::test]
async fn test_index_error_status() {
    let router = Router::new().route(
        "/api/v2/movie_details.json",
        get(|| async { StatusCode::BAD_GATEWAY }),
    );
    let addr = serve(router).await;
    let client = assert_ok!(YtsApiClient::new(&config(addr)));

    let result = client.movie_details("tt0133093").await;
    assert!(matches!(
        result,
        Err(YtsError::UpstreamStatus { status: 502, .. })
    ));
}

#[tokio::test]
async fn test_index_unparseable_body() {
    let router = Router::new().route(
        "/api/v2/list_movies.json",
        get(|| async { "<html>maintenance</html>" }),
    );
    let addr = serve(router).await;
    let client = assert_ok!(YtsApiClient::new(&config(addr)));

    let error = assert_err!(client.latest(20).await);
    assert!(matches!(error, YtsError::ParseError(_)));
}

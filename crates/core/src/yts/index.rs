//! YTS public JSON API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::YtsConfig;

use super::types::YtsEnvelope;
use super::YtsError;

/// Read access to the torrent index's JSON API.
#[async_trait]
pub trait TorrentIndex: Send + Sync {
    /// `movie_details.json?imdb_id=<id>`
    async fn movie_details(&self, imdb_id: &str) -> Result<YtsEnvelope, YtsError>;

    /// `list_movies.json?query_term=<term>`
    async fn search(&self, term: &str, limit: u32) -> Result<YtsEnvelope, YtsError>;

    /// Newest uploads first.
    async fn latest(&self, limit: u32) -> Result<YtsEnvelope, YtsError>;
}

pub struct YtsApiClient {
    client: Client,
    base_url: String,
}

impl YtsApiClient {
    pub fn new(config: &YtsConfig) -> Result<Self, YtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_envelope(
        &self,
        step: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<YtsEnvelope, YtsError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("YTS {}: {} {:?}", step, url, query);

        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(YtsError::UpstreamStatus {
                step,
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| {
            YtsError::ParseError(format!("Failed to parse {} response: {}", step, e))
        })
    }
}

#[async_trait]
impl TorrentIndex for YtsApiClient {
    async fn movie_details(&self, imdb_id: &str) -> Result<YtsEnvelope, YtsError> {
        self.get_envelope(
            "movie_details",
            "movie_details.json",
            &[("imdb_id", imdb_id.to_string())],
        )
        .await
    }

    async fn search(&self, term: &str, limit: u32) -> Result<YtsEnvelope, YtsError> {
        self.get_envelope(
            "list_movies",
            "list_movies.json",
            &[("query_term", term.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn latest(&self, limit: u32) -> Result<YtsEnvelope, YtsError> {
        self.get_envelope(
            "latest",
            "list_movies.json",
            &[
                ("sort_by", "date_added".to_string()),
                ("order_by", "desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}

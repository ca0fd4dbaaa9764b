//! Mock torrent index for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::yts::{TorrentIndex, YtsData, YtsEnvelope, YtsError, YtsMovie};

/// A recorded index query for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedIndexQuery {
    MovieDetails { imdb_id: String },
    Search { term: String, limit: u32 },
    Latest { limit: u32 },
}

/// Mock implementation of the TorrentIndex trait.
///
/// Movies are kept in insertion order; `latest` returns them in that order.
#[derive(Debug)]
pub struct MockTorrentIndex {
    movies: RwLock<Vec<YtsMovie>>,
    details_status: RwLock<String>,
    search_status: RwLock<String>,
    /// When set, every call fails as if upstream answered with this status.
    failure_status: RwLock<Option<u16>>,
    queries: RwLock<Vec<RecordedIndexQuery>>,
}

impl Default for MockTorrentIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTorrentIndex {
    pub fn new() -> Self {
        Self {
            movies: RwLock::new(Vec::new()),
            details_status: RwLock::new("ok".to_string()),
            search_status: RwLock::new("ok".to_string()),
            failure_status: RwLock::new(None),
            queries: RwLock::new(Vec::new()),
        }
    }

    pub async fn add_movie(&self, movie: YtsMovie) {
        self.movies.write().await.push(movie);
    }

    pub async fn clear_movies(&self) {
        self.movies.write().await.clear();
    }

    /// Envelope status reported by `movie_details` ("ok" by default).
    pub async fn set_details_status(&self, status: &str) {
        *self.details_status.write().await = status.to_string();
    }

    /// Envelope status reported by `search` ("ok" by default).
    pub async fn set_search_status(&self, status: &str) {
        *self.search_status.write().await = status.to_string();
    }

    pub async fn fail_with_status(&self, status: u16) {
        *self.failure_status.write().await = Some(status);
    }

    pub async fn queries(&self) -> Vec<RecordedIndexQuery> {
        self.queries.read().await.clone()
    }

    pub async fn clear_queries(&self) {
        self.queries.write().await.clear();
    }

    async fn record(&self, step: &'static str, query: RecordedIndexQuery) -> Result<(), YtsError> {
        self.queries.write().await.push(query);
        match *self.failure_status.read().await {
            Some(status) => Err(YtsError::UpstreamStatus { step, status }),
            None => Ok(()),
        }
    }

    fn envelope(status: String, data: YtsData) -> YtsEnvelope {
        YtsEnvelope {
            status,
            status_message: None,
            data: Some(data),
        }
    }
}

#[async_trait]
impl TorrentIndex for MockTorrentIndex {
    async fn movie_details(&self, imdb_id: &str) -> Result<YtsEnvelope, YtsError> {
        self.record(
            "movie details",
            RecordedIndexQuery::MovieDetails {
                imdb_id: imdb_id.to_string(),
            },
        )
        .await?;

        let movie = self
            .movies
            .read()
            .await
            .iter()
            .find(|m| m.imdb_code == imdb_id)
            .cloned()
            .unwrap_or_default();

        Ok(Self::envelope(
            self.details_status.read().await.clone(),
            YtsData {
                movie: Some(movie),
                ..Default::default()
            },
        ))
    }

    async fn search(&self, term: &str, limit: u32) -> Result<YtsEnvelope, YtsError> {
        self.record(
            "search",
            RecordedIndexQuery::Search {
                term: term.to_string(),
                limit,
            },
        )
        .await?;

        let term_lower = term.to_lowercase();
        let movies: Vec<YtsMovie> = self
            .movies
            .read()
            .await
            .iter()
            .filter(|m| m.imdb_code == term || m.title.to_lowercase().contains(&term_lower))
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(Self::envelope(
            self.search_status.read().await.clone(),
            YtsData {
                movie_count: Some(movies.len() as u32),
                movies: Some(movies),
                ..Default::default()
            },
        ))
    }

    async fn latest(&self, limit: u32) -> Result<YtsEnvelope, YtsError> {
        self.record("latest", RecordedIndexQuery::Latest { limit })
            .await?;

        let movies: Vec<YtsMovie> = self
            .movies
            .read()
            .await
            .iter()
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(Self::envelope(
            "ok".to_string(),
            YtsData {
                movie_count: Some(movies.len() as u32),
                movies: Some(movies),
                ..Default::default()
            },
        ))
    }
}

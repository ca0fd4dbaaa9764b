//! Torrent lookup by IMDb id: ordered resolvers, first success wins, cached.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::clock::Clock;

use super::index::TorrentIndex;
use super::types::{Torrent, YtsEnvelope, YtsMovie};
use super::YtsError;

/// One way of finding a movie on the torrent index.
#[async_trait]
pub trait TorrentResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Some` only when the upstream answered `ok` with a movie object.
    async fn resolve(&self, imdb_id: &str) -> Option<YtsMovie>;
}

fn accept(
    resolver: &'static str,
    imdb_id: &str,
    result: Result<YtsEnvelope, YtsError>,
) -> Option<YtsMovie> {
    match result {
        Ok(envelope) if envelope.is_ok() => {
            let movie = envelope.into_movie();
            if movie.is_none() {
                debug!("{}: no movie object for {}", resolver, imdb_id);
            }
            movie
        }
        Ok(envelope) => {
            debug!(
                "{}: status '{}' for {} ({})",
                resolver,
                envelope.status,
                imdb_id,
                envelope.status_message.unwrap_or_default()
            );
            None
        }
        Err(e) => {
            warn!("{} failed for {}: {}", resolver, imdb_id, e);
            None
        }
    }
}

/// Primary: the movie details endpoint keyed by IMDb id.
pub struct MovieDetailsResolver {
    index: Arc<dyn TorrentIndex>,
}

impl MovieDetailsResolver {
    pub fn new(index: Arc<dyn TorrentIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl TorrentResolver for MovieDetailsResolver {
    fn name(&self) -> &'static str {
        "movie_details"
    }

    async fn resolve(&self, imdb_id: &str) -> Option<YtsMovie> {
        accept(self.name(), imdb_id, self.index.movie_details(imdb_id).await)
    }
}

/// Secondary: free-text search using the IMDb id as the term.
pub struct SearchTermResolver {
    index: Arc<dyn TorrentIndex>,
}

impl SearchTermResolver {
    pub fn new(index: Arc<dyn TorrentIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl TorrentResolver for SearchTermResolver {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn resolve(&self, imdb_id: &str) -> Option<YtsMovie> {
        accept(self.name(), imdb_id, self.index.search(imdb_id, 1).await)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TorrentLookupResult {
    pub imdb_id: String,
    pub torrents: Vec<Torrent>,
    /// Served from the response cache without touching the network.
    pub cached: bool,
    /// Resolver that produced the torrents, when one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
}

/// Finds the torrent variants of a movie.
///
/// Torrent availability never blocks a caller: when every resolver fails the
/// result is an empty list, not an error.
pub struct TorrentLookup {
    resolvers: Vec<Arc<dyn TorrentResolver>>,
    cache: TtlCache<String, Vec<Torrent>>,
}

impl TorrentLookup {
    pub fn new(
        resolvers: Vec<Arc<dyn TorrentResolver>>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolvers,
            cache: TtlCache::new(ttl, clock),
        }
    }

    /// Details endpoint first, search second.
    pub fn with_default_resolvers(
        index: Arc<dyn TorrentIndex>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            vec![
                Arc::new(MovieDetailsResolver::new(Arc::clone(&index))) as Arc<dyn TorrentResolver>,
                Arc::new(SearchTermResolver::new(index)) as Arc<dyn TorrentResolver>,
            ],
            ttl,
            clock,
        )
    }

    pub fn cache(&self) -> &TtlCache<String, Vec<Torrent>> {
        &self.cache
    }

    pub async fn lookup(&self, imdb_id: &str) -> Result<TorrentLookupResult, YtsError> {
        let imdb_id = imdb_id.trim();
        if imdb_id.is_empty() {
            return Err(YtsError::MissingId);
        }

        if let Some(torrents) = self.cache.get(&imdb_id.to_string()) {
            debug!("Torrent cache hit for {}", imdb_id);
            return Ok(TorrentLookupResult {
                imdb_id: imdb_id.to_string(),
                torrents,
                cached: true,
                source: None,
            });
        }

        for resolver in &self.resolvers {
            let Some(movie) = resolver.resolve(imdb_id).await else {
                continue;
            };

            let torrents = movie.torrents();
            if torrents.is_empty() {
                info!("{} found {} but it has no torrents", resolver.name(), imdb_id);
                break;
            }

            info!(
                "{} resolved {} torrents for {}",
                resolver.name(),
                torrents.len(),
                imdb_id
            );
            self.cache.insert(imdb_id.to_string(), torrents.clone());
            return Ok(TorrentLookupResult {
                imdb_id: imdb_id.to_string(),
                torrents,
                cached: false,
                source: Some(resolver.name()),
            });
        }

        Ok(TorrentLookupResult {
            imdb_id: imdb_id.to_string(),
            torrents: Vec::new(),
            cached: false,
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::testing::{fixtures, MockTorrentIndex, RecordedIndexQuery};

    fn lookup(index: &Arc<MockTorrentIndex>, clock: &Arc<ManualClock>) -> TorrentLookup {
        TorrentLookup::with_default_resolvers(index.clone(), Duration::hours(1), clock.clone())
    }

    #[tokio::test]
    async fn test_blank_id_is_rejected() {
        let index = Arc::new(MockTorrentIndex::new());
        let clock = Arc::new(ManualClock::default());
        let result = lookup(&index, &clock).lookup("  ").await;
        assert!(matches!(result, Err(YtsError::MissingId)));
        assert!(index.queries().await.is_empty());
    }

    #[tokio::test]
    async fn test_primary_endpoint_wins() {
        let index = Arc::new(MockTorrentIndex::new());
        index
            .add_movie(fixtures::yts_movie("tt1234567", "Heat", 2))
            .await;
        let clock = Arc::new(ManualClock::default());

        let result = lookup(&index, &clock).lookup("tt1234567").await.unwrap();
        assert_eq!(result.torrents.len(), 2);
        assert_eq!(result.source, Some("movie_details"));
        assert!(!result.cached);
        assert_eq!(index.queries().await.len(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_search() {
        let index = Arc::new(MockTorrentIndex::new());
        index
            .add_movie(fixtures::yts_movie("tt1234567", "Heat", 1))
            .await;
        index.set_details_status("error").await;
        let clock = Arc::new(ManualClock::default());

        let result = lookup(&index, &clock).lookup("tt1234567").await.unwrap();
        assert_eq!(result.torrents.len(), 1);
        assert_eq!(result.source, Some("search"));

        let queries = index.queries().await;
        assert!(matches!(queries[0], RecordedIndexQuery::MovieDetails { .. }));
        assert!(matches!(queries[1], RecordedIndexQuery::Search { .. }));
    }

    #[tokio::test]
    async fn test_cached_entry_served_without_network() {
        let index = Arc::new(MockTorrentIndex::new());
        index
            .add_movie(fixtures::yts_movie("tt1234567", "Heat", 2))
            .await;
        let clock = Arc::new(ManualClock::default());
        let lookup = lookup(&index, &clock);

        let first = lookup.lookup("tt1234567").await.unwrap();
        index.clear_queries().await;
        index.clear_movies().await;
        clock.advance(Duration::minutes(59));

        let second = lookup.lookup("tt1234567").await.unwrap();
        assert!(second.cached);
        assert_eq!(second.torrents, first.torrents);
        assert!(index.queries().await.is_empty());
    }

    #[tokio::test]
    async fn test_cache_expires_after_ttl() {
        let index = Arc::new(MockTorrentIndex::new());
        index
            .add_movie(fixtures::yts_movie("tt1234567", "Heat", 2))
            .await;
        let clock = Arc::new(ManualClock::default());
        let lookup = lookup(&index, &clock);

        lookup.lookup("tt1234567").await.unwrap();
        clock.advance(Duration::hours(1));
        let again = lookup.lookup("tt1234567").await.unwrap();
        assert!(!again.cached);
        assert_eq!(index.queries().await.len(), 2);
    }

    #[tokio::test]
    async fn test_both_endpoints_failing_is_soft() {
        let index = Arc::new(MockTorrentIndex::new());
        index.set_details_status("error").await;
        index.set_search_status("error").await;
        let clock = Arc::new(ManualClock::default());
        let lookup = lookup(&index, &clock);

        let result = lookup.lookup("tt1234567").await.unwrap();
        assert!(result.torrents.is_empty());
        assert!(result.source.is_none());
        assert!(lookup.cache().is_empty());
    }

    #[tokio::test]
    async fn test_transport_errors_are_soft() {
        let index = Arc::new(MockTorrentIndex::new());
        index.fail_with_status(503).await;
        let clock = Arc::new(ManualClock::default());

        let result = lookup(&index, &clock).lookup("tt7654321").await.unwrap();
        assert!(result.torrents.is_empty());
    }

    #[tokio::test]
    async fn test_movie_without_torrents_not_cached() {
        let index = Arc::new(MockTorrentIndex::new());
        index
            .add_movie(fixtures::yts_movie("tt1234567", "Heat", 0))
            .await;
        let clock = Arc::new(ManualClock::default());
        let lookup = lookup(&index, &clock);

        let result = lookup.lookup("tt1234567").await.unwrap();
        assert!(result.torrents.is_empty());
        assert!(lookup.cache().is_empty());
        // First success wins even when empty: no fallthrough to search.
        assert_eq!(index.queries().await.len(), 1);
    }
}

//! Sync passes over the upstream lists.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::SyncConfig;
use crate::store::{MovieEnrichment, MovieRecord, MovieStore, MovieTable, Ratings, StoreError};
use crate::tmdb::{MetadataCatalog, UpcomingMovie};
use crate::yts::{Torrent, TorrentIndex, YtsMovie};

use super::types::{CombinedSyncResult, SyncCounts, SyncError};

const SOURCE_UPCOMING: &str = "tmdb_upcoming";
const SOURCE_LATEST: &str = "yts";

enum ItemOutcome {
    Added,
    Updated,
    Skipped,
}

impl SyncCounts {
    fn record(&mut self, outcome: Result<ItemOutcome, StoreError>, id: &str) {
        match outcome {
            Ok(ItemOutcome::Added) => self.added += 1,
            Ok(ItemOutcome::Updated) => self.updated += 1,
            Ok(ItemOutcome::Skipped) => self.skipped += 1,
            Err(e) => {
                warn!("Sync failed for {}: {}", id, e);
                self.errors += 1;
            }
        }
    }
}

pub struct SyncOrchestrator {
    catalog: Option<Arc<dyn MetadataCatalog>>,
    index: Arc<dyn TorrentIndex>,
    store: Arc<dyn MovieStore>,
    config: SyncConfig,
    clock: Arc<dyn Clock>,
}

impl SyncOrchestrator {
    /// `catalog` is optional: without it the upcoming pass reports a failure.
    pub fn new(
        catalog: Option<Arc<dyn MetadataCatalog>>,
        index: Arc<dyn TorrentIndex>,
        store: Arc<dyn MovieStore>,
        config: SyncConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            index,
            store,
            config,
            clock,
        }
    }

    pub fn table(&self) -> MovieTable {
        self.config.target_table
    }

    /// Insert a minimal row for every upcoming title not stored yet.
    pub async fn sync_upcoming(&self) -> SyncCounts {
        let Some(catalog) = &self.catalog else {
            return SyncCounts::failed("TMDB is not configured");
        };

        let movies = match catalog.upcoming_movies(self.config.upcoming_limit).await {
            Ok(movies) => movies,
            Err(e) => {
                warn!("Failed to fetch upcoming movies: {}", e);
                return SyncCounts::failed(e.to_string());
            }
        };

        let mut counts = SyncCounts::default();
        for movie in &movies {
            let id = movie.imdb_id.as_deref().unwrap_or_default();
            let outcome = self.upsert_upcoming(movie).await;
            counts.record(outcome, id);
        }

        info!(
            "Upcoming sync: {} added, {} skipped, {} errors",
            counts.added, counts.skipped, counts.errors
        );
        counts
    }

    async fn upsert_upcoming(&self, movie: &UpcomingMovie) -> Result<ItemOutcome, StoreError> {
        let Some(imdb_id) = movie.imdb_id.as_deref().filter(|id| !id.is_empty()) else {
            debug!("Skipping upcoming '{}': no IMDb id", movie.title);
            return Ok(ItemOutcome::Skipped);
        };

        let table = self.table();
        if self.store.exists(table, imdb_id).await? {
            debug!("Skipping upcoming {}: already stored", imdb_id);
            return Ok(ItemOutcome::Skipped);
        }

        let mut record = MovieRecord::new(imdb_id, &movie.title, self.clock.now());
        record.poster_url = movie.poster_url.clone();
        record.year = movie.year();
        record.genres = movie.genres.clone();
        record.release_date = movie.release_date.clone();
        record.source = Some(SOURCE_UPCOMING.to_string());

        self.store.insert(table, &record).await?;
        Ok(ItemOutcome::Added)
    }

    /// Upsert the newest torrent-bearing titles.
    pub async fn sync_latest(&self) -> SyncCounts {
        let movies = match self.index.latest(self.config.latest_limit).await {
            Ok(envelope) if envelope.is_ok() => envelope.into_movies(),
            Ok(envelope) => {
                let message = format!("Torrent index returned status '{}'", envelope.status);
                warn!("{}", message);
                return SyncCounts::failed(message);
            }
            Err(e) => {
                warn!("Failed to fetch latest movies: {}", e);
                return SyncCounts::failed(e.to_string());
            }
        };

        let mut counts = SyncCounts::default();
        for movie in &movies {
            let outcome = self.upsert_latest(movie).await;
            counts.record(outcome, &movie.imdb_code);
        }

        info!(
            "Latest sync: {} added, {} updated, {} skipped, {} errors",
            counts.added, counts.updated, counts.skipped, counts.errors
        );
        counts
    }

    async fn upsert_latest(&self, movie: &YtsMovie) -> Result<ItemOutcome, StoreError> {
        if !movie.imdb_code.starts_with("tt") {
            debug!("Skipping latest '{}': invalid id '{}'", movie.title, movie.imdb_code);
            return Ok(ItemOutcome::Skipped);
        }

        let table = self.table();
        let now = self.clock.now();
        let ratings = movie.rating.map(|r| Ratings {
            imdb: Some(r),
            ..Default::default()
        });

        if self.store.exists(table, &movie.imdb_code).await? {
            let enrichment = MovieEnrichment {
                poster_url: movie.poster_url(),
                plot: movie.plot(),
                runtime: movie.runtime,
                ratings,
                torrents: movie.torrents(),
                source: Some(SOURCE_LATEST.to_string()),
                updated_at: now,
            };
            return if self
                .store
                .apply_enrichment(table, &movie.imdb_code, &enrichment)
                .await?
            {
                Ok(ItemOutcome::Updated)
            } else {
                Ok(ItemOutcome::Skipped)
            };
        }

        let mut record = MovieRecord::new(&movie.imdb_code, &movie.title, now);
        record.poster_url = movie.poster_url();
        record.year = movie.year;
        record.genres = movie.genres();
        record.plot = movie.plot();
        record.runtime = movie.runtime;
        record.ratings = ratings;
        record.torrents = movie.torrents();
        record.source = Some(SOURCE_LATEST.to_string());

        self.store.insert(table, &record).await?;
        Ok(ItemOutcome::Added)
    }

    /// Reserved for a popularity feed; does nothing yet.
    pub async fn sync_popular(&self) -> SyncCounts {
        SyncCounts::default()
    }

    /// Run every pass in order.
    pub async fn run_all(&self) -> CombinedSyncResult {
        info!("Starting combined sync");
        let upcoming = self.sync_upcoming().await;
        let latest = self.sync_latest().await;
        let popular = self.sync_popular().await;

        CombinedSyncResult {
            upcoming,
            latest,
            popular,
            timestamp: self.clock.now(),
        }
    }

    /// Replace a stored row's torrent list. Returns the stored torrent count.
    pub async fn update_torrents(
        &self,
        imdb_id: &str,
        torrents: &[Torrent],
    ) -> Result<usize, SyncError> {
        let imdb_id = imdb_id.trim();
        if imdb_id.is_empty() {
            return Err(SyncError::InvalidRequest("Movie id is required".to_string()));
        }
        if torrents.is_empty() {
            return Err(SyncError::InvalidRequest(
                "At least one torrent is required".to_string(),
            ));
        }

        let matched = self
            .store
            .update_torrents(self.table(), imdb_id, torrents, self.clock.now())
            .await?;
        if !matched {
            return Err(SyncError::NotFound(imdb_id.to_string()));
        }

        info!("Updated {} torrents for {}", torrents.len(), imdb_id);
        Ok(torrents.len())
    }
}

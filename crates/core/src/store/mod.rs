//! Persisted movie rows.
//!
//! Two tables share one row shape: `movies_mini`, the denormalized table the
//! sync job maintains, and `movies`, the fuller catalog. Rows are keyed by
//! IMDb id and written last-write-wins; nothing spans more than one row.

mod sqlite;
mod supabase;
mod types;

pub use sqlite::SqliteMovieStore;
pub use supabase::SupabaseStore;
pub use types::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::yts::Torrent;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    /// A row with this IMDb id already exists.
    #[error("Movie already exists: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Storage for movie rows.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn exists(&self, table: MovieTable, imdb_id: &str) -> Result<bool, StoreError>;

    async fn get(&self, table: MovieTable, imdb_id: &str)
        -> Result<Option<MovieRecord>, StoreError>;

    /// Insert a new row. Fails with [`StoreError::Conflict`] if the id exists.
    async fn insert(&self, table: MovieTable, record: &MovieRecord) -> Result<(), StoreError>;

    /// Overwrite only the enrichable fields. Returns whether a row matched.
    async fn apply_enrichment(
        &self,
        table: MovieTable,
        imdb_id: &str,
        enrichment: &MovieEnrichment,
    ) -> Result<bool, StoreError>;

    /// Replace a row's torrent list. Returns whether a row matched.
    async fn update_torrents(
        &self,
        table: MovieTable,
        imdb_id: &str,
        torrents: &[Torrent],
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Case-insensitive title substring search, newest first.
    async fn search(
        &self,
        table: MovieTable,
        query: &str,
        limit: u32,
    ) -> Result<Vec<MovieSummary>, StoreError>;
}

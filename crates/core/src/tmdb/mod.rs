//! TMDB (The Movie Database) metadata integration.
//!
//! Supplies the upcoming list for the sync job and the similar/details data
//! the movie pages show.

mod client;
mod types;

pub use client::TmdbClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the metadata API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Movie metadata source.
#[async_trait]
pub trait MetadataCatalog: Send + Sync {
    /// Up to `limit` upcoming releases, each with its IMDb id when TMDB knows it.
    async fn upcoming_movies(&self, limit: u32) -> Result<Vec<UpcomingMovie>, CatalogError>;

    /// Map an IMDb id to a TMDB movie id.
    async fn find_by_imdb(&self, imdb_id: &str) -> Result<Option<u32>, CatalogError>;

    /// Movies TMDB considers similar to the given one.
    async fn similar_movies(&self, tmdb_id: u32) -> Result<Vec<SimilarMovie>, CatalogError>;

    /// Full details with trailer and cast.
    async fn movie_details(&self, tmdb_id: u32) -> Result<MovieDetails, CatalogError>;
}

//! Mock metadata catalog for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::tmdb::{CatalogError, MetadataCatalog, MovieDetails, SimilarMovie, UpcomingMovie};

/// Mock implementation of the MetadataCatalog trait.
#[derive(Debug, Default)]
pub struct MockMetadataCatalog {
    upcoming: RwLock<Vec<UpcomingMovie>>,
    imdb_map: RwLock<HashMap<String, u32>>,
    similar: RwLock<HashMap<u32, Vec<SimilarMovie>>>,
    details: RwLock<HashMap<u32, MovieDetails>>,
    similar_calls: AtomicUsize,
    /// If set, the next operation will fail with this error.
    next_error: RwLock<Option<CatalogError>>,
}

impl MockMetadataCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_upcoming(&self, movies: Vec<UpcomingMovie>) {
        *self.upcoming.write().await = movies;
    }

    pub async fn map_imdb(&self, imdb_id: &str, tmdb_id: u32) {
        self.imdb_map
            .write()
            .await
            .insert(imdb_id.to_string(), tmdb_id);
    }

    pub async fn set_similar(&self, tmdb_id: u32, movies: Vec<SimilarMovie>) {
        self.similar.write().await.insert(tmdb_id, movies);
    }

    pub async fn add_details(&self, details: MovieDetails) {
        self.details.write().await.insert(details.tmdb_id, details);
    }

    pub async fn fail_next(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn similar_calls(&self) -> usize {
        self.similar_calls.load(Ordering::SeqCst)
    }

    async fn take_error(&self) -> Result<(), CatalogError> {
        match self.next_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MetadataCatalog for MockMetadataCatalog {
    async fn upcoming_movies(&self, limit: u32) -> Result<Vec<UpcomingMovie>, CatalogError> {
        self.take_error().await?;
        Ok(self
            .upcoming
            .read()
            .await
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_by_imdb(&self, imdb_id: &str) -> Result<Option<u32>, CatalogError> {
        self.take_error().await?;
        Ok(self.imdb_map.read().await.get(imdb_id).copied())
    }

    async fn similar_movies(&self, tmdb_id: u32) -> Result<Vec<SimilarMovie>, CatalogError> {
        self.take_error().await?;
        self.similar_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .similar
            .read()
            .await
            .get(&tmdb_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn movie_details(&self, tmdb_id: u32) -> Result<MovieDetails, CatalogError> {
        self.take_error().await?;
        self.details
            .read()
            .await
            .get(&tmdb_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Movie {} not found", tmdb_id)))
    }
}

//! Similar-movies lookup with a per-id response cache.

use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;
use tracing::debug;

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::tmdb::{CatalogError, MetadataCatalog, SimilarMovie};

#[derive(Debug, Error)]
pub enum SimilarError {
    #[error("Movie id is required")]
    InvalidId,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub struct SimilarMovies {
    catalog: Arc<dyn MetadataCatalog>,
    cache: TtlCache<String, Vec<SimilarMovie>>,
}

impl SimilarMovies {
    pub fn new(catalog: Arc<dyn MetadataCatalog>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            cache: TtlCache::new(ttl, clock),
        }
    }

    /// Accepts an IMDb id (`tt…`) or a numeric TMDB id.
    ///
    /// An IMDb id TMDB has never heard of yields an empty list.
    pub async fn similar(&self, id: &str) -> Result<Vec<SimilarMovie>, SimilarError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(SimilarError::InvalidId);
        }

        if let Some(movies) = self.cache.get(&id.to_string()) {
            debug!("Similar-movies cache hit for {}", id);
            return Ok(movies);
        }

        let tmdb_id = if id.starts_with("tt") {
            match self.catalog.find_by_imdb(id).await? {
                Some(tmdb_id) => tmdb_id,
                None => return Ok(Vec::new()),
            }
        } else {
            id.parse::<u32>().map_err(|_| SimilarError::InvalidId)?
        };

        let movies = self.catalog.similar_movies(tmdb_id).await?;
        self.cache.insert(id.to_string(), movies.clone());
        Ok(movies)
    }
}

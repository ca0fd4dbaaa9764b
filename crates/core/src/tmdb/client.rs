//! TMDB API client.
//!
//! TMDB requires an API key for access.
//! Rate limits are generous (around 40 requests per second).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::TmdbConfig;

use super::types::{
    genre_name, year_of, CastMember, MovieDetails, SimilarMovie, UpcomingMovie,
};
use super::{CatalogError, MetadataCatalog};

/// Results per page on every TMDB list endpoint.
const TMDB_PAGE_SIZE: u32 = 20;

/// How many cast members to keep from the credits.
const TOP_CAST: usize = 10;

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    image_base_url: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, CatalogError> {
        if config.api_key.is_empty() {
            return Err(CatalogError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string())
            .trim_end_matches('/')
            .to_string();

        let image_base_url = config
            .image_base_url
            .unwrap_or_else(|| "https://image.tmdb.org/t/p".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
            image_base_url,
        })
    }

    fn poster_url(&self, path: Option<String>) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(|p| format!("{}/w500{}", self.image_base_url, p))
    }

    fn backdrop_url(&self, path: Option<String>) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(|p| format!("{}/original{}", self.image_base_url, p))
    }

    /// GET `{base_url}{path}` and decode JSON, mapping TMDB status codes.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => {
                return Err(CatalogError::NotConfigured(
                    "Invalid TMDB API key".to_string(),
                ))
            }
            StatusCode::NOT_FOUND => return Err(CatalogError::NotFound(what.to_string())),
            StatusCode::TOO_MANY_REQUESTS => return Err(CatalogError::RateLimitExceeded),
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(CatalogError::ApiError {
                    status: status.as_u16(),
                    message: body,
                });
            }
            _ => {}
        }

        response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse {} response: {}", what, e))
        })
    }

    async fn imdb_id_for(&self, tmdb_id: u32) -> Result<Option<String>, CatalogError> {
        let ids: TmdbExternalIds = self
            .get_json(
                &format!("/movie/{}/external_ids", tmdb_id),
                &[],
                &format!("external ids of movie {}", tmdb_id),
            )
            .await?;
        Ok(ids.imdb_id.filter(|id| !id.is_empty()))
    }
}

#[async_trait]
impl MetadataCatalog for TmdbClient {
    async fn upcoming_movies(&self, limit: u32) -> Result<Vec<UpcomingMovie>, CatalogError> {
        debug!("TMDB upcoming: limit={}", limit);

        let mut results = Vec::new();
        let mut page = 1;
        loop {
            let response: TmdbPage<TmdbMovieResult> = self
                .get_json(
                    "/movie/upcoming",
                    &[("page", page.to_string())],
                    "upcoming movies",
                )
                .await?;

            let total_pages = response.total_pages.unwrap_or(1);
            results.extend(response.results);

            if results.len() as u32 >= limit || page >= total_pages || page * TMDB_PAGE_SIZE >= limit
            {
                break;
            }
            page += 1;
        }
        results.truncate(limit as usize);

        let mut movies = Vec::with_capacity(results.len());
        for r in results {
            let imdb_id = match self.imdb_id_for(r.id).await {
                Ok(id) => id,
                Err(e) => {
                    warn!("Could not resolve IMDb id for TMDB {}: {}", r.id, e);
                    None
                }
            };

            movies.push(UpcomingMovie {
                tmdb_id: r.id,
                imdb_id,
                genres: r
                    .genre_ids
                    .iter()
                    .filter_map(|id| genre_name(*id))
                    .map(String::from)
                    .collect(),
                poster_url: self.poster_url(r.poster_path),
                title: r.title,
                release_date: r.release_date,
                overview: r.overview,
                vote_average: r.vote_average,
            });
        }

        Ok(movies)
    }

    async fn find_by_imdb(&self, imdb_id: &str) -> Result<Option<u32>, CatalogError> {
        debug!("TMDB find: imdb_id={}", imdb_id);

        let found: TmdbFindResponse = self
            .get_json(
                &format!("/find/{}", imdb_id),
                &[("external_source", "imdb_id".to_string())],
                &format!("IMDb id {}", imdb_id),
            )
            .await?;

        Ok(found.movie_results.first().map(|m| m.id))
    }

    async fn similar_movies(&self, tmdb_id: u32) -> Result<Vec<SimilarMovie>, CatalogError> {
        debug!("TMDB similar: id={}", tmdb_id);

        let page: TmdbPage<TmdbMovieResult> = self
            .get_json(
                &format!("/movie/{}/similar", tmdb_id),
                &[],
                &format!("Movie ID {}", tmdb_id),
            )
            .await?;

        Ok(page
            .results
            .into_iter()
            .map(|r| SimilarMovie {
                tmdb_id: r.id,
                year: year_of(r.release_date.as_deref()),
                poster_url: self.poster_url(r.poster_path),
                title: r.title,
                release_date: r.release_date,
                overview: r.overview,
                vote_average: r.vote_average,
            })
            .collect())
    }

    async fn movie_details(&self, tmdb_id: u32) -> Result<MovieDetails, CatalogError> {
        debug!("TMDB get movie: id={}", tmdb_id);

        let d: TmdbMovieDetails = self
            .get_json(
                &format!("/movie/{}", tmdb_id),
                &[("append_to_response", "videos,credits".to_string())],
                &format!("Movie ID {}", tmdb_id),
            )
            .await?;

        let trailer_key = d.videos.and_then(|v| pick_trailer(v.results));

        let cast = d
            .credits
            .map(|c| {
                c.cast
                    .into_iter()
                    .take(TOP_CAST)
                    .map(|m| CastMember {
                        name: m.name,
                        character: m.character,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(MovieDetails {
            tmdb_id: d.id,
            imdb_id: d.imdb_id.filter(|id| !id.is_empty()),
            year: year_of(d.release_date.as_deref()),
            poster_url: self.poster_url(d.poster_path),
            backdrop_url: self.backdrop_url(d.backdrop_path),
            title: d.title,
            release_date: d.release_date,
            runtime_minutes: d.runtime,
            overview: d.overview,
            genres: d.genres.into_iter().map(|g| g.name).collect(),
            vote_average: d.vote_average,
            vote_count: d.vote_count,
            trailer_key,
            cast,
        })
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbPage<T> {
    results: Vec<T>,
    #[serde(default)]
    total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResult {
    id: u32,
    title: String,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct TmdbExternalIds {
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbFindResponse {
    #[serde(default)]
    movie_results: Vec<TmdbFindResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbFindResult {
    id: u32,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetails {
    id: u32,
    imdb_id: Option<String>,
    title: String,
    release_date: Option<String>,
    runtime: Option<u32>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    vote_average: Option<f32>,
    vote_count: Option<u32>,
    #[serde(default)]
    videos: Option<TmdbVideos>,
    #[serde(default)]
    credits: Option<TmdbCredits>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbVideos {
    #[serde(default)]
    results: Vec<TmdbVideo>,
}

#[derive(Debug, Deserialize)]
struct TmdbVideo {
    key: String,
    site: String,
    #[serde(rename = "type")]
    kind: String,
    official: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TmdbCredits {
    #[serde(default)]
    cast: Vec<TmdbCastMember>,
}

#[derive(Debug, Deserialize)]
struct TmdbCastMember {
    name: String,
    character: Option<String>,
}

/// First official YouTube trailer, else the first YouTube trailer at all.
fn pick_trailer(videos: Vec<TmdbVideo>) -> Option<String> {
    let mut trailers = videos
        .into_iter()
        .filter(|video| video.site == "YouTube" && video.kind == "Trailer");
    let first = trailers.next()?;
    if first.official == Some(true) {
        return Some(first.key);
    }
    trailers
        .find(|video| video.official == Some(true))
        .map(|video| video.key)
        .or(Some(first.key))
}

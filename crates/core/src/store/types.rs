use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::yts::Torrent;

/// Which movie table to read or write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieTable {
    /// `movies_mini`
    #[default]
    Mini,
    /// `movies`
    Full,
}

impl MovieTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            MovieTable::Mini => "movies_mini",
            MovieTable::Full => "movies",
        }
    }

    pub fn all() -> [MovieTable; 2] {
        [MovieTable::Mini, MovieTable::Full]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u32>,
}

/// A persisted movie row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub ratings: Option<Ratings>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub torrents: Vec<Torrent>,
    /// Which upstream produced the last write.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl MovieRecord {
    /// A row with only an id and title set.
    pub fn new(imdb_id: impl Into<String>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            imdb_id: imdb_id.into(),
            title: title.into(),
            poster_url: None,
            year: None,
            genres: Vec::new(),
            plot: None,
            runtime: None,
            ratings: None,
            cast: Vec::new(),
            torrents: Vec::new(),
            source: None,
            release_date: None,
            updated_at: now,
        }
    }
}

/// Fields a sync may refresh on an existing row. Everything else is left as is.
///
/// `None` means "upstream did not say": the stored value is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieEnrichment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Ratings>,
    pub torrents: Vec<Torrent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub table: MovieTable,
}

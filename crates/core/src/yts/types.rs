use serde::{Deserialize, Serialize};

/// A downloadable torrent variant of a movie, in the fixed shape the rest of
/// the system stores and serves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Torrent {
    pub url: String,
    pub hash: String,
    pub quality: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub seeds: u32,
    pub peers: u32,
    /// Human readable size, e.g. "1.65 GB".
    pub size: String,
    pub size_bytes: u64,
    pub date_uploaded: String,
    pub date_uploaded_unix: i64,
}

/// Response envelope shared by every YTS API endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct YtsEnvelope {
    pub status: String,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub data: Option<YtsData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YtsData {
    #[serde(default)]
    pub movie: Option<YtsMovie>,
    #[serde(default)]
    pub movies: Option<Vec<YtsMovie>>,
    #[serde(default)]
    pub movie_count: Option<u32>,
}

impl YtsEnvelope {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// The singular `data.movie`, or else the first of `data.movies`.
    pub fn into_movie(self) -> Option<YtsMovie> {
        let data = self.data?;
        data.movie
            .filter(|m| !m.is_placeholder())
            .or_else(|| data.movies.and_then(|list| list.into_iter().next()))
    }

    pub fn into_movies(self) -> Vec<YtsMovie> {
        self.data.and_then(|d| d.movies).unwrap_or_default()
    }
}

/// Movie payload as returned by the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YtsMovie {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub imdb_code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description_full: Option<String>,
    #[serde(default)]
    pub medium_cover_image: Option<String>,
    #[serde(default)]
    pub large_cover_image: Option<String>,
    #[serde(default)]
    pub torrents: Option<Vec<YtsTorrent>>,
}

impl YtsMovie {
    /// movie_details answers unknown ids with an all-empty movie object.
    fn is_placeholder(&self) -> bool {
        self.id == 0 && self.imdb_code.is_empty() && self.title.is_empty()
    }

    pub fn torrents(&self) -> Vec<Torrent> {
        self.torrents
            .iter()
            .flatten()
            .cloned()
            .map(Torrent::from)
            .collect()
    }

    pub fn plot(&self) -> Option<String> {
        [&self.description_full, &self.summary]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .cloned()
    }

    pub fn poster_url(&self) -> Option<String> {
        self.large_cover_image
            .clone()
            .or_else(|| self.medium_cover_image.clone())
    }

    pub fn genres(&self) -> Vec<String> {
        self.genres.clone().unwrap_or_default()
    }
}

/// Torrent payload as returned by the API; every field may be absent or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YtsTorrent {
    pub url: Option<String>,
    pub hash: Option<String>,
    pub quality: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub seeds: Option<u32>,
    pub peers: Option<u32>,
    pub size: Option<String>,
    pub size_bytes: Option<u64>,
    pub date_uploaded: Option<String>,
    pub date_uploaded_unix: Option<i64>,
}

impl From<YtsTorrent> for Torrent {
    fn from(t: YtsTorrent) -> Self {
        Self {
            url: t.url.unwrap_or_default(),
            hash: t.hash.unwrap_or_default(),
            quality: t.quality.unwrap_or_default(),
            kind: t.kind.unwrap_or_default(),
            seeds: t.seeds.unwrap_or(0),
            peers: t.peers.unwrap_or(0),
            size: t.size.unwrap_or_default(),
            size_bytes: t.size_bytes.unwrap_or(0),
            date_uploaded: t.date_uploaded.unwrap_or_default(),
            date_uploaded_unix: t.date_uploaded_unix.unwrap_or(0),
        }
    }
}

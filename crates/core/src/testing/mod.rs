//! Mock implementations of the upstream traits, for tests.
//!
//! Every mock is configured through async setters and records what it was
//! asked, so tests can assert on call counts without any network.
//!
//! # Example
//!
//! ```rust,ignore
//! use movono_core::testing::{fixtures, MockTorrentIndex};
//!
//! let index = MockTorrentIndex::new();
//! index.add_movie(fixtures::yts_movie("tt0133093", "The Matrix", 2)).await;
//! index.set_details_status("error").await; // force the search fallback
//! ```

mod mock_catalog;
mod mock_index;
mod mock_login;

pub use mock_catalog::MockMetadataCatalog;
pub use mock_index::{MockTorrentIndex, RecordedIndexQuery};
pub use mock_login::MockLoginClient;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;

    use crate::store::MovieRecord;
    use crate::tmdb::{CastMember, MovieDetails, SimilarMovie, UpcomingMovie};
    use crate::yts::{Torrent, YtsMovie, YtsTorrent};

    /// A torrent in the stored shape.
    pub fn torrent(hash: &str, quality: &str) -> Torrent {
        Torrent {
            url: format!("https://yts.example/torrent/download/{}", hash),
            hash: hash.to_string(),
            quality: quality.to_string(),
            kind: "web".to_string(),
            seeds: 100,
            peers: 20,
            size: "1.5 GB".to_string(),
            size_bytes: 1_610_612_736,
            date_uploaded: "2024-01-01 00:00:00".to_string(),
            date_uploaded_unix: 1_704_067_200,
        }
    }

    /// An API movie with `torrent_count` torrents.
    pub fn yts_movie(imdb_id: &str, title: &str, torrent_count: usize) -> YtsMovie {
        let torrents = (0..torrent_count)
            .map(|i| YtsTorrent {
                url: Some(format!("https://yts.example/torrent/{}-{}", imdb_id, i)),
                hash: Some(format!("{}HASH{}", imdb_id.to_uppercase(), i)),
                quality: Some(if i % 2 == 0 { "1080p" } else { "720p" }.to_string()),
                kind: Some("bluray".to_string()),
                seeds: Some(50),
                peers: Some(5),
                size: Some("2.1 GB".to_string()),
                size_bytes: Some(2_254_857_830),
                date_uploaded: None,
                date_uploaded_unix: None,
            })
            .collect();

        YtsMovie {
            id: 1000 + torrent_count as u64,
            imdb_code: imdb_id.to_string(),
            title: title.to_string(),
            year: Some(2020),
            rating: Some(7.0),
            runtime: Some(120),
            genres: Some(vec!["Drama".to_string()]),
            summary: Some(format!("{} summary", title)),
            description_full: None,
            medium_cover_image: None,
            large_cover_image: Some(format!("https://img.example/{}.jpg", imdb_id)),
            torrents: Some(torrents),
        }
    }

    /// An upcoming release; `imdb_id` may be absent like it often is upstream.
    pub fn upcoming_movie(tmdb_id: u32, imdb_id: Option<&str>, title: &str) -> UpcomingMovie {
        UpcomingMovie {
            tmdb_id,
            imdb_id: imdb_id.map(str::to_string),
            title: title.to_string(),
            release_date: Some("2030-06-01".to_string()),
            overview: Some("Coming soon".to_string()),
            poster_url: Some(format!("https://image.tmdb.org/t/p/w500/{}.jpg", tmdb_id)),
            genres: vec!["Action".to_string()],
            vote_average: None,
        }
    }

    pub fn similar_movie(tmdb_id: u32, title: &str) -> SimilarMovie {
        SimilarMovie {
            tmdb_id,
            title: title.to_string(),
            release_date: Some("2003-05-15".to_string()),
            year: Some(2003),
            overview: None,
            poster_url: None,
            vote_average: Some(7.1),
        }
    }

    pub fn movie_details(tmdb_id: u32, imdb_id: &str, title: &str) -> MovieDetails {
        MovieDetails {
            tmdb_id,
            imdb_id: Some(imdb_id.to_string()),
            title: title.to_string(),
            release_date: Some("1999-03-30".to_string()),
            year: Some(1999),
            runtime_minutes: Some(136),
            overview: Some("A hacker learns the truth.".to_string()),
            poster_url: None,
            backdrop_url: None,
            genres: vec!["Action".to_string(), "Science Fiction".to_string()],
            vote_average: Some(8.2),
            vote_count: Some(25000),
            trailer_key: Some("vKQi3bBA1y8".to_string()),
            cast: vec![CastMember {
                name: "Keanu Reeves".to_string(),
                character: Some("Neo".to_string()),
            }],
        }
    }

    /// A stored row with an id, title and optional year.
    pub fn movie_record(imdb_id: &str, title: &str, year: Option<u32>) -> MovieRecord {
        let mut record = MovieRecord::new(imdb_id, title, Utc::now());
        record.year = year;
        record
    }
}

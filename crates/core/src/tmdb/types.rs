use serde::{Deserialize, Serialize};

/// An upcoming release from the metadata API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingMovie {
    pub tmdb_id: u32,
    /// IMDb id (e.g. "tt0133093"); absent for many unreleased titles.
    pub imdb_id: Option<String>,
    pub title: String,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub genres: Vec<String>,
    pub vote_average: Option<f32>,
}

impl UpcomingMovie {
    pub fn year(&self) -> Option<u32> {
        year_of(self.release_date.as_deref())
    }
}

/// A movie in a "similar movies" list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarMovie {
    pub tmdb_id: u32,
    pub title: String,
    pub release_date: Option<String>,
    pub year: Option<u32>,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub vote_average: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
}

/// Movie details with the videos and credits appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub tmdb_id: u32,
    pub imdb_id: Option<String>,
    pub title: String,
    pub release_date: Option<String>,
    pub year: Option<u32>,
    pub runtime_minutes: Option<u32>,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub genres: Vec<String>,
    pub vote_average: Option<f32>,
    pub vote_count: Option<u32>,
    /// YouTube key of the first official trailer.
    pub trailer_key: Option<String>,
    /// Top-billed cast.
    pub cast: Vec<CastMember>,
}

/// Extract year from a `YYYY-MM-DD` date.
pub fn year_of(date: Option<&str>) -> Option<u32> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}

/// TMDB's fixed movie genre ids.
pub fn genre_name(id: u32) -> Option<&'static str> {
    Some(match id {
        28 => "Action",
        12 => "Adventure",
        16 => "Animation",
        35 => "Comedy",
        80 => "Crime",
        99 => "Documentary",
        18 => "Drama",
        10751 => "Family",
        14 => "Fantasy",
        36 => "History",
        27 => "Horror",
        10402 => "Music",
        9648 => "Mystery",
        10749 => "Romance",
        878 => "Science Fiction",
        10770 => "TV Movie",
        53 => "Thriller",
        10752 => "War",
        37 => "Western",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_of() {
        assert_eq!(year_of(Some("1999-03-30")), Some(1999));
        assert_eq!(year_of(Some("")), None);
        assert_eq!(year_of(Some("soon")), None);
        assert_eq!(year_of(None), None);
    }

    #[test]
    fn test_genre_name() {
        assert_eq!(genre_name(878), Some("Science Fiction"));
        assert_eq!(genre_name(1), None);
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

mod profile;

pub use profile::Profile;

/// TMDB genre code
pub type GenreId = u32;

/// A catalog title as handed to the rest of the application.
///
/// Items are read-only snapshots of the external catalog. The watchlist stores
/// them verbatim, so the serialized form keeps the catalog's field names.
/// Deserialization goes through [`TmdbMovie`], which accepts both list-shaped
/// (`genre_ids`) and detail-shaped (`genres: [{id, name}]`) records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "TmdbMovie")]
pub struct ContentItem {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub genre_ids: Vec<GenreId>,
    pub vote_average: f64,
    pub adult: bool,
    pub release_date: Option<NaiveDate>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub original_language: Option<String>,
}

impl ContentItem {
    pub fn has_any_genre(&self, genres: &[GenreId]) -> bool {
        self.genre_ids.iter().any(|id| genres.contains(id))
    }

    pub fn release_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.release_date.map(|d| d.year())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: GenreId,
    #[serde(default)]
    pub name: String,
}

/// A playable trailer reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trailer {
    pub key: String,
    pub name: String,
    pub site: String,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw movie record from TMDB list, search and detail endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Option<Vec<GenreId>>,
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub adult: bool,
    #[serde(default, deserialize_with = "lenient_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
}

impl From<TmdbMovie> for ContentItem {
    fn from(movie: TmdbMovie) -> Self {
        // Detail responses carry {id, name} pairs instead of bare codes
        let genre_ids = match (movie.genre_ids, movie.genres) {
            (Some(ids), _) => ids,
            (None, Some(genres)) => genres.into_iter().map(|g| g.id).collect(),
            (None, None) => Vec::new(),
        };

        ContentItem {
            id: movie.id,
            title: movie.title,
            overview: movie.overview.unwrap_or_default(),
            genre_ids,
            vote_average: movie.vote_average.unwrap_or_default(),
            adult: movie.adult,
            release_date: movie.release_date,
            poster_path: movie.poster_path,
            backdrop_path: movie.backdrop_path,
            original_language: movie.original_language,
        }
    }
}

/// TMDB returns `""` for unknown release dates
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}

/// Paged result wrapper used by every TMDB list endpoint
#[derive(Debug, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbVideo {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

#[derive(Debug, Deserialize)]
pub struct TmdbVideoList {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbGenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

use chrono::{Datelike, NaiveDate};
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};

use super::genre::genre_names;

const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const PLACEHOLDER_POSTER_URL: &str = "https://placehold.co/400x600/666666/ffffff";

/// A catalog movie considered for recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateMovie {
    /// TMDB movie id, echoed unchanged through ranking
    pub id: u64,
    pub title: String,
    /// Absolute poster URL; named `poster_path` on the wire for the UI
    #[serde(rename = "poster_path")]
    pub poster_url: String,
    pub overview: String,
    pub release_date: Option<String>,
    pub release_year: Option<i32>,
    pub vote_average: f64,
    pub genre_ids: Vec<u32>,
}

/// A candidate with the justification for recommending it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedRecommendation {
    #[serde(flatten)]
    pub movie: CandidateMovie,
    pub reasoning: String,
    /// Same value as `vote_average`; the UI displays this field
    pub imdb_rating: f64,
    /// Display names for `genre_ids`
    pub genres: Vec<String>,
}

impl RankedRecommendation {
    pub fn new(movie: CandidateMovie, reasoning: String) -> Self {
        let imdb_rating = movie.vote_average;
        let genres = genre_names(&movie.genre_ids);
        Self {
            movie,
            reasoning,
            imdb_rating,
            genres,
        }
    }

    pub fn id(&self) -> u64 {
        self.movie.id
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Page of results from `GET /discover/movie`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDiscoverResponse {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// Raw movie result from the TMDB discover endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<u32>,
}

/// TMDB sometimes sends `null` where a value is expected; treat it as missing
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<TmdbMovie> for CandidateMovie {
    fn from(movie: TmdbMovie) -> Self {
        let poster_url = match movie.poster_path.as_deref() {
            Some(path) if !path.is_empty() => format!("{}{}", POSTER_BASE_URL, path),
            _ => placeholder_poster_url(&movie.title),
        };

        // TMDB sends "" for unknown release dates
        let release_date = movie.release_date.filter(|d| !d.trim().is_empty());
        let release_year = release_date.as_deref().and_then(release_year);

        CandidateMovie {
            id: movie.id,
            title: movie.title,
            poster_url,
            overview: movie.overview.unwrap_or_default(),
            release_date,
            release_year,
            vote_average: movie.vote_average,
            genre_ids: movie.genre_ids,
        }
    }
}

/// Placeholder image that shows the movie title
pub fn placeholder_poster_url(title: &str) -> String {
    Url::parse_with_params(PLACEHOLDER_POSTER_URL, &[("text", title)])
        .map(String::from)
        .unwrap_or_else(|_| PLACEHOLDER_POSTER_URL.to_string())
}

fn release_year(date: &str) -> Option<i32> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|d| d.year())
        .ok()
        .or_else(|| date.get(..4).and_then(|y| y.parse().ok()))
}

use crate::detail::MovieDetail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A title the user has watched and rated.
///
/// Serialized with the field names used by the stored `watched` list so that
/// existing lists keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedEntry {
    #[serde(rename = "imdbID", alias = "id")]
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: f64,
    pub runtime: u32, // minutes
    #[serde(rename = "userRating")]
    pub user_rating: u8, // 1-10
    /// How many times the rating was changed before the entry was added
    #[serde(rename = "userRatingDecisions", default)]
    pub user_rating_decisions: u32,
    #[serde(rename = "addedAt", default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl WatchedEntry {
    /// Build an entry from a fetched detail record and the user's rating.
    ///
    /// Unparseable runtime or IMDb rating values (`"N/A"`) are stored as 0.
    pub fn from_detail(
        imdb_id: &str,
        detail: &MovieDetail,
        user_rating: u8,
        user_rating_decisions: u32,
    ) -> Self {
        Self {
            imdb_id: imdb_id.to_string(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster: detail.poster.clone(),
            imdb_rating: detail.imdb_rating_value().unwrap_or(0.0),
            runtime: detail.runtime_minutes().unwrap_or(0),
            user_rating,
            user_rating_decisions,
            added_at: Some(Utc::now()),
        }
    }
}

/// Aggregates shown above the watched list.
///
/// Averages are `NaN` when `count` is 0; callers decide how to display that.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime: f64,
}

impl WatchedSummary {
    pub fn from_entries(entries: &[WatchedEntry]) -> Self {
        let imdb: Vec<f64> = entries.iter().map(|e| e.imdb_rating).collect();
        let user: Vec<f64> = entries.iter().map(|e| f64::from(e.user_rating)).collect();
        let runtime: Vec<f64> = entries.iter().map(|e| f64::from(e.runtime)).collect();

        Self {
            count: entries.len(),
            avg_imdb_rating: average(&imdb),
            avg_user_rating: average(&user),
            avg_runtime: average(&runtime),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Arithmetic mean, sum divided by count. An empty slice yields `NaN`.
pub fn average(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

use serde::{Deserialize, Serialize};

/// Full record for a single title, as returned by an OMDb `i=<id>` lookup.
///
/// Every field is optional on the wire; OMDb uses `"N/A"` for unknown values
/// and omits fields entirely on some records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieDetail {
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
    #[serde(rename = "Runtime", default)]
    pub runtime: String, // "148 min"
    #[serde(rename = "Plot", default)]
    pub plot: String,
    #[serde(rename = "Released", default)]
    pub released: String,
    #[serde(rename = "Director", default)]
    pub director: String,
    #[serde(rename = "Actors", default)]
    pub actors: String,
    #[serde(rename = "Genre", default)]
    pub genre: String,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: String,
}

impl MovieDetail {
    /// Runtime in minutes, taken from the leading number of `Runtime`.
    ///
    /// Returns `None` for `"N/A"` or an empty field.
    pub fn runtime_minutes(&self) -> Option<u32> {
        self.runtime
            .split_whitespace()
            .next()
            .and_then(|n| n.parse().ok())
    }

    /// Numeric IMDb rating, or `None` when the API reports `"N/A"`.
    pub fn imdb_rating_value(&self) -> Option<f64> {
        self.imdb_rating.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(runtime: &str, rating: &str) -> MovieDetail {
        MovieDetail {
            runtime: runtime.to_string(),
            imdb_rating: rating.to_string(),
            ..MovieDetail::default()
        }
    }

    #[test]
    fn test_runtime_minutes() {
        assert_eq!(detail("148 min", "").runtime_minutes(), Some(148));
        assert_eq!(detail("90", "").runtime_minutes(), Some(90));
        assert_eq!(detail("N/A", "").runtime_minutes(), None);
        assert_eq!(detail("", "").runtime_minutes(), None);
    }

    #[test]
    fn test_imdb_rating_value() {
        assert_eq!(detail("", "8.8").imdb_rating_value(), Some(8.8));
        assert_eq!(detail("", "N/A").imdb_rating_value(), None);
    }

    #[test]
    fn test_decode_omdb_payload() {
        let json = r#"{
            "Title": "Inception",
            "Year": "2010",
            "Runtime": "148 min",
            "Genre": "Action, Adventure, Sci-Fi",
            "Director": "Christopher Nolan",
            "Actors": "Leonardo DiCaprio, Joseph Gordon-Levitt",
            "Plot": "A thief who steals corporate secrets...",
            "Released": "16 Jul 2010",
            "Poster": "p.jpg",
            "imdbRating": "8.8",
            "imdbID": "tt1375666",
            "Response": "True"
        }"#;

        let detail: MovieDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.title, "Inception");
        assert_eq!(detail.runtime_minutes(), Some(148));
        assert_eq!(detail.imdb_rating_value(), Some(8.8));
        assert_eq!(detail.imdb_id, "tt1375666");
    }
}

use thiserror::Error;

/// Failures of a single search or detail request.
///
/// Only `Network`, `NotFound` and `Decode` are meant to reach the user;
/// `Cancelled` marks a superseded request and is dropped silently.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Something went wrong while fetching data ({0})")]
    Network(String),

    /// The API answered with `Response: "False"`; the message is shown as-is
    #[error("{0}")]
    NotFound(String),

    #[error("request was cancelled")]
    Cancelled,

    #[error("Unexpected response from movie database: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_is_verbatim() {
        let err = FetchError::NotFound("Movie not found!".to_string());
        assert_eq!(err.to_string(), "Movie not found!");
        assert!(!err.is_cancelled());
        assert!(FetchError::Cancelled.is_cancelled());
    }
}

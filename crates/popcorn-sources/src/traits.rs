use crate::error::FetchError;
use async_trait::async_trait;
use popcorn_models::{MovieDetail, SearchResultItem};
use tokio_util::sync::CancellationToken;

/// Remote movie database.
///
/// Implementations must return `FetchError::Cancelled` once `cancel` fires and
/// should stop work on the underlying request as soon as they notice.
#[async_trait]
pub trait MovieApi: Send + Sync {
    fn source_name(&self) -> &str;

    async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResultItem>, FetchError>;

    async fn details(
        &self,
        imdb_id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetail, FetchError>;
}

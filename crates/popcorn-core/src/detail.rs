use crate::fetch::{FetchCycle, FetchState, ReactiveFetch};
use async_trait::async_trait;
use popcorn_models::MovieDetail;
use popcorn_sources::{FetchError, MovieApi};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub type DetailState = FetchState<Option<String>, Option<MovieDetail>>;

impl DetailState {
    pub fn selected_id(&self) -> Option<&str> {
        self.input.as_deref()
    }

    pub fn detail(&self) -> Option<&MovieDetail> {
        self.data.as_ref()
    }
}

pub struct DetailCycle {
    api: Arc<dyn MovieApi>,
}

#[async_trait]
impl FetchCycle for DetailCycle {
    type Input = Option<String>;
    type Output = Option<MovieDetail>;

    fn request_key(&self, selected: &Option<String>) -> Option<String> {
        selected.clone()
    }

    async fn fetch(
        &self,
        imdb_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<MovieDetail>, FetchError> {
        self.api.details(imdb_id, cancel).await.map(Some)
    }
}

/// Fetches the detail record for whichever id is selected.
///
/// Re-fetches on every selection change, with nothing cached between ids.
/// Shares the search fetcher's cancellation: switching selection mid-flight
/// discards the older record.
pub struct DetailFetcher {
    inner: ReactiveFetch<DetailCycle>,
}

impl DetailFetcher {
    pub fn spawn(api: Arc<dyn MovieApi>, selected_rx: watch::Receiver<Option<String>>) -> Self {
        Self {
            inner: ReactiveFetch::spawn(DetailCycle { api }, selected_rx, None),
        }
    }

    pub fn state(&self) -> DetailState {
        self.inner.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.inner.subscribe()
    }

    pub async fn wait_settled(&self) -> DetailState {
        self.inner.wait_settled().await
    }
}

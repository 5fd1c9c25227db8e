use crate::fetch::{CycleCallback, FetchCycle, FetchState, ReactiveFetch};
use async_trait::async_trait;
use popcorn_models::SearchResultItem;
use popcorn_sources::{FetchError, MovieApi};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub type SearchState = FetchState<String, Vec<SearchResultItem>>;

impl SearchState {
    pub fn query(&self) -> &str {
        &self.input
    }

    pub fn items(&self) -> &[SearchResultItem] {
        &self.data
    }
}

pub struct SearchCycle {
    api: Arc<dyn MovieApi>,
    min_query_length: usize,
}

#[async_trait]
impl FetchCycle for SearchCycle {
    type Input = String;
    type Output = Vec<SearchResultItem>;

    fn request_key(&self, query: &String) -> Option<String> {
        if query.chars().count() < self.min_query_length {
            return None;
        }
        Some(query.clone())
    }

    async fn fetch(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResultItem>, FetchError> {
        self.api.search(query, cancel).await
    }
}

/// Keeps search results in step with a query channel.
///
/// Only the most recently issued search can reach the published state.
pub struct SearchFetcher {
    inner: ReactiveFetch<SearchCycle>,
}

impl SearchFetcher {
    pub fn spawn(
        api: Arc<dyn MovieApi>,
        query_rx: watch::Receiver<String>,
        min_query_length: usize,
        on_cycle: Option<CycleCallback>,
    ) -> Self {
        let cycle = SearchCycle {
            api,
            min_query_length,
        };
        Self {
            inner: ReactiveFetch::spawn(cycle, query_rx, on_cycle),
        }
    }

    pub fn state(&self) -> SearchState {
        self.inner.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.subscribe()
    }

    pub async fn wait_settled(&self) -> SearchState {
        self.inner.wait_settled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{result_item, ScriptedApi};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn spawn_with(api: &Arc<ScriptedApi>, query: &str) -> (watch::Sender<String>, SearchFetcher) {
        let (query_tx, query_rx) = watch::channel(query.to_string());
        let fetcher = SearchFetcher::spawn(Arc::clone(api) as Arc<dyn MovieApi>, query_rx, 3, None);
        (query_tx, fetcher)
    }

    #[tokio::test]
    async fn test_short_query_skips_request() {
        let api = Arc::new(ScriptedApi::new());
        let (query_tx, fetcher) = spawn_with(&api, "");

        query_tx.send_replace("in".to_string());
        let state = fetcher.wait_settled().await;

        assert_eq!(state.query(), "in");
        assert!(state.items().is_empty());
        assert_eq!(state.error, None);
        assert!(!state.is_loading);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_short_query_clears_previous_results() {
        let api = Arc::new(ScriptedApi::new());
        let (query_tx, fetcher) = spawn_with(&api, "incep");

        api.wait_for_call("s:incep").await;
        api.reply_search("incep", Ok(vec![result_item("tt1375666", "Inception")]));
        assert_eq!(fetcher.wait_settled().await.items().len(), 1);

        query_tx.send_replace("in".to_string());
        let state = fetcher.wait_settled().await;
        assert!(state.items().is_empty());
        assert_eq!(api.calls(), vec!["s:incep".to_string()]);
    }

    #[tokio::test]
    async fn test_search_success() {
        let api = Arc::new(ScriptedApi::new());
        let (_query_tx, fetcher) = spawn_with(&api, "incep");

        api.wait_for_call("s:incep").await;
        assert!(fetcher.state().is_loading);

        api.reply_search("incep", Ok(vec![result_item("tt1375666", "Inception")]));
        let state = fetcher.wait_settled().await;

        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].imdb_id, "tt1375666");
        assert_eq!(state.items()[0].title, "Inception");
        assert_eq!(state.error, None);
        assert_eq!(api.calls(), vec!["s:incep".to_string()]);
    }

    #[tokio::test]
    async fn test_not_found_surfaces_api_message() {
        let api = Arc::new(ScriptedApi::new());
        let (_query_tx, fetcher) = spawn_with(&api, "zzzzzz");

        api.wait_for_call("s:zzzzzz").await;
        api.reply_search("zzzzzz", Err(FetchError::NotFound("Movie not found!".to_string())));
        let state = fetcher.wait_settled().await;

        assert_eq!(state.error.as_deref(), Some("Movie not found!"));
        assert!(state.items().is_empty());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_new_query_clears_error() {
        let api = Arc::new(ScriptedApi::new());
        let (query_tx, fetcher) = spawn_with(&api, "zzzzzz");

        api.wait_for_call("s:zzzzzz").await;
        api.reply_search("zzzzzz", Err(FetchError::Network("500".to_string())));
        assert!(fetcher.wait_settled().await.error.is_some());

        query_tx.send_replace("matrix".to_string());
        api.wait_for_call("s:matrix").await;
        let loading = fetcher.state();
        assert!(loading.is_loading);
        assert_eq!(loading.error, None);
    }

    #[tokio::test]
    async fn test_last_query_wins_when_stale_response_arrives_late() {
        let api = Arc::new(ScriptedApi::ignoring_cancel());
        let (query_tx, fetcher) = spawn_with(&api, "incep");
        api.wait_for_call("s:incep").await;

        query_tx.send_replace("inter".to_string());
        api.wait_for_call("s:inter").await;

        api.reply_search("inter", Ok(vec![result_item("tt0816692", "Interstellar")]));
        let settled = fetcher.wait_settled().await;
        assert_eq!(settled.items()[0].title, "Interstellar");

        // The superseded request resolves afterwards and must be dropped
        let mut state_rx = fetcher.subscribe();
        state_rx.borrow_and_update();
        api.reply_search("incep", Ok(vec![result_item("tt1375666", "Inception")]));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert!(!state_rx.has_changed().unwrap());
        let state = fetcher.state();
        assert_eq!(state.query(), "inter");
        assert_eq!(state.items()[0].title, "Interstellar");
    }

    #[tokio::test]
    async fn test_stale_error_is_not_surfaced() {
        let api = Arc::new(ScriptedApi::ignoring_cancel());
        let (query_tx, fetcher) = spawn_with(&api, "incep");
        api.wait_for_call("s:incep").await;

        query_tx.send_replace("inter".to_string());
        api.wait_for_call("s:inter").await;

        api.reply_search("incep", Err(FetchError::Network("503".to_string())));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let state = fetcher.state();
        assert!(state.is_loading);
        assert_eq!(state.error, None);

        api.reply_search("inter", Ok(vec![result_item("tt0816692", "Interstellar")]));
        let state = fetcher.wait_settled().await;
        assert_eq!(state.error, None);
        assert_eq!(state.items().len(), 1);
    }

    #[tokio::test]
    async fn test_rapid_changes_issue_one_request_each() {
        let api = Arc::new(ScriptedApi::new());
        let (query_tx, fetcher) = spawn_with(&api, "mat");
        api.wait_for_call("s:mat").await;

        query_tx.send_replace("matr".to_string());
        api.wait_for_call("s:matr").await;
        query_tx.send_replace("matri".to_string());
        api.wait_for_call("s:matri").await;

        api.reply_search("matri", Ok(vec![result_item("tt0133093", "The Matrix")]));
        let state = fetcher.wait_settled().await;

        assert_eq!(state.query(), "matri");
        assert_eq!(state.items()[0].imdb_id, "tt0133093");
        assert_eq!(api.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_drop_mid_request_publishes_nothing() {
        let api = Arc::new(ScriptedApi::ignoring_cancel());
        let (_query_tx, fetcher) = spawn_with(&api, "incep");
        api.wait_for_call("s:incep").await;

        let mut state_rx = fetcher.subscribe();
        state_rx.borrow_and_update();
        drop(fetcher);

        api.reply_search("incep", Ok(vec![result_item("tt1375666", "Inception")]));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert!(!matches!(state_rx.has_changed(), Ok(true)));
        assert!(state_rx.borrow().items().is_empty());
    }

    #[tokio::test]
    async fn test_callback_runs_every_cycle() {
        let api = Arc::new(ScriptedApi::new());
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);

        let (query_tx, query_rx) = watch::channel("ab".to_string());
        let fetcher = SearchFetcher::spawn(
            Arc::clone(&api) as Arc<dyn MovieApi>,
            query_rx,
            3,
            Some(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );
        fetcher.wait_settled().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        query_tx.send_replace("in".to_string());
        fetcher.wait_settled().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        query_tx.send_replace("incep".to_string());
        api.wait_for_call("s:incep").await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}

//! Scripted `MovieApi` for driving fetchers deterministically in tests.

use async_trait::async_trait;
use popcorn_models::{MovieDetail, SearchResultItem};
use popcorn_sources::{FetchError, MovieApi};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

type SearchReply = Result<Vec<SearchResultItem>, FetchError>;
type DetailReply = Result<MovieDetail, FetchError>;

/// Each call parks until the test answers it with `reply_search` /
/// `reply_details`. With `ignore_cancel`, parked calls keep waiting after
/// their token fires, which simulates a transport that does not stop.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    ignore_cancel: bool,
    calls: Mutex<Vec<String>>,
    pending_search: Mutex<HashMap<String, oneshot::Sender<SearchReply>>>,
    pending_details: Mutex<HashMap<String, oneshot::Sender<DetailReply>>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ignoring_cancel() -> Self {
        Self {
            ignore_cancel: true,
            ..Self::default()
        }
    }

    /// Log of issued requests, `s:<query>` or `i:<id>`
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) async fn wait_for_call(&self, call: &str) {
        let wait = async {
            loop {
                if self.calls().iter().any(|c| c == call) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .unwrap_or_else(|_| panic!("request {} was never issued", call));
    }

    pub(crate) fn reply_search(&self, query: &str, reply: SearchReply) {
        let tx = self
            .pending_search
            .lock()
            .unwrap()
            .remove(query)
            .unwrap_or_else(|| panic!("no pending search for {}", query));
        let _ = tx.send(reply);
    }

    pub(crate) fn reply_details(&self, imdb_id: &str, reply: DetailReply) {
        let tx = self
            .pending_details
            .lock()
            .unwrap()
            .remove(imdb_id)
            .unwrap_or_else(|| panic!("no pending detail fetch for {}", imdb_id));
        let _ = tx.send(reply);
    }

    async fn park<T>(
        &self,
        rx: oneshot::Receiver<Result<T, FetchError>>,
        cancel: &CancellationToken,
    ) -> Result<T, FetchError> {
        if self.ignore_cancel {
            return rx.await.unwrap_or(Err(FetchError::Cancelled));
        }
        tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            reply = rx => reply.unwrap_or(Err(FetchError::Cancelled)),
        }
    }
}

#[async_trait]
impl MovieApi for ScriptedApi {
    fn source_name(&self) -> &str {
        "scripted"
    }

    async fn search(&self, query: &str, cancel: &CancellationToken) -> SearchReply {
        let (tx, rx) = oneshot::channel();
        self.pending_search.lock().unwrap().insert(query.to_string(), tx);
        self.calls.lock().unwrap().push(format!("s:{}", query));
        self.park(rx, cancel).await
    }

    async fn details(&self, imdb_id: &str, cancel: &CancellationToken) -> DetailReply {
        let (tx, rx) = oneshot::channel();
        self.pending_details.lock().unwrap().insert(imdb_id.to_string(), tx);
        self.calls.lock().unwrap().push(format!("i:{}", imdb_id));
        self.park(rx, cancel).await
    }
}

pub(crate) fn result_item(imdb_id: &str, title: &str) -> SearchResultItem {
    SearchResultItem {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "2010".to_string(),
        poster: "p.jpg".to_string(),
        media_type: None,
    }
}

pub(crate) fn inception_detail() -> MovieDetail {
    MovieDetail {
        imdb_id: "tt1375666".to_string(),
        title: "Inception".to_string(),
        year: "2010".to_string(),
        poster: "p.jpg".to_string(),
        runtime: "148 min".to_string(),
        imdb_rating: "8.8".to_string(),
        ..MovieDetail::default()
    }
}

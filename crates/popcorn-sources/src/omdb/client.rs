use crate::error::FetchError;
use crate::omdb::api;
use crate::traits::MovieApi;
use async_trait::async_trait;
use popcorn_config::OmdbConfig;
use popcorn_models::{MovieDetail, SearchResultItem};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// HTTP client for the OMDb API. The API key is injected, never global.
#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn from_config(config: &OmdbConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MovieApi for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResultItem>, FetchError> {
        // Dropping the request future on cancel aborts the HTTP call
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Search for '{}' cancelled", query);
                Err(FetchError::Cancelled)
            }
            result = api::search(&self.client, &self.base_url, &self.api_key, query) => result,
        }
    }

    async fn details(
        &self,
        imdb_id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetail, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Detail fetch for {} cancelled", imdb_id);
                Err(FetchError::Cancelled)
            }
            result = api::get_details(&self.client, &self.base_url, &self.api_key, imdb_id) => {
                result
            }
        }
    }
}

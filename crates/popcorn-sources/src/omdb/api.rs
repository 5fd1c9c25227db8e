use crate::error::FetchError;
use popcorn_models::{MovieDetail, SearchResultItem};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<SearchResultItem>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(flatten)]
    detail: MovieDetail,
}

/// OMDb reports logical failures in-band with `Response: "False"`
fn api_failed(response: &str) -> bool {
    response.eq_ignore_ascii_case("false")
}

pub(crate) fn parse_search_body(body: &str) -> Result<Vec<SearchResultItem>, FetchError> {
    let envelope: SearchEnvelope = serde_json::from_str(body)?;
    if api_failed(&envelope.response) {
        let message = envelope.error.unwrap_or_else(|| "Movie not found!".to_string());
        return Err(FetchError::NotFound(message));
    }
    Ok(envelope.search)
}

pub(crate) fn parse_detail_body(imdb_id: &str, body: &str) -> Result<MovieDetail, FetchError> {
    let envelope: DetailEnvelope = serde_json::from_str(body)?;
    if api_failed(&envelope.response) {
        let message = envelope.error.unwrap_or_else(|| "Incorrect IMDb ID.".to_string());
        return Err(FetchError::NotFound(message));
    }

    let mut detail = envelope.detail;
    if detail.imdb_id.is_empty() {
        detail.imdb_id = imdb_id.to_string();
    }
    Ok(detail)
}

async fn get_body(
    client: &Client,
    base_url: &str,
    params: &[(&str, &str)],
) -> Result<String, FetchError> {
    let response = client
        .get(base_url)
        .query(params)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        warn!("OMDb request failed with status {}", status);
        return Err(FetchError::Network(status.to_string()));
    }

    Ok(response.text().await?)
}

/// Search titles matching `query` (`s=` parameter)
pub async fn search(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<Vec<SearchResultItem>, FetchError> {
    debug!("Searching OMDb for '{}'", query);
    let body = get_body(client, base_url, &[("apikey", api_key), ("s", query)]).await?;
    let items = parse_search_body(&body)?;
    debug!("OMDb returned {} results for '{}'", items.len(), query);
    Ok(items)
}

/// Fetch the full record for one title (`i=` parameter)
pub async fn get_details(
    client: &Client,
    base_url: &str,
    api_key: &str,
    imdb_id: &str,
) -> Result<MovieDetail, FetchError> {
    debug!("Fetching OMDb details for {}", imdb_id);
    let body = get_body(client, base_url, &[("apikey", api_key), ("i", imdb_id)]).await?;
    parse_detail_body(imdb_id, &body)
}

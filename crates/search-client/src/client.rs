use reqwest::{header, Client, Response};
use serde_json::Value;

use crate::error::{SearchError, SearchResult};
use crate::models::{SearchRequest, SearchResponse, StockRecord};
use crate::normalize::{parse_details_body, parse_search_body};
use crate::SearchConfig;

/// HTTP client for the stock research backend. One request per call, no
/// retries.
#[derive(Clone)]
pub struct StockSearchClient {
    client: Client,
    config: SearchConfig,
}

impl StockSearchClient {
    pub fn new(config: SearchConfig) -> SearchResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> SearchResult<Self> {
        Self::new(SearchConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Run a natural-language search. The query is sent trimmed, and
    /// whitespace-only queries are rejected before any request is made.
    pub async fn search(&self, query: &str) -> SearchResult<SearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let mut request = SearchRequest::new(query);
        if self.config.include_historical {
            request = request.with_history(self.config.history_days);
        }

        let url = format!("{}/search", self.config.base_url);
        tracing::debug!(%url, query, "Submitting stock search");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;

        let body = read_json(response).await?;
        let result = parse_search_body(&body)?;
        tracing::debug!(count = result.results.len(), "Search returned results");
        Ok(result)
    }

    /// Fetch one symbol's snapshot from `/stocks/{symbol}`.
    pub async fn get_details(&self, symbol: &str) -> SearchResult<StockRecord> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let url = format!(
            "{}/stocks/{}",
            self.config.base_url,
            urlencoding::encode(symbol)
        );
        tracing::debug!(%url, "Fetching stock details");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let body = read_json(response).await?;
        parse_details_body(&body)
    }
}

/// Check status and content type, then parse the body as JSON.
async fn read_json(response: Response) -> SearchResult<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Backend returned an error status");
        return Err(SearchError::Protocol {
            status: status.as_u16(),
            body,
        });
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !content_type.contains("application/json") {
        return Err(SearchError::Format(format!(
            "not JSON (content-type: {})",
            if content_type.is_empty() { "none" } else { content_type.as_str() }
        )));
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| SearchError::Format(e.to_string()))
}

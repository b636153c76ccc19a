use async_trait::async_trait;

use crate::error::SearchResult;
use crate::models::{SearchResponse, StockRecord};
use crate::StockSearchClient;

/// Backend-agnostic interface for stock search.
///
/// The dashboard only talks to this trait, so tests can drive it with an
/// in-memory backend instead of the HTTP client.
#[async_trait]
pub trait StockSearch: Send + Sync {
    async fn search(&self, query: &str) -> SearchResult<SearchResponse>;

    async fn get_details(&self, symbol: &str) -> SearchResult<StockRecord>;

    fn backend_name(&self) -> &'static str;
}

/// HTTP-backed implementation that delegates to `StockSearchClient`.
pub struct HttpSearchProvider {
    client: StockSearchClient,
}

impl HttpSearchProvider {
    pub fn new(client: StockSearchClient) -> Self {
        Self { client }
    }
}

impl From<StockSearchClient> for HttpSearchProvider {
    fn from(client: StockSearchClient) -> Self {
        Self::new(client)
    }
}

#[async_trait]
impl StockSearch for HttpSearchProvider {
    async fn search(&self, query: &str) -> SearchResult<SearchResponse> {
        self.client.search(query).await
    }

    async fn get_details(&self, symbol: &str) -> SearchResult<StockRecord> {
        self.client.get_details(symbol).await
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

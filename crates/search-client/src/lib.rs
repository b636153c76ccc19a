pub mod client;
pub mod error;
pub mod models;
pub mod normalize;
pub mod provider;

pub use client::StockSearchClient;
pub use error::{SearchError, SearchResult};
pub use models::{Analysis, HistoricalData, SearchRequest, SearchResponse, StockRecord};
pub use provider::{HttpSearchProvider, StockSearch};

use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HISTORY_DAYS: u32 = 365;

/// Configuration for the stock search backend
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub include_historical: bool,
    pub history_days: u32,
}

impl SearchConfig {
    /// Built-in defaults pointed at `base_url`, ignoring the environment.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            include_historical: true,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }

    /// Read `STOCK_API_*` variables, falling back to the built-in defaults.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("STOCK_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("STOCK_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let include_historical = std::env::var("STOCK_API_INCLUDE_HISTORICAL")
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(true);

        let history_days = std::env::var("STOCK_API_HISTORY_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HISTORY_DAYS);

        Self {
            timeout: Duration::from_secs(timeout_secs),
            include_historical,
            history_days,
            ..Self::new(base_url)
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

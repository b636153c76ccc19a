use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_historical: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            include_historical: None,
            days: None,
        }
    }

    pub fn with_history(mut self, days: u32) -> Self {
        self.include_historical = Some(true);
        self.days = Some(days);
        self
    }
}

/// Normalized search payload. A backend `error` never reaches this type; it is
/// turned into `SearchError::Application` while parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<StockRecord>,
}

impl SearchResponse {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Parallel date/price sequences. `dates[i]` pairs with `prices[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalData {
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
}

impl HistoricalData {
    pub fn len(&self) -> usize {
        self.dates.len().min(self.prices.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paired points, stopping at the shorter sequence.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.dates
            .iter()
            .map(String::as_str)
            .zip(self.prices.iter().copied())
    }
}

/// Narrative analysis attached to a search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub performance_summary: String,
    pub trading_volume_analysis: String,
    pub technical_signals: String,
    pub market_sentiment: String,
    /// Snake-case metric name to categorical value ("bullish", "weak", ...).
    pub key_metrics: BTreeMap<String, String>,
}

/// One search result: a security's latest snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub current_price: Option<f64>,
    pub daily_change_percent: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap_formatted: Option<String>,
    pub day_low: Option<f64>,
    pub day_high: Option<f64>,
    pub historical_data: HistoricalData,
    pub analysis: Option<Analysis>,
}

impl StockRecord {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }
}

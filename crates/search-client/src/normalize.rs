//! Lenient extraction of backend payloads into the typed model.
//!
//! The backend is loosely typed: any field other than `symbol` may be missing,
//! null, or carry a number as a string. Extraction works field by field over a
//! `serde_json::Value` so one bad field never rejects the whole record.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{SearchError, SearchResult};
use crate::models::{Analysis, HistoricalData, SearchResponse, StockRecord};

/// Top-level `error` message, if the payload carries a truthy one.
pub fn error_message(body: &Value) -> Option<String> {
    let err = body.get("error")?;
    match err {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Turn a `/search` body into a normalized response.
pub fn parse_search_body(body: &Value) -> SearchResult<SearchResponse> {
    if let Some(message) = error_message(body) {
        return Err(SearchError::Application(message));
    }

    let results = body
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::Format("missing `results` array".to_string()))?;

    let records = results
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let record = normalize_record(raw);
            if record.is_none() {
                tracing::warn!(index, "Dropping search result without a symbol");
            }
            record
        })
        .collect();

    Ok(SearchResponse { results: records })
}

/// Turn a `/stocks/{symbol}` body into a single record. Accepts either a bare
/// record or a `results` wrapper, in which case the first entry wins.
pub fn parse_details_body(body: &Value) -> SearchResult<StockRecord> {
    if let Some(message) = error_message(body) {
        return Err(SearchError::Application(message));
    }

    let raw = match body.get("results") {
        Some(Value::Array(items)) => items
            .first()
            .ok_or_else(|| SearchError::Format("empty `results` array".to_string()))?,
        _ => body,
    };

    normalize_record(raw)
        .ok_or_else(|| SearchError::Format("stock record has no symbol".to_string()))
}

/// Build a record from one raw result. Returns `None` only when there is no
/// usable symbol.
pub fn normalize_record(raw: &Value) -> Option<StockRecord> {
    let obj = raw.as_object()?;
    let symbol = parse_string(obj, "symbol").filter(|s| !s.trim().is_empty())?;

    Some(StockRecord {
        symbol,
        name: parse_string(obj, "name"),
        sector: parse_string(obj, "sector"),
        industry: parse_string(obj, "industry"),
        current_price: parse_f64(obj, "current_price"),
        daily_change_percent: parse_f64(obj, "daily_change_percent"),
        volume: parse_f64(obj, "volume"),
        market_cap_formatted: parse_string(obj, "market_cap_formatted"),
        day_low: parse_f64(obj, "day_low"),
        day_high: parse_f64(obj, "day_high"),
        historical_data: obj
            .get("historical_data")
            .map(normalize_historical)
            .unwrap_or_default(),
        analysis: obj.get("analysis").and_then(normalize_analysis),
    })
}

/// Pair dates with prices up to the shorter sequence. Entries that cannot be
/// read keep their slot (empty date / NaN price) so later indices stay aligned.
pub fn normalize_historical(raw: &Value) -> HistoricalData {
    let dates: Vec<String> = raw
        .get("dates")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|d| d.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default();

    let prices: Vec<f64> = raw
        .get("prices")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(|p| value_as_f64(p).unwrap_or(f64::NAN)).collect())
        .unwrap_or_default();

    let len = dates.len().min(prices.len());
    if dates.len() != prices.len() {
        tracing::debug!(
            dates = dates.len(),
            prices = prices.len(),
            "Historical sequences differ in length, truncating"
        );
    }

    HistoricalData {
        dates: dates.into_iter().take(len).collect(),
        prices: prices.into_iter().take(len).collect(),
    }
}

fn normalize_analysis(raw: &Value) -> Option<Analysis> {
    let obj = raw.as_object()?;

    let key_metrics: BTreeMap<String, String> = obj
        .get("key_metrics")
        .and_then(Value::as_object)
        .map(|metrics| {
            metrics
                .iter()
                .filter_map(|(name, value)| {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        _ => return None,
                    };
                    Some((name.clone(), value))
                })
                .collect()
        })
        .unwrap_or_default();

    Some(Analysis {
        performance_summary: parse_string(obj, "performance_summary").unwrap_or_default(),
        trading_volume_analysis: parse_string(obj, "trading_volume_analysis").unwrap_or_default(),
        technical_signals: parse_string(obj, "technical_signals").unwrap_or_default(),
        market_sentiment: parse_string(obj, "market_sentiment").unwrap_or_default(),
        key_metrics,
    })
}

fn parse_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn parse_f64(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(value_as_f64)
}

fn value_as_f64(val: &Value) -> Option<f64> {
    val.as_f64()
        .or_else(|| val.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|v: &f64| v.is_finite())
}

//! Display values for a single result card.
//!
//! Everything here is a pure function of a `StockRecord` (plus "now" for the
//! chart cutoff), so the renderer never has to deal with missing fields.

use chrono::{DateTime, Utc};
use search_client::{Analysis, StockRecord};

use crate::classify::{BadgeStyle, ChangeClass, MetricLevel};
use crate::format::{
    format_change, format_day_range, format_optional_number, format_price, title_case, MISSING,
};
use crate::series::{palette, prepare_series, ChartPalette, PriceSeries};

/// Identity of a rendered card. Expand state belongs to a key, so a new
/// result set with a different symbol at the same slot starts collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardKey {
    pub symbol: String,
    pub index: usize,
}

impl CardKey {
    pub fn new(symbol: impl Into<String>, index: usize) -> Self {
        Self {
            symbol: symbol.into(),
            index,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub label: String,
    pub level: MetricLevel,
}

impl Badge {
    pub fn style(&self) -> BadgeStyle {
        self.level.badge_style()
    }

    pub fn text(&self) -> String {
        format!("{}: {}", self.label, self.level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSection {
    pub title: &'static str,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub symbol: String,
    pub name: String,
    pub subtitle: Option<String>,
    pub price: String,
    pub change: String,
    pub change_class: ChangeClass,
    pub market_cap: String,
    pub volume: String,
    pub day_range: String,
    pub series: Option<PriceSeries>,
    pub palette: ChartPalette,
    pub badges: Vec<Badge>,
    pub sections: Vec<AnalysisSection>,
}

impl CardView {
    pub fn build(record: &StockRecord, now: DateTime<Utc>) -> Self {
        let change_class = ChangeClass::from_percent(record.daily_change_percent);

        let subtitle = match (record.sector.as_deref(), record.industry.as_deref()) {
            (Some(s), Some(i)) => Some(format!("{} | {}", s, i)),
            (Some(s), None) => Some(s.to_string()),
            (None, Some(i)) => Some(i.to_string()),
            (None, None) => None,
        };

        let (badges, sections) = record
            .analysis
            .as_ref()
            .map(|a| (badges(a), sections(a)))
            .unwrap_or_default();

        Self {
            symbol: record.symbol.clone(),
            name: record.name.clone().unwrap_or_default(),
            subtitle,
            price: format_price(record.current_price),
            change: format_change(record.daily_change_percent),
            change_class,
            market_cap: record
                .market_cap_formatted
                .clone()
                .unwrap_or_else(|| MISSING.to_string()),
            volume: format_optional_number(record.volume),
            day_range: format_day_range(record.day_low, record.day_high),
            series: prepare_series(&record.historical_data, now),
            palette: palette(change_class),
            badges,
            sections,
        }
    }

    /// Whether there is anything to show when the card is expanded.
    pub fn has_analysis(&self) -> bool {
        !self.badges.is_empty() || !self.sections.is_empty()
    }
}

fn badges(analysis: &Analysis) -> Vec<Badge> {
    analysis
        .key_metrics
        .iter()
        .map(|(name, value)| Badge {
            label: title_case(name),
            level: MetricLevel::parse(value),
        })
        .collect()
}

fn sections(analysis: &Analysis) -> Vec<AnalysisSection> {
    [
        ("Performance Summary", &analysis.performance_summary),
        ("Trading Volume Analysis", &analysis.trading_volume_analysis),
        ("Technical Signals", &analysis.technical_signals),
        ("Market Sentiment", &analysis.market_sentiment),
    ]
    .into_iter()
    .filter(|(_, body)| !body.trim().is_empty())
    .map(|(title, body)| AnalysisSection {
        title,
        body: body.clone(),
    })
    .collect()
}

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use ratatui::style::Color;
use search_client::HistoricalData;

use crate::classify::ChangeClass;

const SECS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub at: DateTime<Utc>,
    pub price: f64,
}

/// Validated, past-only price history ready for plotting. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// (unix seconds, price) pairs for the chart widget.
    pub fn xy(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.at.timestamp() as f64, p.price))
            .collect()
    }

    /// Time bounds, widened by a day on each side when there is a single point.
    pub fn x_bounds(&self) -> [f64; 2] {
        let (min, max) = min_max(self.points.iter().map(|p| p.at.timestamp() as f64));
        if max > min {
            [min, max]
        } else {
            [min - SECS_PER_DAY, max + SECS_PER_DAY]
        }
    }

    /// Price bounds with a small margin so a flat line is still visible.
    pub fn y_bounds(&self) -> [f64; 2] {
        let (min, max) = min_max(self.points.iter().map(|p| p.price));
        let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
        [min - pad, max + pad]
    }

    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Keep the pairs whose date parses and is not later than `now`, in their
/// original order. `None` means there is nothing to plot.
pub fn prepare_series(hist: &HistoricalData, now: DateTime<Utc>) -> Option<PriceSeries> {
    let points: Vec<PricePoint> = hist
        .pairs()
        .filter_map(|(date, price)| {
            let at = parse_date(date)?;
            (at <= now && price.is_finite()).then_some(PricePoint { at, price })
        })
        .collect();

    if points.is_empty() {
        None
    } else {
        Some(PriceSeries { points })
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD` (midnight UTC) and `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Line and fill colors for a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPalette {
    pub line: Color,
    pub fill: Color,
}

pub fn palette(class: ChangeClass) -> ChartPalette {
    match class {
        ChangeClass::Positive => ChartPalette {
            line: Color::Rgb(46, 204, 113),
            fill: Color::Rgb(14, 36, 24),
        },
        ChangeClass::Negative => ChartPalette {
            line: Color::Rgb(231, 76, 60),
            fill: Color::Rgb(38, 16, 14),
        },
        ChangeClass::Neutral => ChartPalette {
            line: Color::Rgb(148, 163, 184),
            fill: Color::Rgb(24, 26, 32),
        },
    }
}

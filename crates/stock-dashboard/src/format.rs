use chrono::{DateTime, TimeZone};

use crate::classify::ChangeClass;

/// Placeholder for values the backend did not send.
pub const MISSING: &str = "—";

/// Scale a large number to a suffixed unit with two decimals.
pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        return MISSING.to_string();
    }
    if v < 0.0 {
        return format!("-{}", format_number(-v));
    }

    if v >= 1e12 {
        format!("{:.2}T", v / 1e12)
    } else if v >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.2}K", v / 1e3)
    } else {
        format!("{:.2}", v)
    }
}

pub fn format_optional_number(v: Option<f64>) -> String {
    v.map(format_number).unwrap_or_else(|| MISSING.to_string())
}

pub fn format_price(v: Option<f64>) -> String {
    match v {
        Some(p) => format!("${:.2}", p),
        None => MISSING.to_string(),
    }
}

/// Signed percentage; only positive changes get a "+" prefix.
pub fn format_change(pct: Option<f64>) -> String {
    let Some(pct) = pct else {
        return MISSING.to_string();
    };
    format!("{}{:.2}%", ChangeClass::from_percent(Some(pct)).sign_prefix(), pct)
}

pub fn format_day_range(low: Option<f64>, high: Option<f64>) -> String {
    if low.is_none() && high.is_none() {
        return MISSING.to_string();
    }
    format!("{} - {}", format_price(low), format_price(high))
}

/// `trading_volume` -> `Trading Volume`
pub fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Header clock, e.g. `14:03:27`.
pub fn format_clock<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%H:%M:%S").to_string()
}

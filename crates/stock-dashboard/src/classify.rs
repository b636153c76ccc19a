use std::fmt;

/// Direction of a day's price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeClass {
    Positive,
    Negative,
    Neutral,
}

impl ChangeClass {
    /// Missing or NaN changes are neutral, as is exactly zero.
    pub fn from_percent(pct: Option<f64>) -> Self {
        match pct {
            Some(p) if p > 0.0 => ChangeClass::Positive,
            Some(p) if p < 0.0 => ChangeClass::Negative,
            _ => ChangeClass::Neutral,
        }
    }

    pub fn sign_prefix(&self) -> &'static str {
        match self {
            ChangeClass::Positive => "+",
            ChangeClass::Negative | ChangeClass::Neutral => "",
        }
    }
}

/// Categorical value of an analysis key metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricLevel {
    Strong,
    High,
    Bullish,
    Weak,
    Low,
    Bearish,
    Neutral,
    Other(String),
}

impl MetricLevel {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strong" => MetricLevel::Strong,
            "high" => MetricLevel::High,
            "bullish" => MetricLevel::Bullish,
            "weak" => MetricLevel::Weak,
            "low" => MetricLevel::Low,
            "bearish" => MetricLevel::Bearish,
            "neutral" => MetricLevel::Neutral,
            _ => MetricLevel::Other(raw.to_string()),
        }
    }

    pub fn badge_style(&self) -> BadgeStyle {
        match self {
            MetricLevel::Strong | MetricLevel::High | MetricLevel::Bullish => BadgeStyle::Positive,
            MetricLevel::Weak | MetricLevel::Low | MetricLevel::Bearish => BadgeStyle::Negative,
            MetricLevel::Neutral | MetricLevel::Other(_) => BadgeStyle::Neutral,
        }
    }
}

impl fmt::Display for MetricLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MetricLevel::Strong => "strong",
            MetricLevel::High => "high",
            MetricLevel::Bullish => "bullish",
            MetricLevel::Weak => "weak",
            MetricLevel::Low => "low",
            MetricLevel::Bearish => "bearish",
            MetricLevel::Neutral => "neutral",
            MetricLevel::Other(raw) => raw,
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStyle {
    Positive,
    Negative,
    Neutral,
}

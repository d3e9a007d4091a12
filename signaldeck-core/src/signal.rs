//! Canonical signal record and its derived enums.
//!
//! Every display field is a plain `String` carrying `"N/A"` when the upstream
//! document did not provide it, so renderers never branch on presence.
//! `trend` and `action` are always derived from free-text upstream fields and
//! never copied from an upstream enum.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::coalesce::NOT_AVAILABLE;

/// Market direction derived from `classification.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl Trend {
    pub const ALL: [Trend; 3] = [Trend::Bullish, Trend::Bearish, Trend::Neutral];

    /// Keyword match on the upper-cased classification type.
    pub fn from_classification(kind: &str) -> Self {
        let kind = kind.to_uppercase();
        if kind.contains("BULLISH") || kind.contains("BUY") {
            Trend::Bullish
        } else if kind.contains("BEARISH") || kind.contains("SELL") {
            Trend::Bearish
        } else {
            Trend::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Bullish => "bullish",
            Trend::Bearish => "bearish",
            Trend::Neutral => "neutral",
        }
    }

    pub fn is_neutral(self) -> bool {
        self == Trend::Neutral
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended action derived from `recommendation.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Wait,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Buy, Action::Sell, Action::Wait];

    /// Keyword match on the upper-cased recommendation action.
    pub fn from_recommendation(action: &str) -> Self {
        let action = action.to_uppercase();
        if action.contains("BUY") || action.contains("LONG") {
            Action::Buy
        } else if action.contains("SELL") || action.contains("SHORT") {
            Action::Sell
        } else {
            Action::Wait
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
            Action::Wait => "wait",
        }
    }

    pub fn is_wait(self) -> bool {
        self == Action::Wait
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a signal within one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Normalized from the per-pair main document.
    Main,
    /// Normalized from one per-timeframe document.
    Timeframe,
    /// Composite of several timeframe signals.
    Aggregated,
    /// Synthetic placeholder used when nothing could be resolved.
    Sample,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Main => "main",
            DataType::Timeframe => "timeframe",
            DataType::Aggregated => "aggregated",
            DataType::Sample => "sample",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered confidence ladder used when combining timeframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// The level a free-text confidence value mentions (case-insensitive).
    /// Text mentioning neither "high" nor "medium" counts as `Low`.
    pub fn mentioned_in(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("high") {
            ConfidenceLevel::High
        } else if text.contains("medium") {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Ratchet: never returns a level below `self`.
    pub fn raise(self, other: ConfidenceLevel) -> Self {
        self.max(other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "LOW",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::High => "HIGH",
        }
    }
}

/// A count that may be unknown. Serializes as a number or `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Count {
    Known(usize),
    #[default]
    NotAvailable,
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Known(n) => write!(f, "{n}"),
            Count::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Count {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Count::Known(n) => serializer.serialize_u64(*n as u64),
            Count::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Count::Known(n as usize),
            Raw::Text(text) => text.trim().parse().map_or(Count::NotAvailable, Count::Known),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub kind: String,
    pub confidence: String,
    pub confluence_score: String,
    pub win_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: String,
    pub entry_range: String,
    pub targets: String,
    pub stop_loss: String,
    pub risk_reward_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSizing {
    pub confidence_tier: String,
    pub position_size: String,
    pub portfolio_risk: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalAnalysis {
    pub primary_timeframe: String,
    pub trend: String,
    pub volume_confirmation: String,
    pub pattern_strength: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskManagement {
    pub stop_loss_type: String,
    pub reward_targets: Count,
    pub exit_strategy: String,
    pub max_drawdown: String,
}

/// One normalized trading recommendation for a pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub pair: String,
    /// Present only for per-timeframe signals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    /// ISO-8601 timestamp.
    pub timestamp: String,
    pub classification: Classification,
    pub recommendation: Recommendation,
    pub position_sizing: PositionSizing,
    pub technical_analysis: TechnicalAnalysis,
    pub risk_management: RiskManagement,
    pub reasoning: String,
    pub trend: Trend,
    pub action: Action,
    #[serde(rename = "dataType")]
    pub data_type: DataType,
}

impl Signal {
    /// Retag provenance. Consumes `self`; signals are never edited in place
    /// once published.
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::mentioned_in(&self.classification.confidence)
    }

    /// Short human label: `BTC-USDT` or `BTC-USDT 1h`.
    pub fn label(&self) -> String {
        match &self.timeframe {
            Some(tf) => format!("{} {tf}", self.pair),
            None => self.pair.clone(),
        }
    }
}

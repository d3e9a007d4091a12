//! Filter engine: order-preserving selection of signals by four criteria.
//!
//! A criterion is either the wildcard (`"all"`) or a concrete value compared
//! by exact, case-sensitive string equality against the stored field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::signal::Signal;

/// Literal that parses to [`Criterion::All`].
pub const WILDCARD: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Criterion {
    #[default]
    All,
    Is(String),
}

impl Criterion {
    pub fn parse(raw: &str) -> Self {
        if raw == WILDCARD {
            Criterion::All
        } else {
            Criterion::Is(raw.to_string())
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Criterion::All)
    }

    /// A missing field only passes the wildcard.
    pub fn accepts(&self, value: Option<&str>) -> bool {
        match self {
            Criterion::All => true,
            Criterion::Is(wanted) => value == Some(wanted.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Criterion::All => WILDCARD,
            Criterion::Is(v) => v,
        }
    }

    /// Step to the next option: `all` → options[0] → .. → options[n-1] → `all`.
    /// A value not among `options` steps back to `all`.
    pub fn cycle(&self, options: &[String]) -> Criterion {
        let next = match self {
            Criterion::All => options.first(),
            Criterion::Is(current) => options
                .iter()
                .position(|o| o == current)
                .and_then(|i| options.get(i + 1)),
        };
        next.map_or(Criterion::All, |v| Criterion::Is(v.clone()))
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Criterion {
    fn from(raw: &str) -> Self {
        Criterion::parse(raw)
    }
}

impl Serialize for Criterion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Criterion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Criterion::parse(&raw))
    }
}

/// Which filter dimension a UI control drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Pair,
    Timeframe,
    Trend,
    Action,
}

impl FilterField {
    pub const ALL: [FilterField; 4] = [
        FilterField::Pair,
        FilterField::Timeframe,
        FilterField::Trend,
        FilterField::Action,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterField::Pair => "Pair",
            FilterField::Timeframe => "Timeframe",
            FilterField::Trend => "Trend",
            FilterField::Action => "Action",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub pair: Criterion,
    pub timeframe: Criterion,
    pub trend: Criterion,
    pub action: Criterion,
}

impl FilterCriteria {
    /// Every criterion is the wildcard.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_wildcard(&self) -> bool {
        FilterField::ALL.iter().all(|f| self.get(*f).is_wildcard())
    }

    pub fn get(&self, field: FilterField) -> &Criterion {
        match field {
            FilterField::Pair => &self.pair,
            FilterField::Timeframe => &self.timeframe,
            FilterField::Trend => &self.trend,
            FilterField::Action => &self.action,
        }
    }

    pub fn set(&mut self, field: FilterField, criterion: Criterion) {
        match field {
            FilterField::Pair => self.pair = criterion,
            FilterField::Timeframe => self.timeframe = criterion,
            FilterField::Trend => self.trend = criterion,
            FilterField::Action => self.action = criterion,
        }
    }

    pub fn matches(&self, signal: &Signal) -> bool {
        self.pair.accepts(Some(&signal.pair))
            && self.timeframe.accepts(signal.timeframe.as_deref())
            && self.trend.accepts(Some(signal.trend.as_str()))
            && self.action.accepts(Some(signal.action.as_str()))
    }
}

/// Signals passing every criterion, in input order.
pub fn filter<'a>(signals: &'a [Signal], criteria: &FilterCriteria) -> Vec<&'a Signal> {
    signals.iter().filter(|s| criteria.matches(s)).collect()
}

/// Distinct values observed for `field`, in first-seen order. Feeds
/// [`Criterion::cycle`].
pub fn observed_values(signals: &[Signal], field: FilterField) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for signal in signals {
        let value = match field {
            FilterField::Pair => Some(signal.pair.as_str()),
            FilterField::Timeframe => signal.timeframe.as_deref(),
            FilterField::Trend => Some(signal.trend.as_str()),
            FilterField::Action => Some(signal.action.as_str()),
        };
        if let Some(v) = value {
            if !seen.iter().any(|s| s == v) {
                seen.push(v.to_string());
            }
        }
    }
    seen
}

//! Timeframe aggregator: N per-timeframe signals for one pair → one composite.
//!
//! Policy: last non-neutral wins, confidence never goes down.
//!
//! Inputs are expected in ascending horizon order (`1h`, `8h`, `1d`), so a
//! longer horizon overrides a shorter one whenever it has an opinion. The
//! remaining display fields come from the last input.

use chrono::DateTime;

use crate::error::SignalError;
use crate::signal::{Action, ConfidenceLevel, DataType, Signal, Trend};

/// Combine per-timeframe signals for `pair` into one `aggregated` signal.
///
/// Returns `SignalError::EmptyAggregation` for an empty slice; the repository
/// never calls it that way.
pub fn aggregate(pair: &str, signals: &[Signal]) -> Result<Signal, SignalError> {
    let last = signals.last().ok_or_else(|| SignalError::EmptyAggregation {
        pair: pair.to_string(),
    })?;

    let trend = signals
        .iter()
        .map(|s| s.trend)
        .filter(|t| !t.is_neutral())
        .last()
        .unwrap_or(Trend::Neutral);

    let action = signals
        .iter()
        .map(|s| s.action)
        .filter(|a| !a.is_wait())
        .last()
        .unwrap_or(Action::Wait);

    let confidence = signals.iter().fold(ConfidenceLevel::Low, |level, s| {
        level.raise(s.confidence_level())
    });

    let timeframes: Vec<&str> = signals
        .iter()
        .filter_map(|s| s.timeframe.as_deref())
        .collect();

    let mut composite = last.clone();
    composite.pair = pair.to_string();
    composite.timeframe = None;
    composite.timestamp = latest_timestamp(signals).to_string();
    composite.classification.confidence = confidence.as_str().to_string();
    composite.trend = trend;
    composite.action = action;
    composite.reasoning = reasoning(signals.len(), &timeframes);
    Ok(composite.with_data_type(DataType::Aggregated))
}

fn reasoning(count: usize, timeframes: &[&str]) -> String {
    let noun = if count == 1 { "timeframe" } else { "timeframes" };
    if timeframes.is_empty() {
        format!("Aggregated analysis across {count} {noun}.")
    } else {
        format!(
            "Aggregated analysis across {count} {noun} ({}).",
            timeframes.join(", ")
        )
    }
}

/// Latest RFC 3339 timestamp; unparseable values lose to parseable ones.
fn latest_timestamp(signals: &[Signal]) -> &str {
    signals
        .iter()
        .max_by_key(|s| DateTime::parse_from_rfc3339(&s.timestamp).ok())
        .map(|s| s.timestamp.as_str())
        .unwrap_or_default()
}

//! Pair list parsing.
//!
//! Accepts `{ "pairs": [{ "symbol": .. }, ..] }` or a bare array of the same.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::SignalError;

/// Pairs substituted when the configured list cannot be loaded.
pub const FALLBACK_SYMBOLS: [&str; 3] = ["BTC-USDT", "ETH-USDT", "BNB-USDT"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairConfig {
    pub symbol: String,
}

impl PairConfig {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into() }
    }
}

/// Parse a pair-list document. Entries without a non-empty string `symbol`
/// are skipped with a warning. Duplicates are kept; the repository dedups.
pub fn parse_pair_list(doc: &Value) -> Result<Vec<PairConfig>, SignalError> {
    let entries = match doc {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("pairs") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(SignalError::ConfigurationUnavailable(
                    "pair list has no 'pairs' array".into(),
                ))
            }
        },
        _ => {
            return Err(SignalError::ConfigurationUnavailable(
                "pair list is neither an object nor an array".into(),
            ))
        }
    };

    let pairs: Vec<PairConfig> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| match entry.get("symbol").and_then(Value::as_str) {
            Some(symbol) if !symbol.trim().is_empty() => Some(PairConfig::new(symbol.trim())),
            _ => {
                warn!(index = i, entry = %entry, "skipping pair entry without a symbol");
                None
            }
        })
        .collect();

    if pairs.is_empty() {
        return Err(SignalError::ConfigurationUnavailable(
            "pair list contains no usable pairs".into(),
        ));
    }
    Ok(pairs)
}

pub fn fallback_pairs() -> Vec<PairConfig> {
    FALLBACK_SYMBOLS.iter().map(|s| PairConfig::new(*s)).collect()
}

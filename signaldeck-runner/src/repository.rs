//! Signal resolution for the runner.
//!
//! Given a pair list, fetches and normalizes documents and returns one
//! signal per pair. Implements the fallback policy:
//! 1. If the main document normalizes → use it (`main`)
//! 2. Else if any timeframe document normalizes → aggregate them (`aggregated`)
//! 3. Otherwise → the pair is omitted
//!
//! If nothing at all resolves, a single sample signal stands in so the
//! presentation layer always has something to render. Per-document failures
//! are logged and absorbed here; nothing past this module is an error.

use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use signaldeck_core::{
    aggregate, default_timeframes, fallback_pairs, normalize, parse_pair_list, sample_signal,
    DataType, PairConfig, Signal, SignalError,
};

use crate::source::{DocumentSource, FetchError};

/// What happened for one pair during a resolution cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairOutcome {
    pub symbol: String,
    /// The main document was fetched and normalized.
    pub main_loaded: bool,
    /// Timeframe documents were requested during resolution. They are only
    /// fetched when the main document is unusable.
    pub timeframes_checked: bool,
    /// Timeframe codes whose documents normalized, in configured order.
    pub timeframes: Vec<String>,
    /// The per-timeframe signals behind those codes.
    pub timeframe_signals: Vec<Signal>,
    /// The signal chosen for this pair, if any.
    pub signal: Option<Signal>,
}

impl PairOutcome {
    fn missing(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            main_loaded: false,
            timeframes_checked: false,
            timeframes: Vec::new(),
            timeframe_signals: Vec::new(),
            signal: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.signal.is_some()
    }
}

/// Immutable snapshot produced by one resolution cycle.
///
/// Signals are in configuration order and unique by pair.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignalSet {
    signals: Vec<Signal>,
    outcomes: Vec<PairOutcome>,
    timeframes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
}

impl SignalSet {
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn outcomes(&self) -> &[PairOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, pair: &str) -> Option<&PairOutcome> {
        self.outcomes.iter().find(|o| o.symbol == pair)
    }

    pub fn get(&self, pair: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.pair == pair)
    }

    /// Timeframe codes this set was resolved against.
    pub fn timeframes(&self) -> &[String] {
        &self.timeframes
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// True when the only content is the sample placeholder.
    pub fn is_sample(&self) -> bool {
        self.signals.len() == 1 && self.signals[0].data_type == DataType::Sample
    }

    /// User-visible message when even the sample fallback failed.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn into_signals(self) -> Vec<Signal> {
        self.signals
    }

    /// Substitute the sample signal when nothing resolved.
    fn with_fallback(mut self) -> Self {
        if !self.signals.is_empty() {
            return self;
        }
        match sample_signal(Utc::now()) {
            Ok(sample) => {
                warn!("no signals resolved; showing sample signal");
                self.signals.push(sample);
            }
            Err(e) => {
                warn!(error = %e, "sample fallback failed");
                self.notice = Some(format!("No signals could be loaded: {e}"));
            }
        }
        self
    }
}

/// Result of a full refresh: pair list plus resolved set.
#[derive(Debug, Clone, Serialize)]
pub struct Refresh {
    /// Pairs the set was built for (the fallback pairs on config failure).
    pub pairs: Vec<PairConfig>,
    pub set: SignalSet,
    /// Why the configured pair list was not used.
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "display_error")]
    pub config_error: Option<SignalError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

fn display_error<S: serde::Serializer>(
    err: &Option<SignalError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match err {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Resolves pair lists into signal sets against one document source.
///
/// Constructed by the caller and passed where needed; it holds no state
/// between cycles.
pub struct SignalRepository<S> {
    source: S,
    timeframes: Vec<String>,
}

impl<S: DocumentSource> SignalRepository<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            timeframes: default_timeframes(),
        }
    }

    /// Override the timeframe set. Order matters: later timeframes
    /// dominate aggregation.
    pub fn with_timeframes(mut self, timeframes: Vec<String>) -> Self {
        self.timeframes = timeframes;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn timeframes(&self) -> &[String] {
        &self.timeframes
    }

    /// Fetch and parse the configured pair list.
    pub fn load_pairs(&self) -> Result<Vec<PairConfig>, SignalError> {
        let doc = self
            .source
            .fetch_pair_list()
            .map_err(|e| SignalError::ConfigurationUnavailable(e.to_string()))?;
        parse_pair_list(&doc)
    }

    /// Load the pair list and resolve it.
    ///
    /// On `ConfigurationUnavailable` the fallback pairs are reported and the
    /// set holds only the sample signal; no documents are fetched.
    pub fn refresh(&self) -> Refresh {
        match self.load_pairs() {
            Ok(pairs) => {
                let set = self.resolve(&pairs);
                Refresh {
                    notice: set.notice.clone(),
                    pairs,
                    set,
                    config_error: None,
                }
            }
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "using fallback pairs");
                let set = SignalSet {
                    timeframes: self.timeframes.clone(),
                    ..SignalSet::default()
                }
                .with_fallback();
                Refresh {
                    notice: set.notice.clone(),
                    pairs: fallback_pairs(),
                    set,
                    config_error: Some(e),
                }
            }
        }
    }

    /// Resolve `pairs` into a signal set.
    ///
    /// Duplicate symbols are skipped (first occurrence wins). Pairs resolve
    /// concurrently; the result is assembled in configuration order.
    pub fn resolve(&self, pairs: &[PairConfig]) -> SignalSet {
        let mut seen = HashSet::new();
        let unique: Vec<&PairConfig> = pairs
            .iter()
            .filter(|p| {
                let fresh = seen.insert(p.symbol.as_str());
                if !fresh {
                    debug!(symbol = %p.symbol, "skipping duplicate pair");
                }
                fresh
            })
            .collect();

        let outcomes: Vec<PairOutcome> = unique
            .par_iter()
            .map(|pair| self.resolve_pair(&pair.symbol))
            .collect();

        let signals: Vec<Signal> = outcomes.iter().filter_map(|o| o.signal.clone()).collect();
        info!(
            source = self.source.name(),
            pairs = unique.len(),
            resolved = signals.len(),
            "resolution complete"
        );

        SignalSet {
            signals,
            outcomes,
            timeframes: self.timeframes.clone(),
            notice: None,
        }
        .with_fallback()
    }

    /// Resolve a single pair. Timeframe documents are only fetched when the
    /// main document is missing or unusable.
    pub fn resolve_pair(&self, symbol: &str) -> PairOutcome {
        if let Some(signal) = self.load_main(symbol) {
            return PairOutcome {
                main_loaded: true,
                signal: Some(signal),
                ..PairOutcome::missing(symbol)
            };
        }

        let timeframe_signals = self.timeframe_signals(symbol);
        let mut outcome = PairOutcome {
            timeframes_checked: true,
            timeframes: timeframe_signals
                .iter()
                .filter_map(|s| s.timeframe.clone())
                .collect(),
            ..PairOutcome::missing(symbol)
        };

        outcome.signal = if timeframe_signals.is_empty() {
            info!(symbol, "no signal available for pair");
            None
        } else {
            match aggregate(symbol, &timeframe_signals) {
                Ok(composite) => Some(composite),
                Err(e) => {
                    warn!(symbol, error = %e, "aggregation failed");
                    None
                }
            }
        };
        outcome.timeframe_signals = timeframe_signals;
        outcome
    }

    /// Fetch and normalize every configured timeframe document for `symbol`,
    /// in configured order. Used for drill-down views of pairs whose card
    /// came from the main document.
    pub fn timeframe_signals(&self, symbol: &str) -> Vec<Signal> {
        self.timeframes
            .par_iter()
            .map(|tf| self.load_timeframe(symbol, tf))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    fn load_main(&self, symbol: &str) -> Option<Signal> {
        let doc = absorb(symbol, "main", self.source.fetch_main(symbol))?;
        match normalize(&doc, symbol, None) {
            Ok(signal) => Some(signal),
            Err(e) => {
                debug!(symbol, error = %e, "main document unusable");
                None
            }
        }
    }

    fn load_timeframe(&self, symbol: &str, timeframe: &str) -> Option<Signal> {
        let doc = absorb(symbol, timeframe, self.source.fetch_timeframe(symbol, timeframe))?;
        match normalize(&doc, symbol, Some(timeframe)) {
            Ok(signal) => Some(signal.with_data_type(DataType::Timeframe)),
            Err(e) => {
                debug!(symbol, timeframe, error = %e, "timeframe document unusable");
                None
            }
        }
    }
}

/// Turn a fetch failure into absence, logging anything other than a plain
/// missing document.
fn absorb(symbol: &str, what: &str, result: Result<Value, FetchError>) -> Option<Value> {
    match result {
        Ok(doc) => Some(doc),
        Err(e) if e.is_not_found() => {
            debug!(symbol, document = what, "document not found");
            None
        }
        Err(e) => {
            warn!(symbol, document = what, error = %e, "document unavailable");
            None
        }
    }
}

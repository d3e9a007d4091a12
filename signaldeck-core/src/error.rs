//! Structured error types for the signal pipeline.
//!
//! These are designed to be displayable in both CLI and TUI contexts. None of
//! them is fatal: the repository absorbs every variant at the lowest layer.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// A document was retrieved but held no recognisable signal body.
    #[error("no signal body found in document for '{pair}'")]
    EmptyBody { pair: String },

    /// The aggregator was handed zero per-timeframe signals.
    #[error("cannot aggregate zero timeframe signals for '{pair}'")]
    EmptyAggregation { pair: String },

    /// The pair list could not be obtained or contained no usable pairs.
    #[error("pair configuration unavailable: {0}")]
    ConfigurationUnavailable(String),
}

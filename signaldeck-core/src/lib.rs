//! SignalDeck Core: the pure signal pipeline.
//!
//! Upstream analysis documents arrive in several JSON shapes. This crate turns
//! them into one canonical [`Signal`] record and works on those records:
//! - Field coalescing over ordered synonym paths
//! - Shape normalization (wrapped/bare bodies, entry ranges, targets)
//! - Timeframe aggregation (last non-neutral wins, confidence ratchets up)
//! - Filtering and summary statistics
//! - Pair-list parsing and the sample fallback signal
//!
//! No I/O happens here; fetching and orchestration live in `signaldeck-runner`.

pub mod aggregate;
pub mod coalesce;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod pairs;
pub mod sample;
pub mod signal;
pub mod stats;
pub mod timeframe;

pub use aggregate::aggregate;
pub use error::SignalError;
pub use filter::{filter, Criterion, FilterCriteria, FilterField};
pub use normalize::{normalize, normalize_at};
pub use pairs::{fallback_pairs, parse_pair_list, PairConfig};
pub use sample::sample_signal;
pub use signal::{Action, ConfidenceLevel, Count, DataType, Signal, Trend};
pub use stats::SignalStats;
pub use timeframe::{default_timeframes, DEFAULT_TIMEFRAMES};

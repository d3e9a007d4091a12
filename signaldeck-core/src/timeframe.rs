//! Standard analysis horizons.

/// Ascending horizon order. The aggregator lets later entries override
/// earlier ones, so this order decides which horizon dominates.
pub const DEFAULT_TIMEFRAMES: [&str; 3] = ["1h", "8h", "1d"];

pub fn default_timeframes() -> Vec<String> {
    DEFAULT_TIMEFRAMES.iter().map(|s| s.to_string()).collect()
}

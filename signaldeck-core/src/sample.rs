//! Illustrative placeholder signal shown when nothing could be resolved.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::error::SignalError;
use crate::normalize::normalize_at;
use crate::signal::{DataType, Signal};

pub const SAMPLE_PAIR: &str = "BTC-USDT";

/// The embedded sample document, in the bare upstream shape.
pub fn sample_document() -> Value {
    json!({
        "classification": {
            "type": "BULLISH",
            "confidence": "HIGH",
            "confluence_score": 8,
            "win_rate": 75
        },
        "recommendation": {
            "action": "BUY",
            "entry_range": {"min": 45000, "max": 46000},
            "targets": [{"price": 48000}, {"price": 50000}, {"price": 52000}],
            "stop_loss": {"price": 44000}
        },
        "position_sizing": {
            "confidence_tier": "HIGH",
            "position_size": 2.5,
            "portfolio_risk": 1.5
        },
        "technical_analysis": {
            "primary_timeframe": "1d",
            "trend": "UPTREND",
            "volume_confirmation": "HIGH",
            "pattern_strength": "STRONG"
        },
        "risk_management": {
            "stop_loss_type": "FIXED",
            "reward_targets": 3,
            "exit_strategy": "GRADUAL",
            "max_drawdown": 2.5
        },
        "reasoning": "Sample signal data for testing purposes. This is a bullish BTC-USDT \
                      signal with high confidence and strong technical indicators."
    })
}

/// Build the sample through the normal pipeline, stamped `now`.
pub fn sample_signal(now: DateTime<Utc>) -> Result<Signal, SignalError> {
    normalize_at(&sample_document(), SAMPLE_PAIR, None, now)
        .map(|s| s.with_data_type(DataType::Sample))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{Action, Count, Trend};
    use chrono::TimeZone;

    #[test]
    fn sample_is_a_bullish_btc_buy() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let s = sample_signal(now).unwrap();
        assert_eq!(s.pair, "BTC-USDT");
        assert_eq!(s.data_type, DataType::Sample);
        assert_eq!(s.trend, Trend::Bullish);
        assert_eq!(s.action, Action::Buy);
        assert_eq!(s.classification.confidence, "HIGH");
        assert_eq!(s.classification.win_rate, "75");
        assert_eq!(s.recommendation.entry_range, "45000 - 46000");
        assert_eq!(s.recommendation.targets, "48000 - 50000 - 52000");
        assert_eq!(s.recommendation.stop_loss, "44000");
        assert_eq!(s.position_sizing.position_size, "2.5");
        assert_eq!(s.risk_management.reward_targets, Count::Known(3));
        assert_eq!(s.timestamp, "2025-06-01T00:00:00.000Z");
        assert!(s.reasoning.starts_with("Sample signal data for testing purposes."));
    }
}

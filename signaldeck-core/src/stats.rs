//! Summary counters shown above the signal grid.

use serde::Serialize;

use crate::signal::{Action, Signal, Trend};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SignalStats {
    pub total: usize,
    pub bullish: usize,
    pub bearish: usize,
    pub wait: usize,
}

impl SignalStats {
    pub fn from_signals<'a, I>(signals: I) -> Self
    where
        I: IntoIterator<Item = &'a Signal>,
    {
        signals.into_iter().fold(Self::default(), |mut acc, s| {
            acc.total += 1;
            match s.trend {
                Trend::Bullish => acc.bullish += 1,
                Trend::Bearish => acc.bearish += 1,
                Trend::Neutral => {}
            }
            if s.action == Action::Wait {
                acc.wait += 1;
            }
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    fn signal(kind: &str, action: &str) -> Signal {
        let doc = json!({
            "timestamp": "2025-01-01T00:00:00Z",
            "classification": {"type": kind},
            "recommendation": {"action": action}
        });
        normalize(&doc, "BTC-USDT", None).unwrap()
    }

    #[test]
    fn counts_by_trend_and_wait() {
        let set = vec![
            signal("BULLISH", "BUY"),
            signal("BULLISH", "HOLD"),
            signal("BEARISH", "SELL"),
            signal("RANGE", "HOLD"),
        ];
        let stats = SignalStats::from_signals(&set);
        assert_eq!(
            stats,
            SignalStats { total: 4, bullish: 2, bearish: 1, wait: 2 }
        );
    }

    #[test]
    fn empty_set_is_all_zero() {
        assert_eq!(SignalStats::from_signals(&[]), SignalStats::default());
    }

    #[test]
    fn accepts_filtered_references() {
        let set = vec![signal("BULLISH", "BUY"), signal("BEARISH", "SELL")];
        let refs: Vec<&Signal> = set.iter().filter(|s| s.trend == Trend::Bearish).collect();
        let stats = SignalStats::from_signals(refs.iter().copied());
        assert_eq!(stats.total, 1);
        assert_eq!(stats.bearish, 1);
    }
}

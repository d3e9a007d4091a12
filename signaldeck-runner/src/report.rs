//! Data availability report: which documents loaded for which pair.

use serde::Serialize;
use signaldeck_core::DataType;

use crate::repository::Refresh;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairStatus {
    pub symbol: String,
    pub main_loaded: bool,
    /// False when the main document resolved the pair and no timeframe
    /// document was requested; both lists below are then empty.
    pub timeframes_checked: bool,
    pub timeframes_loaded: Vec<String>,
    pub timeframes_missing: Vec<String>,
    /// Provenance of the chosen signal; `None` when the pair is missing.
    pub resolved: Option<DataType>,
}

impl PairStatus {
    pub fn is_missing(&self) -> bool {
        self.resolved.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataStatus {
    pub rows: Vec<PairStatus>,
    pub timeframes: Vec<String>,
    /// The grid is showing the sample placeholder.
    pub sample: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_error: Option<String>,
}

impl DataStatus {
    pub fn from_refresh(refresh: &Refresh) -> Self {
        let timeframes = refresh.set.timeframes().to_vec();
        let mut rows: Vec<PairStatus> = Vec::new();

        for pair in &refresh.pairs {
            if rows.iter().any(|r| r.symbol == pair.symbol) {
                continue;
            }
            let row = match refresh.set.outcome(&pair.symbol) {
                Some(outcome) => PairStatus {
                    symbol: pair.symbol.clone(),
                    main_loaded: outcome.main_loaded,
                    timeframes_checked: outcome.timeframes_checked,
                    timeframes_loaded: outcome.timeframes.clone(),
                    timeframes_missing: timeframes
                        .iter()
                        .filter(|tf| outcome.timeframes_checked && !outcome.timeframes.contains(tf))
                        .cloned()
                        .collect(),
                    resolved: outcome.signal.as_ref().map(|s| s.data_type),
                },
                None => PairStatus {
                    symbol: pair.symbol.clone(),
                    main_loaded: false,
                    timeframes_checked: false,
                    timeframes_loaded: Vec::new(),
                    timeframes_missing: Vec::new(),
                    resolved: None,
                },
            };
            rows.push(row);
        }

        Self {
            rows,
            timeframes,
            sample: refresh.set.is_sample(),
            config_error: refresh.config_error.as_ref().map(|e| e.to_string()),
        }
    }

    pub fn resolved_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_missing()).count()
    }

    pub fn missing(&self) -> impl Iterator<Item = &PairStatus> {
        self.rows.iter().filter(|r| r.is_missing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::SignalRepository;
    use crate::source::StaticSource;
    use serde_json::json;

    fn body() -> serde_json::Value {
        json!({"classification": {"type": "BULLISH"}, "recommendation": {"action": "BUY"}})
    }

    #[test]
    fn rows_follow_pair_list_and_flag_missing() {
        let src = StaticSource::new()
            .with_pair_list(json!({"pairs": [
                {"symbol": "BTC-USDT"}, {"symbol": "ETH-USDT"}, {"symbol": "BTC-USDT"}, {"symbol": "XRP-USDT"}
            ]}))
            .with_main("BTC-USDT", body())
            .with_timeframe("BTC-USDT", "1d", body())
            .with_timeframe("ETH-USDT", "1h", body())
            .with_timeframe("ETH-USDT", "8h", body());
        let refresh = SignalRepository::new(src).refresh();
        let status = DataStatus::from_refresh(&refresh);

        assert_eq!(status.rows.len(), 3);
        let btc = &status.rows[0];
        assert!(btc.main_loaded);
        assert!(!btc.timeframes_checked);
        assert!(btc.timeframes_loaded.is_empty());
        assert!(btc.timeframes_missing.is_empty());
        assert_eq!(btc.resolved, Some(DataType::Main));

        let eth = &status.rows[1];
        assert!(!eth.main_loaded);
        assert!(eth.timeframes_checked);
        assert_eq!(eth.timeframes_loaded, vec!["1h", "8h"]);
        assert_eq!(eth.timeframes_missing, vec!["1d"]);
        assert_eq!(eth.resolved, Some(DataType::Aggregated));

        let xrp = &status.rows[2];
        assert!(xrp.timeframes_checked);
        assert_eq!(xrp.timeframes_missing, vec!["1h", "8h", "1d"]);

        let missing: Vec<&str> = status.missing().map(|r| r.symbol.as_str()).collect();
        assert_eq!(missing, vec!["XRP-USDT"]);
        assert_eq!(status.resolved_count(), 2);
        assert!(!status.sample);
        assert!(status.config_error.is_none());
    }

    #[test]
    fn config_failure_lists_fallback_pairs_as_missing() {
        let refresh = SignalRepository::new(StaticSource::new()).refresh();
        let status = DataStatus::from_refresh(&refresh);
        assert!(status.sample);
        assert!(status.config_error.is_some());
        assert_eq!(status.rows.len(), 3);
        assert_eq!(status.missing().count(), 3);
    }
}

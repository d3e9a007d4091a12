//! Resolution against a site directory on disk.

use std::path::Path;

use proptest::prelude::*;
use serde_json::{json, Value};
use signaldeck_core::{DataType, PairConfig, Trend};
use signaldeck_runner::{DataStatus, DeckConfig, FsSource, SignalRepository, StaticSource};

fn write(root: &Path, relative: &str, doc: &Value) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(doc).unwrap()).unwrap();
}

fn wrapped(kind: &str, action: &str, confidence: &str) -> Value {
    json!({
        "timestamp": "2025-05-01T00:00:00Z",
        "signal": {
            "classification": {"type": kind, "confidence": confidence, "confluence_score": 7},
            "recommendation": {"action": action, "entry_range": [100, 110], "take_profit": [120, 130]},
            "reasoning": "fixture"
        }
    })
}

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "config/pairs.json",
        &json!({"pairs": [
            {"symbol": "BTC-USDT"},
            {"symbol": "ETH-USDT"},
            {"symbol": "BTC-USDT"},
            {"symbol": "SOL-USDT"},
            {"name": "no symbol"}
        ]}),
    );
    write(root, "assets/pairs/BTC-USDT/data-BTC-USDT.json", &wrapped("BULLISH", "BUY", "HIGH"));
    write(root, "assets/pairs/BTC-USDT/data-BTC-USDT-1h.json", &wrapped("BEARISH", "SELL", "LOW"));
    write(root, "assets/pairs/ETH-USDT/data-ETH-USDT-1h.json", &wrapped("RANGE", "HOLD", "LOW"));
    write(root, "assets/pairs/ETH-USDT/data-ETH-USDT-8h.json", &wrapped("BEARISH", "SELL", "MEDIUM"));
    write(root, "assets/pairs/ETH-USDT/data-ETH-USDT-1d.json", &wrapped("RANGE", "HOLD", "LOW"));
    std::fs::write(root.join("assets/pairs/ETH-USDT/graph-ETH-USDT-8h.png"), b"png").unwrap();
    dir
}

#[test]
fn site_directory_resolves_with_fallbacks() {
    let dir = site();
    let repo = SignalRepository::new(FsSource::new(dir.path()));
    let refresh = repo.refresh();

    assert!(refresh.config_error.is_none());
    assert_eq!(refresh.pairs.len(), 4);

    let set = &refresh.set;
    let pairs: Vec<&str> = set.signals().iter().map(|s| s.pair.as_str()).collect();
    assert_eq!(pairs, vec!["BTC-USDT", "ETH-USDT"]);

    let btc = set.get("BTC-USDT").unwrap();
    assert_eq!(btc.data_type, DataType::Main);
    assert_eq!(btc.recommendation.entry_range, "100 - 110");
    assert_eq!(btc.recommendation.targets, "120 - 130");

    let eth = set.get("ETH-USDT").unwrap();
    assert_eq!(eth.data_type, DataType::Aggregated);
    assert_eq!(eth.trend, Trend::Bearish);
    assert_eq!(eth.classification.confidence, "MEDIUM");
    assert_eq!(set.outcome("ETH-USDT").unwrap().timeframe_signals.len(), 3);

    let status = DataStatus::from_refresh(&refresh);
    let missing: Vec<&str> = status.missing().map(|r| r.symbol.as_str()).collect();
    assert_eq!(missing, vec!["SOL-USDT"]);
}

#[test]
fn charts_are_located_on_disk() {
    let dir = site();
    let repo = SignalRepository::new(FsSource::new(dir.path()));
    use signaldeck_runner::DocumentSource;
    assert_eq!(repo.source().chart_location("ETH-USDT", "8h").exists, Some(true));
    assert_eq!(repo.source().chart_location("ETH-USDT", "1h").exists, Some(false));
}

#[test]
fn config_built_source_reads_the_same_site() {
    let dir = site();
    let config = DeckConfig::default().for_dir(dir.path().display().to_string());
    let source = config.build_source().unwrap();
    let repo = SignalRepository::new(source).with_timeframes(config.timeframes.clone());
    assert_eq!(repo.refresh().set.len(), 2);
}

#[test]
fn corrupt_pair_list_falls_back_to_sample() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("config")).unwrap();
    std::fs::write(dir.path().join("config/pairs.json"), "{ broken").unwrap();
    let refresh = SignalRepository::new(FsSource::new(dir.path())).refresh();
    assert!(refresh.config_error.is_some());
    assert_eq!(refresh.set.len(), 1);
    assert!(refresh.set.is_sample());
}

#[test]
fn zero_pairs_resolved_yields_exactly_one_sample() {
    let repo = SignalRepository::new(StaticSource::new());
    let set = repo.resolve(&[]);
    assert_eq!(set.len(), 1);
    assert_eq!(set.signals()[0].data_type, DataType::Sample);
}

proptest! {
    /// However often symbols repeat, each appears at most once.
    #[test]
    fn resolution_is_unique_by_pair(picks in prop::collection::vec(0usize..3, 0..12)) {
        let symbols = ["BTC-USDT", "ETH-USDT", "BNB-USDT"];
        let mut src = StaticSource::new();
        for s in symbols {
            src = src.with_main(s, wrapped("BULLISH", "BUY", "LOW"));
        }
        let repo = SignalRepository::new(src);
        let pairs: Vec<PairConfig> = picks.iter().map(|i| PairConfig::new(symbols[*i])).collect();
        let set = repo.resolve(&pairs);

        let mut seen = std::collections::HashSet::new();
        for s in set.signals() {
            prop_assert!(seen.insert(s.pair.clone()));
        }
        if !picks.is_empty() {
            prop_assert!(!set.is_sample());
        }
    }
}

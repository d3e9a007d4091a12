//! SignalDeck Runner: document sources, resolution, configuration.
//!
//! This crate builds on `signaldeck-core` to provide:
//! - Document sources (static site directory, HTTP, in-memory)
//! - Signal resolution with main → timeframe → sample fallback
//! - TOML deck configuration
//! - Data availability reporting

pub mod config;
pub mod report;
pub mod repository;
pub mod source;

pub use config::{ConfigError, DeckConfig, SourceConfig, SourceKind};
pub use report::{DataStatus, PairStatus};
pub use repository::{PairOutcome, Refresh, SignalRepository, SignalSet};
pub use source::{
    ChartRef, DocumentSource, FetchError, FsSource, HttpSource, SourceLayout, StaticSource,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn snapshots_are_send_sync() {
        assert_send::<SignalSet>();
        assert_sync::<SignalSet>();
        assert_send::<Refresh>();
        assert_sync::<Refresh>();
        assert_send::<DataStatus>();
        assert_sync::<DataStatus>();
    }

    #[test]
    fn repository_is_send_sync() {
        assert_send::<SignalRepository<Box<dyn DocumentSource>>>();
        assert_sync::<SignalRepository<Box<dyn DocumentSource>>>();
        assert_send::<SignalRepository<FsSource>>();
        assert_sync::<SignalRepository<StaticSource>>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<DeckConfig>();
        assert_sync::<DeckConfig>();
        assert_send::<FetchError>();
        assert_sync::<FetchError>();
    }
}

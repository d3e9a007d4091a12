//! Document sources and structured fetch errors.
//!
//! The DocumentSource trait abstracts over where upstream documents live
//! (a static site directory, a web server, in-memory fixtures) so the
//! repository can be driven by any of them and mocked in tests.
//! Every fetch is one best-effort attempt; there are no retries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Structured error types for document retrieval.
///
/// Every variant means "this document is unavailable for this cycle"; the
/// repository treats them identically and only logs the difference.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("document not found: {location}")]
    NotFound { location: String },

    #[error("HTTP {status} for {location}")]
    Status { location: String, status: u16 },

    #[error("network error for {location}: {reason}")]
    Network { location: String, reason: String },

    #[error("invalid JSON in {location}: {reason}")]
    Parse { location: String, reason: String },

    #[error("I/O error reading {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Plain absence, as opposed to a broken source.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FetchError::NotFound { .. } | FetchError::Status { status: 404, .. }
        )
    }
}

/// Path templates for the static dashboard layout.
///
/// `{symbol}` and `{timeframe}` are substituted literally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLayout {
    pub pair_list: String,
    pub main: String,
    pub timeframe: String,
    pub chart: String,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            pair_list: "config/pairs.json".into(),
            main: "assets/pairs/{symbol}/data-{symbol}.json".into(),
            timeframe: "assets/pairs/{symbol}/data-{symbol}-{timeframe}.json".into(),
            chart: "assets/pairs/{symbol}/graph-{symbol}-{timeframe}.png".into(),
        }
    }
}

impl SourceLayout {
    pub fn main_path(&self, symbol: &str) -> String {
        render(&self.main, symbol, "")
    }

    pub fn timeframe_path(&self, symbol: &str, timeframe: &str) -> String {
        render(&self.timeframe, symbol, timeframe)
    }

    pub fn chart_path(&self, symbol: &str, timeframe: &str) -> String {
        render(&self.chart, symbol, timeframe)
    }
}

fn render(template: &str, symbol: &str, timeframe: &str) -> String {
    template
        .replace("{symbol}", symbol)
        .replace("{timeframe}", timeframe)
}

/// Where a chart artifact lives. `exists` is `None` when the source cannot
/// tell without fetching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartRef {
    pub timeframe: String,
    pub location: String,
    pub exists: Option<bool>,
}

/// Trait for upstream document sources.
///
/// Implementations only retrieve and parse JSON; interpreting the documents
/// is the normalizer's job.
pub trait DocumentSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    fn fetch_pair_list(&self) -> Result<Value, FetchError>;

    fn fetch_main(&self, symbol: &str) -> Result<Value, FetchError>;

    fn fetch_timeframe(&self, symbol: &str, timeframe: &str) -> Result<Value, FetchError>;

    /// Location of the rendered chart for one pair and timeframe.
    fn chart_location(&self, symbol: &str, timeframe: &str) -> ChartRef;
}

impl<T: DocumentSource + ?Sized> DocumentSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_pair_list(&self) -> Result<Value, FetchError> {
        (**self).fetch_pair_list()
    }

    fn fetch_main(&self, symbol: &str) -> Result<Value, FetchError> {
        (**self).fetch_main(symbol)
    }

    fn fetch_timeframe(&self, symbol: &str, timeframe: &str) -> Result<Value, FetchError> {
        (**self).fetch_timeframe(symbol, timeframe)
    }

    fn chart_location(&self, symbol: &str, timeframe: &str) -> ChartRef {
        (**self).chart_location(symbol, timeframe)
    }
}

// ── Filesystem ───────────────────────────────────────────────────────

/// A directory laid out like the static dashboard site.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    layout: SourceLayout,
    name: String,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = format!("fs:{}", root.display());
        Self {
            root,
            layout: SourceLayout::default(),
            name,
        }
    }

    pub fn with_layout(mut self, layout: SourceLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_json(&self, relative: &str) -> Result<Value, FetchError> {
        let path = self.root.join(relative);
        let location = path.display().to_string();
        debug!(%location, "reading document");
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound {
                    location: location.clone(),
                }
            } else {
                FetchError::Io {
                    location: location.clone(),
                    source: e,
                }
            }
        })?;
        serde_json::from_str(&content).map_err(|e| FetchError::Parse {
            location,
            reason: e.to_string(),
        })
    }
}

impl DocumentSource for FsSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_pair_list(&self) -> Result<Value, FetchError> {
        self.read_json(&self.layout.pair_list)
    }

    fn fetch_main(&self, symbol: &str) -> Result<Value, FetchError> {
        self.read_json(&self.layout.main_path(symbol))
    }

    fn fetch_timeframe(&self, symbol: &str, timeframe: &str) -> Result<Value, FetchError> {
        self.read_json(&self.layout.timeframe_path(symbol, timeframe))
    }

    fn chart_location(&self, symbol: &str, timeframe: &str) -> ChartRef {
        let path = self.root.join(self.layout.chart_path(symbol, timeframe));
        ChartRef {
            timeframe: timeframe.to_string(),
            exists: Some(path.is_file()),
            location: path.display().to_string(),
        }
    }
}

// ── HTTP ─────────────────────────────────────────────────────────────

/// The same layout served over HTTP.
///
/// Every request carries a `v=<millis>` query parameter so intermediate
/// caches never serve a previous cycle's document.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
    layout: SourceLayout,
    name: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("signaldeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network {
                location: base_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        let name = format!("http:{base_url}");
        Ok(Self {
            client,
            base_url,
            layout: SourceLayout::default(),
            name,
        })
    }

    pub fn with_layout(mut self, layout: SourceLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url, relative.trim_start_matches('/'))
    }

    fn get_json(&self, relative: &str) -> Result<Value, FetchError> {
        let location = self.url_for(relative);
        let stamp = Utc::now().timestamp_millis().to_string();
        debug!(%location, "fetching document");

        let resp = self
            .client
            .get(&location)
            .query(&[("v", stamp.as_str())])
            .send()
            .map_err(|e| FetchError::Network {
                location: location.clone(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location,
                status: status.as_u16(),
            });
        }

        resp.json::<Value>().map_err(|e| FetchError::Parse {
            location,
            reason: e.to_string(),
        })
    }
}

impl DocumentSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_pair_list(&self) -> Result<Value, FetchError> {
        self.get_json(&self.layout.pair_list)
    }

    fn fetch_main(&self, symbol: &str) -> Result<Value, FetchError> {
        self.get_json(&self.layout.main_path(symbol))
    }

    fn fetch_timeframe(&self, symbol: &str, timeframe: &str) -> Result<Value, FetchError> {
        self.get_json(&self.layout.timeframe_path(symbol, timeframe))
    }

    fn chart_location(&self, symbol: &str, timeframe: &str) -> ChartRef {
        ChartRef {
            timeframe: timeframe.to_string(),
            location: self.url_for(&self.layout.chart_path(symbol, timeframe)),
            exists: None,
        }
    }
}

// ── In-memory ────────────────────────────────────────────────────────

/// In-memory documents keyed by layout path. Records every request so tests
/// can assert on fetch behaviour.
#[derive(Debug, Default)]
pub struct StaticSource {
    layout: SourceLayout,
    documents: HashMap<String, Value>,
    charts: Vec<String>,
    requests: Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair_list(mut self, doc: Value) -> Self {
        self.documents.insert(self.layout.pair_list.clone(), doc);
        self
    }

    pub fn with_main(mut self, symbol: &str, doc: Value) -> Self {
        self.documents.insert(self.layout.main_path(symbol), doc);
        self
    }

    pub fn with_timeframe(mut self, symbol: &str, timeframe: &str, doc: Value) -> Self {
        self.documents
            .insert(self.layout.timeframe_path(symbol, timeframe), doc);
        self
    }

    pub fn with_chart(mut self, symbol: &str, timeframe: &str) -> Self {
        self.charts.push(self.layout.chart_path(symbol, timeframe));
        self
    }

    /// Every location requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn get(&self, location: String) -> Result<Value, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(location.clone());
        }
        self.documents
            .get(&location)
            .cloned()
            .ok_or(FetchError::NotFound { location })
    }
}

impl DocumentSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_pair_list(&self) -> Result<Value, FetchError> {
        self.get(self.layout.pair_list.clone())
    }

    fn fetch_main(&self, symbol: &str) -> Result<Value, FetchError> {
        self.get(self.layout.main_path(symbol))
    }

    fn fetch_timeframe(&self, symbol: &str, timeframe: &str) -> Result<Value, FetchError> {
        self.get(self.layout.timeframe_path(symbol, timeframe))
    }

    fn chart_location(&self, symbol: &str, timeframe: &str) -> ChartRef {
        let location = self.layout.chart_path(symbol, timeframe);
        ChartRef {
            timeframe: timeframe.to_string(),
            exists: Some(self.charts.contains(&location)),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn layout_renders_dashboard_paths() {
        let layout = SourceLayout::default();
        assert_eq!(layout.main_path("BTC-USDT"), "assets/pairs/BTC-USDT/data-BTC-USDT.json");
        assert_eq!(
            layout.timeframe_path("ETH-USDT", "8h"),
            "assets/pairs/ETH-USDT/data-ETH-USDT-8h.json"
        );
        assert_eq!(
            layout.chart_path("ETH-USDT", "1d"),
            "assets/pairs/ETH-USDT/graph-ETH-USDT-1d.png"
        );
    }

    #[test]
    fn fs_source_reads_and_classifies_errors() {
        let dir = tempfile::tempdir().unwrap();
        let pair_dir = dir.path().join("assets/pairs/BTC-USDT");
        std::fs::create_dir_all(&pair_dir).unwrap();
        std::fs::write(pair_dir.join("data-BTC-USDT.json"), r#"{"reasoning": "ok"}"#).unwrap();
        std::fs::write(pair_dir.join("data-BTC-USDT-1h.json"), "{not json").unwrap();
        std::fs::write(pair_dir.join("graph-BTC-USDT-1d.png"), b"\x89PNG").unwrap();

        let src = FsSource::new(dir.path());
        assert_eq!(src.fetch_main("BTC-USDT").unwrap(), json!({"reasoning": "ok"}));
        assert!(matches!(
            src.fetch_timeframe("BTC-USDT", "1h"),
            Err(FetchError::Parse { .. })
        ));
        let missing = src.fetch_timeframe("BTC-USDT", "8h").unwrap_err();
        assert!(missing.is_not_found());
        assert!(src.fetch_pair_list().unwrap_err().is_not_found());

        assert_eq!(src.chart_location("BTC-USDT", "1d").exists, Some(true));
        assert_eq!(src.chart_location("BTC-USDT", "1h").exists, Some(false));
    }

    #[test]
    fn static_source_records_requests() {
        let src = StaticSource::new().with_main("BTC-USDT", json!({"reasoning": "x"}));
        assert!(src.fetch_main("BTC-USDT").is_ok());
        assert!(src.fetch_timeframe("BTC-USDT", "1h").is_err());
        assert_eq!(
            src.requests(),
            vec![
                "assets/pairs/BTC-USDT/data-BTC-USDT.json".to_string(),
                "assets/pairs/BTC-USDT/data-BTC-USDT-1h.json".to_string(),
            ]
        );
    }

    #[test]
    fn http_source_builds_urls_without_double_slashes() {
        let src = HttpSource::new("https://example.org/deck/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            src.url_for("config/pairs.json"),
            "https://example.org/deck/config/pairs.json"
        );
        let chart = src.chart_location("BTC-USDT", "1h");
        assert_eq!(
            chart.location,
            "https://example.org/deck/assets/pairs/BTC-USDT/graph-BTC-USDT-1h.png"
        );
        assert_eq!(chart.exists, None);
    }

    #[test]
    fn status_404_counts_as_not_found() {
        let e = FetchError::Status { location: "x".into(), status: 404 };
        assert!(e.is_not_found());
        let e = FetchError::Status { location: "x".into(), status: 500 };
        assert!(!e.is_not_found());
    }
}

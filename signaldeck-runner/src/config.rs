//! Deck configuration: where documents come from and which timeframes to read.
//!
//! Stored as TOML:
//!
//! ```toml
//! timeframes = ["1h", "8h", "1d"]
//!
//! [source]
//! kind = "fs"            # or "http"
//! root = "site"          # directory for fs, base URL for http
//! timeout_secs = 10
//!
//! [layout]               # optional path template overrides
//! main = "assets/pairs/{symbol}/data-{symbol}.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use signaldeck_core::default_timeframes;

use crate::source::{DocumentSource, FetchError, FsSource, HttpSource, SourceLayout};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("cannot build document source: {0}")]
    Source(#[from] FetchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Fs,
    Http,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Directory for `fs`, base URL for `http`.
    pub root: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Fs,
            root: ".".into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Ascending horizon order; later entries dominate aggregation.
    pub timeframes: Vec<String>,
    pub source: SourceConfig,
    pub layout: SourceLayout,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            timeframes: default_timeframes(),
            source: SourceConfig::default(),
            layout: SourceLayout::default(),
        }
    }
}

impl DeckConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Point at a local site directory.
    pub fn for_dir(mut self, dir: impl Into<String>) -> Self {
        self.source.kind = SourceKind::Fs;
        self.source.root = dir.into();
        self
    }

    /// Point at a web server.
    pub fn for_url(mut self, url: impl Into<String>) -> Self {
        self.source.kind = SourceKind::Http;
        self.source.root = url.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeframes.is_empty() {
            return Err(ConfigError::Invalid("timeframes must not be empty".into()));
        }
        if let Some(tf) = self.timeframes.iter().find(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("blank timeframe code {tf:?}")));
        }
        if self.source.root.trim().is_empty() {
            return Err(ConfigError::Invalid("source.root must not be empty".into()));
        }
        if self.source.kind == SourceKind::Http {
            if self.source.timeout_secs == 0 {
                return Err(ConfigError::Invalid("source.timeout_secs must be positive".into()));
            }
            if !(self.source.root.starts_with("http://") || self.source.root.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "source.root must be an http(s) URL for kind = \"http\", got {:?}",
                    self.source.root
                )));
            }
        }
        Ok(())
    }

    /// Build the configured document source.
    pub fn build_source(&self) -> Result<Box<dyn DocumentSource>, ConfigError> {
        self.validate()?;
        let source: Box<dyn DocumentSource> = match self.source.kind {
            SourceKind::Fs => {
                Box::new(FsSource::new(&self.source.root).with_layout(self.layout.clone()))
            }
            SourceKind::Http => Box::new(
                HttpSource::new(&self.source.root, Duration::from_secs(self.source.timeout_secs))?
                    .with_layout(self.layout.clone()),
            ),
        };
        Ok(source)
    }
}

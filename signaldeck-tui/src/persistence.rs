//! Display preference persistence: JSON save/load across restarts.
//!
//! Only the theme flag is stored; signals are always fetched fresh.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::theme::ThemeMode;

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub theme: ThemeMode,
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        theme: app.theme_mode,
    }
}

pub fn apply(app: &mut AppState, state: PersistedState) {
    app.theme_mode = state.theme;
}

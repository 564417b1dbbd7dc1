//! Persisted engine settings (`settings.yaml`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, SyncError};
use crate::paths;

/// Backups kept by default when rotation runs.
pub const DEFAULT_BACKUP_RETENTION: usize = 7;

/// Tunables read from `<root>/etc/curator/settings.yaml`.
///
/// Every field has a default, so a missing or partial file is fine. A
/// retention of `0` disables backup rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backup_retention: usize,
    pub export_all_entities: bool,
    pub export_domains: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backup_retention: DEFAULT_BACKUP_RETENTION,
            export_all_entities: false,
            export_domains: Vec::new(),
        }
    }
}

/// Load settings from `<root>/etc/curator/settings.yaml`.
///
/// A missing file yields `Settings::default()`; a malformed one is a
/// `Parse` error with path context.
pub fn load_at(root: &Path) -> Result<Settings, SyncError> {
    let path = paths::settings_path(root);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| SyncError::Parse { path, source: e })
}

/// Atomically save settings to `<root>/etc/curator/settings.yaml`.
pub fn save_at(root: &Path, settings: &Settings) -> Result<(), SyncError> {
    let path = paths::settings_path(root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let yaml = serde_yaml::to_string(settings)?;
    let tmp = path.with_file_name(format!("{}.tmp", paths::SETTINGS_FILENAME));
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

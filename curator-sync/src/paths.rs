//! Storage layout and path resolution.
//!
//! ```text
//! <root>/
//!   etc/curator/
//!     overrides.yaml
//!     settings.yaml
//!     backups/
//!       overrides-YYYYMMDD-HHMMSS.yaml
//! ```
//!
//! All functions here are pure path arithmetic; nothing touches the
//! filesystem.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Main override document file name.
pub const OVERRIDES_FILENAME: &str = "overrides.yaml";

/// Settings file name.
pub const SETTINGS_FILENAME: &str = "settings.yaml";

/// Backup directory name under the base directory.
pub const BACKUPS_DIRNAME: &str = "backups";

/// Backup file name prefix and suffix; see [`backup_file_name`].
pub const BACKUP_PREFIX: &str = "overrides-";
pub const BACKUP_SUFFIX: &str = ".yaml";

/// `<root>/etc/curator/`
pub fn base_dir(root: &Path) -> PathBuf {
    root.join("etc").join("curator")
}

/// `<root>/etc/curator/overrides.yaml`
pub fn overrides_path(root: &Path) -> PathBuf {
    base_dir(root).join(OVERRIDES_FILENAME)
}

/// `<root>/etc/curator/settings.yaml`
pub fn settings_path(root: &Path) -> PathBuf {
    base_dir(root).join(SETTINGS_FILENAME)
}

/// `<root>/etc/curator/backups/`
pub fn backups_dir(root: &Path) -> PathBuf {
    base_dir(root).join(BACKUPS_DIRNAME)
}

/// Resolve an optional caller-supplied path against the config root.
///
/// Absent or empty → `default`; relative → joined under `root`; absolute →
/// taken as-is.
pub fn resolve(root: &Path, requested: Option<&Path>, default: PathBuf) -> PathBuf {
    match requested {
        None => default,
        Some(p) if p.as_os_str().is_empty() => default,
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => root.join(p),
    }
}

/// Timestamped backup file name for an export instant.
///
/// The fixed-width stamp makes lexicographic name order equal chronological
/// order, which rotation relies on.
pub fn backup_file_name(at: DateTime<Utc>) -> String {
    format!(
        "{}{}{}",
        BACKUP_PREFIX,
        at.format("%Y%m%d-%H%M%S"),
        BACKUP_SUFFIX
    )
}

/// True iff `name` looks like a file produced by [`backup_file_name`].
pub fn is_backup_name(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

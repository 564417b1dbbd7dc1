//! Timestamped override backups and retention pruning.
//!
//! A backup is a copy of the previous override file, named after the export
//! instant. Rotation keeps the newest `keep` files. Failures in here are
//! logged and swallowed; backup hygiene must never fail an export.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{io_err, SyncError};
use crate::paths;

/// Copy the current override file into `backups_dir` under a timestamped
/// name.
///
/// Returns the backup path, or `None` when there is no current file to
/// archive (first export). The copy leaves the live file in place.
pub fn archive(
    current: &Path,
    backups_dir: &Path,
    at: DateTime<Utc>,
) -> Result<Option<PathBuf>, SyncError> {
    if !current.exists() {
        tracing::debug!("no previous overrides at {}; skipping backup", current.display());
        return Ok(None);
    }
    std::fs::create_dir_all(backups_dir).map_err(|e| io_err(backups_dir, e))?;
    let dest = backups_dir.join(paths::backup_file_name(at));
    std::fs::copy(current, &dest).map_err(|e| io_err(&dest, e))?;
    tracing::info!("archived {} -> {}", current.display(), dest.display());
    Ok(Some(dest))
}

/// All entries in `backups_dir` matching the backup naming scheme, in
/// ascending name order (oldest first). A missing directory yields an empty
/// list.
///
/// No file-type filter: a directory that happens to match the pattern is
/// listed and later fails deletion harmlessly.
pub fn list_backups(backups_dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(backups_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            tracing::warn!("cannot list backups in {}: {err}", backups_dir.display());
            return Vec::new();
        }
    };
    let mut backups: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(paths::is_backup_name)
                .unwrap_or(false)
        })
        .collect();
    backups.sort();
    backups
}

/// Delete all but the newest `keep` backups.
///
/// `keep == 0` disables rotation entirely. Returns the number of files
/// deleted; per-file failures are logged at warn level and skipped.
pub fn rotate(backups_dir: &Path, keep: usize) -> usize {
    if keep == 0 {
        return 0;
    }
    let mut backups = list_backups(backups_dir);
    backups.reverse(); // newest first
    let mut deleted = 0;
    for path in backups.iter().skip(keep) {
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!("pruned backup: {}", path.display());
                deleted += 1;
            }
            Err(err) => {
                tracing::warn!("failed to prune backup {}: {err}", path.display());
            }
        }
    }
    deleted
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

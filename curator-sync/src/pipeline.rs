//! Export / import entrypoints sequencing serializer, backups, and applier.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;

use curator_core::types::OverrideDocument;
use curator_core::{AreaLookup, EntityRegistry};

use crate::apply::{self, ImportSummary};
use crate::backup;
use crate::error::{io_err, SyncError};
use crate::paths;
use crate::serialize;
use crate::settings::Settings;

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Options for an export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Write the main override file.
    pub write_overrides: bool,
    /// Archive the previous file and rotate old backups.
    pub write_backup: bool,
    /// Include entities without overrides as empty records.
    pub include_all: bool,
    /// Target path; `None` means `<root>/etc/curator/overrides.yaml`.
    pub path: Option<PathBuf>,
    /// Restrict the export to these domains (empty = all).
    pub include_domains: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            write_overrides: true,
            write_backup: true,
            include_all: false,
            path: None,
            include_domains: Vec::new(),
        }
    }
}

/// Outcome of an export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Resolved target path, whether or not it was written.
    pub path: PathBuf,
    pub overrides_written: bool,
    /// False on a first export: there was no previous file to archive.
    pub backup_written: bool,
    pub backup_path: Option<PathBuf>,
    /// Entities in the exported document.
    pub entities: usize,
    /// Backups deleted by rotation.
    pub pruned: usize,
}

/// Serialize the registry and write the override document.
///
/// Sequencing: build the document, archive the previous file and rotate
/// (when `write_backup`), then atomically write (when `write_overrides`).
/// The archive precedes the write so the previous state is never the only
/// copy at risk.
pub fn export<R: EntityRegistry + ?Sized>(
    registry: &R,
    root: &Path,
    settings: &Settings,
    options: &ExportOptions,
) -> Result<ExportReport, SyncError> {
    let now = Utc::now();
    let doc = serialize::build_document(
        &registry.list_entities(),
        &options.include_domains,
        options.include_all,
        now,
    );
    let target = paths::resolve(root, options.path.as_deref(), paths::overrides_path(root));
    let backups_dir = paths::backups_dir(root);

    let mut backup_path = None;
    let mut pruned = 0;
    if options.write_backup {
        backup_path = backup::archive(&target, &backups_dir, now)?;
        pruned = backup::rotate(&backups_dir, settings.backup_retention);
    }

    let mut overrides_written = false;
    if options.write_overrides {
        write_document(&target, &doc)?;
        overrides_written = true;
        tracing::info!(
            "exported {} entities -> {}",
            doc.entities.len(),
            target.display()
        );
    }

    Ok(ExportReport {
        path: target,
        overrides_written,
        backup_written: backup_path.is_some(),
        backup_path,
        entities: doc.entities.len(),
        pruned,
    })
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Options for an import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Source path; `None` means `<root>/etc/curator/overrides.yaml`.
    pub path: Option<PathBuf>,
    /// Absent properties keep their current value (merge) or are cleared.
    pub merge: bool,
    /// Fail on the first unknown entity instead of skipping it.
    pub strict_entities: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            path: None,
            merge: true,
            strict_entities: false,
        }
    }
}

/// Read the override document and apply it to the registry.
///
/// A missing file is a zero-count success, not an error.
pub fn import<R: EntityRegistry + ?Sized>(
    registry: &mut R,
    areas: Option<&dyn AreaLookup>,
    root: &Path,
    options: &ImportOptions,
) -> Result<ImportSummary, SyncError> {
    let source = paths::resolve(root, options.path.as_deref(), paths::overrides_path(root));
    let contents = match std::fs::read_to_string(&source) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::info!("no overrides at {}; nothing to import", source.display());
            return Ok(ImportSummary::default());
        }
        Err(err) => return Err(io_err(&source, err)),
    };
    let value: serde_yaml::Value = serde_yaml::from_str(&contents).map_err(|e| SyncError::Parse {
        path: source.clone(),
        source: e,
    })?;
    let overrides = apply::normalize(value, &source)?;
    let summary = apply::apply(
        &overrides,
        registry,
        areas,
        options.merge,
        options.strict_entities,
    )?;
    tracing::info!(
        "import complete: updated={} skipped={}",
        summary.updated,
        summary.skipped
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Atomic document write
// ---------------------------------------------------------------------------

/// Write flow: serialize → `.curator.tmp` sibling → rename. The rename is
/// atomic on POSIX; a failed rename removes the sibling.
pub(crate) fn write_document(path: &Path, doc: &OverrideDocument) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let yaml = serde_yaml::to_string(doc)?;
    let tmp = PathBuf::from(format!("{}.curator.tmp", path.display()));
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

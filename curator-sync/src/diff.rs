//! Dry-run unified diff between the on-disk overrides and a fresh export.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use curator_core::types::OverrideDocument;
use curator_core::EntityRegistry;

use crate::error::io_err;
use crate::paths;
use crate::pipeline::ExportOptions;
use crate::serialize;
use crate::SyncError;

/// A single file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Render what `export` would write and compare it to the current file.
///
/// Returns `None` when the two are equivalent. `version` and `generated_at`
/// are borrowed from the parseable on-disk document before comparison so
/// timestamp churn never shows up as a difference. No files are written.
pub fn diff_overrides<R: EntityRegistry + ?Sized>(
    registry: &R,
    root: &Path,
    options: &ExportOptions,
) -> Result<Option<FileDiff>, SyncError> {
    let target = paths::resolve(root, options.path.as_deref(), paths::overrides_path(root));
    let existing = read_existing_or_empty(&target)?;

    let mut doc = serialize::build_document(
        &registry.list_entities(),
        &options.include_domains,
        options.include_all,
        chrono::Utc::now(),
    );
    if let Ok(current) = serde_yaml::from_str::<OverrideDocument>(&existing) {
        doc.version = current.version;
        doc.generated_at = current.generated_at;
    }
    let rendered = serde_yaml::to_string(&doc)?;

    if existing == rendered {
        return Ok(None);
    }

    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from(paths::OVERRIDES_FILENAME));
    let old_header = format!("a/{name}");
    let new_header = format!("b/{name}");
    let unified = TextDiff::from_lines(&existing, &rendered)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();

    Ok(Some(FileDiff {
        path: target,
        unified_diff: unified,
    }))
}

fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(normalize_line_endings(&content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

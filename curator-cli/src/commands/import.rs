//! `curator import` — apply the YAML override file back onto the registry.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use curator_core::registry;
use curator_sync::{pipeline, ImportOptions};

use super::super::{config_root, registry_path};

/// Arguments for `curator import`.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Config root directory (defaults to $CURATOR_ROOT, then the current directory).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Registry snapshot file (defaults to <root>/registry.json).
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Read the override document here instead of the default location.
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Clear properties absent from the file instead of keeping them.
    #[arg(long)]
    pub replace: bool,

    /// Fail on the first override for an unknown entity instead of skipping it.
    #[arg(long)]
    pub strict: bool,

    /// Apply to an in-memory copy and report counts without saving the registry.
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportArgs {
    pub fn run(self) -> Result<()> {
        let root = config_root(self.root);
        let registry_file = registry_path(&root, self.registry);

        let mut snapshot = registry::load_at(&registry_file)
            .with_context(|| format!("cannot load registry '{}'", registry_file.display()))?;
        let areas = snapshot.area_index();

        let options = ImportOptions {
            path: self.path,
            merge: !self.replace,
            strict_entities: self.strict,
        };
        let summary = pipeline::import(&mut snapshot, Some(&areas), &root, &options)
            .context("import failed")?;

        if !self.dry_run {
            registry::save_at(&registry_file, &snapshot)
                .with_context(|| format!("cannot save registry '{}'", registry_file.display()))?;
        }

        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        println!(
            "{prefix}✓ Overrides imported ({} updated, {} skipped)",
            summary.updated, summary.skipped
        );
        Ok(())
    }
}

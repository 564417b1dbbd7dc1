//! `curator export` — write entity overrides from the registry to YAML.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use curator_core::registry;
use curator_sync::{pipeline, settings, ExportOptions, ExportReport};

use super::super::{config_root, registry_path};

/// Arguments for `curator export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Config root directory (defaults to $CURATOR_ROOT, then the current directory).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Registry snapshot file (defaults to <root>/registry.json).
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Write the override document here instead of the default location.
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Include entities without overrides as empty records.
    #[arg(long)]
    pub include_all: bool,

    /// Restrict the export to a domain; repeat for several.
    #[arg(long = "domain", value_name = "DOMAIN")]
    pub domains: Vec<String>,

    /// Skip archiving the previous file and rotating old backups.
    #[arg(long)]
    pub no_backup: bool,

    /// Build the document and backups without writing the override file.
    #[arg(long)]
    pub no_overrides: bool,
}

impl ExportArgs {
    pub fn run(self) -> Result<()> {
        let root = config_root(self.root);
        let registry_file = registry_path(&root, self.registry);

        let snapshot = registry::load_at(&registry_file)
            .with_context(|| format!("cannot load registry '{}'", registry_file.display()))?;
        let settings = settings::load_at(&root).context("cannot load settings")?;

        // Flags win over settings; the domain filter replaces rather than
        // extends the configured list.
        let options = ExportOptions {
            write_overrides: !self.no_overrides,
            write_backup: !self.no_backup,
            include_all: self.include_all || settings.export_all_entities,
            path: self.path,
            include_domains: if self.domains.is_empty() {
                settings.export_domains.clone()
            } else {
                self.domains
            },
        };

        let report = pipeline::export(&snapshot, &root, &settings, &options)
            .context("export failed")?;
        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &ExportReport) {
    if report.overrides_written {
        println!(
            "✓ Exported {} entity override(s) to '{}'",
            report.entities,
            report.path.display()
        );
    } else {
        println!(
            "✓ Built {} entity override(s), file left untouched",
            report.entities
        );
    }
    if let Some(backup) = &report.backup_path {
        println!("  Archived previous file: {}", backup.display());
    }
    if report.pruned > 0 {
        println!("  Pruned {} old backup(s)", report.pruned);
    }
}

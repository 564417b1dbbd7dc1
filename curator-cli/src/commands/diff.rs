//! `curator diff` — show what export would change in the override file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use curator_core::registry;
use curator_sync::{diff::diff_overrides, settings, ExportOptions};

use super::super::{config_root, registry_path};

/// Arguments for `curator diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Config root directory (defaults to $CURATOR_ROOT, then the current directory).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Registry snapshot file (defaults to <root>/registry.json).
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Include entities without overrides as empty records.
    #[arg(long)]
    pub include_all: bool,

    /// Restrict the comparison to a domain; repeat for several.
    #[arg(long = "domain", value_name = "DOMAIN")]
    pub domains: Vec<String>,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let root = config_root(self.root);
        let registry_file = registry_path(&root, self.registry);

        let snapshot = registry::load_at(&registry_file)
            .with_context(|| format!("cannot load registry '{}'", registry_file.display()))?;
        let settings = settings::load_at(&root).context("cannot load settings")?;

        // Same defaulting as export, so the diff previews exactly what
        // export would write.
        let options = ExportOptions {
            include_all: self.include_all || settings.export_all_entities,
            include_domains: if self.domains.is_empty() {
                settings.export_domains
            } else {
                self.domains
            },
            ..ExportOptions::default()
        };

        match diff_overrides(&snapshot, &root, &options).context("diff failed")? {
            None => println!("No differences."),
            Some(diff) => {
                print!("{}", diff.unified_diff);
                if !diff.unified_diff.ends_with('\n') {
                    println!();
                }
            }
        }

        Ok(())
    }
}

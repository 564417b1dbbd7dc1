//! `curator init` — create the storage layout and default settings file.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use curator_sync::{paths, settings, Settings};

use super::super::config_root;

/// Arguments for `curator init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Config root directory (defaults to $CURATOR_ROOT, then the current directory).
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let root = config_root(self.root);

        let backups = paths::backups_dir(&root);
        fs::create_dir_all(&backups)
            .with_context(|| format!("cannot create '{}'", backups.display()))?;
        println!(
            "✓ Storage layout ready at '{}'",
            paths::base_dir(&root).display()
        );

        let settings_file = paths::settings_path(&root);
        if settings_file.exists() {
            println!("  Settings already present: {}", settings_file.display());
        } else {
            settings::save_at(&root, &Settings::default())
                .context("failed to write default settings")?;
            println!("  Wrote default settings: {}", settings_file.display());
        }

        Ok(())
    }
}

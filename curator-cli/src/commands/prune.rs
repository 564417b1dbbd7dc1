//! `curator prune` — delete old backups beyond the retention limit.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use curator_sync::{backup, paths, settings};

use super::super::config_root;

/// Arguments for `curator prune`.
#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Config root directory (defaults to $CURATOR_ROOT, then the current directory).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Keep this many recent backups (0 disables pruning; defaults to the settings value).
    #[arg(long, value_name = "N")]
    pub keep: Option<usize>,
}

impl PruneArgs {
    pub fn run(self) -> Result<()> {
        let root = config_root(self.root);
        let keep = match self.keep {
            Some(keep) => keep,
            None => {
                settings::load_at(&root)
                    .context("cannot load settings")?
                    .backup_retention
            }
        };

        let backups_dir = paths::backups_dir(&root);
        let deleted = backup::rotate(&backups_dir, keep);
        let remaining = backup::list_backups(&backups_dir).len();
        println!("✓ Pruned {deleted} backup(s), {remaining} kept");
        Ok(())
    }
}

//! Curator — entity metadata override sync CLI.
//!
//! # Usage
//!
//! ```text
//! curator init [--root <dir>]
//! curator export [--root <dir>] [--registry <file>] [--path <file>]
//!                [--include-all] [--domain <name>]... [--no-backup] [--no-overrides]
//! curator import [--root <dir>] [--registry <file>] [--path <file>]
//!                [--replace] [--strict] [--dry-run]
//! curator status [--root <dir>] [--registry <file>] [--json]
//! curator diff [--root <dir>] [--registry <file>] [--include-all] [--domain <name>]...
//! curator prune [--root <dir>] [--keep <n>]
//! ```

mod commands;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, export::ExportArgs, import::ImportArgs, init::InitArgs, prune::PruneArgs,
    status::StatusArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "curator",
    version,
    about = "Export and import entity metadata overrides as YAML",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the storage layout and a default settings file.
    Init(InitArgs),

    /// Write entity overrides from the registry to the YAML file.
    Export(ExportArgs),

    /// Apply the YAML override file back onto the registry.
    Import(ImportArgs),

    /// Show settings, backups, and currently overridden entities.
    Status(StatusArgs),

    /// Show a unified diff of what export would write.
    Diff(DiffArgs),

    /// Delete old backups beyond the retention limit.
    Prune(PruneArgs),
}

// ---------------------------------------------------------------------------
// Shared path resolution
// ---------------------------------------------------------------------------

/// Config root: `--root` flag, then `CURATOR_ROOT`, then the current
/// directory.
pub fn config_root(flag: Option<PathBuf>) -> PathBuf {
    if let Some(root) = flag {
        return root;
    }
    match env::var_os("CURATOR_ROOT") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from("."),
    }
}

/// Registry snapshot path: `--registry` flag (relative values resolved under
/// the root), defaulting to `<root>/registry.json`.
pub fn registry_path(root: &Path, flag: Option<PathBuf>) -> PathBuf {
    curator_sync::paths::resolve(root, flag.as_deref(), root.join("registry.json"))
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Export(args) => args.run(),
        Commands::Import(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Prune(args) => args.run(),
    }
}

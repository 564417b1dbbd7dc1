//! Subcommand implementations for the `curator` binary.

pub mod diff;
pub mod export;
pub mod import;
pub mod init;
pub mod prune;
pub mod status;

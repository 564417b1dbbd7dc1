//! # curator-sync
//!
//! Entity-metadata override engine: registry serialization, override
//! application, timestamped backups with retention, and the orchestration
//! pipeline.
//!
//! Call [`pipeline::export`] to write the override document for a registry,
//! or [`pipeline::import`] to apply one back onto it.

pub mod apply;
pub mod backup;
pub mod diff;
pub mod error;
pub mod paths;
pub mod pipeline;
pub mod serialize;
pub mod settings;

pub use apply::ImportSummary;
pub use diff::FileDiff;
pub use error::SyncError;
pub use pipeline::{export, import, ExportOptions, ExportReport, ImportOptions};
pub use settings::Settings;

//! `curator status` — storage and override visibility.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use curator_core::{registry, types::OverrideDocument, RegistrySnapshot};
use curator_sync::{backup, paths, serialize, settings, Settings};

use super::super::{config_root, registry_path};

/// Arguments for `curator status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Config root directory (defaults to $CURATOR_ROOT, then the current directory).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Registry snapshot file (defaults to <root>/registry.json).
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let root = config_root(self.root);
        let registry_file = registry_path(&root, self.registry);

        let snapshot = registry::load_at(&registry_file)
            .with_context(|| format!("cannot load registry '{}'", registry_file.display()))?;
        let settings = settings::load_at(&root).context("cannot load settings")?;

        let report = build_report(&snapshot, &root, settings);
        if self.json {
            print_json(report)?;
            return Ok(());
        }

        print_table(report);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct OverrideRow {
    entity_id: String,
    name: Option<String>,
    icon: Option<String>,
    hidden: bool,
    disabled: bool,
    properties: Vec<&'static str>,
}

#[derive(Debug, Clone)]
struct StatusReport {
    entity_count: usize,
    backup_count: usize,
    overrides_path: PathBuf,
    file_exists: bool,
    generated_at: Option<String>,
    settings: Settings,
    rows: Vec<OverrideRow>,
}

#[derive(Serialize)]
struct StatusReportJson {
    summary: StatusSummaryJson,
    overrides_file: OverridesFileJson,
    settings: SettingsJson,
    entities: Vec<OverrideRowJson>,
}

#[derive(Serialize)]
struct StatusSummaryJson {
    entities: usize,
    overridden: usize,
    backups: usize,
}

#[derive(Serialize)]
struct OverridesFileJson {
    path: String,
    exists: bool,
    generated_at: Option<String>,
}

#[derive(Serialize)]
struct SettingsJson {
    backup_retention: usize,
    export_all_entities: bool,
    export_domains: Vec<String>,
}

#[derive(Serialize)]
struct OverrideRowJson {
    entity_id: String,
    name: Option<String>,
    icon: Option<String>,
    hidden: bool,
    disabled: bool,
    properties: Vec<String>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "entity")]
    entity: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "icon")]
    icon: String,
    #[tabled(rename = "hidden")]
    hidden: String,
    #[tabled(rename = "disabled")]
    disabled: String,
}

fn build_report(snapshot: &RegistrySnapshot, root: &Path, settings: Settings) -> StatusReport {
    let document = serialize::build_document(&snapshot.entities, &[], false, Utc::now());
    let rows = document
        .entities
        .iter()
        .map(|(id, record)| OverrideRow {
            entity_id: id.to_string(),
            name: record.name.clone().flatten(),
            icon: record.icon.clone().flatten(),
            hidden: record.hidden.is_some(),
            disabled: record.disabled.is_some(),
            properties: record.present_properties(),
        })
        .collect();

    let overrides_path = paths::overrides_path(root);
    let (file_exists, generated_at) = load_export_stamp(&overrides_path);
    let backup_count = backup::list_backups(&paths::backups_dir(root)).len();

    StatusReport {
        entity_count: snapshot.entities.len(),
        backup_count,
        overrides_path,
        file_exists,
        generated_at,
        settings,
        rows,
    }
}

/// Whether the override file exists and, when parseable, its export stamp.
fn load_export_stamp(path: &Path) -> (bool, Option<String>) {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return (path.exists(), None),
    };
    let stamp = serde_yaml::from_str::<OverrideDocument>(&contents)
        .ok()
        .map(|doc| doc.generated_at);
    (true, stamp)
}

fn print_json(report: StatusReport) -> Result<()> {
    let payload = StatusReportJson {
        summary: StatusSummaryJson {
            entities: report.entity_count,
            overridden: report.rows.len(),
            backups: report.backup_count,
        },
        overrides_file: OverridesFileJson {
            path: report.overrides_path.display().to_string(),
            exists: report.file_exists,
            generated_at: report.generated_at,
        },
        settings: SettingsJson {
            backup_retention: report.settings.backup_retention,
            export_all_entities: report.settings.export_all_entities,
            export_domains: report.settings.export_domains,
        },
        entities: report
            .rows
            .into_iter()
            .map(|row| OverrideRowJson {
                entity_id: row.entity_id,
                name: row.name,
                icon: row.icon,
                hidden: row.hidden,
                disabled: row.disabled,
                properties: row.properties.iter().map(|p| p.to_string()).collect(),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(report: StatusReport) {
    println!(
        "Curator v{} | {} entities | {} overridden | {} backups",
        env!("CARGO_PKG_VERSION"),
        report.entity_count,
        report.rows.len(),
        report.backup_count,
    );

    let file_state = if report.file_exists {
        match &report.generated_at {
            Some(stamp) => format!("generated {stamp}").green().to_string(),
            None => "present".green().to_string(),
        }
    } else {
        "missing".yellow().to_string()
    };
    println!(
        "Overrides file: {} ({})",
        report.overrides_path.display(),
        file_state
    );
    println!(
        "Settings: keep {} backups | export_all: {} | domains: {}",
        report.settings.backup_retention,
        report.settings.export_all_entities,
        format_domains(&report.settings.export_domains),
    );

    if report.rows.is_empty() {
        println!("No overridden entities.");
        return;
    }

    let file_missing = !report.file_exists;
    let table_rows: Vec<StatusTableRow> = report
        .rows
        .into_iter()
        .map(|row| StatusTableRow {
            entity: row.entity_id,
            name: row.name.unwrap_or_else(|| "-".to_string()),
            icon: row.icon.unwrap_or_else(|| "-".to_string()),
            hidden: marker(row.hidden).to_string(),
            disabled: marker(row.disabled).to_string(),
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    if file_missing {
        println!("Run 'curator export' to write the override file.");
    }
}

fn format_domains(domains: &[String]) -> String {
    if domains.is_empty() {
        return "all".to_string();
    }
    domains.join(", ")
}

fn marker(set: bool) -> &'static str {
    if set {
        "yes"
    } else {
        "-"
    }
}

//! Host-registry access traits and the JSON snapshot store.
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   registry.json   (entity + area snapshot, written atomically)
//! ```
//!
//! # API pattern
//!
//! Persistence functions take explicit paths (`load_at` / `save_at`) so tests
//! run against a `TempDir`; path defaulting lives in the CLI layer.
//!
//! The engine mutates a registry only through [`EntityRegistry::update`] and
//! resolves areas through [`AreaLookup`]. [`RegistrySnapshot`] implements the
//! former; [`AreaIndex`] (a detached copy of the area list, see
//! [`RegistrySnapshot::area_index`]) implements the latter, so an import can
//! hold the snapshot mutably while still looking up areas.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::types::{Area, AreaId, EntityId, EntityRecord, EntityUpdate};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Read/update access to an entity registry.
pub trait EntityRegistry {
    /// All entries, cloned, in ascending id order.
    fn list_entities(&self) -> Vec<EntityRecord>;

    /// Look up a single entry by id.
    fn get(&self, id: &EntityId) -> Option<&EntityRecord>;

    /// Apply a sparse update to an existing entry.
    fn update(&mut self, id: &EntityId, update: EntityUpdate) -> Result<(), RegistryError>;
}

/// Read access to the area registry.
pub trait AreaLookup {
    /// Look up an area by its identifier.
    fn get_area(&self, id: &AreaId) -> Option<&Area>;

    /// Look up an area by display name (ASCII case-insensitive).
    fn get_area_by_name(&self, name: &str) -> Option<&Area>;
}

// ---------------------------------------------------------------------------
// Snapshot store
// ---------------------------------------------------------------------------

/// An entity registry plus its areas, persisted as one JSON file.
///
/// Entries are held as a plain list with linear lookups; registries are
/// small enough that an index would buy nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

impl Default for RegistrySnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            updated_at: None,
            areas: Vec::new(),
            entities: Vec::new(),
        }
    }
}

impl RegistrySnapshot {
    /// Insert or replace an entry, keyed by entity id.
    pub fn insert_entity(&mut self, record: EntityRecord) {
        match self
            .entities
            .iter_mut()
            .find(|e| e.entity_id == record.entity_id)
        {
            Some(existing) => *existing = record,
            None => self.entities.push(record),
        }
    }

    /// Insert or replace an area, keyed by area id.
    pub fn insert_area(&mut self, area: Area) {
        match self.areas.iter_mut().find(|a| a.id == area.id) {
            Some(existing) => *existing = area,
            None => self.areas.push(area),
        }
    }

    /// Detached copy of the area list for lookups during mutation.
    pub fn area_index(&self) -> AreaIndex {
        AreaIndex {
            areas: self.areas.clone(),
        }
    }
}

/// Load a snapshot from `path`.
///
/// Returns `RegistryError::SnapshotNotFound` if absent,
/// `RegistryError::Parse` (with path + position context) if malformed JSON.
pub fn load_at(path: &Path) -> Result<RegistrySnapshot, RegistryError> {
    if !path.exists() {
        return Err(RegistryError::SnapshotNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| RegistryError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Atomically save a snapshot to `path`.
///
/// Write flow: serialize → `.tmp` sibling → `rename`. The sibling stays on
/// the same filesystem so the rename cannot cross devices.
pub fn save_at(path: &Path, snapshot: &RegistrySnapshot) -> Result<(), RegistryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = tmp_sibling(path);
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("registry.json"));
    path.with_file_name(format!("{name}.tmp"))
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl EntityRegistry for RegistrySnapshot {
    fn list_entities(&self) -> Vec<EntityRecord> {
        let mut entities = self.entities.clone();
        entities.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        entities
    }

    fn get(&self, id: &EntityId) -> Option<&EntityRecord> {
        self.entities.iter().find(|e| &e.entity_id == id)
    }

    fn update(&mut self, id: &EntityId, update: EntityUpdate) -> Result<(), RegistryError> {
        let entry = self
            .entities
            .iter_mut()
            .find(|e| &e.entity_id == id)
            .ok_or_else(|| RegistryError::UnknownEntity {
                entity_id: id.to_string(),
            })?;
        update.name.apply_to(&mut entry.name);
        update.icon.apply_to(&mut entry.icon);
        update.hidden_by.apply_to(&mut entry.hidden_by);
        update.disabled_by.apply_to(&mut entry.disabled_by);
        update.area_id.apply_to(&mut entry.area_id);
        Ok(())
    }
}

/// Area list detached from a snapshot; implements [`AreaLookup`].
#[derive(Debug, Clone, Default)]
pub struct AreaIndex {
    areas: Vec<Area>,
}

impl AreaIndex {
    pub fn new(areas: Vec<Area>) -> Self {
        Self { areas }
    }
}

impl AreaLookup for AreaIndex {
    fn get_area(&self, id: &AreaId) -> Option<&Area> {
        self.areas.iter().find(|a| &a.id == id)
    }

    fn get_area_by_name(&self, name: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

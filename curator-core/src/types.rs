//! Domain types for the Curator override engine.
//!
//! Override documents distinguish an absent property from an explicit null:
//! absent means "no opinion", null means "clear". Fields that need the
//! distinction are `Option<Option<T>>` with a presence-aware deserializer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Current schema version written into every exported document.
///
/// Read back only as an opaque tag; import accepts any version.
pub const DOCUMENT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed entity identifier of the form `<domain>.<object_id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    /// The domain prefix before the first `.` separator.
    ///
    /// An id without a separator is its own domain, matching how the host
    /// registry partitions ids.
    pub fn domain(&self) -> &str {
        match self.0.split_once('.') {
            Some((domain, _)) => domain,
            None => &self.0,
        }
    }

    /// True iff the id has exactly one `.` separator.
    pub fn is_qualified(&self) -> bool {
        self.0.bytes().filter(|b| *b == b'.').count() == 1
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed identifier for an area (room, zone).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AreaId(pub String);

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AreaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AreaId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Who hid an entity. Curator only ever writes [`Hider::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hider {
    User,
    Integration,
}

impl fmt::Display for Hider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hider::User => write!(f, "user"),
            Hider::Integration => write!(f, "integration"),
        }
    }
}

/// Who disabled an entity. Curator only ever writes [`Disabler::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disabler {
    User,
    Integration,
    ConfigEntry,
    Device,
}

impl fmt::Display for Disabler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disabler::User => write!(f, "user"),
            Disabler::Integration => write!(f, "integration"),
            Disabler::ConfigEntry => write!(f, "config_entry"),
            Disabler::Device => write!(f, "device"),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry-side structs
// ---------------------------------------------------------------------------

/// A single entry in the host entity registry.
///
/// Curator reads these and requests updates through [`EntityUpdate`]; it
/// never constructs registry entries itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_by: Option<Hider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_by: Option<Disabler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<AreaId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Integration-supplied default name; never consulted for exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
}

impl EntityRecord {
    /// A bare entry with nothing overridden.
    pub fn new(entity_id: impl Into<EntityId>) -> Self {
        Self {
            entity_id: entity_id.into(),
            name: None,
            icon: None,
            hidden_by: None,
            disabled_by: None,
            area_id: None,
            platform: None,
            original_name: None,
            unique_id: None,
        }
    }
}

/// A named area from the host area registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Update requests
// ---------------------------------------------------------------------------

/// Three-state edit for a single registry field.
///
/// `Keep` is the default so a sparse [`EntityUpdate`] touches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldEdit<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> FieldEdit<T> {
    /// Apply this edit to a stored optional field.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            FieldEdit::Keep => {}
            FieldEdit::Clear => *slot = None,
            FieldEdit::Set(value) => *slot = Some(value),
        }
    }
}

/// A sparse update request against one registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityUpdate {
    pub name: FieldEdit<String>,
    pub icon: FieldEdit<String>,
    pub hidden_by: FieldEdit<Hider>,
    pub disabled_by: FieldEdit<Disabler>,
    pub area_id: FieldEdit<AreaId>,
}

// ---------------------------------------------------------------------------
// Override document
// ---------------------------------------------------------------------------

/// Sparse per-entity override set as persisted in `overrides.yaml`.
///
/// Outer `None` = key absent, `Some(None)` = key present with an explicit
/// null. Unknown keys in the source document are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverrideRecord {
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub hidden: Option<Option<bool>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub disabled: Option<Option<bool>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub area: Option<Option<String>>,
}

impl OverrideRecord {
    /// True when no property is present at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.icon.is_none()
            && self.hidden.is_none()
            && self.disabled.is_none()
            && self.area.is_none()
    }

    /// Names of the properties present on this record, in schema order.
    pub fn present_properties(&self) -> Vec<&'static str> {
        let mut props = Vec::new();
        if self.name.is_some() {
            props.push("name");
        }
        if self.icon.is_some() {
            props.push("icon");
        }
        if self.hidden.is_some() {
            props.push("hidden");
        }
        if self.disabled.is_some() {
            props.push("disabled");
        }
        if self.area.is_some() {
            props.push("area");
        }
        props
    }
}

/// Deserialize a field that was present in the source, mapping an explicit
/// null to `Some(None)`. Combined with `#[serde(default)]`, absent keys stay
/// `None`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Top-level persisted overrides document.
///
/// Field order is the serialization order: `version` and `generated_at`
/// lead so the file reads as metadata-then-data. Entities are keyed by id
/// and therefore emitted sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideDocument {
    pub version: u32,
    pub generated_at: String,
    #[serde(default)]
    pub entities: BTreeMap<EntityId, OverrideRecord>,
}

impl OverrideDocument {
    /// An empty document stamped with the given generation time.
    pub fn new(generated_at: impl Into<String>) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            generated_at: generated_at.into(),
            entities: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

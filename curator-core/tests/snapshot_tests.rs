//! Snapshot-store error-message, atomic-write-safety, and trait integration
//! tests against a real filesystem.

use assert_fs::prelude::*;
use curator_core::{
    registry,
    types::{Area, AreaId, EntityId, EntityRecord, EntityUpdate, FieldEdit, Hider},
    AreaLookup, EntityRegistry, RegistryError, RegistrySnapshot,
};
use predicates::prelude::predicate;
use std::fs;

fn sample_snapshot() -> RegistrySnapshot {
    let mut snap = RegistrySnapshot::default();
    snap.insert_area(Area {
        id: AreaId::from("kitchen"),
        name: String::from("Kitchen"),
    });
    snap.insert_entity(EntityRecord {
        name: Some(String::from("Kitchen Light")),
        area_id: Some(AreaId::from("kitchen")),
        platform: Some(String::from("hue")),
        original_name: Some(String::from("Hue color lamp")),
        unique_id: Some(String::from("00:17:88:01:aa")),
        ..EntityRecord::new("light.kitchen")
    });
    snap.insert_entity(EntityRecord::new("sensor.attic_temp"));
    snap
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_snapshot_returns_not_found() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let err = registry::load_at(&root.path().join("registry.json")).unwrap_err();
    assert!(matches!(err, RegistryError::SnapshotNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("registry snapshot not found"));
    assert!(err.to_string().contains("registry.json"));
}

#[test]
fn load_corrupt_json_returns_parse_error_with_path() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let path = root.path().join("registry.json");
    fs::write(&path, b"{\"entities\": [oops").expect("write");

    let err = registry::load_at(&path).unwrap_err();
    assert!(matches!(err, RegistryError::Parse { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("registry.json"), "must contain file path, got: {msg}");
    let source_msg = match &err {
        RegistryError::Parse { source, .. } => source.to_string(),
        _ => unreachable!(),
    };
    assert!(!source_msg.is_empty(), "serde_json must provide error context");
}

#[test]
fn load_wrong_type_json_returns_parse_error() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let path = root.path().join("registry.json");
    fs::write(&path, b"[1, 2, 3]").expect("write");

    let err = registry::load_at(&path).unwrap_err();
    assert!(matches!(err, RegistryError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn save_cleans_up_tmp_file() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let path = root.path().join("registry.json");
    registry::save_at(&path, &sample_snapshot()).expect("save");

    root.child("registry.json").assert(predicate::path::exists());
    assert!(
        !path.with_file_name("registry.json.tmp").exists(),
        ".tmp must be removed after successful save"
    );
}

#[test]
fn mid_write_crash_leaves_original_intact() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let path = root.path().join("registry.json");
    registry::save_at(&path, &sample_snapshot()).expect("save");
    let original_bytes = fs::read(&path).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    let tmp = path.with_file_name("registry.json.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    let current_bytes = fs::read(&path).expect("read after crash");
    assert_eq!(original_bytes, current_bytes, "original must be unchanged after crash");
    assert!(tmp.exists(), ".tmp orphan must exist (crash = no cleanup)");
}

#[test]
fn save_creates_missing_parent_directories() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let path = root.path().join("state").join("host").join("registry.json");
    registry::save_at(&path, &sample_snapshot()).expect("save");
    root.child("state/host/registry.json")
        .assert(predicate::path::exists());
}

// ---------------------------------------------------------------------------
// 3. Roundtrip and trait behavior
// ---------------------------------------------------------------------------

#[test]
fn save_then_load_roundtrips_all_fields() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let path = root.path().join("registry.json");
    let snap = sample_snapshot();
    registry::save_at(&path, &snap).expect("save");
    let loaded = registry::load_at(&path).expect("load");
    assert_eq!(loaded, snap);

    let entry = loaded.get(&EntityId::from("light.kitchen")).expect("entry");
    assert_eq!(entry.platform.as_deref(), Some("hue"));
    assert_eq!(entry.original_name.as_deref(), Some("Hue color lamp"));
    assert_eq!(entry.unique_id.as_deref(), Some("00:17:88:01:aa"));
    assert_eq!(entry.area_id, Some(AreaId::from("kitchen")));
}

#[test]
fn updates_persist_across_save_and_load() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let path = root.path().join("registry.json");
    let mut snap = sample_snapshot();

    snap.update(
        &EntityId::from("sensor.attic_temp"),
        EntityUpdate {
            hidden_by: FieldEdit::Set(Hider::User),
            name: FieldEdit::Set(String::from("Attic Temperature")),
            ..EntityUpdate::default()
        },
    )
    .expect("update");
    registry::save_at(&path, &snap).expect("save");

    let loaded = registry::load_at(&path).expect("load");
    let entry = loaded.get(&EntityId::from("sensor.attic_temp")).expect("entry");
    assert_eq!(entry.hidden_by, Some(Hider::User));
    assert_eq!(entry.name.as_deref(), Some("Attic Temperature"));
}

#[test]
fn minimal_snapshot_json_loads_with_defaults() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let path = root.path().join("registry.json");
    fs::write(
        &path,
        br#"{"entities": [{"entity_id": "light.lamp"}]}"#,
    )
    .expect("write");

    let loaded = registry::load_at(&path).expect("load");
    assert_eq!(loaded.entities.len(), 1);
    assert!(loaded.areas.is_empty());
    assert!(loaded.get(&EntityId::from("light.lamp")).is_some());
}

#[test]
fn area_index_survives_snapshot_mutation() {
    let mut snap = sample_snapshot();
    let areas = snap.area_index();

    snap.update(
        &EntityId::from("light.kitchen"),
        EntityUpdate {
            area_id: FieldEdit::Clear,
            ..EntityUpdate::default()
        },
    )
    .expect("update");

    // The detached index still resolves while the snapshot is mutated.
    assert!(areas.get_area(&AreaId::from("kitchen")).is_some());
    assert!(areas.get_area_by_name("KITCHEN").is_some());
}

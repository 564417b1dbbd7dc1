//! Override document normalization and registry application.
//!
//! Two document shapes are accepted:
//! - wrapped: `{version, generated_at, entities: {<id>: {...}}}` — current
//!   export format; wins whenever `entities` is present as a mapping; keys
//!   pass through unfiltered but must be strings (non-string is malformed);
//! - flat: `{<id>: {...}}` — legacy hand-written format; only top-level
//!   pairs whose key is a string with exactly one `.` and whose value is a
//!   mapping count as entity entries, everything else is skipped.

use std::collections::BTreeMap;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use curator_core::types::{
    AreaId, Disabler, EntityId, EntityUpdate, FieldEdit, Hider, OverrideRecord,
};
use curator_core::{AreaLookup, EntityRegistry};

use crate::error::SyncError;

/// Counters from an import application pass.
///
/// `updated` counts every entity that was found and pushed, whether or not
/// any field actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub updated: usize,
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Reduce a parsed YAML document to the entity override map.
///
/// `Null` (an empty file) normalizes to an empty map. Anything other than a
/// mapping at the top level is `Malformed`, as is an override record with a
/// wrong-typed property.
pub fn normalize(
    value: Value,
    path: &Path,
) -> Result<BTreeMap<EntityId, OverrideRecord>, SyncError> {
    let mapping = match value {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(SyncError::Malformed {
                path: path.to_path_buf(),
                reason: String::from("top level must be a mapping"),
            })
        }
    };

    if let Some(Value::Mapping(inner)) = mapping.get("entities") {
        return parse_entities(inner, path, false);
    }
    parse_entities(&mapping, path, true)
}

fn parse_entities(
    block: &Mapping,
    path: &Path,
    flat: bool,
) -> Result<BTreeMap<EntityId, OverrideRecord>, SyncError> {
    let mut out = BTreeMap::new();
    for (key, value) in block {
        let Some(key) = key.as_str() else {
            if flat {
                continue;
            }
            return Err(SyncError::Malformed {
                path: path.to_path_buf(),
                reason: String::from("entity ids must be strings"),
            });
        };
        let id = EntityId::from(key);
        if flat && !(id.is_qualified() && value.is_mapping()) {
            continue;
        }
        let record: OverrideRecord =
            serde_yaml::from_value(value.clone()).map_err(|e| SyncError::Malformed {
                path: path.to_path_buf(),
                reason: format!("invalid override record for '{id}': {e}"),
            })?;
        out.insert(id, record);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Apply an override map to the registry.
///
/// Entities are processed in id order. A missing entity counts as skipped;
/// with `strict_entities` it aborts the import instead (updates already
/// applied stay applied). `merge` controls what absent properties mean:
/// keep the current value (merge) or clear it (replace) — except `area`,
/// which is kept in both modes.
pub fn apply<R: EntityRegistry + ?Sized>(
    overrides: &BTreeMap<EntityId, OverrideRecord>,
    registry: &mut R,
    areas: Option<&dyn AreaLookup>,
    merge: bool,
    strict_entities: bool,
) -> Result<ImportSummary, SyncError> {
    let mut summary = ImportSummary::default();
    for (id, record) in overrides {
        if registry.get(id).is_none() {
            summary.skipped += 1;
            if strict_entities {
                return Err(SyncError::EntityNotFound { entity_id: id.clone() });
            }
            tracing::warn!("skipping unknown entity: {id}");
            continue;
        }
        registry.update(id, build_update(record, merge, areas))?;
        summary.updated += 1;
    }
    Ok(summary)
}

/// Translate one override record into a sparse registry update.
pub fn build_update(
    record: &OverrideRecord,
    merge: bool,
    areas: Option<&dyn AreaLookup>,
) -> EntityUpdate {
    EntityUpdate {
        name: text_edit(&record.name, merge),
        icon: text_edit(&record.icon, merge),
        hidden_by: marker_edit(record.hidden, merge, Hider::User),
        disabled_by: marker_edit(record.disabled, merge, Disabler::User),
        area_id: area_edit(&record.area, areas),
    }
}

fn text_edit(field: &Option<Option<String>>, merge: bool) -> FieldEdit<String> {
    match field {
        Some(Some(v)) if !v.is_empty() => FieldEdit::Set(v.clone()),
        Some(_) => FieldEdit::Clear,
        None if merge => FieldEdit::Keep,
        None => FieldEdit::Clear,
    }
}

fn marker_edit<M: Copy>(field: Option<Option<bool>>, merge: bool, user_marker: M) -> FieldEdit<M> {
    match field {
        Some(Some(true)) => FieldEdit::Set(user_marker),
        // false and explicit null both clear, whoever set the marker.
        Some(_) => FieldEdit::Clear,
        None if merge => FieldEdit::Keep,
        None => FieldEdit::Clear,
    }
}

fn area_edit(field: &Option<Option<String>>, areas: Option<&dyn AreaLookup>) -> FieldEdit<AreaId> {
    match field {
        Some(Some(v)) if !v.is_empty() => resolve_area(v, areas),
        Some(_) => FieldEdit::Clear,
        // An absent area is kept even in replace mode; there is no "no
        // area" sentinel distinct from clearing.
        None => FieldEdit::Keep,
    }
}

/// Resolve an area value, trying a direct id first, then the display name.
/// Unresolvable values clear the assignment rather than erroring.
fn resolve_area(value: &str, areas: Option<&dyn AreaLookup>) -> FieldEdit<AreaId> {
    let Some(lookup) = areas else {
        tracing::debug!("no area registry available; clearing area '{value}'");
        return FieldEdit::Clear;
    };
    if let Some(area) = lookup.get_area(&AreaId::from(value)) {
        return FieldEdit::Set(area.id.clone());
    }
    if let Some(area) = lookup.get_area_by_name(value) {
        return FieldEdit::Set(area.id.clone());
    }
    tracing::debug!("unresolvable area '{value}'; clearing assignment");
    FieldEdit::Clear
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use curator_core::types::{Area, EntityRecord};
    use curator_core::RegistrySnapshot;

    use super::*;

    fn parse(path: &str, yaml: &str) -> BTreeMap<EntityId, OverrideRecord> {
        let value: Value = serde_yaml::from_str(yaml).expect("yaml");
        normalize(value, Path::new(path)).expect("normalize")
    }

    fn registry() -> RegistrySnapshot {
        let mut snap = RegistrySnapshot::default();
        snap.insert_area(Area {
            id: AreaId::from("office"),
            name: String::from("Office"),
        });
        snap.insert_entity(EntityRecord {
            name: Some(String::from("Old Name")),
            icon: Some(String::from("mdi:old")),
            hidden_by: Some(Hider::Integration),
            area_id: Some(AreaId::from("office")),
            ..EntityRecord::new("light.desk")
        });
        snap.insert_entity(EntityRecord::new("switch.relay"));
        snap
    }

    // --- normalize ---------------------------------------------------------

    #[test]
    fn normalize_wrapped_shape() {
        let entities = parse(
            "overrides.yaml",
            "version: 1\ngenerated_at: '2026-02-10T08:00:00Z'\nentities:\n  light.desk:\n    name: Desk\n",
        );
        assert_eq!(entities.len(), 1);
        assert_eq!(
            entities[&EntityId::from("light.desk")].name,
            Some(Some(String::from("Desk")))
        );
    }

    #[test]
    fn normalize_flat_shape_filters_candidates() {
        let entities = parse(
            "overrides.yaml",
            concat!(
                "light.desk:\n  name: Desk\n",
                "version: 1\n",                    // non-mapping value
                "not_an_id:\n  name: nope\n",      // no separator
                "a.b.c:\n  name: nope\n",          // two separators
                "5: {name: nope}\n",               // non-string key
            ),
        );
        let ids: Vec<String> = entities.keys().map(|k| k.to_string()).collect();
        assert_eq!(ids, vec!["light.desk"]);
    }

    #[test]
    fn normalize_wrapped_wins_over_flat() {
        let entities = parse(
            "overrides.yaml",
            "light.stray:\n  name: Stray\nentities:\n  light.desk:\n    name: Desk\n",
        );
        let ids: Vec<String> = entities.keys().map(|k| k.to_string()).collect();
        assert_eq!(ids, vec!["light.desk"]);
    }

    #[test]
    fn normalize_non_mapping_entities_falls_back_to_flat() {
        let entities = parse(
            "overrides.yaml",
            "entities: enabled\nlight.desk:\n  name: Desk\n",
        );
        let ids: Vec<String> = entities.keys().map(|k| k.to_string()).collect();
        assert_eq!(ids, vec!["light.desk"]);
    }

    #[test]
    fn normalize_wrapped_passes_keys_unfiltered() {
        let entities = parse(
            "overrides.yaml",
            "entities:\n  weird_key_without_dot:\n    name: Odd\n",
        );
        assert!(entities.contains_key(&EntityId::from("weird_key_without_dot")));
    }

    #[test]
    fn normalize_wrapped_non_string_key_is_malformed() {
        let value: Value =
            serde_yaml::from_str("entities:\n  light.desk:\n    name: Desk\n  5:\n    name: nope\n")
                .expect("yaml");
        let err = normalize(value, Path::new("overrides.yaml")).unwrap_err();
        assert!(matches!(err, SyncError::Malformed { .. }), "got: {err}");
        assert!(
            err.to_string().contains("entity ids must be strings"),
            "got: {err}"
        );
    }

    #[test]
    fn normalize_null_document_is_empty() {
        let value: Value = serde_yaml::from_str("").expect("yaml");
        let entities = normalize(value, Path::new("overrides.yaml")).expect("normalize");
        assert!(entities.is_empty());
    }

    #[test]
    fn normalize_non_mapping_top_level_is_malformed() {
        let value: Value = serde_yaml::from_str("- a\n- b\n").expect("yaml");
        let err = normalize(value, Path::new("overrides.yaml")).unwrap_err();
        assert!(matches!(err, SyncError::Malformed { .. }), "got: {err}");
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn normalize_wrong_typed_property_is_malformed() {
        let value: Value =
            serde_yaml::from_str("entities:\n  light.desk:\n    hidden: 3\n").expect("yaml");
        let err = normalize(value, Path::new("overrides.yaml")).unwrap_err();
        assert!(matches!(err, SyncError::Malformed { .. }), "got: {err}");
        assert!(err.to_string().contains("light.desk"), "got: {err}");
    }

    // --- build_update ------------------------------------------------------

    #[test]
    fn merge_absent_fields_keep() {
        let update = build_update(&OverrideRecord::default(), true, None);
        assert_eq!(update, EntityUpdate::default());
    }

    #[test]
    fn replace_absent_fields_clear_except_area() {
        let update = build_update(&OverrideRecord::default(), false, None);
        assert_eq!(update.name, FieldEdit::Clear);
        assert_eq!(update.icon, FieldEdit::Clear);
        assert_eq!(update.hidden_by, FieldEdit::Clear);
        assert_eq!(update.disabled_by, FieldEdit::Clear);
        assert_eq!(update.area_id, FieldEdit::Keep);
    }

    #[test]
    fn empty_string_clears_like_null() {
        let record = OverrideRecord {
            name: Some(Some(String::new())),
            icon: Some(None),
            ..OverrideRecord::default()
        };
        let update = build_update(&record, true, None);
        assert_eq!(update.name, FieldEdit::Clear);
        assert_eq!(update.icon, FieldEdit::Clear);
    }

    #[test]
    fn hidden_true_sets_user_marker() {
        let record = OverrideRecord {
            hidden: Some(Some(true)),
            disabled: Some(Some(false)),
            ..OverrideRecord::default()
        };
        let update = build_update(&record, true, None);
        assert_eq!(update.hidden_by, FieldEdit::Set(Hider::User));
        assert_eq!(update.disabled_by, FieldEdit::Clear);
    }

    // --- apply -------------------------------------------------------------

    #[test]
    fn apply_merge_leaves_unmentioned_fields() {
        let mut snap = registry();
        let overrides = parse("overrides.yaml", "light.desk:\n  name: New Name\n");
        let summary = apply(&overrides, &mut snap, None, true, false).expect("apply");
        assert_eq!(summary, ImportSummary { updated: 1, skipped: 0 });

        let entry = snap.get(&EntityId::from("light.desk")).expect("entry");
        assert_eq!(entry.name.as_deref(), Some("New Name"));
        assert_eq!(entry.icon.as_deref(), Some("mdi:old"));
        assert_eq!(entry.hidden_by, Some(Hider::Integration));
    }

    #[test]
    fn apply_replace_clears_unmentioned_fields() {
        let mut snap = registry();
        let overrides = parse("overrides.yaml", "light.desk:\n  name: New Name\n");
        apply(&overrides, &mut snap, None, false, false).expect("apply");

        let entry = snap.get(&EntityId::from("light.desk")).expect("entry");
        assert_eq!(entry.name.as_deref(), Some("New Name"));
        assert_eq!(entry.icon, None);
        assert_eq!(entry.hidden_by, None, "replace clears the non-user marker too");
        assert_eq!(
            entry.area_id,
            Some(AreaId::from("office")),
            "area survives replace mode"
        );
    }

    #[test]
    fn apply_hidden_false_clears_integration_marker() {
        let mut snap = registry();
        let overrides = parse("overrides.yaml", "light.desk:\n  hidden: false\n");
        apply(&overrides, &mut snap, None, true, false).expect("apply");
        let entry = snap.get(&EntityId::from("light.desk")).expect("entry");
        assert_eq!(entry.hidden_by, None);
    }

    #[test]
    fn apply_resolves_area_by_id_and_name() {
        let mut snap = registry();
        let areas = snap.area_index();

        let by_id = parse("overrides.yaml", "switch.relay:\n  area: office\n");
        apply(&by_id, &mut snap, Some(&areas), true, false).expect("apply");
        assert_eq!(
            snap.get(&EntityId::from("switch.relay")).unwrap().area_id,
            Some(AreaId::from("office"))
        );

        let by_name = parse("overrides.yaml", "switch.relay:\n  area: OFFICE\n");
        apply(&by_name, &mut snap, Some(&areas), true, false).expect("apply");
        assert_eq!(
            snap.get(&EntityId::from("switch.relay")).unwrap().area_id,
            Some(AreaId::from("office")),
            "display-name lookup is case-insensitive"
        );
    }

    #[test]
    fn apply_unresolvable_area_clears() {
        let mut snap = registry();
        let areas = snap.area_index();
        let overrides = parse("overrides.yaml", "light.desk:\n  area: atlantis\n");
        apply(&overrides, &mut snap, Some(&areas), true, false).expect("apply");
        assert_eq!(snap.get(&EntityId::from("light.desk")).unwrap().area_id, None);
    }

    #[test]
    fn apply_without_area_registry_clears() {
        let mut snap = registry();
        let overrides = parse("overrides.yaml", "light.desk:\n  area: office\n");
        apply(&overrides, &mut snap, None, true, false).expect("apply");
        assert_eq!(snap.get(&EntityId::from("light.desk")).unwrap().area_id, None);
    }

    #[test]
    fn apply_null_area_clears() {
        let mut snap = registry();
        let overrides = parse("overrides.yaml", "light.desk:\n  area: ~\n");
        apply(&overrides, &mut snap, None, true, false).expect("apply");
        assert_eq!(snap.get(&EntityId::from("light.desk")).unwrap().area_id, None);
    }

    #[test]
    fn apply_lenient_skips_unknown_entities() {
        let mut snap = registry();
        let overrides = parse(
            "overrides.yaml",
            "light.ghost:\n  name: Ghost\nswitch.relay:\n  name: Relay\n",
        );
        let summary = apply(&overrides, &mut snap, None, true, false).expect("apply");
        assert_eq!(summary, ImportSummary { updated: 1, skipped: 1 });
        assert_eq!(
            snap.get(&EntityId::from("switch.relay")).unwrap().name.as_deref(),
            Some("Relay")
        );
    }

    #[test]
    fn apply_strict_aborts_but_keeps_prior_updates() {
        let mut snap = registry();
        // Ids sort so light.desk is applied before switch.ghost aborts.
        let overrides = parse(
            "overrides.yaml",
            "switch.ghost:\n  name: Ghost\nlight.desk:\n  name: Applied First\n",
        );
        let err = apply(&overrides, &mut snap, None, true, true).unwrap_err();
        assert!(matches!(err, SyncError::EntityNotFound { .. }), "got: {err}");
        assert!(err.to_string().contains("switch.ghost"));
        assert_eq!(
            snap.get(&EntityId::from("light.desk")).unwrap().name.as_deref(),
            Some("Applied First"),
            "eager updates are not rolled back"
        );
    }

    #[test]
    fn apply_counts_every_found_entity() {
        let mut snap = registry();
        let overrides = parse("overrides.yaml", "light.desk: {}\nswitch.relay: {}\n");
        let summary = apply(&overrides, &mut snap, None, true, false).expect("apply");
        assert_eq!(summary.updated, 2, "found entities count even with no edits");
    }
}

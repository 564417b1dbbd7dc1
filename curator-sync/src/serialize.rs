//! Registry -> override document conversion.
//!
//! Export policy: a property is exported whenever it is explicitly set on
//! the entry. `hidden`/`disabled` flatten to `true` when any marker is
//! present; `false` is never written — absence of the key means "not
//! overridden", so importing a document never un-hides or re-enables
//! entities it is silent about. Area assignments are import-only and never
//! exported.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use curator_core::types::{EntityRecord, OverrideDocument, OverrideRecord};

/// UTC at second precision with a literal `Z`, e.g. `2026-02-10T08:30:05Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Build the override document for `entities`.
///
/// With a non-empty `include_domains`, entities outside those domains are
/// skipped (comparison is case-insensitive on both sides). With
/// `include_all`, entities without overrides appear as empty records.
pub fn build_document(
    entities: &[EntityRecord],
    include_domains: &[String],
    include_all: bool,
    generated_at: DateTime<Utc>,
) -> OverrideDocument {
    let domains: BTreeSet<String> = include_domains
        .iter()
        .map(|d| d.to_ascii_lowercase())
        .collect();

    let mut doc = OverrideDocument::new(format_timestamp(generated_at));
    for entry in entities {
        if !domains.is_empty()
            && !domains.contains(&entry.entity_id.domain().to_ascii_lowercase())
        {
            continue;
        }

        let mut record = OverrideRecord::default();
        if let Some(name) = entry.name.as_deref().filter(|n| !n.is_empty()) {
            record.name = Some(Some(name.to_owned()));
        }
        if let Some(icon) = entry.icon.as_deref().filter(|i| !i.is_empty()) {
            record.icon = Some(Some(icon.to_owned()));
        }
        if entry.hidden_by.is_some() {
            record.hidden = Some(Some(true));
        }
        if entry.disabled_by.is_some() {
            record.disabled = Some(Some(true));
        }

        if !record.is_empty() || include_all {
            doc.entities.insert(entry.entity_id.clone(), record);
        }
    }
    doc
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

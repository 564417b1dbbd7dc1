//! Curator core library — domain types, registry access, errors.
//!
//! Public API surface:
//! - [`types`] — identifiers, markers, records, and the override document
//! - [`error`] — [`RegistryError`]
//! - [`registry`] — collaborator traits and the JSON snapshot store

pub mod error;
pub mod registry;
pub mod types;

pub use error::RegistryError;
pub use registry::{AreaIndex, AreaLookup, EntityRegistry, RegistrySnapshot};
pub use types::{
    Area, AreaId, Disabler, EntityId, EntityRecord, EntityUpdate, FieldEdit, Hider,
    OverrideDocument, OverrideRecord, DOCUMENT_VERSION,
};

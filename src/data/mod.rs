//! Preference data structures and schema parsing.
//!
//! This module provides the model side of the editor:
//!
//! - [`definition`] - static per-key schema (enum values, default, descriptions)
//! - [`node`] - live references handed to renderers, plus layered-value inspection
//! - [`store`] - the preference store contract and an in-memory implementation

/// Static preference schema parsed from a JSON-Schema-style document.
pub mod definition;

/// Live preference references and inspection snapshots.
pub mod node;

/// Preference store contract and in-memory layered store.
pub mod store;

pub use definition::{PreferenceDefinition, SchemaError, collect_definitions};
pub use node::{Inspection, PreferenceNode};
pub use store::{MemoryStore, PreferenceStore};

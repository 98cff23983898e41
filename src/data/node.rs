//! Live preference references.

use std::rc::Rc;

use serde_json::Value;

use crate::data::definition::PreferenceDefinition;

/// Live reference to one preference being edited.
///
/// Pairs the static definition with the identity of the key; the form
/// builder owns the nodes and renderers hold cheap clones.
#[derive(Debug, Clone)]
pub struct PreferenceNode {
    definition: Rc<PreferenceDefinition>,
}

impl PreferenceNode {
    pub fn new(definition: Rc<PreferenceDefinition>) -> Self {
        PreferenceNode { definition }
    }

    /// Configuration key this node edits.
    pub fn key(&self) -> &str {
        &self.definition.key
    }

    pub fn definition(&self) -> &PreferenceDefinition {
        &self.definition
    }
}

/// Snapshot of the layered lookup for one key.
///
/// Refreshed by renderers on every value-change notification; `user_value`
/// being present is what "modified from default" means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inspection {
    /// Value contributed by the defaults layer.
    pub default_value: Option<Value>,
    /// Override from the user layer, if any.
    pub user_value: Option<Value>,
    /// Value currently in force after layering.
    pub effective: Option<Value>,
}

impl Inspection {
    /// Whether the user layer overrides the default.
    pub fn is_overridden(&self) -> bool {
        self.user_value.is_some()
    }
}

//! Preference store contract and in-memory implementation.
//!
//! Renderers only ever talk to [`PreferenceStore`]: read the effective
//! value, write eagerly, and listen for change notifications. Writes are
//! treated as infallible by callers; whatever the store decides is the new
//! effective value flows back through the notification.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use log::debug;
use serde_json::{Map, Value};

use crate::data::definition::PreferenceDefinition;
use crate::data::node::Inspection;
use crate::event::{Emitter, Event};

/// Store contract consumed by renderers.
pub trait PreferenceStore {
    /// Current effective value for `key`, after layering.
    fn value(&self, key: &str) -> Option<Value>;

    /// Layered lookup snapshot for `key`.
    fn inspect(&self, key: &str) -> Inspection;

    /// Eager write into the user layer. No batching, no debouncing; a
    /// change notification fires after the write is applied.
    fn set_value_immediately(&self, key: &str, value: Value);

    /// Notification stream firing the key of every applied write.
    fn on_did_change_value(&self) -> Event<String>;
}

#[derive(Default)]
struct Layers {
    defaults: BTreeMap<String, Value>,
    user: BTreeMap<String, Value>,
}

/// Two-layer in-memory store: schema defaults below, user overrides on top.
#[derive(Default)]
pub struct MemoryStore {
    layers: RefCell<Layers>,
    emitter: Emitter<String>,
}

impl MemoryStore {
    pub fn new() -> Rc<Self> {
        Rc::new(MemoryStore::default())
    }

    /// Seed the defaults layer from definition defaults.
    pub fn seed_defaults(&self, definitions: &[PreferenceDefinition]) {
        let mut layers = self.layers.borrow_mut();
        for definition in definitions {
            if let Some(default) = &definition.default {
                layers
                    .defaults
                    .insert(definition.key.clone(), default.clone());
            }
        }
    }

    /// Load user-layer values from a configuration object.
    ///
    /// Used for the initial file load, before anything subscribes; it does
    /// not notify.
    pub fn load_user(&self, object: &Value) {
        let Some(object) = object.as_object() else {
            return;
        };
        let mut layers = self.layers.borrow_mut();
        for (key, value) in object {
            layers.user.insert(key.clone(), value.clone());
        }
    }

    /// Effective values of every known key, as a JSON object.
    pub fn as_json(&self) -> Value {
        let layers = self.layers.borrow();
        let mut object = Map::new();
        for (key, value) in &layers.defaults {
            object.insert(key.clone(), value.clone());
        }
        for (key, value) in &layers.user {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

impl PreferenceStore for MemoryStore {
    fn value(&self, key: &str) -> Option<Value> {
        let layers = self.layers.borrow();
        layers
            .user
            .get(key)
            .or_else(|| layers.defaults.get(key))
            .cloned()
    }

    fn inspect(&self, key: &str) -> Inspection {
        let layers = self.layers.borrow();
        let default_value = layers.defaults.get(key).cloned();
        let user_value = layers.user.get(key).cloned();
        let effective = user_value.clone().or_else(|| default_value.clone());
        Inspection {
            default_value,
            user_value,
            effective,
        }
    }

    fn set_value_immediately(&self, key: &str, value: Value) {
        debug!("set {key} = {value}");
        self.layers
            .borrow_mut()
            .user
            .insert(key.to_string(), value);
        // Borrow released before listeners run; they are free to read back.
        self.emitter.fire(&key.to_string());
    }

    fn on_did_change_value(&self) -> Event<String> {
        self.emitter.event()
    }
}

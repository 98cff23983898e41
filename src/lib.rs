//! # prefedit
//!
//! A Cursive-based TUI component library for editing enumerated preferences.
//!
//! prefedit binds typed configuration values (JSON-like scalars) to
//! interactive selection widgets. The core of the crate is the selection
//! binder: it derives the displayed selection from whatever value is stored,
//! writes user picks back eagerly, and suppresses change notifications while
//! the widget is focused so a pick never feeds back into itself.
//!
//! ## Features
//!
//! - Selection binder keeping widget state and stored value consistent
//! - Capability-scored renderer registration for pluggable leaf renderers
//! - Layered in-memory preference store (schema defaults + user overrides)
//! - Definitions parsed from JSON-Schema-style documents (`enum`, `default`,
//!   `enumDescriptions`, `markdownEnumDescriptions`)
//! - Cursive form assembly with TOML and JSON config round-tripping
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//!
//! use prefedit::data::{MemoryStore, PreferenceDefinition, PreferenceNode};
//! use prefedit::ui::RendererRegistry;
//!
//! let definition = PreferenceDefinition {
//!     key: "size".to_string(),
//!     title: Some("Size".to_string()),
//!     description: None,
//!     enum_values: vec!["small".into(), "medium".into(), "large".into()],
//!     default: Some("medium".into()),
//!     enum_descriptions: Vec::new(),
//!     markdown_enum_descriptions: Vec::new(),
//! };
//!
//! let store = MemoryStore::new();
//! store.seed_defaults(std::slice::from_ref(&definition));
//!
//! let node = PreferenceNode::new(Rc::new(definition));
//! let registry = RendererRegistry::with_defaults();
//! let renderer = registry.renderer_for(store, &node);
//! assert!(renderer.is_some());
//! ```
//!
//! ## Modules
//!
//! - [`data`] - preference definitions, nodes, and the store contract
//! - [`ui`] - renderers, registration, and the Cursive host
//! - [`event`] - the single-threaded change-notification channel
//! - [`run`] - editor entry point for typed configs

/// Single-threaded emitter/event/subscription channel.
pub mod event;

/// Preference definitions, nodes, and the store contract.
///
/// This module provides the model side of the editor: schema parsing,
/// layered value lookup, and change notification.
pub mod data;

/// Renderers, registration, and widget plumbing.
pub mod ui;

/// Editor entry point and Cursive form assembly.
pub mod run;

pub use run::*;
pub use serde_json::Value;

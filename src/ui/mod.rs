//! Renderers and widget plumbing.
//!
//! - [`widget`] - the selection-widget contract renderers talk to
//! - [`select`] - the selection binder for enumerated preferences
//! - [`registry`] - capability-scored renderer registration
//! - [`view`] - the Cursive-backed host implementation

/// Selection-widget contract: options, props, and the host trait.
pub mod widget;

/// Selection binder for enumerated preferences.
pub mod select;

/// Capability-scored renderer registration.
pub mod registry;

/// Cursive-backed selection host.
pub mod view;

pub use registry::{
    LeafRendererContribution, NodeRenderer, RendererContext, RendererRegistry,
    SelectRendererContribution,
};
pub use select::SelectRenderer;
pub use view::{CursiveSelectHost, RowSync};
pub use widget::{SelectOption, SelectProps, SelectionHost, display_string};

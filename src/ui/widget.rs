//! Selection-widget contract.
//!
//! Renderers never touch a concrete toolkit; they hand a [`SelectProps`] to
//! whatever [`SelectionHost`] the presentation layer supplies. The host owns
//! the interactive control, reports whether it currently has input focus,
//! and invokes each option's callback on user pick.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::event::Event;

/// Detail marker attached to the option matching the declared default.
pub const DEFAULT_DETAIL: &str = "default";

/// Display form of a scalar preference value.
///
/// Strings render bare; everything else uses its JSON rendering, so `1` and
/// `"1"` share the display form `"1"`.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Per-render view model for one selectable option.
///
/// Recomputed from the definition and the current effective value on every
/// render pass; never persisted.
pub struct SelectOption {
    /// Display form of the enum entry.
    pub value: String,
    /// `Some(DEFAULT_DETAIL)` when this entry is the declared default.
    pub detail: Option<&'static str>,
    /// Plain-text description, absent past the description array's length.
    pub description: Option<String>,
    /// Markdown description, absent past the array's length.
    pub markdown_description: Option<String>,
    /// Invoked when the user picks this option.
    pub on_selected: Rc<dyn Fn()>,
}

impl SelectOption {
    /// Label shown by hosts: the value, with the default marker appended.
    pub fn label(&self) -> String {
        match self.detail {
            Some(detail) => format!("{} ({detail})", self.value),
            None => self.value.clone(),
        }
    }
}

impl fmt::Debug for SelectOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectOption")
            .field("value", &self.value)
            .field("detail", &self.detail)
            .field("description", &self.description)
            .field("markdown_description", &self.markdown_description)
            .finish_non_exhaustive()
    }
}

/// Everything a host needs to mount the widget.
pub struct SelectProps {
    /// Options in definition order.
    pub options: Vec<SelectOption>,
    /// Index of the currently selected option.
    pub selected: usize,
    /// Fires the fresh selection index whenever the value changes while the
    /// widget is not focused.
    pub on_did_change: Event<usize>,
}

/// Abstract presentation layer for one selection widget.
pub trait SelectionHost {
    /// Build (or replace) the interactive control from `props`.
    fn mount(&mut self, props: SelectProps);

    /// Whether this widget is the current target of user input.
    fn has_focus(&self) -> bool;

    /// Publish the modified-from-default status.
    fn set_modified(&mut self, modified: bool);
}

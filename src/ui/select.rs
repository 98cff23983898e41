//! Selection binder for enumerated preferences.
//!
//! [`SelectRenderer`] keeps a selection widget's displayed state consistent
//! with an external preference value and propagates user picks back, without
//! redundant or circular updates. The store is the single source of truth:
//! a user pick only writes; every state refresh flows back through the
//! store's change notification.

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;
use serde_json::Value;

use crate::data::node::{Inspection, PreferenceNode};
use crate::data::store::PreferenceStore;
use crate::event::{Emitter, Subscription};
use crate::ui::registry::NodeRenderer;
use crate::ui::widget::{DEFAULT_DETAIL, SelectOption, SelectProps, SelectionHost, display_string};

/// Leaf renderer binding one enumerated preference to a selection widget.
pub struct SelectRenderer {
    node: PreferenceNode,
    inner: Rc<RefCell<SelectInner>>,
    store_sub: Option<Subscription>,
}

struct SelectInner {
    node: PreferenceNode,
    store: Rc<dyn PreferenceStore>,
    host: Option<Box<dyn SelectionHost>>,
    on_did_change: Emitter<usize>,
    inspection: Option<Inspection>,
    modified: bool,
}

impl SelectRenderer {
    pub fn new(store: Rc<dyn PreferenceStore>, node: PreferenceNode) -> Self {
        let inner = Rc::new(RefCell::new(SelectInner {
            node: node.clone(),
            store: store.clone(),
            host: None,
            on_did_change: Emitter::new(),
            inspection: None,
            modified: false,
        }));

        let weak = Rc::downgrade(&inner);
        let key = node.key().to_string();
        let store_sub = store.on_did_change_value().subscribe(move |changed: &String| {
            if *changed == key
                && let Some(inner) = weak.upgrade()
            {
                SelectInner::value_changed(&inner);
            }
        });

        // Seed inspection and modification status from the current value.
        SelectInner::value_changed(&inner);

        SelectRenderer {
            node,
            inner,
            store_sub: Some(store_sub),
        }
    }

    /// One option per allowed value, in definition order.
    ///
    /// The default marker compares display strings, so a numeric default
    /// marks a numeric entry even though both were stringified.
    pub fn select_options(&self) -> Vec<SelectOption> {
        SelectInner::select_options(&self.inner)
    }

    /// Index of the first enum entry strictly value-equal to the effective
    /// current value, or `0` when nothing matches. Never out of range for a
    /// non-empty enum set.
    pub fn selection_index(&self) -> usize {
        self.inner.borrow().selection_index()
    }

    /// First enum entry; what an absent value displays as.
    pub fn fallback_value(&self) -> Option<Value> {
        self.inner.borrow().fallback_value().cloned()
    }

    /// Effective value for display: the stored value, else the fallback.
    pub fn effective_value(&self) -> Option<Value> {
        self.inner.borrow().effective_value()
    }
}

impl NodeRenderer for SelectRenderer {
    fn key(&self) -> &str {
        self.node.key()
    }

    fn render(&mut self, mut host: Box<dyn SelectionHost>) {
        let props = SelectProps {
            options: SelectInner::select_options(&self.inner),
            selected: self.inner.borrow().selection_index(),
            on_did_change: self.inner.borrow().on_did_change.event(),
        };
        host.mount(props);
        host.set_modified(self.inner.borrow().modified);
        // Replaces any previously attached widget for this node.
        self.inner.borrow_mut().host = Some(host);
    }

    fn handle_value_change(&mut self) {
        SelectInner::value_changed(&self.inner);
    }

    fn dispose(&mut self) {
        if let Some(sub) = self.store_sub.take() {
            sub.dispose();
        }
        self.inner.borrow_mut().host = None;
    }
}

impl Drop for SelectRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl SelectInner {
    fn select_options(inner: &Rc<RefCell<SelectInner>>) -> Vec<SelectOption> {
        let borrowed = inner.borrow();
        let definition = borrowed.node.definition();
        let default_label = definition.default.as_ref().map(display_string);

        definition
            .enum_values
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let value = display_string(entry);
                let detail = (default_label.as_deref() == Some(value.as_str()))
                    .then_some(DEFAULT_DETAIL);
                let weak = Rc::downgrade(inner);
                SelectOption {
                    value,
                    detail,
                    description: definition.enum_descriptions.get(index).cloned(),
                    markdown_description: definition
                        .markdown_enum_descriptions
                        .get(index)
                        .cloned(),
                    on_selected: Rc::new(move || {
                        if let Some(inner) = weak.upgrade() {
                            SelectInner::user_interaction(&inner, index);
                        }
                    }),
                }
            })
            .collect()
    }

    /// Map a picked index back to its enum value and write it eagerly.
    ///
    /// No local state changes here; the refresh arrives through the store's
    /// change notification only.
    fn user_interaction(inner: &Rc<RefCell<SelectInner>>, index: usize) {
        let (store, key, value) = {
            let borrowed = inner.borrow();
            let value = borrowed.node.definition().enum_values.get(index).cloned();
            (borrowed.store.clone(), borrowed.node.key().to_string(), value)
        };
        // Borrow released: the write below re-enters through the store
        // notification.
        if let Some(value) = value {
            store.set_value_immediately(&key, value);
        }
    }

    fn value_changed(inner: &Rc<RefCell<SelectInner>>) {
        let (index, focused) = {
            let mut borrowed = inner.borrow_mut();
            let inspection = borrowed.store.inspect(borrowed.node.key());
            borrowed.inspection = Some(inspection);

            let index = borrowed.selection_index();
            let modified = borrowed
                .inspection
                .as_ref()
                .is_some_and(Inspection::is_overridden);
            borrowed.modified = modified;
            if let Some(host) = borrowed.host.as_mut() {
                host.set_modified(modified);
            }

            let focused = borrowed.host.as_ref().is_some_and(|host| host.has_focus());
            trace!(
                "value change on {}: index {index}, modified {modified}, focused {focused}",
                borrowed.node.key()
            );
            (index, focused)
        };

        // Do not re-notify the widget while the user is interacting with
        // it; that would loop pick -> write -> notify -> re-apply -> write.
        if !focused {
            inner.borrow().on_did_change.fire(&index);
        }
    }

    fn current_value(&self) -> Option<Value> {
        self.store.value(self.node.key())
    }

    fn fallback_value(&self) -> Option<&Value> {
        self.node.definition().enum_values.first()
    }

    fn effective_value(&self) -> Option<Value> {
        self.current_value()
            .or_else(|| self.fallback_value().cloned())
    }

    fn selection_index(&self) -> usize {
        let Some(current) = self.current_value() else {
            return 0;
        };
        self.node
            .definition()
            .enum_values
            .iter()
            .position(|entry| *entry == current)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;
    use crate::data::definition::PreferenceDefinition;
    use crate::data::store::MemoryStore;

    #[derive(Clone, Default)]
    struct MockHandles {
        focused: Rc<Cell<bool>>,
        modified: Rc<Cell<bool>>,
        mounts: Rc<RefCell<Vec<MountSnapshot>>>,
        props: Rc<RefCell<Option<SelectProps>>>,
        emitted: Rc<RefCell<Vec<usize>>>,
    }

    #[derive(Debug, PartialEq)]
    struct MountSnapshot {
        options: Vec<(String, Option<&'static str>, Option<String>)>,
        selected: usize,
    }

    struct MockHost {
        handles: MockHandles,
        change_sub: Option<Subscription>,
    }

    impl SelectionHost for MockHost {
        fn mount(&mut self, props: SelectProps) {
            self.handles.mounts.borrow_mut().push(MountSnapshot {
                options: props
                    .options
                    .iter()
                    .map(|o| (o.value.clone(), o.detail, o.description.clone()))
                    .collect(),
                selected: props.selected,
            });
            let emitted = self.handles.emitted.clone();
            self.change_sub = Some(
                props
                    .on_did_change
                    .subscribe(move |index: &usize| emitted.borrow_mut().push(*index)),
            );
            *self.handles.props.borrow_mut() = Some(props);
        }

        fn has_focus(&self) -> bool {
            self.handles.focused.get()
        }

        fn set_modified(&mut self, modified: bool) {
            self.handles.modified.set(modified);
        }
    }

    fn definition(enum_values: Vec<Value>, default: Option<Value>) -> PreferenceDefinition {
        PreferenceDefinition {
            key: "size".to_string(),
            title: None,
            description: None,
            enum_values,
            default,
            enum_descriptions: Vec::new(),
            markdown_enum_descriptions: Vec::new(),
        }
    }

    fn rendered(def: PreferenceDefinition) -> (Rc<MemoryStore>, SelectRenderer, MockHandles) {
        let store = MemoryStore::new();
        store.seed_defaults(std::slice::from_ref(&def));
        let node = PreferenceNode::new(Rc::new(def));
        let mut renderer = SelectRenderer::new(store.clone(), node);
        let handles = MockHandles::default();
        renderer.render(Box::new(MockHost {
            handles: handles.clone(),
            change_sub: None,
        }));
        (store, renderer, handles)
    }

    fn pick(handles: &MockHandles, index: usize) {
        let props = handles.props.borrow();
        (props.as_ref().unwrap().options[index].on_selected)();
    }

    #[test]
    fn options_mark_default_and_carry_descriptions() {
        let mut def = definition(
            vec![json!("small"), json!("medium"), json!("large")],
            Some(json!("medium")),
        );
        def.enum_descriptions = vec!["tiny".to_string(), "regular".to_string()];
        def.markdown_enum_descriptions = vec!["*tiny*".to_string()];
        let (store, renderer, _handles) = rendered(def);
        store.set_value_immediately("size", json!("large"));

        let options = renderer.select_options();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].detail, None);
        assert_eq!(options[1].detail, Some(DEFAULT_DETAIL));
        assert_eq!(options[2].detail, None);
        // Short parallel arrays leave later entries without descriptions.
        assert_eq!(options[0].description.as_deref(), Some("tiny"));
        assert_eq!(options[2].description, None);
        assert_eq!(options[0].markdown_description.as_deref(), Some("*tiny*"));
        assert_eq!(options[1].markdown_description, None);

        assert_eq!(renderer.selection_index(), 2);
    }

    #[test]
    fn selection_index_uses_strict_value_equality() {
        let (store, renderer, _handles) =
            rendered(definition(vec![json!(1), json!(2), json!(3)], None));

        store.set_value_immediately("size", json!(2));
        assert_eq!(renderer.selection_index(), 1);

        // No strict match: a string "2" does not equal the number 2.
        store.set_value_immediately("size", json!("2"));
        assert_eq!(renderer.selection_index(), 0);

        // Out-of-set value falls back to 0 without error.
        store.set_value_immediately("size", json!(4));
        assert_eq!(renderer.selection_index(), 0);
    }

    #[test]
    fn default_marker_compares_string_forms() {
        // Number-vs-string divergence is deliberate: marking stringifies,
        // index lookup does not.
        let (_store, renderer, _handles) =
            rendered(definition(vec![json!(1), json!(2), json!(3)], Some(json!(1))));
        let options = renderer.select_options();
        assert_eq!(options[0].detail, Some(DEFAULT_DETAIL));
        assert_eq!(options[0].value, "1");
    }

    #[test]
    fn absent_value_falls_back_to_first_entry() {
        let (_store, renderer, handles) =
            rendered(definition(vec![json!("small"), json!("medium")], None));

        assert_eq!(renderer.selection_index(), 0);
        assert_eq!(renderer.fallback_value(), Some(json!("small")));
        assert_eq!(renderer.effective_value(), Some(json!("small")));
        assert_eq!(handles.mounts.borrow()[0].selected, 0);
    }

    #[test]
    fn user_interaction_writes_exactly_once() {
        let (store, renderer, handles) = rendered(definition(
            vec![json!("small"), json!("medium"), json!("large")],
            Some(json!("medium")),
        ));

        let writes = Rc::new(Cell::new(0u32));
        let counter = writes.clone();
        let _sub = store
            .on_did_change_value()
            .subscribe(move |_: &String| counter.set(counter.get() + 1));

        pick(&handles, 2);

        assert_eq!(writes.get(), 1);
        assert_eq!(store.value("size"), Some(json!("large")));
        // Derived, not locally mutated: the index comes back from the store.
        assert_eq!(renderer.selection_index(), 2);
        assert!(handles.modified.get());
    }

    #[test]
    fn focused_widget_is_not_re_notified() {
        let (store, _renderer, handles) = rendered(definition(
            vec![json!("small"), json!("medium"), json!("large")],
            None,
        ));

        handles.focused.set(true);
        store.set_value_immediately("size", json!("large"));
        assert!(handles.emitted.borrow().is_empty());
        // Status refresh still happened.
        assert!(handles.modified.get());

        handles.focused.set(false);
        store.set_value_immediately("size", json!("medium"));
        assert_eq!(*handles.emitted.borrow(), vec![1]);
    }

    #[test]
    fn pick_while_focused_does_not_echo_back() {
        let (_store, _renderer, handles) = rendered(definition(
            vec![json!("small"), json!("medium"), json!("large")],
            None,
        ));

        // A real widget holds focus while the user interacts with it.
        handles.focused.set(true);
        pick(&handles, 1);
        assert!(handles.emitted.borrow().is_empty());
    }

    #[test]
    fn re_render_with_unchanged_inputs_is_idempotent() {
        let mut def = definition(
            vec![json!("small"), json!("medium"), json!("large")],
            Some(json!("medium")),
        );
        def.enum_descriptions = vec!["tiny".to_string()];
        let (store, mut renderer, handles) = rendered(def);
        store.set_value_immediately("size", json!("large"));

        renderer.render(Box::new(MockHost {
            handles: handles.clone(),
            change_sub: None,
        }));
        renderer.render(Box::new(MockHost {
            handles: handles.clone(),
            change_sub: None,
        }));

        let mounts = handles.mounts.borrow();
        let last = mounts.len() - 1;
        assert_eq!(mounts[last], mounts[last - 1]);
        assert_eq!(mounts[last].selected, 2);
    }

    #[test]
    fn dispose_detaches_from_the_store() {
        let (store, mut renderer, handles) = rendered(definition(
            vec![json!("small"), json!("medium")],
            None,
        ));

        renderer.dispose();
        store.set_value_immediately("size", json!("medium"));
        assert!(handles.emitted.borrow().is_empty());
    }
}

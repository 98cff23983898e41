//! Cursive-backed selection host.
//!
//! Binds the abstract widget contract to a `SelectView`: option labels come
//! from the view model, user submits invoke the picked option's callback,
//! and a `FocusTracker` maintains the focus flag the binder's re-entrancy
//! guard reads. Change-channel firings land in a pending cell and are
//! applied to the view on the next UI pump, since listeners run without
//! access to the `Cursive` root.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cursive::Cursive;
use cursive::event::EventResult;
use cursive::view::Nameable;
use cursive::views::{BoxedView, FocusTracker, LinearLayout, SelectView, TextView};

use crate::event::Subscription;
use crate::ui::widget::{SelectProps, SelectionHost};

/// [`SelectionHost`] implementation rendering into a Cursive view tree.
///
/// `mount` parks the built view in a slot; the form builder takes it from
/// there and adds it to the layout it is assembling.
pub struct CursiveSelectHost {
    name: String,
    title: String,
    focused: Rc<Cell<bool>>,
    pending: Rc<Cell<Option<usize>>>,
    modified: Rc<Cell<bool>>,
    built: Rc<RefCell<Option<BoxedView>>>,
    change_sub: Option<Subscription>,
}

impl CursiveSelectHost {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        CursiveSelectHost {
            name: name.into(),
            title: title.into(),
            focused: Rc::new(Cell::new(false)),
            pending: Rc::new(Cell::new(None)),
            modified: Rc::new(Cell::new(false)),
            built: Rc::new(RefCell::new(None)),
            change_sub: None,
        }
    }

    /// Slot the mounted view is parked in.
    pub fn view_slot(&self) -> Rc<RefCell<Option<BoxedView>>> {
        self.built.clone()
    }

    /// Handle the UI pump uses to push queued updates into the view tree.
    pub fn sync_handle(&self) -> RowSync {
        RowSync {
            name: self.name.clone(),
            title: self.title.clone(),
            pending: self.pending.clone(),
            modified: self.modified.clone(),
            shown_modified: Cell::new(false),
        }
    }
}

impl SelectionHost for CursiveSelectHost {
    fn mount(&mut self, props: SelectProps) {
        let mut select = SelectView::<usize>::new();
        for (index, option) in props.options.iter().enumerate() {
            select.add_item(option.label(), index);
        }
        let _ = select.set_selection(props.selected);

        let callbacks: Rc<Vec<Rc<dyn Fn()>>> = Rc::new(
            props
                .options
                .iter()
                .map(|option| option.on_selected.clone())
                .collect(),
        );
        select.set_on_submit(move |_siv: &mut Cursive, index: &usize| {
            if let Some(callback) = callbacks.get(*index) {
                callback();
            }
        });

        let gained = self.focused.clone();
        let lost = self.focused.clone();
        let tracked = FocusTracker::new(select.with_name(self.name.clone()))
            .on_focus(move |_| {
                gained.set(true);
                EventResult::Ignored
            })
            .on_focus_lost(move |_| {
                lost.set(false);
                EventResult::Ignored
            });

        let pending = self.pending.clone();
        self.change_sub = Some(
            props
                .on_did_change
                .subscribe(move |index: &usize| pending.set(Some(*index))),
        );

        let row = LinearLayout::vertical()
            .child(TextView::new(self.title.clone()).with_name(label_name(&self.name)))
            .child(tracked);
        *self.built.borrow_mut() = Some(BoxedView::boxed(row));
    }

    fn has_focus(&self) -> bool {
        self.focused.get()
    }

    fn set_modified(&mut self, modified: bool) {
        self.modified.set(modified);
    }
}

/// Per-row handle applying queued selection and status updates.
pub struct RowSync {
    name: String,
    title: String,
    pending: Rc<Cell<Option<usize>>>,
    modified: Rc<Cell<bool>>,
    shown_modified: Cell<bool>,
}

impl RowSync {
    /// Apply pending updates to the named views. Called from the UI pump,
    /// which has the `Cursive` root the change listeners lack.
    pub fn apply(&self, siv: &mut Cursive) {
        if let Some(index) = self.pending.take() {
            siv.call_on_name(&self.name, |view: &mut SelectView<usize>| {
                let _ = view.set_selection(index);
            });
        }

        let modified = self.modified.get();
        if modified != self.shown_modified.get() {
            self.shown_modified.set(modified);
            let label = if modified {
                format!("{} *", self.title)
            } else {
                self.title.clone()
            };
            siv.call_on_name(&label_name(&self.name), |view: &mut TextView| {
                view.set_content(label);
            });
        }
    }
}

fn label_name(name: &str) -> String {
    format!("{name}.label")
}

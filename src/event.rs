//! Single-threaded change-notification channel.
//!
//! An [`Emitter`] is owned by the component that produces notifications; it
//! hands out cloneable [`Event`] handles that consumers use to subscribe.
//! Subscriptions are removed explicitly through [`Subscription::dispose`] or
//! implicitly when the handle is dropped, so teardown is always tied to the
//! owner's lifecycle rather than left to chance.
//!
//! Everything here is `Rc`-based: the editor runs on a single cooperative UI
//! thread and listeners fire synchronously, in subscription order.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct ListenerList<T: 'static> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

impl<T: 'static> ListenerList<T> {
    fn new() -> Self {
        ListenerList {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

/// Single-producer notification source.
pub struct Emitter<T: 'static> {
    listeners: Rc<RefCell<ListenerList<T>>>,
}

impl<T: 'static> Emitter<T> {
    pub fn new() -> Self {
        Emitter {
            listeners: Rc::new(RefCell::new(ListenerList::new())),
        }
    }

    /// Subscribe handle for this emitter.
    pub fn event(&self) -> Event<T> {
        Event {
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Invoke every live listener with `value`, in subscription order.
    ///
    /// Delivery works off a snapshot of the listener list, so listeners may
    /// subscribe or dispose during a `fire` without corrupting delivery.
    pub fn fire(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        for listener in snapshot {
            listener(value);
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscribe handle derived from an [`Emitter`].
///
/// Holds only a weak reference: once the emitter is dropped, subscribing
/// yields an inert [`Subscription`].
pub struct Event<T: 'static> {
    listeners: Weak<RefCell<ListenerList<T>>>,
}

impl<T: 'static> Clone for Event<T> {
    fn clone(&self) -> Self {
        Event {
            listeners: self.listeners.clone(),
        }
    }
}

impl<T: 'static> Event<T> {
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let Some(list) = self.listeners.upgrade() else {
            return Subscription::empty();
        };
        let id = {
            let mut list = list.borrow_mut();
            let id = list.next_id;
            list.next_id += 1;
            list.entries.push((id, Rc::new(listener)));
            id
        };
        let weak = Rc::downgrade(&list);
        Subscription {
            dispose: Some(Box::new(move || {
                if let Some(list) = weak.upgrade() {
                    list.borrow_mut().entries.retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }
}

/// Handle to one registered listener.
///
/// Disposing removes the listener; dropping the handle disposes as well.
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// A subscription that is not attached to anything.
    pub fn empty() -> Self {
        Subscription { dispose: None }
    }

    /// Remove the listener from its emitter.
    pub fn dispose(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

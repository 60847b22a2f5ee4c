//! # Observable properties
//!
//! Change channels are explicit: anything a view can watch implements
//! [`Observable`], and watching it yields a [`Subscription`] that
//! unsubscribes exactly once when dropped.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use trellis_core::*;
//!
//! let name = property("A".to_string());
//! let hits = Rc::new(Cell::new(0));
//!
//! let sub = Subscription::install(Rc::new(name.clone()), {
//!     let hits = hits.clone();
//!     Rc::new(move || hits.set(hits.get() + 1))
//! });
//!
//! name.set("B".to_string());
//! drop(sub);
//! name.set("C".to_string());
//! assert_eq!(hits.get(), 1);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

pub type SubId = u64;
pub type Handler = Rc<dyn Fn()>;

/// A change channel with typed subscribe/unsubscribe.
pub trait Observable {
    fn subscribe(&self, handler: Handler) -> SubId;
    fn unsubscribe(&self, id: SubId);
}

/// One installed handler. Unsubscribes on drop.
pub struct Subscription {
    channel: Rc<dyn Observable>,
    id: SubId,
}

impl Subscription {
    pub fn install(channel: Rc<dyn Observable>, handler: Handler) -> Self {
        let id = channel.subscribe(handler);
        Self { channel, id }
    }

    pub fn id(&self) -> SubId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.channel.unsubscribe(self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Handler list shared by the channel implementations in this crate.
#[derive(Default)]
pub(crate) struct Subscribers {
    next: SubId,
    handlers: Vec<(SubId, Handler)>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, handler: Handler) -> SubId {
        let id = self.next;
        self.next += 1;
        self.handlers.push((id, handler));
        id
    }

    pub(crate) fn remove(&mut self, id: SubId) {
        self.handlers.retain(|(sid, _)| *sid != id);
    }

    pub(crate) fn ids(&self) -> Vec<SubId> {
        self.handlers.iter().map(|(id, _)| *id).collect()
    }

    pub(crate) fn get(&self, id: SubId) -> Option<Handler> {
        self.handlers
            .iter()
            .find(|(sid, _)| *sid == id)
            .map(|(_, h)| h.clone())
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Calls every handler in `ids` that `lookup` still finds. No borrow is held
/// while a handler runs, so handlers may unsubscribe themselves or others.
pub(crate) fn dispatch(ids: Vec<SubId>, lookup: impl Fn(SubId) -> Option<Handler>) {
    for id in ids {
        if let Some(handler) = lookup(id) {
            handler();
        }
    }
}

/// Observable cell. Clones share the same value and subscribers.
pub struct Property<T: 'static>(Rc<PropertyInner<T>>);

struct PropertyInner<T> {
    value: RefCell<T>,
    subs: RefCell<Subscribers>,
}

impl<T> Property<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(PropertyInner {
            value: RefCell::new(value),
            subs: RefCell::new(Subscribers::default()),
        }))
    }
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.value.borrow().clone()
    }
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.value.borrow())
    }
    /// Stores `v` and notifies every subscriber.
    pub fn set(&self, v: T) {
        *self.0.value.borrow_mut() = v;
        self.notify();
    }
    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        f(&mut self.0.value.borrow_mut());
        self.notify();
    }
    /// Stores `v` without raising a change.
    pub fn set_quiet(&self, v: T) {
        *self.0.value.borrow_mut() = v;
    }
    /// Raises a change without touching the value.
    pub fn notify(&self) {
        let ids = self.0.subs.borrow().ids();
        dispatch(ids, |id| self.0.subs.borrow().get(id));
    }
    pub fn subscriber_count(&self) -> usize {
        self.0.subs.borrow().len()
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Identity comparison: two handles are equal when they share one cell.
impl<T> PartialEq for Property<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Eq for Property<T> {}

impl<T: std::fmt::Debug> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Property")
            .field(&*self.0.value.borrow())
            .finish()
    }
}

impl<T> Observable for Property<T> {
    fn subscribe(&self, handler: Handler) -> SubId {
        self.0.subs.borrow_mut().add(handler)
    }
    fn unsubscribe(&self, id: SubId) {
        self.0.subs.borrow_mut().remove(id);
    }
}

pub fn property<T>(t: T) -> Property<T> {
    Property::new(t)
}

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::observable::{Subscribers, dispatch};
use crate::{Handler, Observable, SubId};

type FieldKey = (usize, String);

/// Field-keyed change broadcast for domain objects that cannot expose a
/// [`crate::Property`] per member. The owner raises
/// `prop_changed(&obj, "member")`; views listen through [`FieldChannel`]s,
/// usually obtained via [`crate::BroadcastBridge`].
#[derive(Clone, Default)]
pub struct PropBroadcast(Rc<RefCell<HashMap<FieldKey, Subscribers>>>);

/// Identity of an object for broadcast purposes.
pub fn object_key<M: ?Sized>(obj: &Rc<M>) -> usize {
    Rc::as_ptr(obj) as *const () as usize
}

impl PropBroadcast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prop_changed<M: ?Sized>(&self, obj: &Rc<M>, member: &str) {
        self.fire(object_key(obj), member);
    }

    pub fn fire(&self, key: usize, member: &str) {
        let field = (key, member.to_string());
        let ids = match self.0.borrow().get(&field) {
            Some(subs) => subs.ids(),
            None => return,
        };
        log::trace!("broadcast {member} on {key:#x} to {} handler(s)", ids.len());
        dispatch(ids, |id| self.0.borrow().get(&field).and_then(|s| s.get(id)));
    }

    pub fn channel(&self, key: usize, member: &str) -> FieldChannel {
        FieldChannel {
            broadcast: self.clone(),
            key,
            member: member.to_string(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.0.borrow().values().map(Subscribers::len).sum()
    }
}

/// One `(object, member)` slot of a [`PropBroadcast`].
pub struct FieldChannel {
    broadcast: PropBroadcast,
    key: usize,
    member: String,
}

impl Observable for FieldChannel {
    fn subscribe(&self, handler: Handler) -> SubId {
        self.broadcast
            .0
            .borrow_mut()
            .entry((self.key, self.member.clone()))
            .or_default()
            .add(handler)
    }

    fn unsubscribe(&self, id: SubId) {
        let mut map = self.broadcast.0.borrow_mut();
        let field = (self.key, self.member.clone());
        if let Some(subs) = map.get_mut(&field) {
            subs.remove(id);
            if subs.is_empty() {
                map.remove(&field);
            }
        }
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use crate::{HookupId, Result, ViewBuilder, ViewError};

/// Per-item display template.
pub type ItemTemplate<T> = Rc<dyn Fn(&mut ViewBuilder<'_>, &T) -> Result<()>>;

/// The window of a sequence that changed: `removed` old items starting at
/// `start` were replaced by `inserted` new ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Splice {
    pub start: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl Splice {
    /// Smallest window turning `old` into `new`, by common prefix and
    /// suffix. `None` when nothing changed.
    pub fn between<T: PartialEq>(old: &[T], new: &[T]) -> Option<Splice> {
        let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
        let room = old.len().min(new.len()) - prefix;
        let suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take(room)
            .take_while(|(a, b)| a == b)
            .count();
        let removed = old.len() - prefix - suffix;
        let inserted = new.len() - prefix - suffix;
        (removed > 0 || inserted > 0).then_some(Splice {
            start: prefix,
            removed,
            inserted,
        })
    }
}

/// Type-erased bound sequence, shared by eager and lazy hookups.
pub(crate) trait SequenceSource {
    fn item_count(&self) -> usize;
    /// Re-fetches and reports what changed since the last fetch.
    fn refresh(&self) -> Option<Splice>;
    /// Builds item `index` as one item hookup at the builder's cursor.
    fn build_item(&self, b: &mut ViewBuilder<'_>, index: usize) -> Result<HookupId>;
    /// Drops `count` stored items from `start` that were never built, so
    /// the stored list keeps matching the item hookups.
    fn forget(&self, start: usize, count: usize);
}

/// Type-erased bound object.
pub(crate) trait ObjectSource {
    /// Re-fetches; `true` when the value differs from the one displayed.
    fn refresh(&self) -> bool;
    fn build(&self, b: &mut ViewBuilder<'_>) -> Result<()>;
    /// Marks the value as not displayed; the next refresh rebuilds.
    fn forget(&self);
}

pub(crate) struct ItemSource<T> {
    fetch: Rc<dyn Fn() -> Vec<T>>,
    items: RefCell<Vec<T>>,
    template: ItemTemplate<T>,
}

impl<T> ItemSource<T> {
    pub(crate) fn new(fetch: Rc<dyn Fn() -> Vec<T>>, template: ItemTemplate<T>) -> Self {
        let items = RefCell::new(fetch());
        Self {
            fetch,
            items,
            template,
        }
    }
}

impl<T: Clone + PartialEq> SequenceSource for ItemSource<T> {
    fn item_count(&self) -> usize {
        self.items.borrow().len()
    }

    fn refresh(&self) -> Option<Splice> {
        let fresh = (self.fetch)();
        let splice = Splice::between(&self.items.borrow(), &fresh);
        *self.items.borrow_mut() = fresh;
        splice
    }

    fn build_item(&self, b: &mut ViewBuilder<'_>, index: usize) -> Result<HookupId> {
        let item = {
            let items = self.items.borrow();
            items
                .get(index)
                .cloned()
                .ok_or(ViewError::ItemIndexOutOfRange {
                    index,
                    len: items.len(),
                })?
        };
        let template = self.template.clone();
        b.add_item(move |b| template(b, &item))
    }

    fn forget(&self, start: usize, count: usize) {
        let mut items = self.items.borrow_mut();
        let start = start.min(items.len());
        let end = start.saturating_add(count).min(items.len());
        items.drain(start..end);
    }
}

pub(crate) struct ObjSource<T> {
    fetch: Rc<dyn Fn() -> T>,
    /// `None` while nothing is displayed.
    current: RefCell<Option<T>>,
    template: ItemTemplate<T>,
}

impl<T> ObjSource<T> {
    pub(crate) fn new(fetch: Rc<dyn Fn() -> T>, template: ItemTemplate<T>) -> Self {
        let current = RefCell::new(Some(fetch()));
        Self {
            fetch,
            current,
            template,
        }
    }
}

impl<T: Clone + PartialEq> ObjectSource for ObjSource<T> {
    fn refresh(&self) -> bool {
        let fresh = (self.fetch)();
        if self.current.borrow().as_ref() == Some(&fresh) {
            return false;
        }
        *self.current.borrow_mut() = Some(fresh);
        true
    }

    fn build(&self, b: &mut ViewBuilder<'_>) -> Result<()> {
        let Some(value) = self.current.borrow().clone() else {
            return Ok(());
        };
        (self.template)(b, &value)
    }

    fn forget(&self) {
        self.current.borrow_mut().take();
    }
}

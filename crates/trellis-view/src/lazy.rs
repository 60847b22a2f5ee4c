//! Deferred construction of lazy sequences.
//!
//! A lazy hookup places one [`crate::LazyBox`] standing for all of its
//! items. A backend calls [`ViewTree::expand`] when it first needs item
//! `index`; the item is built synchronously, inserted into the lazy box in
//! logical order, and remembered so later calls return it directly.

use crate::builder::Frame;
use crate::hookup::{HookupKind, Part};
use crate::{BoxId, BoxKind, HookupId, Result, ViewBuilder, ViewError, ViewTree};

impl ViewTree {
    /// Item hookup for item `index` of `lazy`, building it on first use.
    pub fn expand(&mut self, lazy: BoxId, index: usize) -> Result<HookupId> {
        let hookup = match self.boxes.get(lazy).map(|n| n.kind()) {
            Some(BoxKind::Lazy(l)) => l.hookup,
            Some(_) => return Err(ViewError::NotLazy(lazy)),
            None => return Err(ViewError::StaleBox(lazy)),
        };
        let node = self
            .hookups
            .get(hookup)
            .ok_or(ViewError::StaleHookup(hookup))?;
        let HookupKind::Lazy(state) = &node.kind else {
            return Err(ViewError::NotLazy(lazy));
        };
        let len = state.expanded.len();
        match state.expanded.get(index) {
            None => return Err(ViewError::ItemIndexOutOfRange { index, len }),
            Some(Some(item)) => return Ok(*item),
            Some(None) => {}
        }

        let source = state.source.clone();
        let style = node.style.clone();
        let part_at = match state.expanded[..index].iter().rev().find_map(|e| *e) {
            Some(prev) => self
                .hookups
                .position_of(hookup, Part::Child(prev))
                .map_or(0, |i| i + 1),
            None => self
                .hookups
                .position_of(hookup, Part::Box(lazy))
                .map_or(0, |i| i + 1),
        };
        let anchor = self.anchor_before(hookup, part_at, lazy);
        let cursor = self.cursor_after(lazy, anchor);
        let item = {
            let mut b = ViewBuilder::resume(self, Frame::resume(hookup, lazy, cursor, part_at, style));
            source.build_item(&mut b, index)?
        };

        if let Some(HookupKind::Lazy(state)) = self.hookups.get_mut(hookup).map(|n| &mut n.kind)
            && let Some(slot) = state.expanded.get_mut(index)
        {
            *slot = Some(item);
        }
        log::debug!("expanded item {index} of {lazy:?}");
        Ok(item)
    }

    /// Logical length of a lazy box.
    pub fn lazy_len(&self, lazy: BoxId) -> Option<usize> {
        match self.boxes.get(lazy)?.kind() {
            BoxKind::Lazy(l) => Some(l.len()),
            _ => None,
        }
    }
}

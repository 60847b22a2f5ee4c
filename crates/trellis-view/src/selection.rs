//! # Selections
//!
//! Selections name data positions, not pixels: a text hookup and a
//! grapheme offset into the text it displays. [`SelectionBuilder`] walks
//! the hookup tree by child index to find one.
//!
//! ```rust
//! use std::rc::Rc;
//! use trellis_core::*;
//! use trellis_view::*;
//!
//! struct Doc {
//!     body: Property<String>,
//! }
//!
//! let doc = Rc::new(Doc { body: property("Hello".to_string()) });
//! let view = RootView::default();
//! view.show(&Paragraph::containing(Display::of(bind!(doc.body))))
//!     .unwrap();
//!
//! let ip = SelectionBuilder::in_root(&view)
//!     .child(0)
//!     .offset(3)
//!     .selection()
//!     .unwrap();
//! assert!(matches!(ip, Selection::Insertion(p) if p.offset == 3));
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::hookup::{HookupKind, Part};
use crate::{BoxId, HookupId, Result, RootView, ViewError, ViewTree};

/// A caret inside the text of a text hookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertionPoint {
    pub hookup: HookupId,
    /// Grapheme offset into the hookup's text.
    pub offset: usize,
}

impl InsertionPoint {
    /// Paragraph, run index and byte offset within that run.
    pub fn locate(&self, tree: &ViewTree) -> Option<(BoxId, usize, usize)> {
        let node = tree.hookups().get(self.hookup)?;
        let HookupKind::Text(text) = node.kind() else {
            return None;
        };
        let para = text.para();
        let mut remaining = self.offset;
        let mut last = None;
        for part in node.parts() {
            let Part::Run { run, .. } = part else {
                continue;
            };
            let index = tree.boxes().run_index(para, *run)?;
            let run_text = &tree.runs(para)[index].text;
            let count = run_text.graphemes(true).count();
            if remaining < count {
                let byte = run_text
                    .grapheme_indices(true)
                    .nth(remaining)
                    .map_or(run_text.len(), |(i, _)| i);
                return Some((para, index, byte));
            }
            remaining -= count;
            last = Some((para, index, run_text.len()));
        }
        if remaining == 0 { last } else { None }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeSelection {
    pub anchor: InsertionPoint,
    pub end: InsertionPoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Insertion(InsertionPoint),
    Range(RangeSelection),
}

impl Selection {
    pub fn hookups(&self) -> impl Iterator<Item = HookupId> {
        let (a, b) = match self {
            Selection::Insertion(ip) => (ip.hookup, None),
            Selection::Range(r) => (r.anchor.hookup, Some(r.end.hookup)),
        };
        std::iter::once(a).chain(b)
    }

    pub fn touches(&self, hookup: HookupId) -> bool {
        self.hookups().any(|h| h == hookup)
    }
}

#[derive(Clone, Debug)]
enum Position {
    At {
        hookup: HookupId,
        offset: Option<usize>,
    },
    Unresolved(String),
}

/// Navigates the hookup tree of a view to build a [`Selection`].
pub struct SelectionBuilder<'v> {
    view: &'v RootView,
    start: HookupId,
    position: Position,
    anchor: Option<InsertionPoint>,
}

impl<'v> SelectionBuilder<'v> {
    pub fn in_root(view: &'v RootView) -> Self {
        let root = view.tree().root_hookup();
        Self::in_hookup(view, root)
    }

    pub fn in_hookup(view: &'v RootView, hookup: HookupId) -> Self {
        Self {
            view,
            start: hookup,
            position: Position::At {
                hookup,
                offset: None,
            },
            anchor: None,
        }
    }

    /// Descends into child `index` of the current hookup. Text hookups have
    /// no children; a missing child leaves the builder unresolved.
    pub fn child(mut self, index: usize) -> Self {
        let hookup = match &self.position {
            Position::At { hookup, .. } => *hookup,
            Position::Unresolved(_) => return self,
        };
        let view = self.view;
        let tree = view.tree();
        self.position = match tree.hookups().get(hookup).map(|n| n.kind()) {
            Some(kind) if kind.is_group() => match tree.hookups().nth_child(hookup, index) {
                Some(child) => Position::At {
                    hookup: child,
                    offset: None,
                },
                None => Position::Unresolved(format!("{hookup:?} has no child {index}")),
            },
            Some(kind) => Position::Unresolved(format!("{hookup:?} is {kind:?}, not a group")),
            None => Position::Unresolved(format!("{hookup:?} is not part of the tree")),
        };
        self
    }

    /// Grapheme offset within the leaf text.
    pub fn offset(mut self, offset: usize) -> Self {
        if let Position::At { offset: o, .. } = &mut self.position {
            *o = Some(offset);
        }
        self
    }

    /// Fixes the current position as the anchor and starts over from the
    /// starting hookup to describe the other end.
    pub fn to(mut self) -> Self {
        match self.resolve() {
            Ok(ip) => {
                self.anchor = Some(ip);
                self.position = Position::At {
                    hookup: self.start,
                    offset: None,
                };
            }
            Err(e) => self.position = Position::Unresolved(e.to_string()),
        }
        self
    }

    pub fn selection(&self) -> Result<Selection> {
        let end = self.resolve()?;
        Ok(match self.anchor {
            Some(anchor) => Selection::Range(RangeSelection { anchor, end }),
            None => Selection::Insertion(end),
        })
    }

    /// Resolves and stores the selection on the view.
    pub fn install(self) -> Result<Selection> {
        let selection = self.selection()?;
        self.view.set_selection(Some(selection))?;
        Ok(selection)
    }

    fn resolve(&self) -> Result<InsertionPoint> {
        let (hookup, offset) = match &self.position {
            Position::At { hookup, offset } => (*hookup, *offset),
            Position::Unresolved(why) => return Err(ViewError::SelectionUnresolved(why.clone())),
        };
        let offset = offset.ok_or(ViewError::SelectionNotImplemented("no offset was given"))?;
        let tree = self.view.tree();
        let leaf = first_text_leaf(&tree, hookup).ok_or(ViewError::SelectionNotImplemented(
            "no text hookup below the position",
        ))?;
        let len = tree
            .hookup_text(leaf)
            .map_or(0, |t| t.graphemes(true).count());
        if offset > len {
            return Err(ViewError::OffsetOutOfRange { offset, len });
        }
        Ok(InsertionPoint {
            hookup: leaf,
            offset,
        })
    }
}

/// Follows first children down to a text hookup.
fn first_text_leaf(tree: &ViewTree, from: HookupId) -> Option<HookupId> {
    let mut current = from;
    loop {
        match tree.hookups().get(current)?.kind() {
            HookupKind::Text(_) => return Some(current),
            _ => current = tree.hookups().nth_child(current, 0)?,
        }
    }
}

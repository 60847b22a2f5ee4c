//! # Box tree
//!
//! The retained render tree. Boxes live in one arena keyed by [`BoxId`];
//! every box has at most one parent and appears exactly once in that
//! parent's child list.
//!
//! Paragraphs do not hold a box per run. A [`BoxKind::Para`] owns a flat
//! list of [`ClientRun`]s addressed by index, each run carrying a stable
//! [`RunId`] so a rebuild can find exactly the runs it produced.

use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use trellis_core::{AssembledStyles, Color, Mp};

use crate::{HookupId, Result, ViewError};

new_key_type! {
    pub struct BoxId;
}

pub type RunId = u64;

/// One styled run of text inside a paragraph.
#[derive(Clone, Debug)]
pub struct ClientRun {
    pub id: RunId,
    pub text: String,
    pub style: Rc<AssembledStyles>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupKind {
    Root,
    Div,
    Cell,
    Row { widths: Vec<Mp> },
}

/// An unexpanded item sequence. Items become child boxes only when
/// [`crate::RootView::expand`] asks for them.
#[derive(Debug)]
pub struct LazyBox {
    pub(crate) hookup: HookupId,
    pub(crate) len: usize,
    pub(crate) children: Vec<BoxId>,
}

impl LazyBox {
    pub fn hookup(&self) -> HookupId {
        self.hookup
    }
    /// Logical item count, expanded or not.
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug)]
pub enum BoxKind {
    Group { kind: GroupKind, children: Vec<BoxId> },
    Para { runs: Vec<ClientRun> },
    Lazy(LazyBox),
    Block { width: Mp, height: Mp, color: Color },
}

impl BoxKind {
    pub fn group(kind: GroupKind) -> Self {
        BoxKind::Group {
            kind,
            children: Vec::new(),
        }
    }

    pub fn para() -> Self {
        BoxKind::Para { runs: Vec::new() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoxKind::Group { kind, .. } => match kind {
                GroupKind::Root => "root",
                GroupKind::Div => "div",
                GroupKind::Cell => "cell",
                GroupKind::Row { .. } => "row",
            },
            BoxKind::Para { .. } => "para",
            BoxKind::Lazy(_) => "lazy",
            BoxKind::Block { .. } => "block",
        }
    }
}

#[derive(Debug)]
pub struct BoxNode {
    pub(crate) kind: BoxKind,
    pub(crate) style: Rc<AssembledStyles>,
    pub(crate) parent: Option<BoxId>,
}

impl BoxNode {
    pub fn kind(&self) -> &BoxKind {
        &self.kind
    }
    pub fn style(&self) -> &Rc<AssembledStyles> {
        &self.style
    }
    pub fn parent(&self) -> Option<BoxId> {
        self.parent
    }
}

#[derive(Default)]
pub struct BoxTree {
    nodes: SlotMap<BoxId, BoxNode>,
    next_run: RunId,
}

impl BoxTree {
    /// Allocates a detached box.
    pub fn alloc(&mut self, kind: BoxKind, style: Rc<AssembledStyles>) -> BoxId {
        self.nodes.insert(BoxNode {
            kind,
            style,
            parent: None,
        })
    }

    pub fn get(&self, id: BoxId) -> Option<&BoxNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: BoxId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: BoxId) -> Option<BoxId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn is_para(&self, id: BoxId) -> bool {
        matches!(
            self.nodes.get(id).map(|n| &n.kind),
            Some(BoxKind::Para { .. })
        )
    }

    /// Child boxes in order. Empty for paragraphs, blocks and unknown ids.
    pub fn children(&self, id: BoxId) -> &[BoxId] {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(BoxKind::Group { children, .. }) => children,
            Some(BoxKind::Lazy(lazy)) => &lazy.children,
            _ => &[],
        }
    }

    fn children_mut(&mut self, id: BoxId) -> Result<&mut Vec<BoxId>> {
        match self.nodes.get_mut(id).map(|n| &mut n.kind) {
            Some(BoxKind::Group { children, .. }) => Ok(children),
            Some(BoxKind::Lazy(lazy)) => Ok(&mut lazy.children),
            Some(BoxKind::Para { .. }) => Err(ViewError::BoxInParagraph(id)),
            Some(BoxKind::Block { .. }) => Err(ViewError::NotAGroup(id)),
            None => Err(ViewError::StaleBox(id)),
        }
    }

    /// Inserts the detached `child` right after `after`, or first when
    /// `after` is `None`. `parent` may not lie inside `child`.
    pub fn insert_box(&mut self, parent: BoxId, child: BoxId, after: Option<BoxId>) -> Result<()> {
        match self.nodes.get(child) {
            Some(node) if node.parent.is_none() => {}
            _ => return Err(ViewError::StaleBox(child)),
        }
        let mut up = Some(parent);
        while let Some(id) = up {
            if id == child {
                return Err(ViewError::WouldCycle { parent, child });
            }
            up = self.parent(id);
        }
        let children = self.children_mut(parent)?;
        let at = match after {
            None => 0,
            Some(sibling) => match children.iter().position(|c| *c == sibling) {
                Some(i) => i + 1,
                None => return Err(ViewError::StaleBox(sibling)),
            },
        };
        children.insert(at, child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    /// Unlinks `id` from its parent and returns its former index. The
    /// subtree below `id` is left as is.
    pub fn detach(&mut self, id: BoxId) -> Option<usize> {
        let parent = self.nodes.get_mut(id)?.parent.take()?;
        let children = self.children_mut(parent).ok()?;
        let at = children.iter().position(|c| *c == id)?;
        children.remove(at);
        Some(at)
    }

    /// Detaches `id` and frees it together with everything below it.
    /// Unknown ids are ignored.
    pub fn discard(&mut self, id: BoxId) {
        self.detach(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                match node.kind {
                    BoxKind::Group { children, .. } => stack.extend(children),
                    BoxKind::Lazy(lazy) => stack.extend(lazy.children),
                    BoxKind::Para { .. } | BoxKind::Block { .. } => {}
                }
            }
        }
    }

    pub fn runs(&self, para: BoxId) -> &[ClientRun] {
        match self.nodes.get(para).map(|n| &n.kind) {
            Some(BoxKind::Para { runs }) => runs,
            _ => &[],
        }
    }

    fn runs_mut(&mut self, para: BoxId) -> Result<&mut Vec<ClientRun>> {
        match self.nodes.get_mut(para).map(|n| &mut n.kind) {
            Some(BoxKind::Para { runs }) => Ok(runs),
            Some(_) => Err(ViewError::NotAGroup(para)),
            None => Err(ViewError::StaleBox(para)),
        }
    }

    pub fn insert_run(
        &mut self,
        para: BoxId,
        at: usize,
        text: String,
        style: Rc<AssembledStyles>,
    ) -> Result<RunId> {
        let id = self.next_run;
        let runs = self.runs_mut(para)?;
        if at > runs.len() {
            return Err(ViewError::RunIndexOutOfRange {
                index: at,
                len: runs.len(),
            });
        }
        runs.insert(at, ClientRun { id, text, style });
        self.next_run += 1;
        Ok(id)
    }

    /// Removes the run and returns the index it occupied.
    pub fn remove_run(&mut self, para: BoxId, run: RunId) -> Option<usize> {
        let runs = self.runs_mut(para).ok()?;
        let at = runs.iter().position(|r| r.id == run)?;
        runs.remove(at);
        Some(at)
    }

    pub fn run_index(&self, para: BoxId, run: RunId) -> Option<usize> {
        self.runs(para).iter().position(|r| r.id == run)
    }

    pub fn run(&self, para: BoxId, run: RunId) -> Option<&ClientRun> {
        self.runs(para).iter().find(|r| r.id == run)
    }

    pub fn para_text(&self, para: BoxId) -> String {
        self.runs(para).iter().map(|r| r.text.as_str()).collect()
    }
}

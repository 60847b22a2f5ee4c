//! # View tree
//!
//! [`ViewTree`] owns both arenas: the boxes a backend lays out and the
//! hookups that keep them in sync with bound data. [`RootView`] is the
//! owning handle applications hold.
//!
//! A change notification lands in [`ViewTree::rebuild`] for exactly one
//! hookup. Rebuilds follow a fixed order: every subscription in the doomed
//! subtree is dropped first (children before parents), then its boxes and
//! runs are detached, and only then is the replacement built and its
//! subscriptions installed.

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use trellis_core::{AssembledStyles, EventBridge, Ws};

use crate::builder::{Cursor, Frame};
use crate::hookup::{HookupKind, HookupNode, HookupTree, Part};
use crate::selection::Selection;
use crate::snapshot::{BoxSnapshot, outline, snapshot};
use crate::{
    BoxId, BoxKind, BoxTree, ClientRun, Flow, GroupKind, HookupId, Result, RunId, ViewBuilder,
    ViewConfig, ViewError,
};

/// The last thing of a container that precedes an insertion point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Anchor {
    Box(BoxId),
    Run(RunId),
}

pub struct ViewTree {
    pub(crate) boxes: BoxTree,
    pub(crate) hookups: HookupTree,
    root_box: BoxId,
    root_hookup: HookupId,
    pub(crate) bridge: Rc<dyn EventBridge>,
    pub(crate) default_ws: Ws,
    pub(crate) this: Weak<RefCell<ViewTree>>,
    pub(crate) selection: Option<Selection>,
    rebuilds: usize,
}

impl ViewTree {
    fn new(config: ViewConfig, this: Weak<RefCell<ViewTree>>) -> Self {
        let style = config.root_style();
        let mut boxes = BoxTree::default();
        let root_box = boxes.alloc(BoxKind::group(GroupKind::Root), style.clone());
        let mut hookups = HookupTree::default();
        let root_hookup = hookups.insert(HookupNode::new(None, root_box, style, HookupKind::Group));
        Self {
            boxes,
            hookups,
            root_box,
            root_hookup,
            bridge: config.bridge,
            default_ws: config.default_ws,
            this,
            selection: None,
            rebuilds: 0,
        }
    }

    pub fn root_box(&self) -> BoxId {
        self.root_box
    }
    pub fn root_hookup(&self) -> HookupId {
        self.root_hookup
    }
    pub fn root_style(&self) -> Option<&Rc<AssembledStyles>> {
        self.boxes.get(self.root_box).map(|n| n.style())
    }
    pub fn boxes(&self) -> &BoxTree {
        &self.boxes
    }
    pub fn hookups(&self) -> &HookupTree {
        &self.hookups
    }
    pub fn children(&self, id: BoxId) -> &[BoxId] {
        self.boxes.children(id)
    }
    pub fn runs(&self, para: BoxId) -> &[ClientRun] {
        self.boxes.runs(para)
    }
    pub fn para_text(&self, para: BoxId) -> String {
        self.boxes.para_text(para)
    }
    pub fn hookup_children(&self, id: HookupId) -> Vec<HookupId> {
        self.hookups.children(id).collect()
    }
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }
    pub fn default_ws(&self) -> Ws {
        self.default_ws
    }
    /// Number of rebuilds that actually changed the tree.
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Hookups holding a live subscription.
    pub fn binding_count(&self) -> usize {
        self.hookups.iter().filter(|(_, n)| n.is_live()).count()
    }

    /// Hookups that follow bound data, live or not.
    pub fn bound_hookup_count(&self) -> usize {
        self.hookups.iter().filter(|(_, n)| n.kind.is_bound()).count()
    }

    pub fn item_count(&self, sequence: HookupId) -> usize {
        self.hookups
            .children(sequence)
            .filter(|c| matches!(self.hookups.get(*c).map(|n| &n.kind), Some(HookupKind::Item)))
            .count()
    }

    /// Text currently displayed by a text hookup.
    pub fn hookup_text(&self, id: HookupId) -> Option<String> {
        match &self.hookups.get(id)?.kind {
            HookupKind::Text(text) => Some(text.text()),
            _ => None,
        }
    }

    /// Boxes produced by `id`'s subtree that sit directly in its container.
    pub fn boxes_of(&self, id: HookupId) -> SmallVec<[BoxId; 2]> {
        let mut out = SmallVec::new();
        if let Some(container) = self.hookups.container(id) {
            self.collect_boxes(id, container, &mut out);
        }
        out
    }

    fn collect_boxes(&self, id: HookupId, container: BoxId, out: &mut SmallVec<[BoxId; 2]>) {
        let Some(node) = self.hookups.get(id) else {
            return;
        };
        for part in &node.parts {
            match *part {
                Part::Box(b) if self.boxes.parent(b) == Some(container) => out.push(b),
                Part::Child(c) if self.hookups.container(c) == Some(container) => {
                    self.collect_boxes(c, container, out)
                }
                _ => {}
            }
        }
    }

    pub fn outline(&self) -> String {
        outline(self)
    }

    pub fn snapshot(&self) -> BoxSnapshot {
        snapshot(self, self.root_box)
    }

    /// Frame appending at the end of the root.
    pub(crate) fn root_frame(&self) -> Frame {
        let after = self.boxes.children(self.root_box).last().copied();
        let part_at = self
            .hookups
            .get(self.root_hookup)
            .map_or(0, |n| n.parts.len());
        let style = self
            .root_style()
            .cloned()
            .unwrap_or_else(AssembledStyles::root);
        Frame::resume(
            self.root_hookup,
            self.root_box,
            Cursor::Group { after },
            part_at,
            style,
        )
    }

    /// Re-evaluates hookup `id` after its source changed. Stale ids are
    /// ignored.
    pub(crate) fn rebuild(&mut self, id: HookupId) -> Result<()> {
        let Some(node) = self.hookups.get(id) else {
            log::trace!("change for discarded hookup {id:?} ignored");
            return Ok(());
        };
        let rebuild: fn(&mut Self, HookupId) -> Result<()> = match node.kind {
            HookupKind::Text(_) => Self::rebuild_text,
            HookupKind::Sequence(_) => Self::rebuild_sequence,
            HookupKind::Lazy(_) => Self::rebuild_lazy,
            HookupKind::Object(_) => Self::rebuild_object,
            HookupKind::Group | HookupKind::Item => return Ok(()),
        };
        rebuild(self, id)
    }

    fn rebuild_text(&mut self, id: HookupId) -> Result<()> {
        let node = self.hookups.get(id).ok_or(ViewError::StaleHookup(id))?;
        let HookupKind::Text(text) = &node.kind else {
            return Ok(());
        };
        let fresh = (text.render)(&node.style);
        if fresh == text.current {
            log::trace!("{id:?}: text unchanged");
            return Ok(());
        }
        let para = text.para;
        let old: Vec<RunId> = node
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Run { run, .. } => Some(*run),
                _ => None,
            })
            .collect();
        let first = *old.first().ok_or(ViewError::StaleHookup(id))?;
        let at = self
            .boxes
            .run_index(para, first)
            .ok_or(ViewError::MissingRun { para, run: first })?;

        for run in &old {
            self.boxes.remove_run(para, *run);
        }
        let mut parts = Vec::with_capacity(fresh.len());
        for (i, piece) in fresh.iter().enumerate() {
            let run = self
                .boxes
                .insert_run(para, at + i, piece.text.clone(), piece.style.clone())?;
            parts.push(Part::Run { para, run });
        }

        if let Some(node) = self.hookups.get_mut(id) {
            node.parts.retain(|p| !matches!(p, Part::Run { .. }));
            node.parts.extend(parts);
            if let HookupKind::Text(text) = &mut node.kind {
                text.current = fresh;
            }
        }
        if let Some(sel) = self.selection
            && sel.touches(id)
        {
            log::debug!("selection cleared: text of {id:?} was replaced");
            self.selection = None;
        }
        self.rebuilds += 1;
        Ok(())
    }

    fn rebuild_sequence(&mut self, id: HookupId) -> Result<()> {
        let node = self.hookups.get(id).ok_or(ViewError::StaleHookup(id))?;
        let HookupKind::Sequence(seq) = &node.kind else {
            return Ok(());
        };
        let (source, container, style) = (seq.source.clone(), node.container, node.style.clone());
        let Some(splice) = source.refresh() else {
            log::trace!("{id:?}: sequence unchanged");
            return Ok(());
        };

        let items: Vec<HookupId> = self.hookups.children(id).collect();
        let doomed: Vec<HookupId> = items
            .iter()
            .skip(splice.start)
            .take(splice.removed)
            .copied()
            .collect();
        for item in &doomed {
            self.uninstall(*item);
        }
        for item in &doomed {
            self.remove_hookup(*item);
        }

        let part_at = match splice.start.checked_sub(1).and_then(|i| items.get(i)) {
            Some(prev) => self
                .hookups
                .position_of(id, Part::Child(*prev))
                .map_or(0, |p| p + 1),
            None => 0,
        };
        let anchor = self.anchor_before(id, part_at, container);
        let cursor = self.cursor_after(container, anchor);
        let mut b = ViewBuilder::resume(self, Frame::resume(id, container, cursor, part_at, style));
        for (built, index) in (splice.start..splice.start + splice.inserted).enumerate() {
            if let Err(e) = source.build_item(&mut b, index) {
                source.forget(index, splice.inserted - built);
                log::warn!(
                    "{id:?}: item {index} failed to build; {built} of {} shown",
                    splice.inserted
                );
                return Err(e);
            }
        }
        log::debug!(
            "{id:?}: replaced {} item(s) with {} at {}",
            splice.removed,
            splice.inserted,
            splice.start
        );
        self.rebuilds += 1;
        Ok(())
    }

    fn rebuild_object(&mut self, id: HookupId) -> Result<()> {
        let node = self.hookups.get(id).ok_or(ViewError::StaleHookup(id))?;
        let HookupKind::Object(obj) = &node.kind else {
            return Ok(());
        };
        let (source, container, style) = (obj.source.clone(), node.container, node.style.clone());
        if !source.refresh() {
            log::trace!("{id:?}: object unchanged");
            return Ok(());
        }

        self.clear_subtree(id);

        let anchor = self.anchor_before(id, 0, container);
        let cursor = self.cursor_after(container, anchor);
        let built = {
            let mut b = ViewBuilder::resume(self, Frame::resume(id, container, cursor, 0, style));
            source.build(&mut b)
        };
        if let Err(e) = built {
            self.clear_subtree(id);
            source.forget();
            return Err(e);
        }
        self.rebuilds += 1;
        Ok(())
    }

    fn rebuild_lazy(&mut self, id: HookupId) -> Result<()> {
        let node = self.hookups.get(id).ok_or(ViewError::StaleHookup(id))?;
        let HookupKind::Lazy(lazy) = &node.kind else {
            return Ok(());
        };
        let (source, container, style) = (lazy.source.clone(), node.container, node.style.clone());
        if source.refresh().is_none() {
            log::trace!("{id:?}: lazy sequence unchanged");
            return Ok(());
        }

        self.clear_subtree(id);
        if let Some(HookupKind::Lazy(lazy)) = self.hookups.get_mut(id).map(|n| &mut n.kind) {
            lazy.lazy_box = None;
            lazy.expanded.clear();
        }

        let anchor = self.anchor_before(id, 0, container);
        let cursor = self.cursor_after(container, anchor);
        let placed = {
            let mut b = ViewBuilder::resume(self, Frame::resume(id, container, cursor, 0, style));
            b.place_lazy_box(id, &source)
        };
        if let Err(e) = placed {
            source.forget(0, source.item_count());
            return Err(e);
        }
        self.rebuilds += 1;
        Ok(())
    }

    /// Drops every subscription in `id`'s subtree, children first.
    pub(crate) fn uninstall(&mut self, id: HookupId) {
        for h in self.hookups.post_order(id) {
            if let Some(node) = self.hookups.get_mut(h)
                && let Some(sub) = node.subscription.take()
            {
                log::trace!("uninstalled {h:?} ({:?})", node.kind);
                drop(sub);
            }
        }
    }

    /// Removes everything `id` produced, freeing descendant hookups. `id`
    /// itself stays, with no parts.
    pub(crate) fn clear_content(&mut self, id: HookupId) {
        self.truncate_parts(id, 0);
    }

    /// Like [`ViewTree::clear_content`], dropping the subscriptions below
    /// `id` first.
    fn clear_subtree(&mut self, id: HookupId) {
        for child in self.hookup_children(id) {
            self.uninstall(child);
        }
        self.clear_content(id);
    }

    /// Removes the parts of `id` past the first `keep`, with everything
    /// they produced. Subscriptions must already be gone.
    fn truncate_parts(&mut self, id: HookupId, keep: usize) {
        let parts = match self.hookups.get_mut(id) {
            Some(node) if node.parts.len() > keep => node.parts.split_off(keep),
            _ => return,
        };
        for part in parts {
            match part {
                Part::Box(b) => self.boxes.discard(b),
                Part::Run { para, run } => {
                    self.boxes.remove_run(para, run);
                }
                Part::Child(c) => {
                    self.clear_content(c);
                    self.forget(c);
                }
            }
        }
    }

    /// Tears down what the root gained past its first `keep` parts.
    pub(crate) fn roll_back_root(&mut self, keep: usize) {
        let root = self.root_hookup;
        let added: Vec<HookupId> = self
            .hookups
            .get(root)
            .map(|n| n.parts.get(keep..).unwrap_or_default())
            .unwrap_or_default()
            .iter()
            .filter_map(|p| match p {
                Part::Child(c) => Some(*c),
                _ => None,
            })
            .collect();
        for child in added {
            self.uninstall(child);
        }
        self.truncate_parts(root, keep);
    }

    /// Removes `id` with everything it produced and unlinks it from its
    /// parent.
    pub(crate) fn remove_hookup(&mut self, id: HookupId) {
        self.clear_content(id);
        if let Some(parent) = self.hookups.get(id).and_then(|n| n.parent)
            && let Some(node) = self.hookups.get_mut(parent)
        {
            node.parts.retain(|p| *p != Part::Child(id));
        }
        self.forget(id);
    }

    fn forget(&mut self, id: HookupId) {
        if let Some(sel) = self.selection
            && sel.touches(id)
        {
            log::debug!("selection cleared: {id:?} was torn down");
            self.selection = None;
        }
        self.hookups.remove(id);
    }

    /// Last box or run of `container` produced before part `pos` of
    /// `owner`, searching earlier siblings and then enclosing hookups that
    /// share the container. `None` means the start of the container.
    pub(crate) fn anchor_before(
        &self,
        owner: HookupId,
        pos: usize,
        container: BoxId,
    ) -> Option<Anchor> {
        let mut owner = owner;
        let mut pos = pos;
        loop {
            let node = self.hookups.get(owner)?;
            let upto = pos.min(node.parts.len());
            if let Some(anchor) = node.parts[..upto]
                .iter()
                .rev()
                .find_map(|p| self.part_anchor(*p, container))
            {
                return Some(anchor);
            }
            let parent = node.parent?;
            if self.hookups.container(parent) != Some(container) {
                return None;
            }
            pos = self.hookups.position_of(parent, Part::Child(owner))?;
            owner = parent;
        }
    }

    fn part_anchor(&self, part: Part, container: BoxId) -> Option<Anchor> {
        match part {
            Part::Box(b) if self.boxes.parent(b) == Some(container) => Some(Anchor::Box(b)),
            Part::Run { para, run } if para == container => Some(Anchor::Run(run)),
            Part::Child(c) if self.hookups.container(c) == Some(container) => {
                self.hookups
                    .get(c)?
                    .parts
                    .iter()
                    .rev()
                    .find_map(|p| self.part_anchor(*p, container))
            }
            _ => None,
        }
    }

    pub(crate) fn cursor_after(&self, container: BoxId, anchor: Option<Anchor>) -> Cursor {
        if self.boxes.is_para(container) {
            let at = match anchor {
                Some(Anchor::Run(run)) => self.boxes.run_index(container, run).map_or(0, |i| i + 1),
                _ => 0,
            };
            Cursor::Para { at }
        } else {
            let after = match anchor {
                Some(Anchor::Box(b)) => Some(b),
                _ => None,
            };
            Cursor::Group { after }
        }
    }
}

impl Drop for ViewTree {
    fn drop(&mut self) {
        let root = self.root_hookup;
        self.uninstall(root);
    }
}

/// Entry point for change notifications.
pub(crate) fn notify(tree: &Weak<RefCell<ViewTree>>, id: HookupId) {
    let Some(cell) = tree.upgrade() else {
        return;
    };
    let Ok(mut tree) = cell.try_borrow_mut() else {
        log::warn!("change for {id:?} arrived while the view was busy; dropped");
        return;
    };
    if let Err(e) = tree.rebuild(id) {
        log::error!("rebuilding {id:?} failed: {e}");
    }
}

/// Owning handle of a live view.
pub struct RootView {
    inner: Rc<RefCell<ViewTree>>,
}

impl Default for RootView {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}

impl RootView {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            inner: Rc::new_cyclic(|this| RefCell::new(ViewTree::new(config, this.clone()))),
        }
    }

    /// Appends `flow` to the end of the root.
    pub fn show(&self, flow: &Flow) -> Result<()> {
        self.build(|b| flow.show(b))
    }

    /// Runs `f` with a builder positioned at the end of the root. A failed
    /// build leaves the root as it was.
    pub fn build<R>(&self, f: impl FnOnce(&mut ViewBuilder<'_>) -> Result<R>) -> Result<R> {
        let mut tree = self.inner.try_borrow_mut().map_err(|_| ViewError::Busy)?;
        let frame = tree.root_frame();
        let keep = frame.part_at();
        let result = {
            let mut b = ViewBuilder::resume(&mut tree, frame);
            f(&mut b)
        };
        if let Err(e) = &result {
            log::debug!("build failed, root restored: {e}");
            tree.roll_back_root(keep);
        }
        result
    }

    /// Read access for backends and tests. Release it before raising
    /// change notifications.
    pub fn tree(&self) -> Ref<'_, ViewTree> {
        self.inner.borrow()
    }

    /// Materializes item `index` of a lazy box; see [`ViewTree::expand`].
    pub fn expand(&self, lazy: BoxId, index: usize) -> Result<HookupId> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| ViewError::Busy)?
            .expand(lazy, index)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.inner.borrow().selection
    }

    pub fn set_selection(&self, selection: Option<Selection>) -> Result<()> {
        let mut tree = self.inner.try_borrow_mut().map_err(|_| ViewError::Busy)?;
        if let Some(sel) = selection {
            for hookup in sel.hookups() {
                if !tree.hookups.contains(hookup) {
                    return Err(ViewError::StaleHookup(hookup));
                }
            }
        }
        tree.selection = selection;
        Ok(())
    }

    pub fn outline(&self) -> String {
        self.inner.borrow().outline()
    }

    pub fn snapshot(&self) -> BoxSnapshot {
        self.inner.borrow().snapshot()
    }
}

//! # View builder
//!
//! [`ViewBuilder`] is the only thing that allocates boxes and hookups. It
//! writes at an explicit [`Cursor`] held in the current [`Frame`]; nested
//! scopes push a frame and restore the caller's on the way out, so the same
//! code path serves the first build and every rebuild.
//!
//! ```rust
//! use std::rc::Rc;
//! use trellis_core::*;
//! use trellis_view::*;
//!
//! struct Person {
//!     name: Property<String>,
//! }
//!
//! let person = Rc::new(Person { name: property("Ada".to_string()) });
//! let view = RootView::default();
//! view.build(|b| {
//!     let style = b.style().clone();
//!     b.add_group_box(BoxKind::para(), style, |b| {
//!         b.add_literal("Name: ")?;
//!         b.add_string(bind!(person.name), Ws(0))?;
//!         Ok(())
//!     })
//! })
//! .unwrap();
//!
//! person.name.set("Grace".to_string());
//! let tree = view.tree();
//! let para = tree.children(tree.root_box())[0];
//! assert_eq!(tree.para_text(para), "Name: Grace");
//! ```

use std::rc::Rc;

use smallvec::smallvec;
use trellis_core::{
    AssembledStyles, Color, Handler, MemberExpr, Mp, MultiString, Observable, StyledText,
    Subscription, Ws,
};

use crate::hookup::{
    HookupKind, HookupNode, LazyHookup, ObjectHookup, Part, RenderFn, RunSpec, Runs,
    SequenceHookup, TextFlavor, TextHookup,
};
use crate::source::{ItemSource, ItemTemplate, ObjSource, ObjectSource, SequenceSource};
use crate::tree::notify;
use crate::{BoxId, BoxKind, HookupId, LazyBox, Result, RunId, ViewError, ViewTree};

/// Where the next box or run goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cursor {
    /// In a group: right after `after`, or first when `None`.
    Group { after: Option<BoxId> },
    /// In a paragraph: at run index `at`.
    Para { at: usize },
}

/// Builder state for one scope.
#[derive(Clone, Debug)]
pub(crate) struct Frame {
    hookup: HookupId,
    container: BoxId,
    cursor: Cursor,
    /// Index in `hookup`'s parts where the next part is recorded.
    part_at: usize,
    /// Paragraph started implicitly for text placed in a group. Text
    /// hookups write into their caller's; other scopes start their own.
    open_para: Option<BoxId>,
    style: Rc<AssembledStyles>,
}

impl Frame {
    pub(crate) fn resume(
        hookup: HookupId,
        container: BoxId,
        cursor: Cursor,
        part_at: usize,
        style: Rc<AssembledStyles>,
    ) -> Self {
        Self {
            hookup,
            container,
            cursor,
            part_at,
            open_para: None,
            style,
        }
    }

    pub(crate) fn part_at(&self) -> usize {
        self.part_at
    }
}

pub struct ViewBuilder<'t> {
    tree: &'t mut ViewTree,
    top: Frame,
    saved: Vec<Frame>,
}

impl<'t> ViewBuilder<'t> {
    pub(crate) fn resume(tree: &'t mut ViewTree, frame: Frame) -> Self {
        Self {
            tree,
            top: frame,
            saved: Vec::new(),
        }
    }

    /// Ambient style of the current scope.
    pub fn style(&self) -> &Rc<AssembledStyles> {
        &self.top.style
    }
    pub fn cursor(&self) -> Cursor {
        self.top.cursor
    }
    pub fn current_hookup(&self) -> HookupId {
        self.top.hookup
    }
    pub fn destination(&self) -> BoxId {
        self.top.container
    }
    pub fn tree(&self) -> &ViewTree {
        self.tree
    }

    /// Appends a literal run under a literal text hookup. The hookup has no
    /// subscription; it exists so the text can be addressed and selected.
    pub fn add_literal(&mut self, text: impl Into<String>) -> Result<HookupId> {
        let style = self.top.style.clone();
        self.add_literal_runs(smallvec![RunSpec {
            text: text.into(),
            style,
        }])
    }

    pub fn add_literal_ws(&mut self, text: impl Into<String>, ws: Ws) -> Result<HookupId> {
        let style = self.top.style.with_ws(ws);
        self.add_literal_runs(smallvec![RunSpec {
            text: text.into(),
            style,
        }])
    }

    /// Appends literal styled text, one run per segment.
    pub fn add_literal_styled(&mut self, text: &StyledText) -> Result<HookupId> {
        let runs = styled_runs(&self.top.style, text, None);
        self.add_literal_runs(runs)
    }

    fn add_literal_runs(&mut self, runs: Runs) -> Result<HookupId> {
        let fixed = runs.clone();
        let render: RenderFn = Rc::new(move |_| fixed.clone());
        self.place_text(TextFlavor::Literal, render, runs)
    }

    /// Binds a string member. Returns the text hookup, or `None` when no
    /// change channel exists and the value was shown once as literal text.
    pub fn add_string(&mut self, expr: MemberExpr<String>, ws: Ws) -> Result<Option<HookupId>> {
        self.add_string_or(expr, ws, None)
    }

    /// Like [`ViewBuilder::add_string`], rendering `substitute` whenever the
    /// fetched value is empty.
    pub fn add_string_or(
        &mut self,
        expr: MemberExpr<String>,
        ws: Ws,
        substitute: Option<(String, Ws)>,
    ) -> Result<Option<HookupId>> {
        let channel = self.change_channel(&expr)?;
        let fetch = expr.fetcher();
        let render: RenderFn = Rc::new(move |style| {
            let value = fetch();
            let (text, ws) = match &substitute {
                Some((sub, sub_ws)) if value.is_empty() => (sub.clone(), *sub_ws),
                _ => (value, ws),
            };
            smallvec![RunSpec {
                text,
                style: style.with_ws(ws),
            }]
        });
        self.add_text(TextFlavor::String, channel, render)
    }

    /// Binds a styled-text member: one run per segment, each segment's
    /// properties applied over the ambient style.
    pub fn add_styled(
        &mut self,
        expr: MemberExpr<StyledText>,
        ws: Ws,
        substitute: Option<(String, Ws)>,
    ) -> Result<Option<HookupId>> {
        let channel = self.change_channel(&expr)?;
        let fetch = expr.fetcher();
        let render: RenderFn = Rc::new(move |style| {
            let value = fetch();
            match &substitute {
                Some((sub, sub_ws)) if value.is_empty() => smallvec![RunSpec {
                    text: sub.clone(),
                    style: style.with_ws(*sub_ws),
                }],
                _ => styled_runs(style, &value, Some(ws)),
            }
        });
        self.add_text(TextFlavor::Styled, channel, render)
    }

    /// Binds a multilingual member, showing its `ws` alternative.
    pub fn add_multi(
        &mut self,
        expr: MemberExpr<MultiString>,
        ws: Ws,
        substitute: Option<(String, Ws)>,
    ) -> Result<Option<HookupId>> {
        let channel = self.change_channel(&expr)?;
        let fetch = expr.fetcher();
        let render: RenderFn = Rc::new(move |style| {
            let value = fetch();
            let text = value.alternative(ws);
            let (text, ws) = match &substitute {
                Some((sub, sub_ws)) if text.is_empty() => (sub.clone(), *sub_ws),
                _ => (text.to_string(), ws),
            };
            smallvec![RunSpec {
                text,
                style: style.with_ws(ws),
            }]
        });
        self.add_text(TextFlavor::Multi, channel, render)
    }

    fn add_text(
        &mut self,
        flavor: TextFlavor,
        channel: Option<Rc<dyn Observable>>,
        render: RenderFn,
    ) -> Result<Option<HookupId>> {
        let runs = render(&self.top.style);
        let Some(channel) = channel else {
            self.add_literal_runs(runs)?;
            return Ok(None);
        };
        let id = self.place_text(flavor, render, runs)?;
        self.install(id, Some(channel));
        Ok(Some(id))
    }

    /// Opens a text hookup and writes its first rendering. Text placed in a
    /// group shares one paragraph with the text around it.
    fn place_text(&mut self, flavor: TextFlavor, render: RenderFn, runs: Runs) -> Result<HookupId> {
        let style = self.top.style.clone();
        let container = self.top.container;
        let id = self.open_hookup(
            HookupKind::Text(TextHookup {
                flavor,
                para: container,
                current: runs.clone(),
                render,
            }),
            container,
            style.clone(),
        );
        let mut frame = self.child_frame(id, style);
        frame.open_para = self.top.open_para;
        let para = self.scoped(frame, |b| {
            let mut para = container;
            for piece in runs {
                para = b.insert_run_here(piece.text, piece.style)?.0;
            }
            Ok(para)
        })?;
        if para != container {
            self.top.open_para = Some(para);
        }
        if let Some(HookupKind::Text(text)) = self.tree.hookups.get_mut(id).map(|n| &mut n.kind) {
            text.para = para;
        }
        Ok(id)
    }

    /// Binds a sequence, building one item hookup per element now.
    pub fn add_obj_seq<T>(
        &mut self,
        expr: MemberExpr<Vec<T>>,
        template: impl Fn(&mut ViewBuilder<'_>, &T) -> Result<()> + 'static,
    ) -> Result<HookupId>
    where
        T: Clone + PartialEq + 'static,
    {
        self.add_obj_seq_with(expr, Rc::new(template))
    }

    pub(crate) fn add_obj_seq_with<T>(
        &mut self,
        expr: MemberExpr<Vec<T>>,
        template: ItemTemplate<T>,
    ) -> Result<HookupId>
    where
        T: Clone + PartialEq + 'static,
    {
        let channel = self.change_channel(&expr)?;
        let source: Rc<dyn SequenceSource> =
            Rc::new(ItemSource::new(expr.fetcher(), template));
        let style = self.top.style.clone();
        let id = self.open_hookup(
            HookupKind::Sequence(SequenceHookup {
                source: source.clone(),
            }),
            self.top.container,
            style.clone(),
        );
        let frame = self.child_frame(id, style);
        self.scoped(frame, |b| {
            for index in 0..source.item_count() {
                source.build_item(b, index)?;
            }
            Ok(())
        })?;
        self.install(id, channel);
        Ok(id)
    }

    /// Binds a sequence whose items are built only when expanded. An empty
    /// sequence places no box at all.
    pub fn add_lazy_obj_seq<T>(
        &mut self,
        expr: MemberExpr<Vec<T>>,
        template: impl Fn(&mut ViewBuilder<'_>, &T) -> Result<()> + 'static,
    ) -> Result<HookupId>
    where
        T: Clone + PartialEq + 'static,
    {
        self.add_lazy_obj_seq_with(expr, Rc::new(template))
    }

    pub(crate) fn add_lazy_obj_seq_with<T>(
        &mut self,
        expr: MemberExpr<Vec<T>>,
        template: ItemTemplate<T>,
    ) -> Result<HookupId>
    where
        T: Clone + PartialEq + 'static,
    {
        let channel = self.change_channel(&expr)?;
        let source: Rc<dyn SequenceSource> =
            Rc::new(ItemSource::new(expr.fetcher(), template));
        let style = self.top.style.clone();
        let id = self.open_hookup(
            HookupKind::Lazy(LazyHookup {
                source: source.clone(),
                lazy_box: None,
                expanded: Vec::new(),
            }),
            self.top.container,
            style.clone(),
        );
        let frame = self.child_frame(id, style);
        self.scoped(frame, |b| b.place_lazy_box(id, &source))?;
        self.install(id, channel);
        Ok(id)
    }

    pub(crate) fn place_lazy_box(
        &mut self,
        id: HookupId,
        source: &Rc<dyn SequenceSource>,
    ) -> Result<()> {
        let len = source.item_count();
        if len == 0 {
            return Ok(());
        }
        let style = self.top.style.clone();
        let lazy = self.insert_box(
            BoxKind::Lazy(LazyBox {
                hookup: id,
                len,
                children: Vec::new(),
            }),
            style,
        )?;
        if let Some(HookupKind::Lazy(state)) = self.tree.hookups.get_mut(id).map(|n| &mut n.kind) {
            state.lazy_box = Some(lazy);
            state.expanded = vec![None; len];
        }
        Ok(())
    }

    /// Binds a single object; the subtree is rebuilt whenever the fetched
    /// value changes.
    pub fn add_obj<T>(
        &mut self,
        expr: MemberExpr<T>,
        template: impl Fn(&mut ViewBuilder<'_>, &T) -> Result<()> + 'static,
    ) -> Result<HookupId>
    where
        T: Clone + PartialEq + 'static,
    {
        self.add_obj_with(expr, Rc::new(template))
    }

    pub(crate) fn add_obj_with<T>(
        &mut self,
        expr: MemberExpr<T>,
        template: ItemTemplate<T>,
    ) -> Result<HookupId>
    where
        T: Clone + PartialEq + 'static,
    {
        let channel = self.change_channel(&expr)?;
        let source: Rc<dyn ObjectSource> = Rc::new(ObjSource::new(expr.fetcher(), template));
        let style = self.top.style.clone();
        let id = self.open_hookup(
            HookupKind::Object(ObjectHookup {
                source: source.clone(),
            }),
            self.top.container,
            style.clone(),
        );
        let frame = self.child_frame(id, style);
        self.scoped(frame, |b| source.build(b))?;
        self.install(id, channel);
        Ok(id)
    }

    /// Places a new box and runs `content` inside it under a fresh group
    /// hookup.
    pub fn add_group_box<R>(
        &mut self,
        kind: BoxKind,
        style: Rc<AssembledStyles>,
        content: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let cursor = match kind {
            BoxKind::Para { .. } => Cursor::Para { at: 0 },
            _ => Cursor::Group { after: None },
        };
        let container = self.insert_box(kind, style.clone())?;
        let id = self.open_hookup(HookupKind::Group, container, style.clone());
        let frame = Frame::resume(id, container, cursor, 0, style);
        self.scoped(frame, content)
    }

    /// Runs `content` under a fresh group hookup in the current box.
    pub fn add_group<R>(
        &mut self,
        style: Rc<AssembledStyles>,
        content: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let id = self.open_hookup(HookupKind::Group, self.top.container, style.clone());
        let frame = self.child_frame(id, style);
        self.scoped(frame, content)
    }

    pub fn add_block(&mut self, color: Color, width: Mp, height: Mp) -> Result<BoxId> {
        let style = self.top.style.clone();
        self.insert_box(
            BoxKind::Block {
                width,
                height,
                color,
            },
            style,
        )
    }

    /// One item of a sequence, under its own item hookup. An item whose
    /// content fails leaves nothing behind.
    pub(crate) fn add_item(
        &mut self,
        content: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<HookupId> {
        let (cursor, open_para) = (self.top.cursor, self.top.open_para);
        let style = self.top.style.clone();
        let id = self.open_hookup(HookupKind::Item, self.top.container, style.clone());
        let frame = self.child_frame(id, style);
        if let Err(e) = self.scoped(frame, content) {
            self.tree.uninstall(id);
            self.tree.remove_hookup(id);
            self.top.cursor = cursor;
            self.top.open_para = open_para;
            self.top.part_at = self.top.part_at.saturating_sub(1);
            return Err(e);
        }
        Ok(id)
    }

    /// Finds the change channel of `expr`: its own, else the bridge's.
    fn change_channel<T: 'static>(
        &self,
        expr: &MemberExpr<T>,
    ) -> Result<Option<Rc<dyn Observable>>> {
        let parts = expr.decompose()?;
        if let Some(channel) = expr.channel() {
            return Ok(Some(channel.clone()));
        }
        let found = self
            .tree
            .bridge
            .hookup_event_actions(parts.member, &parts.target);
        if found.is_none() {
            log::debug!(
                "no change channel for {}::{}; value shown once",
                parts.type_name,
                parts.member
            );
        }
        Ok(found)
    }

    fn install(&mut self, id: HookupId, channel: Option<Rc<dyn Observable>>) {
        let Some(channel) = channel else {
            return;
        };
        let this = self.tree.this.clone();
        let handler: Handler = Rc::new(move || notify(&this, id));
        if let Some(node) = self.tree.hookups.get_mut(id) {
            debug_assert!(node.subscription.is_none(), "{id:?} installed twice");
            node.subscription = Some(Subscription::install(channel, handler));
        }
    }

    fn open_hookup(
        &mut self,
        kind: HookupKind,
        container: BoxId,
        style: Rc<AssembledStyles>,
    ) -> HookupId {
        let node = HookupNode::new(Some(self.top.hookup), container, style, kind);
        let id = self.tree.hookups.insert(node);
        self.record_part(Part::Child(id));
        id
    }

    fn child_frame(&self, id: HookupId, style: Rc<AssembledStyles>) -> Frame {
        Frame::resume(id, self.top.container, self.top.cursor, 0, style)
    }

    fn record_part(&mut self, part: Part) {
        if let Some(node) = self.tree.hookups.get_mut(self.top.hookup) {
            let at = self.top.part_at.min(node.parts.len());
            node.parts.insert(at, part);
            self.top.part_at = at + 1;
        }
    }

    fn scoped<R>(&mut self, frame: Frame, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let caller = std::mem::replace(&mut self.top, frame);
        self.saved.push(caller);
        let result = f(self);
        if let Some(caller) = self.saved.pop() {
            let inner = std::mem::replace(&mut self.top, caller);
            if inner.container == self.top.container {
                self.top.cursor = inner.cursor;
            }
            if inner.open_para != self.top.open_para {
                self.top.open_para = None;
            }
        }
        result
    }

    fn insert_box(&mut self, kind: BoxKind, style: Rc<AssembledStyles>) -> Result<BoxId> {
        let after = match self.top.cursor {
            Cursor::Group { after } => after,
            Cursor::Para { .. } => return Err(ViewError::BoxInParagraph(self.top.container)),
        };
        let id = self.tree.boxes.alloc(kind, style);
        if let Err(e) = self.tree.boxes.insert_box(self.top.container, id, after) {
            self.tree.boxes.discard(id);
            return Err(e);
        }
        self.top.cursor = Cursor::Group { after: Some(id) };
        self.top.open_para = None;
        self.record_part(Part::Box(id));
        Ok(id)
    }

    /// Inserts a run at the cursor. In a group the run goes into the
    /// paragraph this frame opened, starting one if needed.
    fn insert_run_here(
        &mut self,
        text: String,
        style: Rc<AssembledStyles>,
    ) -> Result<(BoxId, RunId)> {
        let (para, at) = match self.top.cursor {
            Cursor::Para { at } => {
                self.top.cursor = Cursor::Para { at: at + 1 };
                (self.top.container, at)
            }
            Cursor::Group { .. } => {
                let para = match self.top.open_para {
                    Some(para) => para,
                    None => {
                        let para_style = self.top.style.clone();
                        let para = self.insert_box(BoxKind::para(), para_style)?;
                        self.top.open_para = Some(para);
                        para
                    }
                };
                (para, self.tree.boxes.runs(para).len())
            }
        };
        let run = self.tree.boxes.insert_run(para, at, text, style)?;
        self.record_part(Part::Run { para, run });
        Ok((para, run))
    }
}

fn styled_runs(base: &Rc<AssembledStyles>, text: &StyledText, ws: Option<Ws>) -> Runs {
    let base = match ws {
        Some(ws) => base.with_ws(ws),
        None => base.clone(),
    };
    let runs: Runs = text
        .segments()
        .iter()
        .map(|seg| RunSpec {
            text: seg.text.clone(),
            style: base.derive_all(&seg.props),
        })
        .collect();
    if runs.is_empty() {
        return smallvec![RunSpec {
            text: String::new(),
            style: base,
        }];
    }
    runs
}

//! # Hookup tree
//!
//! Binding nodes that shadow the box tree. A hookup records, in document
//! order, the [`Part`]s it produced: boxes, paragraph runs and child
//! hookups. That list is what a rebuild tears down and where it splices the
//! replacement back in.
//!
//! The kinds are a closed enum; structural kinds (`Group`, `Item`) and
//! literal text never carry a subscription.

use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use trellis_core::{AssembledStyles, Subscription};

use crate::source::{ObjectSource, SequenceSource};
use crate::{BoxId, RunId};

new_key_type! {
    pub struct HookupId;
}

/// Something a hookup produced, in document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Part {
    Box(BoxId),
    Run { para: BoxId, run: RunId },
    Child(HookupId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFlavor {
    /// Plain string.
    String,
    /// Styled text, one run per segment.
    Styled,
    /// Multilingual string, one alternative shown.
    Multi,
    /// Fixed text. Never subscribed, never rebuilt.
    Literal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunSpec {
    pub text: String,
    pub style: Rc<AssembledStyles>,
}

pub(crate) type Runs = SmallVec<[RunSpec; 1]>;
pub(crate) type RenderFn = Rc<dyn Fn(&Rc<AssembledStyles>) -> Runs>;

pub struct TextHookup {
    pub(crate) flavor: TextFlavor,
    pub(crate) para: BoxId,
    pub(crate) current: Runs,
    pub(crate) render: RenderFn,
}

impl TextHookup {
    pub fn flavor(&self) -> TextFlavor {
        self.flavor
    }
    pub fn para(&self) -> BoxId {
        self.para
    }
    pub fn text(&self) -> String {
        self.current.iter().map(|r| r.text.as_str()).collect()
    }
}

pub struct SequenceHookup {
    pub(crate) source: Rc<dyn SequenceSource>,
}

pub struct LazyHookup {
    pub(crate) source: Rc<dyn SequenceSource>,
    pub(crate) lazy_box: Option<BoxId>,
    pub(crate) expanded: Vec<Option<HookupId>>,
}

impl LazyHookup {
    pub fn lazy_box(&self) -> Option<BoxId> {
        self.lazy_box
    }
    pub fn expanded_count(&self) -> usize {
        self.expanded.iter().flatten().count()
    }
}

pub struct ObjectHookup {
    pub(crate) source: Rc<dyn ObjectSource>,
}

pub enum HookupKind {
    Group,
    Item,
    Text(TextHookup),
    Sequence(SequenceHookup),
    Lazy(LazyHookup),
    Object(ObjectHookup),
}

impl HookupKind {
    /// Everything but text can be navigated into by index.
    pub fn is_group(&self) -> bool {
        !matches!(self, HookupKind::Text(_))
    }

    /// Kinds that follow bound data rather than mere structure.
    pub fn is_bound(&self) -> bool {
        match self {
            HookupKind::Group | HookupKind::Item => false,
            HookupKind::Text(t) => t.flavor != TextFlavor::Literal,
            _ => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HookupKind::Group => "group",
            HookupKind::Item => "item",
            HookupKind::Text(t) => match t.flavor {
                TextFlavor::String => "string",
                TextFlavor::Styled => "tss",
                TextFlavor::Multi => "mls",
                TextFlavor::Literal => "literal",
            },
            HookupKind::Sequence(_) => "sequence",
            HookupKind::Lazy(_) => "lazy",
            HookupKind::Object(_) => "object",
        }
    }
}

impl std::fmt::Debug for HookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub struct HookupNode {
    pub(crate) parent: Option<HookupId>,
    pub(crate) container: BoxId,
    pub(crate) style: Rc<AssembledStyles>,
    pub(crate) parts: Vec<Part>,
    pub(crate) kind: HookupKind,
    pub(crate) subscription: Option<Subscription>,
}

impl HookupNode {
    pub(crate) fn new(
        parent: Option<HookupId>,
        container: BoxId,
        style: Rc<AssembledStyles>,
        kind: HookupKind,
    ) -> Self {
        Self {
            parent,
            container,
            style,
            parts: Vec::new(),
            kind,
            subscription: None,
        }
    }

    pub fn parent(&self) -> Option<HookupId> {
        self.parent
    }
    /// The box this hookup's content is placed into.
    pub fn container(&self) -> BoxId {
        self.container
    }
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }
    pub fn kind(&self) -> &HookupKind {
        &self.kind
    }
    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }
}

#[derive(Default)]
pub struct HookupTree {
    nodes: SlotMap<HookupId, HookupNode>,
}

impl HookupTree {
    pub(crate) fn insert(&mut self, node: HookupNode) -> HookupId {
        self.nodes.insert(node)
    }

    pub(crate) fn remove(&mut self, id: HookupId) -> Option<HookupNode> {
        self.nodes.remove(id)
    }

    pub(crate) fn get_mut(&mut self, id: HookupId) -> Option<&mut HookupNode> {
        self.nodes.get_mut(id)
    }

    pub fn get(&self, id: HookupId) -> Option<&HookupNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: HookupId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HookupId, &HookupNode)> {
        self.nodes.iter()
    }

    pub fn container(&self, id: HookupId) -> Option<BoxId> {
        self.nodes.get(id).map(|n| n.container)
    }

    /// Child hookups in document order.
    pub fn children(&self, id: HookupId) -> impl Iterator<Item = HookupId> + '_ {
        self.nodes
            .get(id)
            .map(|n| n.parts.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|p| match p {
                Part::Child(c) => Some(*c),
                _ => None,
            })
    }

    pub fn nth_child(&self, id: HookupId, index: usize) -> Option<HookupId> {
        self.children(id).nth(index)
    }

    pub fn position_of(&self, owner: HookupId, part: Part) -> Option<usize> {
        self.nodes.get(owner)?.parts.iter().position(|p| *p == part)
    }

    /// `id` and every hookup below it, children before their parent.
    pub fn post_order(&self, id: HookupId) -> Vec<HookupId> {
        let mut out = Vec::new();
        self.collect_post_order(id, &mut out);
        out
    }

    fn collect_post_order(&self, id: HookupId, out: &mut Vec<HookupId>) {
        if !self.contains(id) {
            return;
        }
        for child in self.children(id) {
            self.collect_post_order(child, out);
        }
        out.push(id);
    }
}

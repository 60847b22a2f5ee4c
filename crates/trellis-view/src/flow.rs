//! # Flows
//!
//! A [`Flow`] describes content without building it: what to add, which
//! style properties to apply, and optionally which box to wrap it in.
//! Showing a flow materializes it at the builder's cursor; a flow can be
//! shown any number of times, each producing an independent subtree.
//!
//! ```rust
//! use trellis_core::*;
//! use trellis_view::*;
//!
//! let heading = Paragraph::containing(Display::of("Inbox"))
//!     .bold()
//!     .font_size(Units::points(14.0));
//!
//! let view = RootView::default();
//! view.show(&heading).unwrap();
//! view.show(&heading).unwrap();
//!
//! let tree = view.tree();
//! assert_eq!(tree.children(tree.root_box()).len(), 2);
//! ```

use std::rc::Rc;

use trellis_core::{Color, FW_BOLD, Mp, StyleProp, Thickness, Ws};

use crate::{BoxKind, GroupKind, Result, ViewBuilder};

/// Produces a flow's content in the current scope.
pub trait FlowContent {
    fn add_content(&self, b: &mut ViewBuilder<'_>) -> Result<()>;
}

struct FnContent<F>(F);

impl<F> FlowContent for FnContent<F>
where
    F: Fn(&mut ViewBuilder<'_>) -> Result<()>,
{
    fn add_content(&self, b: &mut ViewBuilder<'_>) -> Result<()> {
        (self.0)(b)
    }
}

struct Sequence(Vec<Flow>);

impl FlowContent for Sequence {
    fn add_content(&self, b: &mut ViewBuilder<'_>) -> Result<()> {
        for flow in &self.0 {
            flow.show(b)?;
        }
        Ok(())
    }
}

/// Box a flow wraps its content in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoxMaker {
    Paragraph,
    Div,
    Cell,
    Row { widths: Vec<Mp> },
}

impl BoxMaker {
    fn make(&self) -> BoxKind {
        match self {
            BoxMaker::Paragraph => BoxKind::para(),
            BoxMaker::Div => BoxKind::group(GroupKind::Div),
            BoxMaker::Cell => BoxKind::group(GroupKind::Cell),
            BoxMaker::Row { widths } => BoxKind::group(GroupKind::Row {
                widths: widths.clone(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct Flow {
    content: Rc<dyn FlowContent>,
    styles: Vec<StyleProp>,
    maker: Option<BoxMaker>,
}

impl Flow {
    pub fn new(content: impl FlowContent + 'static) -> Self {
        Self {
            content: Rc::new(content),
            styles: Vec::new(),
            maker: None,
        }
    }

    /// Content written directly against the builder.
    pub fn from_fn(f: impl Fn(&mut ViewBuilder<'_>) -> Result<()> + 'static) -> Self {
        Self::new(FnContent(f))
    }

    /// Several flows shown one after another.
    pub fn sequence(flows: impl IntoFlows) -> Self {
        Self::new(Sequence(flows.into_flows()))
    }

    pub fn with_maker(mut self, maker: BoxMaker) -> Self {
        self.maker = Some(maker);
        self
    }

    pub fn styled(mut self, prop: StyleProp) -> Self {
        self.styles.push(prop);
        self
    }

    pub fn styles(&self) -> &[StyleProp] {
        &self.styles
    }

    pub fn maker(&self) -> Option<&BoxMaker> {
        self.maker.as_ref()
    }

    /// Derives this flow's style from the ambient one, opens its box (or
    /// stays in the current one), adds the content under a new group
    /// hookup and returns to the caller's scope.
    pub fn show(&self, b: &mut ViewBuilder<'_>) -> Result<()> {
        let style = b.style().derive_all(&self.styles);
        match &self.maker {
            Some(maker) => b.add_group_box(maker.make(), style, |b| self.content.add_content(b)),
            None => b.add_group(style, |b| self.content.add_content(b)),
        }
    }
}

impl std::fmt::Debug for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flow")
            .field("styles", &self.styles)
            .field("maker", &self.maker)
            .finish_non_exhaustive()
    }
}

/// Style modifiers for anything that converts into a [`Flow`].
pub trait FlowExt: Into<Flow> {
    fn bold(self) -> Flow {
        Into::<Flow>::into(self).styled(StyleProp::FontWeight(FW_BOLD))
    }
    fn italic(self) -> Flow {
        Into::<Flow>::into(self).styled(StyleProp::Italic(true))
    }
    fn underline(self) -> Flow {
        Into::<Flow>::into(self).styled(StyleProp::Underline(true))
    }
    fn font_size(self, size: Mp) -> Flow {
        Into::<Flow>::into(self).styled(StyleProp::FontSize(size))
    }
    fn font_family(self, family: &str) -> Flow {
        Into::<Flow>::into(self).styled(StyleProp::FontFamily(family.into()))
    }
    fn foreground(self, color: Color) -> Flow {
        Into::<Flow>::into(self).styled(StyleProp::ForeColor(color))
    }
    fn background(self, color: Color) -> Flow {
        Into::<Flow>::into(self).styled(StyleProp::BackColor(color))
    }
    fn margins(self, margins: Thickness) -> Flow {
        Into::<Flow>::into(self).styled(StyleProp::Margins(margins))
    }
    fn pads(self, pads: Thickness) -> Flow {
        Into::<Flow>::into(self).styled(StyleProp::Pads(pads))
    }
    fn ws(self, ws: Ws) -> Flow {
        Into::<Flow>::into(self).styled(StyleProp::Ws(ws))
    }
}

impl<F: Into<Flow>> FlowExt for F {}

pub trait IntoFlows {
    fn into_flows(self) -> Vec<Flow>;
}

impl IntoFlows for Flow {
    fn into_flows(self) -> Vec<Flow> {
        vec![self]
    }
}

impl IntoFlows for Vec<Flow> {
    fn into_flows(self) -> Vec<Flow> {
        self
    }
}

impl<const N: usize> IntoFlows for [Flow; N] {
    fn into_flows(self) -> Vec<Flow> {
        self.into()
    }
}

macro_rules! impl_into_flows_tuple {
    ($($idx:tt $t:ident),+) => {
        impl<$($t: IntoFlows),+> IntoFlows for ($($t,)+) {
            fn into_flows(self) -> Vec<Flow> {
                let mut v = Vec::new();
                $(v.extend(self.$idx.into_flows());)+
                v
            }
        }
    };
}

impl_into_flows_tuple!(0 A);
impl_into_flows_tuple!(0 A, 1 B);
impl_into_flows_tuple!(0 A, 1 B, 2 C);
impl_into_flows_tuple!(0 A, 1 B, 2 C, 3 D);
impl_into_flows_tuple!(0 A, 1 B, 2 C, 3 D, 4 E);
impl_into_flows_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
impl_into_flows_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
impl_into_flows_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);

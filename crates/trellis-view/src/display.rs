//! Content vocabulary: `Display::of(...)`, `LazyDisplay::of(...)` and the
//! structural wrappers (`Paragraph`, `Div`, `Cell`, `Row`, `Block`).

use std::rc::Rc;

use trellis_core::{Color, MemberExpr, Mp, MultiString, StyledText, Ws};

use crate::flow::{BoxMaker, FlowContent, IntoFlows};
use crate::source::ItemTemplate;
use crate::{Flow, Result, ViewBuilder};

/// Entry point for displaying literal or bound values.
pub struct Display;

/// Entry point for virtualized sequences.
pub struct LazyDisplay;

/// What [`Display::of`] accepts.
pub trait DisplayOf {
    type Output;
    fn into_display(self) -> Self::Output;
}

impl Display {
    /// Literals give a plain [`Flow`]; bound members give a [`BoundText`].
    pub fn of<D: DisplayOf>(value: D) -> D::Output {
        value.into_display()
    }

    /// A bound sequence, finished with [`ItemBuilder::using`].
    pub fn of_seq<T>(expr: MemberExpr<Vec<T>>) -> ItemBuilder<T> {
        ItemBuilder { expr, lazy: false }
    }

    /// A bound object, finished with [`ObjBuilder::using`].
    pub fn of_obj<T>(expr: MemberExpr<T>) -> ObjBuilder<T> {
        ObjBuilder { expr }
    }
}

impl LazyDisplay {
    pub fn of<T>(expr: MemberExpr<Vec<T>>) -> ItemBuilder<T> {
        ItemBuilder { expr, lazy: true }
    }
}

struct Literal(String);

impl FlowContent for Literal {
    fn add_content(&self, b: &mut ViewBuilder<'_>) -> Result<()> {
        b.add_literal(self.0.clone()).map(|_| ())
    }
}

struct LiteralStyled(StyledText);

impl FlowContent for LiteralStyled {
    fn add_content(&self, b: &mut ViewBuilder<'_>) -> Result<()> {
        b.add_literal_styled(&self.0).map(|_| ())
    }
}

impl DisplayOf for &str {
    type Output = Flow;
    fn into_display(self) -> Flow {
        Flow::new(Literal(self.to_string()))
    }
}

impl DisplayOf for String {
    type Output = Flow;
    fn into_display(self) -> Flow {
        Flow::new(Literal(self))
    }
}

impl DisplayOf for StyledText {
    type Output = Flow;
    fn into_display(self) -> Flow {
        Flow::new(LiteralStyled(self))
    }
}

#[derive(Clone, Debug)]
enum BoundValue {
    Plain(MemberExpr<String>),
    Styled(MemberExpr<StyledText>),
    Multi(MemberExpr<MultiString>),
}

/// A bound scalar text value.
#[derive(Clone, Debug)]
pub struct BoundText {
    value: BoundValue,
    ws: Option<Ws>,
    substitute: Option<(String, Option<Ws>)>,
}

impl BoundText {
    fn new(value: BoundValue) -> Self {
        Self {
            value,
            ws: None,
            substitute: None,
        }
    }

    /// Writing system of the bound run. Defaults to the ambient style's.
    pub fn ws(mut self, ws: Ws) -> Self {
        self.ws = Some(ws);
        self
    }

    /// Shown instead of the value whenever the value is empty.
    pub fn when_empty(mut self, substitute: impl Into<String>) -> Self {
        self.substitute = Some((substitute.into(), None));
        self
    }

    pub fn when_empty_ws(mut self, substitute: impl Into<String>, ws: Ws) -> Self {
        self.substitute = Some((substitute.into(), Some(ws)));
        self
    }

    pub fn show(&self, b: &mut ViewBuilder<'_>) -> Result<()> {
        Flow::from(self.clone()).show(b)
    }
}

impl FlowContent for BoundText {
    fn add_content(&self, b: &mut ViewBuilder<'_>) -> Result<()> {
        let ws = self.ws.unwrap_or_else(|| b.style().ws());
        let substitute = self
            .substitute
            .as_ref()
            .map(|(text, sub_ws)| (text.clone(), sub_ws.unwrap_or(ws)));
        match &self.value {
            BoundValue::Plain(expr) => b.add_string_or(expr.clone(), ws, substitute),
            BoundValue::Styled(expr) => b.add_styled(expr.clone(), ws, substitute),
            BoundValue::Multi(expr) => b.add_multi(expr.clone(), ws, substitute),
        }
        .map(|_| ())
    }
}

impl From<BoundText> for Flow {
    fn from(text: BoundText) -> Flow {
        Flow::new(text)
    }
}

impl IntoFlows for BoundText {
    fn into_flows(self) -> Vec<Flow> {
        vec![self.into()]
    }
}

impl DisplayOf for MemberExpr<String> {
    type Output = BoundText;
    fn into_display(self) -> BoundText {
        BoundText::new(BoundValue::Plain(self))
    }
}

impl DisplayOf for MemberExpr<StyledText> {
    type Output = BoundText;
    fn into_display(self) -> BoundText {
        BoundText::new(BoundValue::Styled(self))
    }
}

impl DisplayOf for MemberExpr<MultiString> {
    type Output = BoundText;
    fn into_display(self) -> BoundText {
        BoundText::new(BoundValue::Multi(self))
    }
}

/// Pairs a bound sequence with its per-item template.
pub struct ItemBuilder<T> {
    expr: MemberExpr<Vec<T>>,
    lazy: bool,
}

impl<T: Clone + PartialEq + 'static> ItemBuilder<T> {
    pub fn using(
        self,
        template: impl Fn(&mut ViewBuilder<'_>, &T) -> Result<()> + 'static,
    ) -> Flow {
        Flow::new(SequenceContent {
            expr: self.expr,
            template: Rc::new(template),
            lazy: self.lazy,
        })
    }
}

struct SequenceContent<T> {
    expr: MemberExpr<Vec<T>>,
    template: ItemTemplate<T>,
    lazy: bool,
}

impl<T: Clone + PartialEq + 'static> FlowContent for SequenceContent<T> {
    fn add_content(&self, b: &mut ViewBuilder<'_>) -> Result<()> {
        let (expr, template) = (self.expr.clone(), self.template.clone());
        if self.lazy {
            b.add_lazy_obj_seq_with(expr, template)?;
        } else {
            b.add_obj_seq_with(expr, template)?;
        }
        Ok(())
    }
}

/// Pairs a bound object with its template.
pub struct ObjBuilder<T> {
    expr: MemberExpr<T>,
}

impl<T: Clone + PartialEq + 'static> ObjBuilder<T> {
    pub fn using(
        self,
        template: impl Fn(&mut ViewBuilder<'_>, &T) -> Result<()> + 'static,
    ) -> Flow {
        Flow::new(ObjectContent {
            expr: self.expr,
            template: Rc::new(template),
        })
    }
}

struct ObjectContent<T> {
    expr: MemberExpr<T>,
    template: ItemTemplate<T>,
}

impl<T: Clone + PartialEq + 'static> FlowContent for ObjectContent<T> {
    fn add_content(&self, b: &mut ViewBuilder<'_>) -> Result<()> {
        b.add_obj_with(self.expr.clone(), self.template.clone())
            .map(|_| ())
    }
}

pub struct Paragraph;

impl Paragraph {
    pub fn containing(content: impl IntoFlows) -> Flow {
        Flow::sequence(content).with_maker(BoxMaker::Paragraph)
    }
}

pub struct Div;

impl Div {
    pub fn containing(content: impl IntoFlows) -> Flow {
        Flow::sequence(content).with_maker(BoxMaker::Div)
    }
}

pub struct Cell;

impl Cell {
    pub fn containing(content: impl IntoFlows) -> Flow {
        Flow::sequence(content).with_maker(BoxMaker::Cell)
    }
}

pub struct Row {
    widths: Vec<Mp>,
}

impl Row {
    pub fn with_widths(widths: impl IntoIterator<Item = Mp>) -> Self {
        Self {
            widths: widths.into_iter().collect(),
        }
    }

    pub fn containing(self, content: impl IntoFlows) -> Flow {
        Flow::sequence(content).with_maker(BoxMaker::Row {
            widths: self.widths,
        })
    }
}

/// Fixed-size decorative box.
pub struct Block;

impl Block {
    pub fn new(color: Color, width: Mp, height: Mp) -> Flow {
        Flow::from_fn(move |b| b.add_block(color, width, height).map(|_| ()))
    }
}

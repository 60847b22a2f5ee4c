pub use crate::boxes::{BoxId, BoxKind, BoxNode, BoxTree, ClientRun, GroupKind, LazyBox, RunId};
pub use crate::builder::{Cursor, ViewBuilder};
pub use crate::config::ViewConfig;
pub use crate::display::{
    Block, BoundText, Cell, Display, DisplayOf, Div, ItemBuilder, LazyDisplay, ObjBuilder,
    Paragraph, Row,
};
pub use crate::error::{Result, ViewError};
pub use crate::flow::{BoxMaker, Flow, FlowContent, FlowExt, IntoFlows};
pub use crate::hookup::{
    HookupId, HookupKind, HookupNode, HookupTree, LazyHookup, Part, RunSpec, TextFlavor,
    TextHookup,
};
pub use crate::selection::{InsertionPoint, RangeSelection, Selection, SelectionBuilder};
pub use crate::snapshot::BoxSnapshot;
pub use crate::source::{ItemTemplate, Splice};
pub use crate::tree::{RootView, ViewTree};

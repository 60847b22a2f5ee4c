use thiserror::Error;
use trellis_core::BindError;

use crate::{BoxId, HookupId, RunId};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error("cannot place a box inside paragraph {0:?}")]
    BoxInParagraph(BoxId),
    #[error("box {0:?} cannot hold child boxes")]
    NotAGroup(BoxId),
    #[error("box {0:?} is not part of the tree")]
    StaleBox(BoxId),
    #[error("box {child:?} cannot be placed inside its own subtree at {parent:?}")]
    WouldCycle { parent: BoxId, child: BoxId },
    #[error("hookup {0:?} is not part of the tree")]
    StaleHookup(HookupId),
    #[error("run {run} is not in paragraph {para:?}")]
    MissingRun { para: BoxId, run: RunId },
    #[error("run index {index} is out of range for a paragraph of {len} runs")]
    RunIndexOutOfRange { index: usize, len: usize },
    #[error("box {0:?} is not a lazy box")]
    NotLazy(BoxId),
    #[error("item {index} is out of range for a sequence of {len}")]
    ItemIndexOutOfRange { index: usize, len: usize },
    #[error("the view is already being built or rebuilt")]
    Busy,
    #[error("selection is unresolved: {0}")]
    SelectionUnresolved(String),
    #[error("selection shape not implemented: {0}")]
    SelectionNotImplemented(&'static str),
    #[error("offset {offset} is past the end of the text ({len})")]
    OffsetOutOfRange { offset: usize, len: usize },
}

pub type Result<T, E = ViewError> = std::result::Result<T, E>;

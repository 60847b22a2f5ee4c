//! Read-only dumps of the box tree: a serializable [`BoxSnapshot`] for
//! backends and inspectors, and an indented text outline.

use std::fmt::Write;

use serde::Serialize;

use crate::{BoxId, BoxKind, GroupKind, ViewTree};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoxSnapshot {
    Root {
        children: Vec<BoxSnapshot>,
    },
    Div {
        children: Vec<BoxSnapshot>,
    },
    Cell {
        children: Vec<BoxSnapshot>,
    },
    Row {
        /// Column widths in millipoints.
        widths: Vec<i32>,
        children: Vec<BoxSnapshot>,
    },
    Para {
        runs: Vec<String>,
    },
    Lazy {
        len: usize,
        expanded: Vec<BoxSnapshot>,
    },
    Block {
        width: i32,
        height: i32,
    },
    /// An id that no longer names a box.
    Missing,
}

pub(crate) fn snapshot(tree: &ViewTree, id: BoxId) -> BoxSnapshot {
    let Some(node) = tree.boxes().get(id) else {
        return BoxSnapshot::Missing;
    };
    let children = || {
        tree.children(id)
            .iter()
            .map(|c| snapshot(tree, *c))
            .collect::<Vec<_>>()
    };
    match node.kind() {
        BoxKind::Group { kind, .. } => match kind {
            GroupKind::Root => BoxSnapshot::Root {
                children: children(),
            },
            GroupKind::Div => BoxSnapshot::Div {
                children: children(),
            },
            GroupKind::Cell => BoxSnapshot::Cell {
                children: children(),
            },
            GroupKind::Row { widths } => BoxSnapshot::Row {
                widths: widths.iter().map(|w| w.0).collect(),
                children: children(),
            },
        },
        BoxKind::Para { runs } => BoxSnapshot::Para {
            runs: runs.iter().map(|r| r.text.clone()).collect(),
        },
        BoxKind::Lazy(lazy) => BoxSnapshot::Lazy {
            len: lazy.len(),
            expanded: children(),
        },
        BoxKind::Block { width, height, .. } => BoxSnapshot::Block {
            width: width.0,
            height: height.0,
        },
    }
}

pub(crate) fn outline(tree: &ViewTree) -> String {
    let mut out = String::new();
    write_outline(tree, tree.root_box(), 0, &mut out);
    out
}

fn write_outline(tree: &ViewTree, id: BoxId, depth: usize, out: &mut String) {
    let Some(node) = tree.boxes().get(id) else {
        return;
    };
    let _ = write!(out, "{:indent$}{}", "", node.kind().name(), indent = depth * 2);
    match node.kind() {
        BoxKind::Para { runs } => {
            for run in runs {
                let _ = write!(out, " {:?}", run.text);
            }
        }
        BoxKind::Group {
            kind: GroupKind::Row { widths },
            ..
        } => {
            for w in widths {
                let _ = write!(out, " {}pt", w.to_points());
            }
        }
        BoxKind::Lazy(lazy) => {
            let _ = write!(out, " {}", lazy.len());
        }
        BoxKind::Block { width, height, .. } => {
            let _ = write!(out, " {}pt x {}pt", width.to_points(), height.to_points());
        }
        BoxKind::Group { .. } => {}
    }
    out.push('\n');
    for child in tree.children(id) {
        write_outline(tree, *child, depth + 1, out);
    }
}

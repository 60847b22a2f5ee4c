//! # Views
//!
//! `trellis-view` turns [`Flow`] descriptions into a live box tree and
//! keeps it in sync with the data it was built from.
//!
//! A view has two trees kept in one [`ViewTree`]:
//!
//! - the **box tree** ([`BoxTree`]): groups, paragraphs of styled runs,
//!   lazy boxes and blocks, which is what a layout backend reads;
//! - the **hookup tree** ([`HookupTree`]): one node per bound value,
//!   sequence, object or structural scope, owning the subscription and the
//!   boxes and runs it produced.
//!
//! ```rust
//! use std::rc::Rc;
//! use trellis_core::*;
//! use trellis_view::*;
//!
//! #[derive(PartialEq)]
//! struct Task {
//!     title: Property<String>,
//! }
//!
//! struct List {
//!     tasks: Property<Vec<Rc<Task>>>,
//! }
//!
//! let task = |t: &str| Rc::new(Task { title: property(t.to_string()) });
//! let list = Rc::new(List { tasks: property(vec![task("write"), task("test")]) });
//!
//! let view = RootView::default();
//! view.show(&Div::containing(
//!     Display::of_seq(bind!(list.tasks))
//!         .using(|b, task| Paragraph::containing(Display::of(bind!(task.title))).show(b)),
//! ))
//! .unwrap();
//!
//! list.tasks.update(|t| t.push(task("ship")));
//!
//! let tree = view.tree();
//! let div = tree.children(tree.root_box())[0];
//! let texts: Vec<String> = tree.children(div).iter().map(|p| tree.para_text(*p)).collect();
//! assert_eq!(texts, ["write", "test", "ship"]);
//! ```
//!
//! Change notifications must be raised on the thread that owns the view,
//! and not while a [`std::cell::Ref`] from [`RootView::tree`] is held.

pub mod boxes;
pub mod builder;
pub mod config;
pub mod display;
pub mod error;
pub mod flow;
pub mod hookup;
pub mod lazy;
pub mod prelude;
pub mod selection;
pub mod snapshot;
pub mod source;
pub mod tests;
pub mod tree;

pub use prelude::*;

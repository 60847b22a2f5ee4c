//! # Styles, properties and bindings
//!
//! `trellis-core` holds the pieces a view is built from that do not depend
//! on the view tree itself:
//!
//! - [`AssembledStyles`]: immutable, structurally shared presentation
//!   properties, derived one [`StyleProp`] at a time.
//! - [`Property<T>`]: an observable cell; anything implementing
//!   [`Observable`] can drive a live view.
//! - [`MemberExpr<T>`]: a bound "member of a target" fetch, built with
//!   [`bind!`] or [`MemberExpr::field`].
//! - [`EventBridge`]: where a view finds change channels for members that
//!   are not properties (see [`PropBroadcast`] / [`BroadcastBridge`]).
//!
//! ```rust
//! use std::rc::Rc;
//! use trellis_core::*;
//!
//! struct Note {
//!     title: Property<String>,
//! }
//!
//! let note = Rc::new(Note { title: property("Draft".to_string()) });
//! let title = bind!(note.title);
//!
//! note.title.set("Final".to_string());
//! assert_eq!(title.fetch(), "Final");
//! ```
//!
//! Everything here is single threaded (`Rc`/`RefCell`): change
//! notifications must be raised on the thread that owns the view.

pub mod binding;
pub mod broadcast;
pub mod color;
pub mod error;
pub mod observable;
pub mod prelude;
pub mod style;
pub mod text;
pub mod units;

pub use binding::*;
pub use broadcast::*;
pub use color::*;
pub use error::*;
pub use observable::*;
pub use prelude::*;
pub use style::*;
pub use text::*;
pub use units::*;

//! # Binding expressions
//!
//! A [`MemberExpr`] is a fetch of the shape "member of some target object":
//! it carries the member name, the receiver, a fetcher that recomputes the
//! current value, and, when the member is a [`Property`], its change
//! channel.
//!
//! ```rust
//! use std::rc::Rc;
//! use trellis_core::*;
//!
//! struct Person {
//!     name: Property<String>,
//! }
//!
//! let person = Rc::new(Person { name: property("Ada".to_string()) });
//! let expr = bind!(person.name);
//! assert_eq!(expr.fetch(), "Ada");
//!
//! let parts = expr.decompose().unwrap();
//! assert_eq!(parts.member, "name");
//! ```
//!
//! Members that are not properties are bound with [`MemberExpr::field`]; the
//! view then asks its [`EventBridge`] for a channel, and without one the
//! value is shown once and never refreshed.

use std::any::Any;
use std::rc::Rc;

use crate::{BindError, Observable, PropBroadcast, Property, object_key};

pub struct MemberExpr<T> {
    member: &'static str,
    type_name: &'static str,
    target: Option<Rc<dyn Any>>,
    fetch: Rc<dyn Fn() -> T>,
    channel: Option<Rc<dyn Observable>>,
}

/// The parts of a well-formed [`MemberExpr`].
#[derive(Clone)]
pub struct Decomposed {
    pub member: &'static str,
    pub type_name: &'static str,
    pub target: Rc<dyn Any>,
}

impl std::fmt::Debug for Decomposed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decomposed")
            .field("member", &self.member)
            .field("type_name", &self.type_name)
            .finish()
    }
}

impl<T: 'static> MemberExpr<T> {
    /// Raw constructor. Nothing is validated until [`MemberExpr::decompose`].
    pub fn new(
        member: &'static str,
        type_name: &'static str,
        target: Option<Rc<dyn Any>>,
        fetch: impl Fn() -> T + 'static,
    ) -> Self {
        Self {
            member,
            type_name,
            target,
            fetch: Rc::new(fetch),
            channel: None,
        }
    }

    /// Binds a [`Property`] member; its change channel is known up front.
    pub fn property<M, F>(target: &Rc<M>, member: &'static str, project: F) -> Self
    where
        M: 'static,
        T: Clone,
        F: Fn(&M) -> &Property<T> + 'static,
    {
        let channel: Rc<dyn Observable> = Rc::new(project(&**target).clone());
        let receiver = target.clone();
        Self {
            member,
            type_name: std::any::type_name::<M>(),
            target: Some(target.clone() as Rc<dyn Any>),
            fetch: Rc::new(move || project(&*receiver).get()),
            channel: Some(channel),
        }
    }

    /// Binds a plain member; the change channel comes from the view's
    /// [`EventBridge`], if any.
    pub fn field<M: 'static>(
        target: &Rc<M>,
        member: &'static str,
        fetch: impl Fn(&M) -> T + 'static,
    ) -> Self {
        let receiver = target.clone();
        Self {
            member,
            type_name: std::any::type_name::<M>(),
            target: Some(target.clone() as Rc<dyn Any>),
            fetch: Rc::new(move || fetch(&*receiver)),
            channel: None,
        }
    }

    /// Overrides the change channel.
    pub fn with_channel(mut self, channel: Rc<dyn Observable>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Transforms the fetched value, keeping member, receiver and channel.
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> MemberExpr<U> {
        let fetch = self.fetch;
        MemberExpr {
            member: self.member,
            type_name: self.type_name,
            target: self.target,
            fetch: Rc::new(move || f(fetch())),
            channel: self.channel,
        }
    }

    pub fn fetch(&self) -> T {
        (self.fetch)()
    }

    pub fn fetcher(&self) -> Rc<dyn Fn() -> T> {
        self.fetch.clone()
    }

    pub fn member(&self) -> &'static str {
        self.member
    }

    pub fn channel(&self) -> Option<&Rc<dyn Observable>> {
        self.channel.as_ref()
    }

    /// Splits the expression into member name, declaring type and receiver.
    /// Fails when the member is not an identifier or there is no receiver.
    pub fn decompose(&self) -> Result<Decomposed, BindError> {
        if !is_identifier(self.member) {
            return Err(BindError::MalformedBinding {
                member: self.member.to_string(),
                type_name: self.type_name,
                reason: "member is not an identifier",
            });
        }
        let target = self.target.clone().ok_or_else(|| BindError::MissingReceiver {
            member: self.member.to_string(),
        })?;
        Ok(Decomposed {
            member: self.member,
            type_name: self.type_name,
            target,
        })
    }
}

impl<T> Clone for MemberExpr<T> {
    fn clone(&self) -> Self {
        Self {
            member: self.member,
            type_name: self.type_name,
            target: self.target.clone(),
            fetch: self.fetch.clone(),
            channel: self.channel.clone(),
        }
    }
}

impl<T> std::fmt::Debug for MemberExpr<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberExpr")
            .field("member", &self.member)
            .field("type_name", &self.type_name)
            .field("channel", &self.channel.is_some())
            .finish()
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => chars.all(|c| c == '_' || c.is_alphanumeric()),
        _ => false,
    }
}

/// Supplies change channels for members that have none of their own.
pub trait EventBridge {
    fn hookup_event_actions(
        &self,
        member: &str,
        target: &Rc<dyn Any>,
    ) -> Option<Rc<dyn Observable>> {
        let _ = (member, target);
        None
    }
}

/// Finds nothing; unbridged members are displayed once.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBridge;

impl EventBridge for NoBridge {}

/// Routes every member through a [`PropBroadcast`].
#[derive(Clone, Default)]
pub struct BroadcastBridge {
    broadcast: PropBroadcast,
}

impl BroadcastBridge {
    pub fn new(broadcast: PropBroadcast) -> Self {
        Self { broadcast }
    }
}

impl EventBridge for BroadcastBridge {
    fn hookup_event_actions(
        &self,
        member: &str,
        target: &Rc<dyn Any>,
    ) -> Option<Rc<dyn Observable>> {
        Some(Rc::new(self.broadcast.channel(object_key(target), member)))
    }
}

/// Anything that names an `Rc` target: the `Rc` itself or a reference to
/// one, as handed to item templates.
pub trait BindTarget {
    type Object;
    fn rc(&self) -> &Rc<Self::Object>;
}

impl<M> BindTarget for Rc<M> {
    type Object = M;
    fn rc(&self) -> &Rc<M> {
        self
    }
}

impl<T: BindTarget> BindTarget for &T {
    type Object = T::Object;
    fn rc(&self) -> &Rc<T::Object> {
        (**self).rc()
    }
}

/// `bind!(target.member)` binds a [`Property`] field of an `Rc` target.
#[macro_export]
macro_rules! bind {
    ($target:ident . $member:ident) => {
        $crate::MemberExpr::property(
            $crate::BindTarget::rc(&$target),
            stringify!($member),
            |t| &t.$member,
        )
    };
}

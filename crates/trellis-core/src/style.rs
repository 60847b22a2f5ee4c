//! # Assembled styles
//!
//! `AssembledStyles` is the immutable record of inheritable presentation
//! properties that every box and run carries. Styles are never mutated:
//! applying a [`StyleProp`] yields a new style derived from the old one, or
//! the old one itself when the property already has that value.
//!
//! ```rust
//! use trellis_core::*;
//!
//! let root = AssembledStyles::root();
//! let bold = root.derive(&StyleProp::FontWeight(FW_BOLD));
//! assert!(bold.is_bold());
//!
//! // Same derivation from the same base is shared, not copied.
//! let again = root.derive(&StyleProp::FontWeight(FW_BOLD));
//! assert!(std::rc::Rc::ptr_eq(&bold, &again));
//! ```
//!
//! Derived styles are cached on their base through weak references, so a
//! style is dropped as soon as no box or run holds it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use bitflags::bitflags;

use crate::{Color, Mp, Thickness, Units, Ws};

pub const FW_NORMAL: u16 = 400;
pub const FW_BOLD: u16 = 700;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FontFlags: u8 {
        const ITALIC = 1 << 0;
        const UNDERLINE = 1 << 1;
        const STRIKEOUT = 1 << 2;
    }
}

/// A single style setter. Flows accumulate these and the builder folds them
/// over the ambient style.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StyleProp {
    FontWeight(u16),
    Italic(bool),
    Underline(bool),
    Strikeout(bool),
    FontSize(Mp),
    FontFamily(Rc<str>),
    ForeColor(Color),
    BackColor(Color),
    Margins(Thickness),
    Pads(Thickness),
    Ws(Ws),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct StyleValues {
    font_weight: u16,
    flags: FontFlags,
    font_size: Mp,
    font_family: Option<Rc<str>>,
    fore_color: Color,
    back_color: Color,
    margins: Thickness,
    pads: Thickness,
    ws: Ws,
}

impl Default for StyleValues {
    fn default() -> Self {
        Self {
            font_weight: FW_NORMAL,
            flags: FontFlags::empty(),
            font_size: Units::points(10.0),
            font_family: None,
            fore_color: Color::BLACK,
            back_color: Color::TRANSPARENT,
            margins: Thickness::default(),
            pads: Thickness::default(),
            ws: Ws::default(),
        }
    }
}

impl StyleValues {
    fn with(&self, prop: &StyleProp) -> StyleValues {
        let mut v = self.clone();
        match prop {
            StyleProp::FontWeight(w) => v.font_weight = *w,
            StyleProp::Italic(on) => v.flags.set(FontFlags::ITALIC, *on),
            StyleProp::Underline(on) => v.flags.set(FontFlags::UNDERLINE, *on),
            StyleProp::Strikeout(on) => v.flags.set(FontFlags::STRIKEOUT, *on),
            StyleProp::FontSize(size) => v.font_size = *size,
            StyleProp::FontFamily(family) => v.font_family = Some(family.clone()),
            StyleProp::ForeColor(c) => v.fore_color = *c,
            StyleProp::BackColor(c) => v.back_color = *c,
            StyleProp::Margins(m) => v.margins = *m,
            StyleProp::Pads(p) => v.pads = *p,
            StyleProp::Ws(ws) => v.ws = *ws,
        }
        v
    }
}

pub struct AssembledStyles {
    values: StyleValues,
    derived_from: Option<Rc<AssembledStyles>>,
    derived: RefCell<HashMap<StyleProp, Weak<AssembledStyles>>>,
}

impl AssembledStyles {
    /// The default style every view starts from.
    pub fn root() -> Rc<Self> {
        Rc::new(Self {
            values: StyleValues::default(),
            derived_from: None,
            derived: RefCell::new(HashMap::new()),
        })
    }

    /// Returns the style with `prop` applied. Never mutates `self`; returns
    /// `self` when `prop` changes nothing, and a shared instance when the
    /// same derivation from this base is still alive.
    pub fn derive(self: &Rc<Self>, prop: &StyleProp) -> Rc<Self> {
        let values = self.values.with(prop);
        if values == self.values {
            return self.clone();
        }

        if let Some(existing) = self.derived.borrow().get(prop).and_then(Weak::upgrade) {
            return existing;
        }

        let style = Rc::new(Self {
            values,
            derived_from: Some(self.clone()),
            derived: RefCell::new(HashMap::new()),
        });
        let mut cache = self.derived.borrow_mut();
        cache.retain(|_, w| w.strong_count() > 0);
        cache.insert(prop.clone(), Rc::downgrade(&style));
        style
    }

    /// Applies `props` left to right.
    pub fn derive_all(self: &Rc<Self>, props: &[StyleProp]) -> Rc<Self> {
        props
            .iter()
            .fold(self.clone(), |style, prop| style.derive(prop))
    }

    /// Specialization used when entering a bound text run.
    pub fn with_ws(self: &Rc<Self>, ws: Ws) -> Rc<Self> {
        self.derive(&StyleProp::Ws(ws))
    }

    pub fn derived_from(&self) -> Option<&Rc<AssembledStyles>> {
        self.derived_from.as_ref()
    }

    pub fn font_weight(&self) -> u16 {
        self.values.font_weight
    }
    pub fn is_bold(&self) -> bool {
        self.values.font_weight >= FW_BOLD
    }
    pub fn flags(&self) -> FontFlags {
        self.values.flags
    }
    pub fn is_italic(&self) -> bool {
        self.values.flags.contains(FontFlags::ITALIC)
    }
    pub fn is_underlined(&self) -> bool {
        self.values.flags.contains(FontFlags::UNDERLINE)
    }
    pub fn font_size(&self) -> Mp {
        self.values.font_size
    }
    pub fn font_family(&self) -> Option<&str> {
        self.values.font_family.as_deref()
    }
    pub fn fore_color(&self) -> Color {
        self.values.fore_color
    }
    pub fn back_color(&self) -> Color {
        self.values.back_color
    }
    pub fn margins(&self) -> Thickness {
        self.values.margins
    }
    pub fn pads(&self) -> Thickness {
        self.values.pads
    }
    pub fn ws(&self) -> Ws {
        self.values.ws
    }
}

impl PartialEq for AssembledStyles {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for AssembledStyles {}

impl std::fmt::Debug for AssembledStyles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssembledStyles")
            .field("font_weight", &self.values.font_weight)
            .field("flags", &self.values.flags)
            .field("font_size", &self.values.font_size)
            .field("font_family", &self.values.font_family)
            .field("fore_color", &self.values.fore_color)
            .field("back_color", &self.values.back_color)
            .field("margins", &self.values.margins)
            .field("pads", &self.values.pads)
            .field("ws", &self.values.ws)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_idempotent() {
        let root = AssembledStyles::root();
        let prop = StyleProp::FontSize(Units::points(14.0));
        let once = root.derive(&prop);
        let twice = once.derive(&prop);
        assert!(Rc::ptr_eq(&once, &twice));
        assert_eq!(once.font_size(), Mp(14_000));
    }

    #[test]
    fn no_op_setter_returns_base() {
        let root = AssembledStyles::root();
        let same = root.derive(&StyleProp::FontWeight(FW_NORMAL));
        assert!(Rc::ptr_eq(&root, &same));
    }

    #[test]
    fn derivation_is_associative() {
        let root = AssembledStyles::root();
        let s1 = [StyleProp::FontWeight(FW_BOLD), StyleProp::Italic(true)];
        let s2 = [
            StyleProp::ForeColor(Color::RED),
            StyleProp::FontWeight(FW_NORMAL),
        ];

        let stepwise = root.derive_all(&s1).derive_all(&s2);
        let composite: Vec<StyleProp> = s1.iter().chain(s2.iter()).cloned().collect();
        let at_once = root.derive_all(&composite);

        assert_eq!(*stepwise, *at_once);
        assert!(!at_once.is_bold());
        assert!(at_once.is_italic());
        assert_eq!(at_once.fore_color(), Color::RED);
    }

    #[test]
    fn derivation_does_not_touch_base() {
        let root = AssembledStyles::root();
        let italic = root.derive(&StyleProp::Italic(true));
        assert!(!root.is_italic());
        assert!(italic.is_italic());
        assert!(Rc::ptr_eq(italic.derived_from().unwrap(), &root));
    }

    #[test]
    fn unused_derivations_are_dropped() {
        let root = AssembledStyles::root();
        let prop = StyleProp::Underline(true);
        let weak = Rc::downgrade(&root.derive(&prop));
        assert!(weak.upgrade().is_none());

        let kept = root.derive(&prop);
        let shared = root.derive(&prop);
        assert!(Rc::ptr_eq(&kept, &shared));
    }

    #[test]
    fn with_ws_specializes() {
        let root = AssembledStyles::root();
        let ws = root.with_ws(Ws(7));
        assert_eq!(ws.ws(), Ws(7));
        assert_eq!(root.ws(), Ws(0));
    }
}

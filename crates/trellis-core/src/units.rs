/// Length in millipoints (1/72000 inch). Integral so styles can be hashed
/// and compared exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Mp(pub i32);

impl Mp {
    pub const ZERO: Mp = Mp(0);

    pub fn to_points(self) -> f32 {
        self.0 as f32 / 1000.0
    }
}

/// Conversions into [`Mp`].
pub struct Units;

impl Units {
    pub fn points(pt: f32) -> Mp {
        Mp((pt * 1000.0).round() as i32)
    }
    pub fn inches(inches: f32) -> Mp {
        Mp((inches * 72_000.0).round() as i32)
    }
    pub fn pixels(px: f32, dpi: f32) -> Mp {
        if dpi <= 0.0 {
            return Mp::ZERO;
        }
        Mp((px * 72_000.0 / dpi).round() as i32)
    }
}

/// Per-edge lengths, used for margins and pads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Thickness {
    pub left: Mp,
    pub top: Mp,
    pub right: Mp,
    pub bottom: Mp,
}

impl Thickness {
    pub fn new(left: Mp, top: Mp, right: Mp, bottom: Mp) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
    pub fn uniform(all: Mp) -> Self {
        Self::new(all, all, all, all)
    }
    pub fn symmetric(horizontal: Mp, vertical: Mp) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }
}

/// Writing system handle. Selects the language/script a run is rendered in
/// and which alternative of a [`crate::MultiString`] is displayed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ws(pub u32);

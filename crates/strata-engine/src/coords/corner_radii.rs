use serde::{Deserialize, Serialize};

/// Per-corner radii for a rounded rectangle (CSS pixels).
///
/// Corners follow CSS convention: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    #[inline]
    pub const fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self { top_left, top_right, bottom_right, bottom_left }
    }

    /// Uniform radius on all four corners.
    #[inline]
    pub const fn all(r: f32) -> Self {
        Self { top_left: r, top_right: r, bottom_right: r, bottom_left: r }
    }

    /// No rounding.
    #[inline]
    pub const fn zero() -> Self {
        Self::all(0.0)
    }

    #[inline]
    pub fn is_uniform(self) -> bool {
        self.top_left == self.top_right
            && self.top_right == self.bottom_right
            && self.bottom_right == self.bottom_left
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.is_uniform() && self.top_left <= 0.0
    }

    /// Radii clamped so no corner is negative.
    #[inline]
    pub fn clamped(self) -> Self {
        Self::new(
            self.top_left.max(0.0),
            self.top_right.max(0.0),
            self.bottom_right.max(0.0),
            self.bottom_left.max(0.0),
        )
    }
}

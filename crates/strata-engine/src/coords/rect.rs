use serde::{Deserialize, Serialize};

use super::{Edges, Vec2};

/// Axis-aligned rectangle in CSS pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    /// True when either dimension is zero or negative.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }

    /// Same size, origin shifted by `delta`.
    #[inline]
    #[must_use]
    pub fn translate(self, delta: Vec2) -> Self {
        Self::from_origin_size(self.origin + delta, self.size)
    }

    /// Grows the rectangle outward by `edges` on each side.
    #[inline]
    #[must_use]
    pub fn outset(self, edges: Edges) -> Self {
        Rect::new(
            self.origin.x - edges.left,
            self.origin.y - edges.top,
            self.size.x + edges.h(),
            self.size.y + edges.v(),
        )
    }

    /// Shrinks the rectangle inward by `edges`, clamping the size at zero.
    #[inline]
    #[must_use]
    pub fn inset(self, edges: Edges) -> Self {
        Rect::new(
            self.origin.x + edges.left,
            self.origin.y + edges.top,
            (self.size.x - edges.h()).max(0.0),
            (self.size.y - edges.v()).max(0.0),
        )
    }
}

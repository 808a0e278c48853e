use serde::{Deserialize, Serialize};

/// Insets on all four sides (padding, margin, border widths).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    #[inline]
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    #[inline]
    pub const fn all(v: f32) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }

    #[inline]
    pub const fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self { top: vertical, bottom: vertical, left: horizontal, right: horizontal }
    }

    /// Total inset on the horizontal axis.
    #[inline]
    pub fn h(self) -> f32 {
        self.left + self.right
    }

    /// Total inset on the vertical axis.
    #[inline]
    pub fn v(self) -> f32 {
        self.top + self.bottom
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }

    #[inline]
    pub fn is_uniform(&self) -> bool {
        self.top == self.right && self.right == self.bottom && self.bottom == self.left
    }

    /// Largest of the four sides.
    #[inline]
    pub fn max_side(&self) -> f32 {
        self.top.max(self.right).max(self.bottom).max(self.left)
    }

    /// Negative sides become zero.
    #[inline]
    #[must_use]
    pub fn non_negative(self) -> Self {
        Self::new(self.top.max(0.0), self.right.max(0.0), self.bottom.max(0.0), self.left.max(0.0))
    }

    /// The four sides in CSS order (top, right, bottom, left).
    #[inline]
    pub fn sides(self) -> [f32; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_h_and_v() {
        let e = Edges::symmetric(4.0, 8.0);
        assert_eq!(e.h(), 16.0);
        assert_eq!(e.v(), 8.0);
    }

    #[test]
    fn non_negative_clamps() {
        let e = Edges::new(-2.0, 3.0, -1.0, 0.0).non_negative();
        assert_eq!(e, Edges::new(0.0, 3.0, 0.0, 0.0));
        assert!(!e.is_zero());
        assert!(Edges::default().is_zero());
    }

    #[test]
    fn max_side_picks_largest() {
        assert_eq!(Edges::new(1.0, 7.0, 3.0, 2.0).max_side(), 7.0);
    }
}

use serde::{Deserialize, Serialize};

use super::Color;

/// A single gradient stop.
///
/// `position` is expected in [0, 1]; the collector resolves implicit CSS
/// positions before constructing stops.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub position: f32,
    pub color: Color,
}

impl ColorStop {
    #[inline]
    pub const fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

/// Gradient definition shared by the linear and radial paint variants.
///
/// Semantics:
/// - `angle` uses CSS degrees: `0` points up, `90` points right, `180` (the
///   CSS default) points down. Radial gradients keep the angle for targets
///   that orient their ellipse.
/// - Stops are sorted by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub stops: Vec<ColorStop>,
    pub angle: f32,
}

impl Gradient {
    pub fn new(stops: Vec<ColorStop>, angle: f32) -> Self {
        Self { stops, angle }
    }

    /// Returns true when the gradient definition is structurally usable.
    pub fn is_valid(&self) -> bool {
        self.angle.is_finite()
            && self.stops.len() >= 2
            && self.stops.iter().all(|s| s.position.is_finite() && s.color.is_finite())
    }

    /// True when every stop is fully transparent.
    pub fn is_invisible(&self) -> bool {
        self.stops.iter().all(|s| s.color.is_transparent())
    }

    /// Unit direction vector for the angle, in y-down space.
    pub fn direction(&self) -> (f32, f32) {
        let rad = self.angle.to_radians();
        (rad.sin(), -rad.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(p: f32) -> ColorStop {
        ColorStop::new(p, Color::black())
    }

    #[test]
    fn needs_two_stops() {
        assert!(!Gradient::new(vec![stop(0.0)], 180.0).is_valid());
        assert!(Gradient::new(vec![stop(0.0), stop(1.0)], 180.0).is_valid());
    }

    #[test]
    fn default_angle_points_down() {
        let (dx, dy) = Gradient::new(vec![stop(0.0), stop(1.0)], 180.0).direction();
        assert!(dx.abs() < 1e-6);
        assert!((dy - 1.0).abs() < 1e-6);
    }
}

use serde::{Deserialize, Serialize};

use super::{Color, Gradient, ImageRef, ScaleMode};

/// Paint source for fills and strokes.
///
/// Order in a layer's paint list is bottom-first: later paints draw on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Paint {
    Solid { color: Color, opacity: f32 },
    Image { image: ImageRef, scale_mode: ScaleMode },
    LinearGradient(Gradient),
    RadialGradient(Gradient),
}

impl Paint {
    /// Solid paint carrying the color's own alpha as its opacity.
    ///
    /// Returns `None` for a fully transparent color: nothing is emitted rather
    /// than a zero-opacity fill.
    #[inline]
    pub fn solid(color: Color) -> Option<Self> {
        if color.is_transparent() || !color.is_finite() {
            return None;
        }
        Some(Paint::Solid { color: color.with_alpha(1.0), opacity: color.a })
    }

    #[inline]
    pub fn image(image: ImageRef, scale_mode: ScaleMode) -> Self {
        Paint::Image { image, scale_mode }
    }

    /// Returns the solid color with opacity folded back into alpha.
    #[inline]
    pub fn solid_color(&self) -> Option<Color> {
        match self {
            Paint::Solid { color, opacity } => Some(color.with_alpha(*opacity)),
            _ => None,
        }
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        match self {
            Paint::Solid { opacity, .. } => *opacity >= 1.0,
            Paint::Image { .. } => false,
            Paint::LinearGradient(g) | Paint::RadialGradient(g) => {
                g.stops.iter().all(|s| s.color.is_opaque())
            }
        }
    }

    #[inline]
    pub fn image_ref(&self) -> Option<&ImageRef> {
        match self {
            Paint::Image { image, .. } => Some(image),
            _ => None,
        }
    }

    #[inline]
    pub fn image_ref_mut(&mut self) -> Option<&mut ImageRef> {
        match self {
            Paint::Image { image, .. } => Some(image),
            _ => None,
        }
    }
}

/// Where a stroke sits relative to the layer edge.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrokeAlign {
    /// CSS borders live inside the border box.
    #[default]
    Inside,
    Outside,
    Center,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_solid_is_not_emitted() {
        assert!(Paint::solid(Color::transparent()).is_none());
        assert!(Paint::solid(Color::from_srgb(1.0, 0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn solid_keeps_alpha_as_opacity() {
        let p = Paint::solid(Color::from_srgb(1.0, 0.0, 0.0, 0.25)).unwrap();
        match p {
            Paint::Solid { color, opacity } => {
                assert_eq!(color.a, 1.0);
                assert_eq!(opacity, 0.25);
            }
            other => panic!("unexpected paint {other:?}"),
        }
        assert_eq!(p.solid_color().unwrap().a, 0.25);
    }

    #[test]
    fn paint_serializes_with_type_tag() {
        let p = Paint::solid(Color::black()).unwrap();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "SOLID");
    }
}

use serde::{Deserialize, Serialize};

/// Straight-alpha sRGB color with channels in `[0, 1]`.
///
/// The layer IR keeps alpha separate from RGB because target scenes express
/// solid paints as `color + opacity`. Use [`premultiplied`](Self::premultiplied)
/// when compositing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    #[inline]
    pub const fn black() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 }
    }

    #[inline]
    pub const fn white() -> Self {
        Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }
    }

    /// Creates a color from straight sRGB bytes (`0`–`255`).
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_srgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Creates a color from straight sRGB `f32` components, clamped to `[0, 1]`.
    #[inline]
    pub fn from_srgb(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// Alpha is exactly zero; nothing would be painted.
    #[inline]
    pub fn is_transparent(self) -> bool {
        self.a <= 0.0
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.a >= 1.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Returns `(r * a, g * a, b * a, a)`.
    #[inline]
    pub fn premultiplied(self) -> (f32, f32, f32, f32) {
        (self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }

    /// Channels as rounded bytes.
    #[inline]
    pub fn to_srgb_u8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// `#rrggbb` for opaque colors, `#rrggbbaa` otherwise.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_srgb_u8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_normalizes() {
        let c = Color::from_srgb_u8(255, 0, 51, 255);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.2).abs() < 1e-6);
        assert!(c.is_opaque());
    }

    #[test]
    fn hex_round_trip_of_bytes() {
        assert_eq!(Color::from_srgb_u8(0x1a, 0x2b, 0x3c, 0xff).to_hex(), "#1a2b3c");
        assert_eq!(Color::from_srgb_u8(0x1a, 0x2b, 0x3c, 0x80).to_hex(), "#1a2b3c80");
    }

    #[test]
    fn premultiplied_scales_rgb() {
        let (r, g, b, a) = Color::from_srgb(1.0, 0.5, 0.0, 0.5).premultiplied();
        assert_eq!((r, g, b, a), (0.5, 0.25, 0.0, 0.5));
    }

    #[test]
    fn transparent_has_zero_alpha() {
        assert!(Color::transparent().is_transparent());
        assert!(!Color::black().is_transparent());
    }
}

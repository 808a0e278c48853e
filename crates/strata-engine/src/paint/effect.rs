use serde::{Deserialize, Serialize};

use crate::coords::Vec2;

use super::Color;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    DropShadow,
    InnerShadow,
    BackgroundBlur,
}

/// A layer effect.
///
/// Blur effects only use `radius`; color/offset/spread are zero.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub color: Color,
    pub offset: Vec2,
    pub radius: f32,
    pub spread: f32,
}

impl Effect {
    pub fn drop_shadow(color: Color, offset: Vec2, radius: f32, spread: f32) -> Self {
        Self { kind: EffectKind::DropShadow, color, offset, radius: radius.max(0.0), spread }
    }

    pub fn inner_shadow(color: Color, offset: Vec2, radius: f32, spread: f32) -> Self {
        Self { kind: EffectKind::InnerShadow, color, offset, radius: radius.max(0.0), spread }
    }

    pub fn background_blur(radius: f32) -> Self {
        Self {
            kind: EffectKind::BackgroundBlur,
            color: Color::transparent(),
            offset: Vec2::zero(),
            radius: radius.max(0.0),
            spread: 0.0,
        }
    }

    #[inline]
    pub fn is_shadow(&self) -> bool {
        matches!(self.kind, EffectKind::DropShadow | EffectKind::InnerShadow)
    }

    /// A shadow with a transparent color, or a zero-radius blur, draws nothing.
    #[inline]
    pub fn is_visible(&self) -> bool {
        match self.kind {
            EffectKind::BackgroundBlur => self.radius > 0.0,
            _ => !self.color.is_transparent(),
        }
    }
}

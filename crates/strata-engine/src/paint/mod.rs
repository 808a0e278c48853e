//! Paint model shared by the layer IR, the collector and the scene builder.
//!
//! Scope:
//! - color representation (straight sRGB alpha)
//! - paint sources (solid, image, gradients)
//! - layer effects (shadows, backdrop blur)
//!
//! Geometry types remain in `coords`.

pub mod color;
pub mod effect;
pub mod gradient;
pub mod image;
mod paint;

pub use color::Color;
pub use effect::{Effect, EffectKind};
pub use gradient::{ColorStop, Gradient};
pub use image::{AssetRef, ImageRef, ScaleMode};
pub use paint::{Paint, StrokeAlign};

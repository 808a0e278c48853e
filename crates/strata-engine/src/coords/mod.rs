//! Coordinate and geometry types shared by capture and scene construction.
//!
//! Canonical space:
//! - CSS pixels
//! - Origin top-left of the *document* (scroll-corrected), never the viewport
//! - +X right, +Y down
//!
//! Scene construction converts to parent-relative offsets explicitly.

mod corner_radii;
mod edges;
mod rect;
mod vec2;

pub use corner_radii::CornerRadii;
pub use edges::Edges;
pub use rect::Rect;
pub use vec2::Vec2;

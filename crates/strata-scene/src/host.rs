//! The surface a scene is built against.

use serde::Serialize;
use strata_engine::coords::{CornerRadii, Edges, Vec2};
use strata_engine::paint::{Effect, Paint, StrokeAlign};
use strata_engine::text::FontName;
use strata_ir::{AxisSizing, CounterAxisAlign, PrimaryAxisAlign, SelfAlign, TextContent};

use crate::error::HostError;

/// Host-assigned node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SceneNodeId(pub usize);

/// Host-assigned handle for registered image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageHandle(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisDirection {
    Horizontal,
    Vertical,
}

/// Auto-layout properties of a container, already mapped to what a target
/// scene can express.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoLayout {
    pub direction: AxisDirection,
    pub item_spacing: f32,
    /// Spacing between wrapped rows; only set when `wrap` is.
    pub counter_axis_spacing: Option<f32>,
    pub padding: Edges,
    pub primary_align: PrimaryAxisAlign,
    pub counter_align: CounterAxisAlign,
    pub wrap: bool,
}

/// Properties a node takes from the container it was appended to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildLayout {
    pub sizing: AxisSizing,
    pub growth: f32,
    pub self_align: Option<SelfAlign>,
    /// Taken out of the parent's flow and placed by its position.
    pub absolute: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextResize {
    /// Width and height follow the content.
    AutoWidth,
    /// Width is fixed; height follows the wrapped content.
    AutoHeight,
}

/// Scene construction surface.
///
/// Every call is synchronous. [`yield_now`](TargetHost::yield_now) is the
/// builder's cooperative break point between sibling batches.
pub trait TargetHost {
    // ── shells ────────────────────────────────────────────────────────────

    fn create_frame(&mut self, name: &str) -> Result<SceneNodeId, HostError>;

    fn create_text(&mut self, name: &str) -> Result<SceneNodeId, HostError>;

    /// Instantiates vector markup natively. Hosts that cannot parse the
    /// markup return an error and the builder falls back to a raster.
    fn create_vector(&mut self, name: &str, markup: &str) -> Result<SceneNodeId, HostError>;

    /// Intrinsic size of a node created by [`create_vector`](TargetHost::create_vector).
    fn intrinsic_size(&self, node: SceneNodeId) -> Result<Vec2, HostError>;

    // ── geometry ──────────────────────────────────────────────────────────

    fn resize(&mut self, node: SceneNodeId, size: Vec2) -> Result<(), HostError>;

    /// Scales a node and its content uniformly to `size`.
    fn rescale(&mut self, node: SceneNodeId, size: Vec2) -> Result<(), HostError>;

    /// Position relative to the parent.
    fn set_position(&mut self, node: SceneNodeId, position: Vec2) -> Result<(), HostError>;

    fn set_rotation(&mut self, node: SceneNodeId, degrees: f32) -> Result<(), HostError>;

    // ── paint ─────────────────────────────────────────────────────────────

    /// Image paints carry [`ImageRef::Handle`](strata_engine::paint::ImageRef::Handle)s
    /// obtained from [`register_image`](TargetHost::register_image).
    fn set_fills(&mut self, node: SceneNodeId, fills: &[Paint]) -> Result<(), HostError>;

    fn set_strokes(
        &mut self,
        node: SceneNodeId,
        strokes: &[Paint],
        weight: f32,
        align: StrokeAlign,
    ) -> Result<(), HostError>;

    fn set_effects(&mut self, node: SceneNodeId, effects: &[Effect]) -> Result<(), HostError>;

    fn set_corner_radii(&mut self, node: SceneNodeId, radii: CornerRadii) -> Result<(), HostError>;

    fn set_opacity(&mut self, node: SceneNodeId, opacity: f32) -> Result<(), HostError>;

    fn set_clips_content(&mut self, node: SceneNodeId, clips: bool) -> Result<(), HostError>;

    // ── layout ────────────────────────────────────────────────────────────

    fn set_auto_layout(&mut self, node: SceneNodeId, layout: &AutoLayout) -> Result<(), HostError>;

    /// Applied after `node` was appended to its parent.
    fn set_child_layout(&mut self, node: SceneNodeId, layout: &ChildLayout) -> Result<(), HostError>;

    // ── content ───────────────────────────────────────────────────────────

    fn load_font(&mut self, font: &FontName) -> Result<(), HostError>;

    /// `font` has been loaded with [`load_font`](TargetHost::load_font).
    fn set_text(
        &mut self,
        node: SceneNodeId,
        text: &TextContent,
        font: &FontName,
        resize: TextResize,
    ) -> Result<(), HostError>;

    fn register_image(&mut self, bytes: &[u8]) -> Result<ImageHandle, HostError>;

    // ── structure ─────────────────────────────────────────────────────────

    fn append_child(&mut self, parent: SceneNodeId, child: SceneNodeId) -> Result<(), HostError>;

    /// Drops a node that could not be completed.
    fn remove(&mut self, node: SceneNodeId);

    fn yield_now(&mut self);
}

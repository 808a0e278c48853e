//! In-memory [`TargetHost`] that records the scene as an inspectable tree.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::Serialize;
use strata_engine::coords::{CornerRadii, Vec2};
use strata_engine::paint::{Effect, Paint, StrokeAlign};
use strata_engine::raster;
use strata_engine::text::{FontBook, FontName};
use strata_ir::TextContent;

use crate::error::HostError;
use crate::host::{AutoLayout, ChildLayout, ImageHandle, SceneNodeId, TargetHost, TextResize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SceneNodeKind {
    Frame,
    Text,
    Vector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneText {
    pub characters: String,
    pub font: FontName,
    pub size: f32,
    pub resize: TextResize,
    /// Laid-out extent: natural width for `AutoWidth`, wrapped to the node
    /// width for `AutoHeight`.
    pub measured: Vec2,
}

/// One recorded node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    pub kind: SceneNodeKind,
    pub name: String,
    /// Relative to the parent.
    pub position: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub fills: Vec<Paint>,
    pub strokes: Vec<Paint>,
    pub stroke_weight: f32,
    pub stroke_align: Option<StrokeAlign>,
    pub effects: Vec<Effect>,
    pub corner_radii: CornerRadii,
    pub opacity: f32,
    pub clips_content: bool,
    pub auto_layout: Option<AutoLayout>,
    pub child_layout: Option<ChildLayout>,
    pub text: Option<SceneText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
    pub parent: Option<SceneNodeId>,
    pub children: Vec<SceneNodeId>,
}

impl SceneNode {
    fn new(kind: SceneNodeKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_owned(),
            position: Vec2::zero(),
            size: Vec2::zero(),
            rotation: 0.0,
            fills: Vec::new(),
            strokes: Vec::new(),
            stroke_weight: 0.0,
            stroke_align: None,
            effects: Vec::new(),
            corner_radii: CornerRadii::zero(),
            opacity: 1.0,
            clips_content: false,
            auto_layout: None,
            child_layout: None,
            text: None,
            markup: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Records every host call into a node table.
///
/// Fonts must be declared up front; [`with_standard_fonts`] declares the
/// build defaults. Vector markup is validated with `usvg`, and image bytes
/// with the `image` crate, so rejection paths behave like a real host.
///
/// [`with_standard_fonts`]: MemoryHost::with_standard_fonts
#[derive(Default)]
pub struct MemoryHost {
    nodes: Vec<Option<SceneNode>>,
    fonts: FontBook,
    images: Vec<Vec<u8>>,
    vectors_disabled: bool,
    refuse: HashSet<String>,
    yields: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Inter` and `Roboto` in their common styles.
    #[must_use]
    pub fn with_standard_fonts(mut self) -> Self {
        for family in ["Inter", "Roboto"] {
            for style in ["Regular", "Italic", "Medium", "Semi Bold", "Bold", "Bold Italic"] {
                self.fonts.declare(FontName::new(family, style));
            }
        }
        self
    }

    #[must_use]
    pub fn with_font(mut self, font: FontName) -> Self {
        self.fonts.declare(font);
        self
    }

    /// Registers outline data so text is measured with real metrics.
    pub fn with_font_bytes(mut self, font: FontName, bytes: &[u8]) -> Result<Self, HostError> {
        self.fonts
            .register(font, bytes)
            .map_err(|e| HostError::Rejected { operation: "register_font", reason: e.to_string() })?;
        Ok(self)
    }

    /// Rejects every vector, forcing raster fallbacks.
    #[must_use]
    pub fn without_vectors(mut self) -> Self {
        self.vectors_disabled = true;
        self
    }

    /// Refuses to create nodes named `name`.
    #[must_use]
    pub fn refusing(mut self, name: impl Into<String>) -> Self {
        self.refuse.insert(name.into());
        self
    }

    // ── inspection ────────────────────────────────────────────────────────

    pub fn node(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn children(&self, id: SceneNodeId) -> impl Iterator<Item = (SceneNodeId, &SceneNode)> {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(move |&c| Some((c, self.node(c)?)))
    }

    /// Live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn images_registered(&self) -> usize {
        self.images.len()
    }

    pub fn yields(&self) -> usize {
        self.yields
    }

    /// Position in root space, summing parent-relative offsets.
    pub fn absolute_position(&self, id: SceneNodeId) -> Option<Vec2> {
        let mut node = self.node(id)?;
        let mut position = node.position;
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            position = position + node.position;
        }
        Some(position)
    }

    /// Indented one-line-per-node dump of the subtree at `root`.
    pub fn outline(&self, root: SceneNodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            let _ = write!(
                out,
                "{:indent$}{:?} {:?} ({}, {}) {}×{}",
                "",
                node.kind,
                node.name,
                node.position.x,
                node.position.y,
                node.size.x,
                node.size.y,
                indent = depth * 2
            );
            if let Some(auto) = &node.auto_layout {
                let _ = write!(out, " {:?} gap {}", auto.direction, auto.item_spacing);
            }
            if let Some(text) = &node.text {
                let _ = write!(out, " {:?} [{}]", text.characters, text.font);
            }
            out.push('\n');
            stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        }
        out
    }

    fn create(&mut self, kind: SceneNodeKind, name: &str) -> Result<SceneNodeId, HostError> {
        if self.refuse.contains(name) {
            return Err(HostError::Rejected { operation: "create", reason: format!("{name:?} is refused") });
        }
        let id = SceneNodeId(self.nodes.len());
        self.nodes.push(Some(SceneNode::new(kind, name)));
        Ok(id)
    }

    fn node_mut(&mut self, id: SceneNodeId) -> Result<&mut SceneNode, HostError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(HostError::UnknownNode(id))
    }
}

impl TargetHost for MemoryHost {
    fn create_frame(&mut self, name: &str) -> Result<SceneNodeId, HostError> {
        self.create(SceneNodeKind::Frame, name)
    }

    fn create_text(&mut self, name: &str) -> Result<SceneNodeId, HostError> {
        self.create(SceneNodeKind::Text, name)
    }

    fn create_vector(&mut self, name: &str, markup: &str) -> Result<SceneNodeId, HostError> {
        if self.vectors_disabled {
            return Err(HostError::Vector("vectors are disabled".into()));
        }
        let size = raster::svg_intrinsic_size(markup).map_err(|e| HostError::Vector(e.to_string()))?;
        let id = self.create(SceneNodeKind::Vector, name)?;
        let node = self.node_mut(id)?;
        node.size = size;
        node.markup = Some(markup.to_owned());
        Ok(id)
    }

    fn intrinsic_size(&self, node: SceneNodeId) -> Result<Vec2, HostError> {
        let node = self.node(node).ok_or(HostError::UnknownNode(node))?;
        Ok(node.size)
    }

    fn resize(&mut self, node: SceneNodeId, size: Vec2) -> Result<(), HostError> {
        self.node_mut(node)?.size = Vec2::new(size.x.max(0.0), size.y.max(0.0));
        Ok(())
    }

    fn rescale(&mut self, node: SceneNodeId, size: Vec2) -> Result<(), HostError> {
        self.resize(node, size)
    }

    fn set_position(&mut self, node: SceneNodeId, position: Vec2) -> Result<(), HostError> {
        self.node_mut(node)?.position = position;
        Ok(())
    }

    fn set_rotation(&mut self, node: SceneNodeId, degrees: f32) -> Result<(), HostError> {
        self.node_mut(node)?.rotation = degrees;
        Ok(())
    }

    fn set_fills(&mut self, node: SceneNodeId, fills: &[Paint]) -> Result<(), HostError> {
        self.node_mut(node)?.fills = fills.to_vec();
        Ok(())
    }

    fn set_strokes(
        &mut self,
        node: SceneNodeId,
        strokes: &[Paint],
        weight: f32,
        align: StrokeAlign,
    ) -> Result<(), HostError> {
        let node = self.node_mut(node)?;
        node.strokes = strokes.to_vec();
        node.stroke_weight = weight;
        node.stroke_align = Some(align);
        Ok(())
    }

    fn set_effects(&mut self, node: SceneNodeId, effects: &[Effect]) -> Result<(), HostError> {
        self.node_mut(node)?.effects = effects.to_vec();
        Ok(())
    }

    fn set_corner_radii(&mut self, node: SceneNodeId, radii: CornerRadii) -> Result<(), HostError> {
        self.node_mut(node)?.corner_radii = radii;
        Ok(())
    }

    fn set_opacity(&mut self, node: SceneNodeId, opacity: f32) -> Result<(), HostError> {
        self.node_mut(node)?.opacity = opacity.clamp(0.0, 1.0);
        Ok(())
    }

    fn set_clips_content(&mut self, node: SceneNodeId, clips: bool) -> Result<(), HostError> {
        self.node_mut(node)?.clips_content = clips;
        Ok(())
    }

    fn set_auto_layout(&mut self, node: SceneNodeId, layout: &AutoLayout) -> Result<(), HostError> {
        let node = self.node_mut(node)?;
        if node.kind != SceneNodeKind::Frame {
            return Err(HostError::Rejected { operation: "set_auto_layout", reason: "not a frame".into() });
        }
        node.auto_layout = Some(*layout);
        Ok(())
    }

    fn set_child_layout(&mut self, node: SceneNodeId, layout: &ChildLayout) -> Result<(), HostError> {
        self.node_mut(node)?.child_layout = Some(*layout);
        Ok(())
    }

    fn load_font(&mut self, font: &FontName) -> Result<(), HostError> {
        self.fonts
            .lookup(font)
            .map(|_| ())
            .map_err(|_| HostError::FontUnavailable(font.clone()))
    }

    fn set_text(
        &mut self,
        node: SceneNodeId,
        text: &TextContent,
        font: &FontName,
        resize: TextResize,
    ) -> Result<(), HostError> {
        let face = self.fonts.lookup(font).map_err(|_| HostError::FontUnavailable(font.clone()))?;
        let width = self.node_mut(node)?.size.x;
        let max_width = match resize {
            TextResize::AutoWidth => None,
            TextResize::AutoHeight => Some(width),
        };
        let measured = self.fonts.measure_text(&text.characters, face, text.font_size, max_width);
        self.node_mut(node)?.text = Some(SceneText {
            characters: text.characters.clone(),
            font: font.clone(),
            size: text.font_size,
            resize,
            measured,
        });
        Ok(())
    }

    fn register_image(&mut self, bytes: &[u8]) -> Result<ImageHandle, HostError> {
        raster::image_dimensions(bytes).map_err(|e| HostError::InvalidImage(e.to_string()))?;
        self.images.push(bytes.to_vec());
        Ok(ImageHandle(format!("img-{}", self.images.len())))
    }

    fn append_child(&mut self, parent: SceneNodeId, child: SceneNodeId) -> Result<(), HostError> {
        if parent == child || self.node(child).is_none() {
            return Err(HostError::UnknownNode(child));
        }
        if self.node_mut(parent)?.kind == SceneNodeKind::Text {
            return Err(HostError::Rejected { operation: "append_child", reason: "text nodes have no children".into() });
        }
        if let Some(old) = self.node(child).and_then(|n| n.parent) {
            self.node_mut(old)?.children.retain(|&c| c != child);
        }
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn remove(&mut self, node: SceneNodeId) {
        let Some(Some(removed)) = self.nodes.get_mut(node.0).map(Option::take) else {
            return;
        };
        if let Some(parent) = removed.parent
            && let Ok(p) = self.node_mut(parent)
        {
            p.children.retain(|&c| c != node);
        }
        let mut stack = removed.children;
        while let Some(child) = stack.pop() {
            if let Some(Some(n)) = self.nodes.get_mut(child.0).map(Option::take) {
                stack.extend(n.children);
            }
        }
    }

    fn yield_now(&mut self) {
        self.yields += 1;
    }
}

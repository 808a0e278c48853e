use serde::{Deserialize, Serialize};
use strata_engine::coords::{CornerRadii, Edges, Rect, Vec2};
use strata_engine::paint::{Effect, ImageRef, Paint, ScaleMode, StrokeAlign};

// ── Layout vocabulary ─────────────────────────────────────────────────────

/// Auto-layout direction of a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    /// Children keep their own absolute positions.
    #[default]
    None,
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimaryAxisAlign {
    #[default]
    Min,
    Max,
    Center,
    SpaceBetween,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CounterAxisAlign {
    #[default]
    Min,
    Max,
    Center,
    Baseline,
}

/// Per-axis sizing behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sizing {
    /// Keep the measured size.
    #[default]
    Fixed,
    /// Shrink-wrap the content (auto-layout frames and text only).
    Hug,
    /// Stretch to the parent's available space (children of auto-layout only).
    Fill,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisSizing {
    pub horizontal: Sizing,
    pub vertical: Sizing,
}

impl AxisSizing {
    #[inline]
    pub const fn new(horizontal: Sizing, vertical: Sizing) -> Self {
        Self { horizontal, vertical }
    }
}

/// Child override of the parent's counter-axis alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelfAlign {
    Min,
    Center,
    Max,
    Stretch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Positioning {
    #[default]
    Auto,
    /// Ignores the parent's auto-layout flow.
    Absolute,
}

/// Box-layout semantics of one layer, both as a container and as a child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutDescriptor {
    pub mode: LayoutMode,
    pub item_spacing: f32,
    pub counter_axis_spacing: f32,
    pub padding: Edges,
    pub primary_axis_align: PrimaryAxisAlign,
    pub counter_axis_align: CounterAxisAlign,
    pub wrap: bool,
    pub sizing: AxisSizing,
    /// Main-axis growth factor inside an auto-layout parent.
    pub growth: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_align: Option<SelfAlign>,
    pub positioning: Positioning,
}

impl LayoutDescriptor {
    /// True when the layer contributes no layout of its own: no direction,
    /// no gaps, no padding, no wrap.
    pub fn is_passthrough(&self) -> bool {
        self.mode == LayoutMode::None
            && self.item_spacing == 0.0
            && self.counter_axis_spacing == 0.0
            && self.padding.is_zero()
            && !self.wrap
    }

    #[inline]
    pub fn is_auto_layout(&self) -> bool {
        self.mode != LayoutMode::None
    }
}

// ── Semantics ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemanticTag {
    Button,
    Input,
    Image,
    Section,
    Container,
}

impl SemanticTag {
    pub fn label(self) -> &'static str {
        match self {
            SemanticTag::Button => "Button",
            SemanticTag::Input => "Input",
            SemanticTag::Image => "Image",
            SemanticTag::Section => "Section",
            SemanticTag::Container => "Container",
        }
    }
}

// ── Text ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justified,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextCase {
    #[default]
    Original,
    Upper,
    Lower,
    Title,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    Strikethrough,
}

/// Text payload. `characters` is whitespace-normalized and never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub characters: String,
    pub font_family: String,
    pub font_weight: u16,
    pub font_size: f32,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub align: TextAlign,
    /// Line height in pixels; `None` lets the target use its font default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    #[serde(default)]
    pub letter_spacing: f32,
    #[serde(default)]
    pub case: TextCase,
    #[serde(default)]
    pub decoration: TextDecoration,
}

impl TextContent {
    pub fn new(characters: impl Into<String>, font_family: impl Into<String>, font_size: f32) -> Self {
        Self {
            characters: characters.into(),
            font_family: font_family.into(),
            font_weight: 400,
            font_size,
            italic: false,
            align: TextAlign::Left,
            line_height: None,
            letter_spacing: 0.0,
            case: TextCase::Original,
            decoration: TextDecoration::None,
        }
    }

    /// Line height in pixels, defaulting to `1.2 × font_size`.
    #[inline]
    pub fn effective_line_height(&self) -> f32 {
        self.line_height.unwrap_or(self.font_size * 1.2)
    }

    /// Whether a box of `height` holds more than one line of this text.
    /// Multi-line text keeps its width and grows down; single lines hug.
    #[inline]
    pub fn is_multiline_at(&self, height: f32) -> bool {
        height > 1.5 * self.effective_line_height()
    }
}

// ── Content ───────────────────────────────────────────────────────────────

/// Kind-specific payload of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayerContent {
    Frame,
    Text(TextContent),
    #[serde(rename_all = "camelCase")]
    Image { image: ImageRef, scale_mode: ScaleMode },
    /// Sanitized SVG markup.
    Vector { markup: String },
}

/// Discriminant of [`LayerContent`], used where the payload is irrelevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    Frame,
    Text,
    Image,
    Vector,
}

impl LayerKind {
    /// Kinds that can hold children and take auto-layout.
    #[inline]
    pub fn is_container(self) -> bool {
        matches!(self, LayerKind::Frame | LayerKind::Image)
    }

    pub fn label(self) -> &'static str {
        match self {
            LayerKind::Frame => "FRAME",
            LayerKind::Text => "TEXT",
            LayerKind::Image => "IMAGE",
            LayerKind::Vector => "VECTOR",
        }
    }
}

// ── LayerNode ─────────────────────────────────────────────────────────────

/// One layer of the IR.
///
/// Geometry is absolute document space for every node, children included.
/// Translation into parent-relative offsets happens only in the scene builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerNode {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Clockwise rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_align: Option<StrokeAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f32>,
    /// Present only when the four corners differ.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radii: Option<CornerRadii>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub clips_content: bool,
    #[serde(default)]
    pub layout: LayoutDescriptor,
    /// Outer spacing as captured. The normalizer turns it into a wrapper, so
    /// it is zero in finished trees.
    #[serde(default, skip_serializing_if = "Edges::is_zero")]
    pub margin: Edges,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<SemanticTag>,
    pub content: LayerContent,
    #[serde(default)]
    pub content_only: bool,
    #[serde(default)]
    pub stack_index: i32,
    #[serde(default)]
    pub children: Vec<LayerNode>,
}

fn full_opacity() -> f32 {
    1.0
}

impl LayerNode {
    /// Empty node of the given content at `rect` (negative sizes clamp to zero).
    pub fn new(name: impl Into<String>, rect: Rect, content: LayerContent) -> Self {
        Self {
            name: name.into(),
            x: rect.origin.x,
            y: rect.origin.y,
            width: rect.size.x.max(0.0),
            height: rect.size.y.max(0.0),
            rotation: None,
            opacity: 1.0,
            fills: Vec::new(),
            strokes: Vec::new(),
            stroke_weight: None,
            stroke_align: None,
            corner_radius: None,
            corner_radii: None,
            effects: Vec::new(),
            clips_content: false,
            layout: LayoutDescriptor::default(),
            margin: Edges::default(),
            semantic: None,
            content,
            content_only: false,
            stack_index: 0,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn frame(name: impl Into<String>, rect: Rect) -> Self {
        Self::new(name, rect, LayerContent::Frame)
    }

    #[inline]
    pub fn text(name: impl Into<String>, rect: Rect, text: TextContent) -> Self {
        Self::new(name, rect, LayerContent::Text(text))
    }

    #[inline]
    pub fn image(name: impl Into<String>, rect: Rect, image: ImageRef, scale_mode: ScaleMode) -> Self {
        Self::new(name, rect, LayerContent::Image { image, scale_mode })
    }

    #[inline]
    pub fn vector(name: impl Into<String>, rect: Rect, markup: impl Into<String>) -> Self {
        Self::new(name, rect, LayerContent::Vector { markup: markup.into() })
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: LayerNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutDescriptor) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_fill(mut self, paint: Paint) -> Self {
        self.fills.push(paint);
        self
    }

    #[inline]
    pub fn kind(&self) -> LayerKind {
        match self.content {
            LayerContent::Frame => LayerKind::Frame,
            LayerContent::Text(_) => LayerKind::Text,
            LayerContent::Image { .. } => LayerKind::Image,
            LayerContent::Vector { .. } => LayerKind::Vector,
        }
    }

    #[inline]
    pub fn text_content(&self) -> Option<&TextContent> {
        match &self.content {
            LayerContent::Text(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.origin.x;
        self.y = rect.origin.y;
        self.width = rect.size.x.max(0.0);
        self.height = rect.size.y.max(0.0);
    }

    /// True when the layer paints anything itself.
    pub fn has_own_paint(&self) -> bool {
        !self.fills.is_empty()
            || (!self.strokes.is_empty() && self.stroke_weight.unwrap_or(0.0) > 0.0)
            || self.effects.iter().any(Effect::is_visible)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order iterator over this subtree.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Visits every node of the subtree mutably, parents before children.
    pub fn visit_mut(&mut self, mut f: impl FnMut(&mut LayerNode)) {
        let mut stack: Vec<&mut LayerNode> = vec![self];
        while let Some(node) = stack.pop() {
            f(&mut *node);
            stack.extend(node.children.iter_mut());
        }
    }
}

/// Pre-order traversal using an explicit stack.
pub struct Iter<'a> {
    stack: Vec<&'a LayerNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a LayerNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_engine::paint::Color;

    fn leaf(name: &str) -> LayerNode {
        LayerNode::frame(name, Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    #[test]
    fn negative_size_clamps_to_zero() {
        let n = LayerNode::frame("n", Rect::new(0.0, 0.0, -5.0, 3.0));
        assert_eq!(n.width, 0.0);
        assert_eq!(n.height, 3.0);
    }

    #[test]
    fn iter_is_preorder() {
        let tree = leaf("a")
            .with_child(leaf("b").with_child(leaf("c")))
            .with_child(leaf("d"));
        let names: Vec<_> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
        assert_eq!(tree.subtree_len(), 4);
    }

    #[test]
    fn visit_mut_reaches_every_node() {
        let mut tree = leaf("a").with_child(leaf("b").with_child(leaf("c")));
        tree.visit_mut(|n| n.x += 1.0);
        assert!(tree.iter().all(|n| n.x == 1.0));
    }

    #[test]
    fn own_paint_detection() {
        let mut n = leaf("n");
        assert!(!n.has_own_paint());
        n.strokes.push(Paint::solid(Color::black()).unwrap());
        assert!(!n.has_own_paint(), "stroke without weight paints nothing");
        n.stroke_weight = Some(1.0);
        assert!(n.has_own_paint());
    }

    #[test]
    fn serializes_camel_case_with_type_tag() {
        let n = LayerNode::text("t", Rect::new(0.0, 0.0, 40.0, 16.0), TextContent::new("Hi", "Inter", 14.0));
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["content"]["type"], "TEXT");
        assert_eq!(json["content"]["fontFamily"], "Inter");
        assert_eq!(json["layout"]["mode"], "NONE");
        assert!(json.get("margin").is_none());
    }

    #[test]
    fn passthrough_layout() {
        let mut l = LayoutDescriptor::default();
        assert!(l.is_passthrough());
        l.padding = Edges::all(4.0);
        assert!(!l.is_passthrough());
    }
}

//! Rendered element tree → layer IR.
//!
//! The walk itself is synchronous and bounded by a [`Governor`]. Assets
//! referenced during the walk are recorded as pending and resolved together
//! afterwards, so one slow fetch never stalls tree construction.

use std::collections::{HashMap, HashSet};
use std::fmt;

use futures::future::join_all;
use serde::Serialize;
use strata_engine::coords::Rect;
use strata_engine::paint::{AssetRef, Color, ImageRef, Paint, ScaleMode};
use strata_engine::raster;
use strata_ir::{LayerContent, LayerNode, Sizing, is_content_only};

use crate::content::{self, ContentKind};
use crate::css::{self, Length};
use crate::error::CaptureError;
use crate::governor::{Budget, Governor, LimitKind};
use crate::layout::{self, ParentFlow};
use crate::normalize::{self, StackEntry, StackSlot};
use crate::paint;
use crate::source::{AssetResolver, ComputedStyle, NodeId, NodeKind, PseudoSlot, SourceTree};

/// Average glyph advance as a fraction of font size, for sizing generated
/// content that declares no width.
const GLYPH_ADVANCE: f32 = 0.55;

const FRAME_PLACEHOLDER_FILL: Color = Color { r: 0.94, g: 0.94, b: 0.94, a: 1.0 };

// ── Results ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// An element could not be captured and was dropped with its subtree.
    StructuralSkip,
    /// An asset resolved to nothing; the layer lost that paint.
    AssetUnavailable,
    BudgetExceeded(LimitKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    fn asset(message: String) -> Self {
        log::debug!("{message}");
        Self::new(WarningKind::AssetUnavailable, message)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureStats {
    pub nodes_visited: usize,
    /// Some budget tripped; the tree is partial.
    pub limit_hit: bool,
}

/// Output of one capture call.
#[derive(Debug, Clone)]
pub struct Capture {
    /// `None` when the root itself was not admitted or not rendered.
    pub root: Option<LayerNode>,
    pub warnings: Vec<Warning>,
    pub stats: CaptureStats,
}

impl Capture {
    /// Roots as a layer list, ready for the interchange encoder.
    pub fn layers(&self) -> &[LayerNode] {
        self.root.as_slice()
    }
}

// ── Entry points ──────────────────────────────────────────────────────────

/// Captures the subtree at `root`: walk, resolve assets, normalize spacing.
pub async fn collect<T, R>(tree: &T, root: NodeId, resolver: &R, budget: Budget) -> Capture
where
    T: SourceTree + ?Sized,
    R: AssetResolver + ?Sized,
{
    let mut capture = collect_structure(tree, root, budget);
    if let Some(node) = capture.root.as_mut() {
        resolve_assets(node, resolver, &mut capture.warnings).await;
        normalize::wrap_outer_spacing(node);
    }
    capture
}

/// The walk alone. Assets stay pending and margins are not yet wrapped.
pub fn collect_structure<T>(tree: &T, root: NodeId, budget: Budget) -> Capture
where
    T: SourceTree + ?Sized,
{
    let mut walker = Walker {
        tree,
        governor: Governor::new(budget),
        warnings: Vec::new(),
    };
    let layer = match tree.kind(root) {
        NodeKind::Element => walker.element(root, None, 0),
        NodeKind::Text => None,
    };
    walker.finish(layer)
}

// ── Walk ──────────────────────────────────────────────────────────────────

struct Walker<'t, T: SourceTree + ?Sized> {
    tree: &'t T,
    governor: Governor,
    warnings: Vec<Warning>,
}

impl<'t, T: SourceTree + ?Sized> Walker<'t, T> {
    fn finish(self, root: Option<LayerNode>) -> Capture {
        let mut warnings = self.warnings;
        for kind in self.governor.tripped() {
            let budget = self.governor.budget();
            let message = match kind {
                LimitKind::Nodes => format!("node budget of {} exhausted", budget.max_nodes),
                LimitKind::Depth => format!("depth budget of {} exceeded", budget.effective_max_depth()),
                LimitKind::Duration => format!("time budget of {:?} exceeded", budget.max_duration),
            };
            warnings.push(Warning::new(WarningKind::BudgetExceeded(*kind), message));
        }
        log::debug!(
            "capture walk: {} nodes, {} warnings",
            self.governor.visited(),
            warnings.len()
        );
        Capture {
            root,
            warnings,
            stats: CaptureStats {
                nodes_visited: self.governor.visited(),
                limit_hit: self.governor.is_halted(),
            },
        }
    }

    fn skip(&mut self, message: String) {
        log::warn!("{message}");
        self.warnings.push(Warning::new(WarningKind::StructuralSkip, message));
    }

    fn element(&mut self, id: NodeId, parent: Option<&ParentFlow>, depth: usize) -> Option<LayerNode> {
        let tree = self.tree;
        let tag = tree.tag(id);
        if !is_rendered(tag, tree.style(id), tree.rect(id)) {
            return None;
        }
        if !self.governor.admit(depth) {
            return None;
        }
        match self.build_element(id, parent, depth) {
            Ok(node) => Some(node),
            Err(err) => {
                self.skip(format!("dropped <{tag}>: {err}"));
                None
            }
        }
    }

    fn build_element(&mut self, id: NodeId, parent: Option<&ParentFlow>, depth: usize) -> Result<LayerNode, CaptureError> {
        let tree = self.tree;
        let tag = tree.tag(id);
        let style = tree.style(id);
        let rect = tree.rect(id).translate(tree.scroll_offset());
        if !rect.is_finite() {
            return Err(CaptureError::Geometry { tag: tag.to_owned() });
        }

        let kind = ContentKind::classify(tag);
        let walks = kind.walks_children() && (kind != ContentKind::EmbeddedFrame || tree.frame_accessible(id));
        let (mut layout, flow) = layout::classify_container(style, walks && !tree.children(id).is_empty());
        layout::apply_child_layout(&mut layout, style, parent);

        let mut node = LayerNode::frame(element_name(tree, id), rect);
        node.layout = layout;
        if parent.is_some() {
            node.margin = layout::margin(style);
        }
        node.semantic = content::semantic_tag(tag, tree.attribute(id, "type"), tree.attribute(id, "role"));
        node.rotation = css::parse_transform_rotation(style.get("transform"));
        node.clips_content = clips_overflow(style);
        node.stack_index = z_index(style, parent);

        if is_painted(style) {
            node.opacity = opacity(style);
            paint::apply_box_paint(&mut node, style);
        }

        match kind {
            ContentKind::Image => {
                if let Some(src) = image_source(tree, id) {
                    node.content = pending_image(AssetRef::url(src), style);
                }
            }
            ContentKind::Picture => {
                let img = tree.children(id).iter().copied().find(|&c| tree.tag(c) == "img");
                if let Some(src) = img.and_then(|c| image_source(tree, c)) {
                    node.content = pending_image(AssetRef::url(src), style);
                }
            }
            ContentKind::Video => {
                let poster = tree.attribute(id, "poster").filter(|p| !p.trim().is_empty());
                let asset = poster.map(AssetRef::url).or_else(|| tree.raster_snapshot(id));
                if let Some(asset) = asset {
                    node.content = pending_image(asset, style);
                }
            }
            ContentKind::Canvas => {
                if let Some(asset) = tree.raster_snapshot(id) {
                    node.content = pending_image(asset, style);
                }
            }
            ContentKind::Vector => {
                if let Some(markup) = tree.inline_svg(id) {
                    node.content = LayerContent::Vector { markup: content::sanitize_svg(markup)? };
                }
            }
            ContentKind::FormControl => self.form_text(id, &mut node, depth),
            ContentKind::EmbeddedFrame if !walks => self.frame_placeholder(id, &mut node, depth),
            ContentKind::EmbeddedFrame | ContentKind::Plain => {}
        }

        if walks {
            self.walk_children(id, &mut node, &flow, depth);
            if kind == ContentKind::Plain && parent.is_some() && !node.children.is_empty() {
                node.content_only = true;
                node.content_only = is_content_only(&node);
            }
        }
        Ok(node)
    }

    fn walk_children(&mut self, id: NodeId, node: &mut LayerNode, flow: &ParentFlow, depth: usize) {
        let tree = self.tree;
        let parent_rect = node.rect();
        let mut entries: Vec<StackEntry> = Vec::new();

        if let Some(before) = self.pseudo(id, PseudoSlot::Before, parent_rect, flow, depth + 1) {
            entries.push(StackEntry::new(StackSlot::Before, before));
        }
        for &child in tree.children(id) {
            if self.governor.is_halted() {
                break;
            }
            let built = match tree.kind(child) {
                NodeKind::Element => self.element(child, Some(flow), depth + 1),
                NodeKind::Text => self.text_leaf(child, flow, depth + 1),
            };
            if let Some(layer) = built {
                entries.push(StackEntry::new(StackSlot::Content, layer));
            }
        }
        if let Some(after) = self.pseudo(id, PseudoSlot::After, parent_rect, flow, depth + 1) {
            entries.push(StackEntry::new(StackSlot::After, after));
        }

        node.children = normalize::sort_stacking(entries, flow.reverse);
    }

    fn text_leaf(&mut self, id: NodeId, flow: &ParentFlow, depth: usize) -> Option<LayerNode> {
        let tree = self.tree;
        let style = tree.style(id);
        let characters = css::collapse_whitespace(tree.text(id)?, style.get("white-space"));
        if characters.trim().is_empty() {
            return None;
        }
        let rect = tree.rect(id).translate(tree.scroll_offset());
        if !rect.is_finite() {
            return None;
        }
        if !self.governor.admit(depth) {
            return None;
        }
        Some(text_layer("text", rect, characters, style, Some(flow)))
    }

    fn form_text(&mut self, id: NodeId, node: &mut LayerNode, depth: usize) {
        let tree = self.tree;
        let style = tree.style(id);
        let input_type = tree.attribute(id, "type").unwrap_or("text");
        if matches!(input_type, "checkbox" | "radio" | "range" | "color" | "file" | "hidden" | "image") {
            return;
        }

        let value = tree.form_value(id).filter(|v| !v.is_empty());
        let (text, placeholder) = match value {
            Some(v) => (v.to_owned(), false),
            None => match tree.attribute(id, "placeholder").filter(|p| !p.is_empty()) {
                Some(p) => (p.to_owned(), true),
                None => return,
            },
        };
        let text = if input_type == "password" && !placeholder {
            "•".repeat(text.chars().count())
        } else {
            text
        };

        if !self.governor.admit(depth + 1) {
            return;
        }
        let mut layer = text_layer("value", paint::content_box(node.rect(), style), text, style, None);
        if placeholder && let Some(Paint::Solid { opacity, .. }) = layer.fills.first_mut() {
            *opacity *= 0.5;
        }
        node.children.push(layer);
    }

    fn frame_placeholder(&mut self, id: NodeId, node: &mut LayerNode, depth: usize) {
        let tree = self.tree;
        node.name = format!("{} (unreadable)", node.name);
        if node.fills.is_empty() {
            node.fills.extend(Paint::solid(FRAME_PLACEHOLDER_FILL));
        }
        if !self.governor.admit(depth + 1) {
            return;
        }
        let label = match tree.attribute(id, "src").and_then(source_host) {
            Some(host) => format!("Embedded content ({host})"),
            None => "Embedded content".to_owned(),
        };
        let style = ComputedStyle::default().with("color", "#666666").with("font-size", "12px");
        let rect = node.rect().inset(strata_engine::coords::Edges::all(8.0));
        node.children.push(text_layer("label", rect, label, &style, None));
    }

    /// Generated content, placed against the parent's absolute box.
    fn pseudo(
        &mut self,
        id: NodeId,
        slot: PseudoSlot,
        parent_rect: Rect,
        flow: &ParentFlow,
        depth: usize,
    ) -> Option<LayerNode> {
        let tree = self.tree;
        let pseudo = tree.pseudo(id, slot)?;
        let style = &pseudo.style;
        let text = pseudo.text()?;
        if !is_rendered("", style, Rect::new(0.0, 0.0, 1.0, 1.0)) {
            return None;
        }

        let rect = pseudo_rect(&text, style, slot, parent_rect, paint::content_box(parent_rect, tree.style(id)));
        let mut layer = LayerNode::frame(slot.label(), rect);
        if is_painted(style) {
            layer.opacity = opacity(style);
            paint::apply_box_paint(&mut layer, style);
        }
        let has_text = !text.trim().is_empty();
        if !has_text && !layer.has_own_paint() {
            return None;
        }
        if !self.governor.admit(depth) {
            return None;
        }

        layout::apply_child_layout(&mut layer.layout, style, Some(flow));
        layer.margin = layout::margin(style);
        layer.stack_index = z_index(style, Some(flow));

        if !layer.has_own_paint() {
            let mut text_node = text_layer(slot.label(), rect, text, style, Some(flow));
            text_node.layout = layer.layout;
            text_node.margin = layer.margin;
            text_node.stack_index = layer.stack_index;
            return Some(text_node);
        }
        if has_text {
            layer.children.push(text_layer("text", rect, text, style, None));
        }
        Some(layer)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────

fn is_rendered(tag: &str, style: &ComputedStyle, rect: Rect) -> bool {
    if content::is_metadata_tag(tag) || layout::DisplayKind::of(style) == layout::DisplayKind::None {
        return false;
    }
    !(rect.is_empty() && clips_overflow(style))
}

/// Hidden and fully transparent boxes keep their subtree but paint nothing.
fn is_painted(style: &ComputedStyle) -> bool {
    opacity(style) > 0.0 && !matches!(style.get("visibility"), "hidden" | "collapse")
}

fn opacity(style: &ComputedStyle) -> f32 {
    style.get("opacity").parse::<f32>().map_or(1.0, |o| o.clamp(0.0, 1.0))
}

fn clips_overflow(style: &ComputedStyle) -> bool {
    ["overflow", "overflow-x", "overflow-y"]
        .iter()
        .any(|p| matches!(style.get(p), "hidden" | "clip" | "scroll" | "auto"))
}

/// Explicit `z-index` of positioned boxes and flex/grid items.
fn z_index(style: &ComputedStyle, parent: Option<&ParentFlow>) -> i32 {
    let positioned = !matches!(style.get("position"), "" | "static");
    let flex_item = parent.is_some_and(|p| {
        matches!(p.display, layout::DisplayKind::Flex | layout::DisplayKind::Grid)
    });
    if !positioned && !flex_item {
        return 0;
    }
    style.get("z-index").parse().unwrap_or(0)
}

fn element_name<T: SourceTree + ?Sized>(tree: &T, id: NodeId) -> String {
    let tag = tree.tag(id);
    match tree.attribute(id, "id").map(str::trim).filter(|s| !s.is_empty()) {
        Some(dom_id) => format!("{tag}#{dom_id}"),
        None => tag.to_owned(),
    }
}

fn image_source<T: SourceTree + ?Sized>(tree: &T, id: NodeId) -> Option<&str> {
    tree.attribute(id, "currentSrc")
        .or_else(|| tree.attribute(id, "src"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn pending_image(asset: AssetRef, style: &ComputedStyle) -> LayerContent {
    LayerContent::Image {
        image: ImageRef::Pending { asset },
        scale_mode: ScaleMode::from_css(style.get("object-fit")),
    }
}

fn source_host(src: &str) -> Option<&str> {
    let rest = src.split_once("://")?.1;
    let host = rest.split(['/', '?', '#']).next()?;
    (!host.is_empty()).then_some(host)
}

fn text_layer(
    name: &str,
    rect: Rect,
    characters: String,
    style: &ComputedStyle,
    flow: Option<&ParentFlow>,
) -> LayerNode {
    let mut node = LayerNode::text(name, rect, paint::text_content(characters, style));
    if is_painted(style) {
        node.fills.extend(paint::text_fill(style));
    }
    layout::apply_child_layout(&mut node.layout, &ComputedStyle::default(), flow);
    let single_line = node.text_content().is_some_and(|text| !text.is_multiline_at(rect.size.y));
    if single_line && node.layout.sizing.horizontal == Sizing::Fill {
        node.layout.sizing.horizontal = Sizing::Hug;
    }
    node
}

fn pseudo_rect(text: &str, style: &ComputedStyle, slot: PseudoSlot, parent: Rect, content: Rect) -> Rect {
    let font_size = style.font_size();
    let line = css::parse_line_height(style.get("line-height"), font_size).unwrap_or(font_size * 1.2);
    let measure = |value: &str, basis: f32, estimate: f32| match css::parse_length(value) {
        Length::Px(v) => v.max(0.0),
        Length::Percent(p) => basis * p / 100.0,
        Length::Auto => estimate,
    };
    let estimated_width = if text.trim().is_empty() {
        0.0
    } else {
        text.chars().count() as f32 * font_size * GLYPH_ADVANCE
    };
    let estimated_height = if text.trim().is_empty() { 0.0 } else { line };
    let w = measure(style.get("width"), parent.size.x, estimated_width);
    let h = measure(style.get("height"), parent.size.y, estimated_height);

    if matches!(style.get("position"), "absolute" | "fixed") {
        let x = match (css::parse_px(style.get("left")), css::parse_px(style.get("right"))) {
            (Some(left), _) => parent.origin.x + left,
            (None, Some(right)) => parent.max().x - right - w,
            (None, None) => content.origin.x,
        };
        let y = match (css::parse_px(style.get("top")), css::parse_px(style.get("bottom"))) {
            (Some(top), _) => parent.origin.y + top,
            (None, Some(bottom)) => parent.max().y - bottom - h,
            (None, None) => content.origin.y,
        };
        return Rect::new(x, y, w, h);
    }

    match slot {
        PseudoSlot::Before => Rect::new(content.origin.x, content.origin.y, w, h),
        PseudoSlot::After => {
            let end = content.max();
            Rect::new((end.x - w).max(content.origin.x), (end.y - h).max(content.origin.y), w, h)
        }
    }
}

// ── Asset resolution ──────────────────────────────────────────────────────

async fn resolve_assets<R>(root: &mut LayerNode, resolver: &R, warnings: &mut Vec<Warning>)
where
    R: AssetResolver + ?Sized,
{
    let pending = pending_assets(root);
    if pending.is_empty() {
        return;
    }

    log::debug!("resolving {} assets", pending.len());
    let fetched = join_all(pending.iter().map(|asset| resolver.resolve(asset))).await;
    let resolved: HashMap<AssetRef, Vec<u8>> = pending
        .into_iter()
        .zip(fetched)
        .filter_map(|(asset, bytes)| Some((asset, bytes?)))
        .collect();

    root.visit_mut(|node| patch_assets(node, &resolved, warnings));
}

/// Distinct pending assets in pre-order.
fn pending_assets(root: &LayerNode) -> Vec<AssetRef> {
    let mut seen: HashSet<&AssetRef> = HashSet::new();
    let mut pending = Vec::new();
    for node in root.iter() {
        let content_asset = match &node.content {
            LayerContent::Image { image: ImageRef::Pending { asset }, .. } => Some(asset),
            _ => None,
        };
        let fill_assets = node.fills.iter().filter_map(|p| match p.image_ref() {
            Some(ImageRef::Pending { asset }) => Some(asset),
            _ => None,
        });
        for asset in content_asset.into_iter().chain(fill_assets) {
            if seen.insert(asset) {
                pending.push(asset.clone());
            }
        }
    }
    pending
}

fn patch_assets(node: &mut LayerNode, resolved: &HashMap<AssetRef, Vec<u8>>, warnings: &mut Vec<Warning>) {
    if let LayerContent::Image { image: ImageRef::Pending { asset }, scale_mode } = &node.content {
        let scale_mode = *scale_mode;
        node.content = match resolved.get(asset) {
            Some(bytes) if raster::looks_like_svg(bytes) => match vector_markup(bytes) {
                Ok(markup) => LayerContent::Vector { markup },
                Err(err) => {
                    warnings.push(Warning::asset(format!("{} unusable: {err}", describe(asset))));
                    LayerContent::Frame
                }
            },
            Some(bytes) => LayerContent::Image { image: ImageRef::Inline { bytes: bytes.clone() }, scale_mode },
            None => {
                warnings.push(Warning::asset(format!("{} unavailable", describe(asset))));
                LayerContent::Frame
            }
        };
    }

    node.fills.retain_mut(|paint| {
        let Some(image) = paint.image_ref_mut() else {
            return true;
        };
        let ImageRef::Pending { asset } = &*image else {
            return true;
        };
        match resolved.get(asset) {
            Some(bytes) => {
                *image = ImageRef::Inline { bytes: bytes.clone() };
                true
            }
            None => {
                warnings.push(Warning::asset(format!("background {} unavailable", describe(asset))));
                false
            }
        }
    });
}

fn vector_markup(bytes: &[u8]) -> Result<String, CaptureError> {
    let text = std::str::from_utf8(bytes).map_err(|e| CaptureError::Svg(e.to_string()))?;
    content::sanitize_svg(text)
}

fn describe(asset: &AssetRef) -> String {
    const MAX: usize = 64;
    match asset {
        AssetRef::Url { url } if url.len() > MAX => {
            let cut = (0..=MAX).rev().find(|&i| url.is_char_boundary(i)).unwrap_or(0);
            format!("asset {}…", &url[..cut])
        }
        AssetRef::Url { url } => format!("asset {url}"),
        AssetRef::Snapshot { key } => format!("snapshot #{key}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Snapshot, SnapshotAssets, SnapshotTree};
    use crate::source::NoAssets;
    use strata_ir::{LayoutMode, SemanticTag, Sizing};

    fn tree(json: &str) -> (SnapshotTree, SnapshotAssets) {
        let (tree, assets, _) = Snapshot::from_json(json).unwrap().into_parts();
        (tree, assets)
    }

    fn structure(json: &str) -> Capture {
        let (tree, _) = tree(json);
        collect_structure(&tree, SnapshotTree::ROOT, Budget::default())
    }

    // ── visibility ────────────────────────────────────────────────────────

    #[test]
    fn metadata_and_display_none_are_skipped() {
        let c = structure(
            r#"{"viewport":{"width":100,"height":100},"root":{"tag":"body","rect":[0,0,100,100],"children":[
                {"tag":"script","rect":[0,0,0,0]},
                {"tag":"div","rect":[0,0,10,10],"style":{"display":"none"}},
                {"tag":"div","rect":[0,0,0,0],"style":{"overflow":"hidden"}},
                {"tag":"div","rect":[0,0,0,0]}
            ]}}"#,
        );
        let root = c.root.unwrap();
        assert_eq!(root.children.len(), 1, "only the unclipped empty div stays");
        assert_eq!(c.stats.nodes_visited, 2);
    }

    #[test]
    fn hidden_elements_keep_children_but_lose_paint() {
        let c = structure(
            r#"{"viewport":{"width":100,"height":100},"root":{"tag":"body","rect":[0,0,100,100],"children":[
                {"tag":"div","rect":[0,0,50,50],"style":{"visibility":"hidden","background-color":"red"},"children":[
                    {"tag":"p","rect":[0,0,10,10],"style":{"visibility":"visible","background-color":"blue"}}
                ]},
                {"tag":"div","rect":[0,0,50,50],"style":{"opacity":"0","background-color":"red"}}
            ]}}"#,
        );
        let root = c.root.unwrap();
        let hidden = &root.children[0];
        assert!(hidden.fills.is_empty());
        assert_eq!(hidden.children.len(), 1);
        assert_eq!(hidden.children[0].fills.len(), 1);
        assert!(root.children[1].fills.is_empty());
        assert_eq!(root.children[1].opacity, 1.0);
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[test]
    fn whitespace_text_is_not_admitted() {
        let c = structure(
            r#"{"viewport":{"width":100,"height":100},"root":{"tag":"p","rect":[0,0,100,20],"style":{"color":"rgb(10, 20, 30)"},"children":[
                {"text":"  \n  ","rect":[0,0,0,0]},
                {"text":"  Hello \n world ","rect":[0,0,80,20]}
            ]}}"#,
        );
        let root = c.root.unwrap();
        assert_eq!(c.stats.nodes_visited, 2);
        let text = root.children[0].text_content().unwrap();
        assert_eq!(text.characters, "Hello world");
        assert_eq!(root.children[0].fills[0].solid_color().unwrap().to_hex(), "#0a141e");
    }

    #[test]
    fn single_line_text_hugs_in_block_flow() {
        let c = structure(
            r#"{"viewport":{"width":200,"height":100},"root":{"tag":"div","rect":[0,0,200,100],"children":[
                {"text":"Title","rect":[0,0,40,19]},
                {"text":"A paragraph long enough to wrap onto a few lines","rect":[0,20,200,60]}
            ]}}"#,
        );
        let root = c.root.unwrap();
        assert_eq!(root.layout.mode, LayoutMode::Vertical);
        let title = &root.children[0];
        assert!(!title.text_content().unwrap().is_multiline_at(title.height));
        assert_eq!(title.layout.sizing.horizontal, Sizing::Hug);
        let body = &root.children[1];
        assert!(body.text_content().unwrap().is_multiline_at(body.height));
        assert_eq!(body.layout.sizing.horizontal, Sizing::Fill);
    }

    // ── content ───────────────────────────────────────────────────────────

    #[test]
    fn element_names_use_ids() {
        let c = structure(
            r#"{"viewport":{"width":10,"height":10},"root":{"tag":"main","attrs":{"id":"app"},"rect":[0,0,10,10]}}"#,
        );
        assert_eq!(c.root.unwrap().name, "main#app");
    }

    #[test]
    fn broken_svg_is_skipped_with_warning() {
        let c = structure(
            r#"{"viewport":{"width":10,"height":10},"root":{"tag":"div","rect":[0,0,10,10],"children":[
                {"tag":"svg","rect":[0,0,5,5],"svg":"<svg><g></svg>"},
                {"tag":"svg","rect":[0,0,5,5],"svg":"<svg><rect width=\"5\" height=\"5\"/></svg>"}
            ]}}"#,
        );
        let root = c.root.unwrap();
        assert_eq!(root.children.len(), 1);
        assert!(matches!(root.children[0].content, LayerContent::Vector { .. }));
        assert_eq!(c.warnings.len(), 1);
        assert_eq!(c.warnings[0].kind, WarningKind::StructuralSkip);
    }

    #[test]
    fn form_control_shows_value_or_placeholder() {
        let c = structure(
            r#"{"viewport":{"width":200,"height":100},"root":{"tag":"form","rect":[0,0,200,100],"children":[
                {"tag":"input","attrs":{"value":"hello"},"rect":[0,0,100,30],"style":{"padding-left":"8px"}},
                {"tag":"input","attrs":{"placeholder":"Search"},"rect":[0,40,100,30]},
                {"tag":"input","attrs":{"type":"password","value":"abc"},"rect":[0,80,100,20]}
            ]}}"#,
        );
        let root = c.root.unwrap();
        let value = &root.children[0].children[0];
        assert_eq!(value.text_content().unwrap().characters, "hello");
        assert_eq!(value.x, 8.0);
        assert_eq!(root.children[1].children[0].text_content().unwrap().characters, "Search");
        assert_eq!(root.children[2].children[0].text_content().unwrap().characters, "•••");
        assert_eq!(root.children[0].semantic, Some(SemanticTag::Input));
    }

    #[test]
    fn unreadable_frame_becomes_placeholder() {
        let c = structure(
            r#"{"viewport":{"width":200,"height":100},"root":{"tag":"div","rect":[0,0,200,100],"children":[
                {"tag":"iframe","attrs":{"src":"https://ads.example.net/slot"},"frameAccessible":false,"rect":[0,0,200,100],
                 "children":[{"tag":"div","rect":[0,0,1,1]}]}
            ]}}"#,
        );
        let frame = &c.root.unwrap().children[0];
        assert!(frame.has_own_paint());
        assert_eq!(frame.children.len(), 1);
        assert_eq!(
            frame.children[0].text_content().unwrap().characters,
            "Embedded content (ads.example.net)"
        );
    }

    // ── pseudo content ────────────────────────────────────────────────────

    #[test]
    fn pseudo_content_is_placed_against_parent_box() {
        let c = structure(
            r#"{"viewport":{"width":200,"height":100},"root":{"tag":"div","rect":[10,10,200,40],
                "style":{"display":"flex","padding-left":"4px","padding-top":"2px"},
                "before":{"style":{"content":"\"★\"","font-size":"10px"}},
                "after":{"style":{"content":"\"\"","width":"8px","height":"8px","background-color":"red"}},
                "children":[{"text":"Label","rect":[20,12,40,16]}]
            }}"#,
        );
        let root = c.root.unwrap();
        let names: Vec<&str> = root.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["::before", "text", "::after"]);

        let before = &root.children[0];
        assert_eq!((before.x, before.y), (14.0, 12.0));
        assert_eq!(before.width, 5.5);
        let after = &root.children[2];
        assert_eq!((after.x, after.y, after.width, after.height), (202.0, 42.0, 8.0, 8.0));
        assert_eq!(after.fills.len(), 1);
    }

    #[test]
    fn empty_pseudo_without_paint_is_dropped() {
        let c = structure(
            r#"{"viewport":{"width":10,"height":10},"root":{"tag":"div","rect":[0,0,10,10],
                "before":{"style":{"content":"\"\""}},
                "after":{"style":{"content":"none","background-color":"red"}}
            }}"#,
        );
        assert!(c.root.unwrap().children.is_empty());
        assert_eq!(c.stats.nodes_visited, 1);
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn stacking_respects_z_index_in_flex() {
        let c = structure(
            r#"{"viewport":{"width":10,"height":10},"root":{"tag":"div","rect":[0,0,10,10],"style":{"display":"flex"},"children":[
                {"tag":"a","rect":[0,0,1,1],"style":{"z-index":"2"}},
                {"tag":"b","rect":[0,0,1,1]},
                {"tag":"i","rect":[0,0,1,1],"style":{"z-index":"-1"}}
            ]}}"#,
        );
        let names: Vec<String> = c.root.unwrap().children.into_iter().map(|n| n.name).collect();
        assert_eq!(names, ["i", "b", "a"]);
    }

    #[test]
    fn inline_wrappers_are_marked_content_only() {
        let c = structure(
            r#"{"viewport":{"width":100,"height":20},"root":{"tag":"p","rect":[0,0,100,20],"children":[
                {"tag":"span","rect":[0,0,40,20],"style":{"display":"inline"},"children":[{"text":"hi","rect":[0,0,20,20]}]},
                {"tag":"span","rect":[40,0,40,20],"style":{"display":"inline","background-color":"red"},"children":[{"text":"there","rect":[40,0,40,20]}]}
            ]}}"#,
        );
        let root = c.root.unwrap();
        assert_eq!(root.layout.mode, LayoutMode::Vertical);
        assert!(root.children[0].content_only);
        assert!(!root.children[1].content_only);
        assert!(!root.content_only);
    }

    #[test]
    fn scroll_offset_moves_into_document_space() {
        let c = structure(
            r#"{"viewport":{"width":10,"height":10},"scroll":{"x":0,"y":300},"root":{"tag":"div","rect":[5,-100,10,10]}}"#,
        );
        let root = c.root.unwrap();
        assert_eq!((root.x, root.y), (5.0, 200.0));
        assert_eq!(root.layout.sizing.horizontal, Sizing::Fixed);
    }

    // ── assets ────────────────────────────────────────────────────────────

    fn run<F: std::future::Future>(f: F) -> F::Output {
        futures::executor::block_on(f)
    }

    #[test]
    fn missing_assets_degrade_to_frames() {
        let (tree, _) = tree(
            r#"{"viewport":{"width":10,"height":10},"root":{"tag":"div","rect":[0,0,10,10],
                "style":{"background-image":"url(\"bg.png\")","background-color":"white"},"children":[
                {"tag":"img","attrs":{"src":"missing.png"},"rect":[0,0,5,5]}
            ]}}"#,
        );
        let c = run(collect(&tree, SnapshotTree::ROOT, &NoAssets, Budget::default()));
        let root = c.root.unwrap();
        assert_eq!(root.fills.len(), 1, "only the background color survives");
        assert_eq!(root.children[0].content, LayerContent::Frame);
        assert_eq!(root.children[0].semantic, Some(SemanticTag::Image));
        let unavailable = c.warnings.iter().filter(|w| w.kind == WarningKind::AssetUnavailable).count();
        assert_eq!(unavailable, 2);
    }

    #[test]
    fn svg_assets_become_vectors() {
        let (tree, mut assets) = tree(
            r#"{"viewport":{"width":10,"height":10},"root":{"tag":"div","rect":[0,0,10,10],"children":[
                {"tag":"img","attrs":{"src":"icon.svg"},"rect":[0,0,5,5]},
                {"tag":"img","attrs":{"src":"photo.png"},"rect":[0,0,5,5]}
            ]}}"#,
        );
        assets.insert("icon.svg", br#"<svg xmlns="http://www.w3.org/2000/svg" onload="x()"><circle r="2"/></svg>"#.to_vec());
        assets.insert("photo.png", vec![0x89, b'P', b'N', b'G']);
        let c = run(collect(&tree, SnapshotTree::ROOT, &assets, Budget::default()));
        let root = c.root.unwrap();
        let LayerContent::Vector { markup } = &root.children[0].content else {
            panic!("expected vector content");
        };
        assert!(!markup.contains("onload"));
        assert!(matches!(
            root.children[1].content,
            LayerContent::Image { image: ImageRef::Inline { .. }, .. }
        ));
        assert!(c.warnings.is_empty());
    }

    #[test]
    fn describe_truncates_long_data_uris() {
        let long = format!("data:image/png;base64,{}", "A".repeat(500));
        let text = describe(&AssetRef::url(long));
        assert!(text.ends_with('…'));
        assert!(text.len() < 80);
    }

    // ── depth ceiling ─────────────────────────────────────────────────────

    #[test]
    fn walk_stops_at_the_hard_depth_ceiling() {
        use crate::governor::HARD_DEPTH_CEILING;
        use crate::snapshot::SnapshotNode;

        let mut node = SnapshotNode { tag: Some("span".into()), rect: [0.0, 0.0, 1.0, 1.0], ..SnapshotNode::default() };
        for _ in 0..HARD_DEPTH_CEILING + 40 {
            node = SnapshotNode {
                tag: Some("div".into()),
                rect: [0.0, 0.0, 1.0, 1.0],
                children: vec![node],
                ..SnapshotNode::default()
            };
        }
        let tree = SnapshotTree::new(node, strata_engine::coords::Vec2::zero());
        let c = collect_structure(&tree, SnapshotTree::ROOT, Budget::default().with_max_depth(usize::MAX));

        assert_eq!(c.stats.nodes_visited, HARD_DEPTH_CEILING);
        assert!(c.stats.limit_hit);
        assert_eq!(c.root.unwrap().subtree_len(), HARD_DEPTH_CEILING);
    }
}

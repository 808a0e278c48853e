//! Layer IR → target scene.
//!
//! Layers carry absolute document coordinates; the builder threads each
//! parent's absolute origin down the recursion and hands the host the
//! difference. Content-only wrappers are skipped through
//! [`flattened_children`], so their children attach to the nearest kept
//! ancestor.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use strata_engine::coords::{CornerRadii, Vec2};
use strata_engine::paint::{Color, ImageRef, Paint, ScaleMode, StrokeAlign};
use strata_engine::raster;
use strata_engine::text::FontName;
use strata_ir::{
    AxisSizing, CounterAxisAlign, LayerContent, LayerNode, LayoutDescriptor, LayoutMode, Positioning, Sizing,
    TextContent, flattened_children,
};

use crate::error::HostError;
use crate::host::{AutoLayout, AxisDirection, ChildLayout, ImageHandle, SceneNodeId, TargetHost, TextResize};

/// Vector fallbacks are rasterized at this multiple of their layer size.
const RASTER_SCALE: f32 = 2.0;

/// Build configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// Siblings constructed between two [`TargetHost::yield_now`] calls.
    pub batch_size: usize,
    /// Family tried when a requested font is unavailable.
    pub fallback_family: String,
    /// Family every host is expected to provide.
    pub default_family: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            batch_size: 50,
            fallback_family: "Inter".to_owned(),
            default_family: "Roboto".to_owned(),
        }
    }
}

impl BuildOptions {
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Outcome of one build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    /// One entry per input layer that produced a node.
    pub roots: Vec<SceneNodeId>,
    pub nodes_built: usize,
    /// Layers replaced by an error placeholder.
    pub placeholders: usize,
    pub images_registered: usize,
    pub warnings: Vec<String>,
}

/// A node shell plus paints its content contributes on top of the layer fills.
struct Shell {
    id: SceneNodeId,
    content_fills: Vec<Paint>,
}

pub struct SceneBuilder<'h, H: TargetHost + ?Sized> {
    host: &'h mut H,
    options: BuildOptions,
    images: HashMap<String, ImageHandle>,
    fonts: HashMap<FontName, FontName>,
    report: BuildReport,
    since_yield: usize,
}

impl<'h, H: TargetHost + ?Sized> SceneBuilder<'h, H> {
    pub fn new(host: &'h mut H, options: BuildOptions) -> Self {
        Self {
            host,
            options,
            images: HashMap::new(),
            fonts: HashMap::new(),
            report: BuildReport::default(),
            since_yield: 0,
        }
    }

    /// Builds every layer as a root node. Never fails as a whole: layers
    /// that cannot be built become placeholders and are listed in the report.
    pub fn build(mut self, layers: &[LayerNode]) -> BuildReport {
        for layer in layers {
            if let Some(id) = self.node(layer, Vec2::zero()) {
                if let Err(err) = self.apply_child_layout(id, layer, None) {
                    self.warn(format!("{}: child layout skipped: {err}", layer.name));
                }
                self.report.roots.push(id);
            }
            self.sibling_built();
        }
        log::debug!(
            "scene built: {} nodes, {} placeholders, {} images",
            self.report.nodes_built,
            self.report.placeholders,
            self.report.images_registered
        );
        self.report
    }

    fn warn(&mut self, message: String) {
        log::warn!("{message}");
        self.report.warnings.push(message);
    }

    fn sibling_built(&mut self) {
        self.since_yield += 1;
        if self.since_yield >= self.options.batch_size.max(1) {
            self.since_yield = 0;
            self.host.yield_now();
        }
    }

    /// Builds `layer` or, failing that, a placeholder in its place.
    fn node(&mut self, layer: &LayerNode, parent_origin: Vec2) -> Option<SceneNodeId> {
        match self.try_node(layer, parent_origin) {
            Ok(id) => Some(id),
            Err(err) => {
                self.warn(format!("{}: {err}", layer.name));
                match self.placeholder(layer, parent_origin) {
                    Ok(id) => {
                        self.report.placeholders += 1;
                        Some(id)
                    }
                    Err(err) => {
                        self.warn(format!("{}: placeholder failed: {err}", layer.name));
                        None
                    }
                }
            }
        }
    }

    fn try_node(&mut self, layer: &LayerNode, parent_origin: Vec2) -> Result<SceneNodeId, HostError> {
        let shell = self.shell(layer)?;
        match self.decorate(shell, layer, parent_origin) {
            Ok(id) => {
                self.report.nodes_built += 1;
                Ok(id)
            }
            Err((id, err)) => {
                self.host.remove(id);
                Err(err)
            }
        }
    }

    fn decorate(&mut self, shell: Shell, layer: &LayerNode, parent_origin: Vec2) -> Result<SceneNodeId, (SceneNodeId, HostError)> {
        let id = shell.id;
        self.properties(shell, layer, parent_origin).map_err(|e| (id, e))?;

        let origin = layer.position();
        let parent_auto = layer.layout.is_auto_layout() && layer.kind().is_container();
        for child in flattened_children(layer) {
            if let Some(child_id) = self.node(child, origin) {
                let attached = match self.host.append_child(id, child_id) {
                    Ok(()) => self.apply_child_layout(child_id, child, Some(parent_auto)),
                    Err(err) => Err(err),
                };
                if let Err(err) = attached {
                    self.warn(format!("{}: not attached: {err}", child.name));
                    self.host.remove(child_id);
                }
            }
            self.sibling_built();
        }
        Ok(id)
    }

    // ── shells ────────────────────────────────────────────────────────────

    fn shell(&mut self, layer: &LayerNode) -> Result<Shell, HostError> {
        match &layer.content {
            LayerContent::Frame => Ok(Shell { id: self.host.create_frame(&layer.name)?, content_fills: Vec::new() }),
            LayerContent::Text(text) => self.text_shell(layer, text),
            LayerContent::Image { image, scale_mode } => {
                let paint = self.image_paint(image, *scale_mode, &layer.name)?;
                let id = self.host.create_frame(&layer.name)?;
                Ok(Shell { id, content_fills: paint.into_iter().collect() })
            }
            LayerContent::Vector { markup } => self.vector_shell(layer, markup),
        }
    }

    fn text_shell(&mut self, layer: &LayerNode, text: &TextContent) -> Result<Shell, HostError> {
        let font = self.resolve_font(text)?;
        let id = self.host.create_text(&layer.name)?;
        let resize = if text.is_multiline_at(layer.height) {
            TextResize::AutoHeight
        } else {
            TextResize::AutoWidth
        };
        let fitted = self
            .host
            .resize(id, layer.rect().size)
            .and_then(|()| self.host.set_text(id, text, &font, resize));
        if let Err(err) = fitted {
            self.host.remove(id);
            return Err(err);
        }
        Ok(Shell { id, content_fills: Vec::new() })
    }

    fn vector_shell(&mut self, layer: &LayerNode, markup: &str) -> Result<Shell, HostError> {
        let size = layer.rect().size;
        match self.host.create_vector(&layer.name, markup) {
            Ok(id) => {
                let fitted = self.host.intrinsic_size(id).and_then(|intrinsic| {
                    if (intrinsic.x - size.x).abs() > 0.5 || (intrinsic.y - size.y).abs() > 0.5 {
                        self.host.rescale(id, size)
                    } else {
                        Ok(())
                    }
                });
                if let Err(err) = fitted {
                    self.host.remove(id);
                    return Err(err);
                }
                Ok(Shell { id, content_fills: Vec::new() })
            }
            Err(err) => {
                log::debug!("{}: vector rejected ({err}), rasterizing", layer.name);
                let w = (size.x * RASTER_SCALE).ceil().max(1.0) as u32;
                let h = (size.y * RASTER_SCALE).ceil().max(1.0) as u32;
                let png = raster::rasterize_svg(markup, w, h)?;
                let handle = self.register(&png)?;
                let id = self.host.create_frame(&layer.name)?;
                Ok(Shell {
                    id,
                    content_fills: vec![Paint::image(ImageRef::Handle { id: handle.0 }, ScaleMode::Fill)],
                })
            }
        }
    }

    /// Requested face, then the fallback family, then the default family.
    fn resolve_font(&mut self, text: &TextContent) -> Result<FontName, HostError> {
        let requested = FontName::from_weight(text.font_family.as_str(), text.font_weight, text.italic);
        if let Some(resolved) = self.fonts.get(&requested) {
            return Ok(resolved.clone());
        }

        let candidates = [
            requested.clone(),
            FontName::new(self.options.fallback_family.as_str(), requested.style.as_str()),
            FontName::new(self.options.fallback_family.as_str(), "Regular"),
            FontName::new(self.options.default_family.as_str(), "Regular"),
        ];
        let mut last_err = None;
        for candidate in candidates {
            match self.host.load_font(&candidate) {
                Ok(()) => {
                    if candidate != requested {
                        log::debug!("font {requested} unavailable, using {candidate}");
                    }
                    self.fonts.insert(requested, candidate.clone());
                    return Ok(candidate);
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| HostError::FontUnavailable(requested)))
    }

    // ── properties ────────────────────────────────────────────────────────

    fn properties(&mut self, shell: Shell, layer: &LayerNode, parent_origin: Vec2) -> Result<(), HostError> {
        let id = shell.id;
        let host = &mut *self.host;
        host.resize(id, layer.rect().size)?;
        host.set_position(id, layer.position() - parent_origin)?;
        if let Some(degrees) = layer.rotation.filter(|d| *d != 0.0) {
            host.set_rotation(id, degrees)?;
        }

        let mut fills = self.paints(&layer.fills, &layer.name)?;
        fills.extend(shell.content_fills);
        let host = &mut *self.host;
        if !fills.is_empty() {
            host.set_fills(id, &fills)?;
        }

        let strokes = self.paints(&layer.strokes, &layer.name)?;
        let host = &mut *self.host;
        if let Some(weight) = layer.stroke_weight.filter(|w| *w > 0.0)
            && !strokes.is_empty()
        {
            host.set_strokes(id, &strokes, weight, layer.stroke_align.unwrap_or(StrokeAlign::Inside))?;
        }
        if !layer.effects.is_empty() {
            host.set_effects(id, &layer.effects)?;
        }
        let radii = match (layer.corner_radii, layer.corner_radius) {
            (Some(radii), _) => Some(radii),
            (None, Some(r)) if r > 0.0 => Some(CornerRadii::all(r)),
            _ => None,
        };
        if let Some(radii) = radii {
            host.set_corner_radii(id, radii)?;
        }
        if layer.opacity < 1.0 {
            host.set_opacity(id, layer.opacity)?;
        }
        if layer.clips_content {
            host.set_clips_content(id, true)?;
        }
        if layer.kind().is_container()
            && let Some(auto) = auto_layout(&layer.layout)
        {
            host.set_auto_layout(id, &auto)?;
        }
        Ok(())
    }

    /// Layer paints with image references swapped for host handles.
    fn paints(&mut self, paints: &[Paint], layer: &str) -> Result<Vec<Paint>, HostError> {
        let mut out = Vec::with_capacity(paints.len());
        for paint in paints {
            match paint {
                Paint::Image { image, scale_mode } => out.extend(self.image_paint(image, *scale_mode, layer)?),
                other => out.push(other.clone()),
            }
        }
        Ok(out)
    }

    fn image_paint(&mut self, image: &ImageRef, scale_mode: ScaleMode, layer: &str) -> Result<Option<Paint>, HostError> {
        let handle = match image {
            ImageRef::Inline { bytes } => self.register(bytes)?,
            ImageRef::Handle { id } => ImageHandle(id.clone()),
            ImageRef::Pending { .. } => {
                self.warn(format!("{layer}: unresolved image dropped"));
                return Ok(None);
            }
        };
        Ok(Some(Paint::image(ImageRef::Handle { id: handle.0 }, scale_mode)))
    }

    /// Registers bytes once per distinct content.
    fn register(&mut self, bytes: &[u8]) -> Result<ImageHandle, HostError> {
        let digest = hex::encode(Sha256::digest(bytes));
        if let Some(handle) = self.images.get(&digest) {
            return Ok(handle.clone());
        }
        let handle = self.host.register_image(bytes)?;
        self.report.images_registered += 1;
        self.images.insert(digest, handle.clone());
        Ok(handle)
    }

    /// Sizing, growth, self-align and absolute placement, once `id` sits in
    /// its parent. `parent_auto` is `None` for roots.
    fn apply_child_layout(&mut self, id: SceneNodeId, layer: &LayerNode, parent_auto: Option<bool>) -> Result<(), HostError> {
        let in_flow_of_auto = parent_auto.unwrap_or(false);
        let absolute = in_flow_of_auto && layer.layout.positioning == Positioning::Absolute;
        let hugs = layer.kind() == strata_ir::LayerKind::Text || layer.layout.is_auto_layout();
        let axis = |sizing: Sizing| match sizing {
            Sizing::Hug if !hugs => Sizing::Fixed,
            Sizing::Fill if !in_flow_of_auto || absolute => Sizing::Fixed,
            other => other,
        };
        let child = ChildLayout {
            sizing: AxisSizing::new(axis(layer.layout.sizing.horizontal), axis(layer.layout.sizing.vertical)),
            growth: if in_flow_of_auto && !absolute { layer.layout.growth } else { 0.0 },
            self_align: layer.layout.self_align.filter(|_| in_flow_of_auto && !absolute),
            absolute,
        };
        self.host.set_child_layout(id, &child)?;
        Ok(())
    }

    // ── failures ──────────────────────────────────────────────────────────

    fn placeholder(&mut self, layer: &LayerNode, parent_origin: Vec2) -> Result<SceneNodeId, HostError> {
        let id = self.host.create_frame(&format!("⚠ {}", layer.name))?;
        match mark_placeholder(&mut *self.host, id, layer, parent_origin) {
            Ok(()) => Ok(id),
            Err(err) => {
                self.host.remove(id);
                Err(err)
            }
        }
    }
}

fn mark_placeholder<H: TargetHost + ?Sized>(
    host: &mut H,
    id: SceneNodeId,
    layer: &LayerNode,
    parent_origin: Vec2,
) -> Result<(), HostError> {
    let red = Color::from_srgb(0.9, 0.2, 0.2, 1.0);
    host.resize(id, layer.rect().size)?;
    host.set_position(id, layer.position() - parent_origin)?;
    host.set_fills(id, &[Paint::Solid { color: red, opacity: 0.15 }])?;
    host.set_strokes(id, &[Paint::Solid { color: red, opacity: 1.0 }], 1.0, StrokeAlign::Inside)
}

/// Container auto-layout as the target can express it; `None` when the
/// layer positions its children absolutely.
pub fn auto_layout(layout: &LayoutDescriptor) -> Option<AutoLayout> {
    let direction = match layout.mode {
        LayoutMode::None => return None,
        LayoutMode::Horizontal => AxisDirection::Horizontal,
        LayoutMode::Vertical => AxisDirection::Vertical,
    };
    // Only horizontal flows wrap in the target model.
    let wrap = layout.wrap && direction == AxisDirection::Horizontal;
    let counter_align = match (layout.counter_axis_align, direction) {
        (CounterAxisAlign::Baseline, AxisDirection::Vertical) => CounterAxisAlign::Min,
        (align, _) => align,
    };
    Some(AutoLayout {
        direction,
        item_spacing: layout.item_spacing,
        counter_axis_spacing: wrap.then_some(layout.counter_axis_spacing),
        padding: layout.padding,
        primary_align: layout.primary_axis_align,
        counter_align,
        wrap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_ir::PrimaryAxisAlign;

    #[test]
    fn no_auto_layout_without_mode() {
        assert_eq!(auto_layout(&LayoutDescriptor::default()), None);
    }

    #[test]
    fn vertical_flows_never_wrap() {
        let layout = LayoutDescriptor {
            mode: LayoutMode::Vertical,
            wrap: true,
            counter_axis_spacing: 8.0,
            counter_axis_align: CounterAxisAlign::Baseline,
            ..LayoutDescriptor::default()
        };
        let auto = auto_layout(&layout).unwrap();
        assert!(!auto.wrap);
        assert_eq!(auto.counter_axis_spacing, None);
        assert_eq!(auto.counter_align, CounterAxisAlign::Min);
    }

    #[test]
    fn wrapped_rows_keep_gutter() {
        let layout = LayoutDescriptor {
            mode: LayoutMode::Horizontal,
            wrap: true,
            item_spacing: 4.0,
            counter_axis_spacing: 12.0,
            primary_axis_align: PrimaryAxisAlign::SpaceBetween,
            ..LayoutDescriptor::default()
        };
        let auto = auto_layout(&layout).unwrap();
        assert_eq!(auto.direction, AxisDirection::Horizontal);
        assert_eq!(auto.counter_axis_spacing, Some(12.0));
        assert_eq!(auto.primary_align, PrimaryAxisAlign::SpaceBetween);
    }

    #[test]
    fn default_options() {
        let options = BuildOptions::default();
        assert_eq!(options.batch_size, 50);
        assert_eq!(options.fallback_family, "Inter");
        assert_eq!(options.default_family, "Roboto");
    }
}

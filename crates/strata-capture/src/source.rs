//! Seams to the rendered page being captured.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strata_engine::coords::{Rect, Vec2};
use strata_engine::paint::AssetRef;

use crate::css;

/// Index of a node inside a [`SourceTree`].
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
}

/// Generated-content slot of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PseudoSlot {
    Before,
    After,
}

impl PseudoSlot {
    pub fn label(self) -> &'static str {
        match self {
            PseudoSlot::Before => "::before",
            PseudoSlot::After => "::after",
        }
    }
}

/// Resolved style of one node, keyed by CSS property name.
///
/// Missing properties read as the empty string. `width` and `height` hold the
/// *specified* value (`auto`, `50%`, `120px`), since the measured size is
/// available from the node's rect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputedStyle {
    props: HashMap<String, String>,
}

impl ComputedStyle {
    #[inline]
    pub fn get(&self, prop: &str) -> &str {
        self.props.get(prop).map(String::as_str).unwrap_or("").trim()
    }

    /// Property as px, zero when absent or not a length.
    #[inline]
    pub fn px(&self, prop: &str) -> f32 {
        css::parse_px(self.get(prop)).unwrap_or(0.0)
    }

    #[inline]
    pub fn is(&self, prop: &str, value: &str) -> bool {
        self.get(prop) == value
    }

    pub fn set(&mut self, prop: impl Into<String>, value: impl Into<String>) {
        self.props.insert(prop.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, prop: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(prop, value);
        self
    }

    pub fn font_size(&self) -> f32 {
        css::parse_px(self.get("font-size")).filter(|s| *s > 0.0).unwrap_or(16.0)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ComputedStyle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            props: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// `::before` / `::after` generated content of an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PseudoElement {
    pub style: ComputedStyle,
}

impl PseudoElement {
    /// Resolved `content` text, `None` for `none`/`normal`.
    pub fn text(&self) -> Option<String> {
        let content = self.style.get("content");
        if content.is_empty() || content == "none" || content == "normal" {
            return None;
        }
        Some(content.trim_matches(|c| c == '"' || c == '\'').to_owned())
    }
}

/// Read-only view of a rendered element tree.
///
/// Rects are border boxes in viewport space; the collector adds
/// [`scroll_offset`](SourceTree::scroll_offset) to reach document space.
pub trait SourceTree {
    fn kind(&self, node: NodeId) -> NodeKind;

    /// Lower-case tag name. Empty for text nodes.
    fn tag(&self, node: NodeId) -> &str;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Own style for elements, the parent's style for text nodes.
    fn style(&self, node: NodeId) -> &ComputedStyle;

    fn rect(&self, node: NodeId) -> Rect;

    fn children(&self, node: NodeId) -> &[NodeId];

    /// Raw text of a text node.
    fn text(&self, node: NodeId) -> Option<&str>;

    fn pseudo(&self, node: NodeId, slot: PseudoSlot) -> Option<&PseudoElement>;

    /// Serialized markup of an inline `<svg>` element.
    fn inline_svg(&self, node: NodeId) -> Option<&str>;

    /// Whether an embedded frame's document can be read.
    fn frame_accessible(&self, node: NodeId) -> bool;

    /// Current value of a form control.
    fn form_value(&self, node: NodeId) -> Option<&str> {
        self.attribute(node, "value")
    }

    /// Raster snapshot captured for canvases and videos without a poster.
    fn raster_snapshot(&self, _node: NodeId) -> Option<AssetRef> {
        None
    }

    fn scroll_offset(&self) -> Vec2;
}

/// Fetches asset bytes. `None` means the asset is unavailable; callers
/// degrade to "no fill".
#[async_trait]
pub trait AssetResolver: Send + Sync {
    async fn resolve(&self, asset: &AssetRef) -> Option<Vec<u8>>;
}

/// Resolver that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

#[async_trait]
impl AssetResolver for NoAssets {
    async fn resolve(&self, _asset: &AssetRef) -> Option<Vec<u8>> {
        None
    }
}

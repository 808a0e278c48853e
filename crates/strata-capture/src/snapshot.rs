//! JSON snapshot of a rendered page.
//!
//! A snapshot is what an in-page script records: a nested element tree with
//! resolved styles and viewport rects, plus a table of asset bytes the script
//! could read. [`SnapshotTree`] and [`SnapshotAssets`] serve it back through
//! the capture seams.
//!
//! ```json
//! {
//!   "viewport": { "width": 1280, "height": 720, "pixelRatio": 2, "origin": "https://example.com" },
//!   "scroll": { "x": 0, "y": 0 },
//!   "root": {
//!     "tag": "body", "rect": [0, 0, 1280, 720], "style": { "display": "block" },
//!     "children": [ { "text": "Hello", "rect": [8, 8, 40, 18] } ]
//!   },
//!   "assets": { "https://example.com/a.png": "<base64>", "#1": "<base64>" }
//! }
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use strata_engine::coords::{Rect, Vec2};
use strata_engine::paint::AssetRef;

use crate::error::CaptureError;
use crate::source::{
    AssetResolver, ComputedStyle, NodeId, NodeKind, PseudoElement, PseudoSlot, SourceTree,
};

// ── Document ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotViewport {
    pub width: f32,
    pub height: f32,
    #[serde(default = "unit_ratio")]
    pub pixel_ratio: f32,
    #[serde(default)]
    pub origin: String,
}

fn unit_ratio() -> f32 {
    1.0
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotNode {
    /// Element tag; absent for text nodes.
    pub tag: Option<String>,
    /// Text content; present only on text nodes.
    pub text: Option<String>,
    pub attrs: HashMap<String, String>,
    pub style: ComputedStyle,
    /// `[x, y, width, height]` in viewport space.
    pub rect: [f32; 4],
    pub children: Vec<SnapshotNode>,
    pub before: Option<PseudoElement>,
    pub after: Option<PseudoElement>,
    /// Serialized markup of an inline `<svg>`.
    pub svg: Option<String>,
    pub frame_accessible: Option<bool>,
    /// Key of a raster snapshot in the asset table (`"#<key>"`).
    pub snapshot: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub viewport: SnapshotViewport,
    #[serde(default)]
    pub scroll: Vec2,
    pub root: SnapshotNode,
    /// Asset bytes, base64, keyed by URL or `#<snapshot key>`.
    #[serde(default)]
    pub assets: HashMap<String, String>,
}

/// Deepest JSON nesting a snapshot may use, about 500 element levels.
pub const MAX_SNAPSHOT_NESTING: usize = 1024;

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self, CaptureError> {
        let depth = strata_ir::format::nesting_depth(text);
        if depth > MAX_SNAPSHOT_NESTING {
            return Err(CaptureError::TooDeep { depth, limit: MAX_SNAPSHOT_NESTING });
        }
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let snapshot = Snapshot::deserialize(&mut de)?;
        de.end()?;
        Ok(snapshot)
    }

    /// Splits the snapshot into its source tree and asset resolver.
    pub fn into_parts(self) -> (SnapshotTree, SnapshotAssets, SnapshotViewport) {
        let assets = SnapshotAssets::from_base64_table(self.assets);
        let tree = SnapshotTree::new(self.root, self.scroll);
        (tree, assets, self.viewport)
    }
}

// ── SnapshotTree ──────────────────────────────────────────────────────────

#[derive(Debug)]
struct ArenaNode {
    kind: NodeKind,
    tag: String,
    text: Option<String>,
    attrs: HashMap<String, String>,
    style: ComputedStyle,
    parent: Option<NodeId>,
    rect: Rect,
    children: Vec<NodeId>,
    before: Option<PseudoElement>,
    after: Option<PseudoElement>,
    svg: Option<String>,
    frame_accessible: bool,
    snapshot: Option<u64>,
}

/// Arena form of a snapshot. The root is node `0`.
#[derive(Debug)]
pub struct SnapshotTree {
    nodes: Vec<ArenaNode>,
    scroll: Vec2,
    empty_style: ComputedStyle,
}

impl SnapshotTree {
    pub const ROOT: NodeId = 0;

    pub fn new(root: SnapshotNode, scroll: Vec2) -> Self {
        let mut nodes: Vec<ArenaNode> = Vec::new();
        let mut work: Vec<(SnapshotNode, Option<NodeId>)> = vec![(root, None)];

        while let Some((mut node, parent)) = work.pop() {
            let id = nodes.len();
            if let Some(p) = parent {
                nodes[p].children.push(id);
            }
            // Reversed so children pop in source order.
            for child in node.children.drain(..).rev() {
                work.push((child, Some(id)));
            }

            let [x, y, w, h] = node.rect;
            let kind = match (&node.tag, &node.text) {
                (None, Some(_)) => NodeKind::Text,
                _ => NodeKind::Element,
            };
            nodes.push(ArenaNode {
                kind,
                tag: node.tag.unwrap_or_default().to_ascii_lowercase(),
                text: node.text,
                attrs: node.attrs,
                style: node.style,
                parent,
                rect: Rect::new(x, y, w, h),
                children: Vec::new(),
                before: node.before,
                after: node.after,
                svg: node.svg,
                frame_accessible: node.frame_accessible.unwrap_or(true),
                snapshot: node.snapshot,
            });
        }

        Self { nodes, scroll, empty_style: ComputedStyle::default() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl SourceTree for SnapshotTree {
    fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node].kind
    }

    fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node].tag
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node].attrs.get(name).map(String::as_str)
    }

    fn style(&self, node: NodeId) -> &ComputedStyle {
        let n = &self.nodes[node];
        match (n.kind, n.parent) {
            (NodeKind::Text, Some(parent)) => &self.nodes[parent].style,
            (NodeKind::Text, None) => &self.empty_style,
            (NodeKind::Element, _) => &n.style,
        }
    }

    fn rect(&self, node: NodeId) -> Rect {
        self.nodes[node].rect
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].children
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes[node].text.as_deref()
    }

    fn pseudo(&self, node: NodeId, slot: PseudoSlot) -> Option<&PseudoElement> {
        let n = &self.nodes[node];
        match slot {
            PseudoSlot::Before => n.before.as_ref(),
            PseudoSlot::After => n.after.as_ref(),
        }
    }

    fn inline_svg(&self, node: NodeId) -> Option<&str> {
        self.nodes[node].svg.as_deref()
    }

    fn frame_accessible(&self, node: NodeId) -> bool {
        self.nodes[node].frame_accessible
    }

    fn raster_snapshot(&self, node: NodeId) -> Option<AssetRef> {
        self.nodes[node].snapshot.map(|key| AssetRef::Snapshot { key })
    }

    fn scroll_offset(&self) -> Vec2 {
        self.scroll
    }
}

// ── SnapshotAssets ────────────────────────────────────────────────────────

/// Resolves `data:` URIs and the snapshot's embedded asset table.
#[derive(Debug, Clone, Default)]
pub struct SnapshotAssets {
    table: HashMap<String, Vec<u8>>,
}

impl SnapshotAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a base64 table. Undecodable entries are skipped.
    pub fn from_base64_table(table: HashMap<String, String>) -> Self {
        let mut assets = Self::new();
        for (key, b64) in table {
            match STANDARD.decode(b64.trim()) {
                Ok(bytes) => assets.insert(key, bytes),
                Err(err) => log::warn!("skipping asset {key}: {err}"),
            }
        }
        assets
    }

    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.table.insert(key.into(), bytes);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn lookup(&self, asset: &AssetRef) -> Option<Vec<u8>> {
        match asset {
            AssetRef::Url { url } if url.starts_with("data:") => decode_data_uri(url),
            AssetRef::Url { url } => self.table.get(url).cloned(),
            AssetRef::Snapshot { key } => self.table.get(&format!("#{key}")).cloned(),
        }
    }
}

#[async_trait]
impl AssetResolver for SnapshotAssets {
    async fn resolve(&self, asset: &AssetRef) -> Option<Vec<u8>> {
        self.lookup(asset)
    }
}

/// `data:[<media type>][;base64],<payload>`.
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if meta.ends_with(";base64") {
        STANDARD.decode(payload.trim()).ok()
    } else {
        Some(percent_decode(payload))
    }
}

fn percent_decode(input: &str) -> Vec<u8> {
    let hex = |b: u8| (b as char).to_digit(16).map(|d| d as u8);
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

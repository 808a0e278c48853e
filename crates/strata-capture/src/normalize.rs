//! Post-walk normalization: paint order and outer spacing.

use strata_engine::coords::Edges;
use strata_ir::{LayerNode, LayoutDescriptor, LayoutMode, Positioning};

/// Where a child came from relative to its parent's own content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StackSlot {
    Before,
    Content,
    After,
}

#[derive(Debug, Clone)]
pub struct StackEntry {
    pub z: i32,
    pub slot: StackSlot,
    pub node: LayerNode,
}

impl StackEntry {
    #[inline]
    pub fn new(slot: StackSlot, node: LayerNode) -> Self {
        Self { z: node.stack_index, slot, node }
    }
}

/// Orders siblings back-to-front: stable by `(z, slot)`, so equal keys keep
/// document order. Reverse flows flip the result.
pub fn sort_stacking(mut entries: Vec<StackEntry>, reverse: bool) -> Vec<LayerNode> {
    entries.sort_by_key(|e| (e.z, e.slot));
    let mut nodes: Vec<LayerNode> = entries.into_iter().map(|e| e.node).collect();
    if reverse {
        nodes.reverse();
    }
    nodes
}

/// Replaces every in-flow node carrying outer spacing with a transparent
/// vertical wrapper whose padding is that spacing. The wrapper takes over
/// sizing, growth, self-align and stacking; the node keeps its box.
///
/// Afterwards no node has a non-zero margin. The root's margin is dropped.
pub fn wrap_outer_spacing(root: &mut LayerNode) {
    root.margin = Edges::default();
    let mut stack: Vec<&mut LayerNode> = vec![root];
    while let Some(node) = stack.pop() {
        for child in node.children.iter_mut() {
            if child.margin.is_zero() {
                continue;
            }
            if child.layout.positioning == Positioning::Absolute {
                child.margin = Edges::default();
                continue;
            }
            wrap_in_place(child);
        }
        stack.extend(node.children.iter_mut());
    }
}

fn wrap_in_place(slot: &mut LayerNode) {
    let mut inner = std::mem::replace(slot, LayerNode::frame("", Default::default()));
    let margin = std::mem::take(&mut inner.margin);

    let mut wrapper = LayerNode::frame(format!("{} spacing", inner.name), inner.rect().outset(margin));
    wrapper.layout = LayoutDescriptor {
        mode: LayoutMode::Vertical,
        padding: margin,
        sizing: inner.layout.sizing,
        growth: std::mem::take(&mut inner.layout.growth),
        self_align: inner.layout.self_align.take(),
        ..LayoutDescriptor::default()
    };
    wrapper.stack_index = inner.stack_index;
    wrapper.children.push(inner);
    *slot = wrapper;
}

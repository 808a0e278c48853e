//! Content-only wrapper elision.
//!
//! A node flagged `content_only` contributes nothing of its own, so consumers
//! splice its children into the parent's list at the same position. The flag
//! is a hint: [`is_content_only`] re-checks the node before it is dropped.

use std::{mem, slice, vec};

use crate::layer::{LayerContent, LayerNode, SemanticTag};

/// True when `node` is flagged content-only and still carries nothing visible.
pub fn is_content_only(node: &LayerNode) -> bool {
    node.content_only
        && matches!(node.content, LayerContent::Frame)
        && node.fills.is_empty()
        && node.strokes.is_empty()
        && node.effects.is_empty()
        && matches!(node.semantic, None | Some(SemanticTag::Container))
        && node.layout.is_passthrough()
        && node.opacity >= 1.0
        && node.rotation.is_none_or(|r| r == 0.0)
        && !node.clips_content
        && node.margin.is_zero()
}

/// Children of `node` as a consumer sees them: every content-only child is
/// replaced, recursively, by its own children.
pub fn flattened_children(node: &LayerNode) -> Vec<&LayerNode> {
    let mut out = Vec::with_capacity(node.children.len());
    let mut stack: Vec<slice::Iter<'_, LayerNode>> = vec![node.children.iter()];

    while let Some(iter) = stack.last_mut() {
        match iter.next() {
            Some(child) if is_content_only(child) => stack.push(child.children.iter()),
            Some(child) => out.push(child),
            None => {
                stack.pop();
            }
        }
    }
    out
}

/// Owned, fully flattened copy of `node`. The root itself is never elided.
///
/// Applying it to its own output returns an equal tree.
pub fn flatten(node: &LayerNode) -> LayerNode {
    let mut root = node.clone();
    flatten_in_place(&mut root);
    root
}

/// In-place variant of [`flatten`].
pub fn flatten_in_place(root: &mut LayerNode) {
    let mut stack: Vec<&mut LayerNode> = vec![root];
    while let Some(node) = stack.pop() {
        splice_children(&mut node.children);
        stack.extend(node.children.iter_mut());
    }
}

fn splice_children(children: &mut Vec<LayerNode>) {
    let mut out = Vec::with_capacity(children.len());
    let mut pending: Vec<vec::IntoIter<LayerNode>> = vec![mem::take(children).into_iter()];

    while let Some(iter) = pending.last_mut() {
        match iter.next() {
            Some(mut child) if is_content_only(&child) => {
                pending.push(mem::take(&mut child.children).into_iter());
            }
            Some(child) => out.push(child),
            None => {
                pending.pop();
            }
        }
    }
    *children = out;
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_engine::coords::{Edges, Rect};
    use strata_engine::paint::{Color, Paint};

    fn frame(name: &str) -> LayerNode {
        LayerNode::frame(name, Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    fn wrapper(name: &str, children: Vec<LayerNode>) -> LayerNode {
        let mut w = frame(name);
        w.content_only = true;
        w.children = children;
        w
    }

    fn names(nodes: &[&LayerNode]) -> Vec<String> {
        nodes.iter().map(|n| n.name.clone()).collect()
    }

    // ── is_content_only ───────────────────────────────────────────────────

    #[test]
    fn unflagged_node_is_never_content_only() {
        assert!(!is_content_only(&frame("a")));
    }

    #[test]
    fn flag_is_revalidated() {
        let mut w = wrapper("w", vec![]);
        assert!(is_content_only(&w));

        w.fills.push(Paint::solid(Color::white()).unwrap());
        assert!(!is_content_only(&w), "own paint");

        let mut w = wrapper("w", vec![]);
        w.layout.padding = Edges::all(8.0);
        assert!(!is_content_only(&w), "padding");

        let mut w = wrapper("w", vec![]);
        w.semantic = Some(SemanticTag::Button);
        assert!(!is_content_only(&w), "semantic meaning");

        let mut w = wrapper("w", vec![]);
        w.semantic = Some(SemanticTag::Container);
        assert!(is_content_only(&w), "container tag carries no meaning");
    }

    // ── flattened_children ────────────────────────────────────────────────

    #[test]
    fn splices_at_same_position() {
        let root = frame("root")
            .with_child(frame("a"))
            .with_child(wrapper("w", vec![frame("b"), frame("c")]))
            .with_child(frame("d"));
        assert_eq!(names(&flattened_children(&root)), ["a", "b", "c", "d"]);
    }

    #[test]
    fn splices_nested_wrappers() {
        let root = frame("root").with_child(wrapper(
            "w1",
            vec![frame("a"), wrapper("w2", vec![frame("b")]), frame("c")],
        ));
        assert_eq!(names(&flattened_children(&root)), ["a", "b", "c"]);
    }

    #[test]
    fn keeps_flagged_node_that_paints() {
        let mut w = wrapper("w", vec![frame("a")]);
        w.opacity = 0.5;
        let root = frame("root").with_child(w);
        assert_eq!(names(&flattened_children(&root)), ["w"]);
    }

    // ── flatten ───────────────────────────────────────────────────────────

    #[test]
    fn flatten_reaches_every_level() {
        let root = frame("root").with_child(
            frame("section").with_child(wrapper("w", vec![frame("x"), frame("y")])),
        );
        let flat = flatten(&root);
        let section = &flat.children[0];
        assert_eq!(section.children.len(), 2);
        assert_eq!(section.children[1].name, "y");
    }

    #[test]
    fn flatten_is_idempotent() {
        let mut kept = wrapper("kept", vec![frame("k")]);
        kept.rotation = Some(15.0);
        let root = frame("root")
            .with_child(wrapper("w", vec![frame("a"), wrapper("w2", vec![frame("b")])]))
            .with_child(kept)
            .with_child(frame("c").with_child(wrapper("w3", vec![frame("d")])));

        let once = flatten(&root);
        let twice = flatten(&once);
        assert_eq!(once, twice);
        assert!(once.iter().skip(1).all(|n| !is_content_only(n)));
    }

    #[test]
    fn root_is_never_elided() {
        let root = wrapper("root", vec![frame("a")]);
        let flat = flatten(&root);
        assert_eq!(flat.name, "root");
        assert_eq!(flat.children.len(), 1);
    }
}

use std::collections::HashMap;

use serde::Serialize;

use crate::layer::{LayerKind, LayerNode, LayoutMode, SemanticTag};

/// Size buckets are this many pixels wide on each axis.
pub const SIZE_BUCKET: f32 = 32.0;

/// Coarse structural fingerprint of a node and its direct children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub kind: LayerKind,
    pub child_count: usize,
    pub child_kinds: Vec<LayerKind>,
    pub size_bucket: (i32, i32),
    pub mode: LayoutMode,
    pub semantic: Option<SemanticTag>,
}

impl Signature {
    pub fn of(node: &LayerNode) -> Self {
        Self {
            kind: node.kind(),
            child_count: node.children.len(),
            child_kinds: node.children.iter().map(LayerNode::kind).collect(),
            size_bucket: (
                (node.width / SIZE_BUCKET).round() as i32,
                (node.height / SIZE_BUCKET).round() as i32,
            ),
            mode: node.layout.mode,
            semantic: node.semantic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentInstance {
    /// Child indices from the layer list: `[root, child, grandchild, ..]`.
    pub path: Vec<usize>,
    /// Layer name at that path.
    pub layer: String,
    /// `"<component> #<ordinal>"`, ordinals starting at 1 in document order.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub name: String,
    #[serde(skip)]
    pub signature: Signature,
    pub instances: Vec<ComponentInstance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComponentReport {
    pub components: Vec<Component>,
}

impl ComponentReport {
    /// Instance label of the node at `path`, if it belongs to a component.
    pub fn label_of(&self, path: &[usize]) -> Option<&str> {
        self.components
            .iter()
            .flat_map(|c| c.instances.iter())
            .find(|i| i.path == path)
            .map(|i| i.label.as_str())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Finds structures that repeat at least twice among nodes with children.
///
/// Components are numbered in order of their first instance.
pub fn detect_components(roots: &[LayerNode]) -> ComponentReport {
    let mut order: Vec<Signature> = Vec::new();
    let mut seen: HashMap<Signature, Vec<(Vec<usize>, &str)>> = HashMap::new();

    let mut stack: Vec<(&LayerNode, Vec<usize>)> = roots
        .iter()
        .enumerate()
        .rev()
        .map(|(i, n)| (n, vec![i]))
        .collect();

    while let Some((node, path)) = stack.pop() {
        for (i, child) in node.children.iter().enumerate().rev() {
            let mut child_path = path.clone();
            child_path.push(i);
            stack.push((child, child_path));
        }
        if node.children.is_empty() {
            continue;
        }

        let sig = Signature::of(node);
        let entry = seen.entry(sig.clone()).or_default();
        if entry.is_empty() {
            order.push(sig);
        }
        entry.push((path, node.name.as_str()));
    }

    let mut components = Vec::new();
    for sig in order {
        let Some(hits) = seen.remove(&sig) else { continue };
        if hits.len() < 2 {
            continue;
        }
        let name = format!("Component {}", components.len() + 1);
        let instances = hits
            .into_iter()
            .enumerate()
            .map(|(i, (path, layer))| ComponentInstance {
                path,
                layer: layer.to_owned(),
                label: format!("{name} #{}", i + 1),
            })
            .collect();
        components.push(Component { name, signature: sig, instances });
    }

    log::debug!("detected {} repeated components", components.len());
    ComponentReport { components }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::TextContent;
    use strata_engine::coords::Rect;

    fn card(x: f32) -> LayerNode {
        let mut card = LayerNode::frame("card", Rect::new(x, 0.0, 200.0, 120.0));
        card.layout.mode = LayoutMode::Vertical;
        card.with_child(LayerNode::frame("thumb", Rect::new(x, 0.0, 200.0, 60.0)))
            .with_child(LayerNode::text(
                "title",
                Rect::new(x, 60.0, 200.0, 20.0),
                TextContent::new("Title", "Inter", 16.0),
            ))
            .with_child(LayerNode::text(
                "body",
                Rect::new(x, 80.0, 200.0, 40.0),
                TextContent::new("Body", "Inter", 14.0),
            ))
    }

    #[test]
    fn identical_subtrees_become_one_component() {
        let root = LayerNode::frame("page", Rect::new(0.0, 0.0, 1000.0, 400.0))
            .with_child(card(0.0))
            .with_child(LayerNode::frame("spacer", Rect::new(0.0, 0.0, 10.0, 10.0)))
            .with_child(card(300.0));

        let report = detect_components(&[root]);
        assert_eq!(report.components.len(), 1);
        let c = &report.components[0];
        assert_eq!(c.name, "Component 1");
        assert_eq!(c.instances.len(), 2);
        assert_eq!(report.label_of(&[0, 0]), Some("Component 1 #1"));
        assert_eq!(report.label_of(&[0, 2]), Some("Component 1 #2"));
        assert_eq!(report.label_of(&[0]), None);
    }

    #[test]
    fn lone_subtree_is_not_labeled() {
        let mut odd = card(300.0);
        odd.children[2] = LayerNode::frame("icon", Rect::new(300.0, 80.0, 20.0, 20.0));
        let root = LayerNode::frame("page", Rect::new(0.0, 0.0, 1000.0, 400.0))
            .with_child(card(0.0))
            .with_child(odd);

        let report = detect_components(&[root]);
        assert!(report.is_empty());
        assert_eq!(report.label_of(&[0, 0]), None);
    }

    #[test]
    fn size_bucket_tolerates_small_differences() {
        let mut a = card(0.0);
        a.width = 205.0;
        let b = card(300.0);
        assert_eq!(Signature::of(&a), Signature::of(&b));

        a.width = 260.0;
        assert_ne!(Signature::of(&a), Signature::of(&b));
    }

    #[test]
    fn instances_across_roots_are_found() {
        let report = detect_components(&[card(0.0), card(0.0)]);
        assert_eq!(report.components[0].instances[1].path, vec![1]);
    }
}

use serde_json::{Value, json};
use strata_capture::{Budget, LimitKind, NoAssets, Snapshot, SnapshotTree, WarningKind, collect, collect_structure};
use strata_ir::{LayoutMode, Sizing, encode, decode, flatten, ViewportMeta};

fn snapshot(root: Value) -> SnapshotTree {
    let doc = json!({ "viewport": { "width": 1280, "height": 720 }, "root": root });
    let (tree, _, _) = Snapshot::from_json(&doc.to_string()).unwrap().into_parts();
    tree
}

fn grid_of(n: usize) -> Value {
    let children: Vec<Value> = (0..n)
        .map(|i| json!({ "tag": "div", "rect": [0, i * 10, 100, 10], "children": [{ "text": format!("row {i}"), "rect": [0, i * 10, 50, 10] }] }))
        .collect();
    json!({ "tag": "body", "rect": [0, 0, 100, n * 10], "children": children })
}

// ── scenarios ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn horizontal_container_with_gutter() {
    let tree = snapshot(json!({
        "tag": "div",
        "rect": [0, 0, 300, 200],
        "style": { "display": "flex", "flex-direction": "row", "column-gap": "10px", "row-gap": "normal" },
        "children": [
            { "tag": "div", "rect": [0, 0, 100, 100], "style": { "width": "100px", "height": "100px" } },
            { "tag": "div", "rect": [110, 0, 100, 100], "style": { "width": "100px", "height": "100px" } }
        ]
    }));
    let capture = collect(&tree, SnapshotTree::ROOT, &NoAssets, Budget::default()).await;
    let root = capture.root.unwrap();

    assert_eq!(root.layout.mode, LayoutMode::Horizontal);
    assert_eq!(root.layout.item_spacing, 10.0);
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[1].x, 110.0);
    assert_eq!(root.children[0].layout.sizing.horizontal, Sizing::Fixed);
    assert!(capture.warnings.is_empty());
}

#[tokio::test]
async fn transparent_background_has_no_fill() {
    let tree = snapshot(json!({
        "tag": "div",
        "rect": [0, 0, 100, 100],
        "style": { "background-color": "rgba(0, 0, 0, 0)" }
    }));
    let capture = collect(&tree, SnapshotTree::ROOT, &NoAssets, Budget::default()).await;
    assert!(capture.root.unwrap().fills.is_empty());
}

#[tokio::test]
async fn zero_size_clipped_root_is_excluded() {
    let tree = snapshot(json!({
        "tag": "div",
        "rect": [0, 0, 0, 0],
        "style": { "overflow": "hidden" },
        "children": [{ "tag": "p", "rect": [0, 0, 50, 50] }]
    }));
    let capture = collect(&tree, SnapshotTree::ROOT, &NoAssets, Budget::default()).await;
    assert!(capture.root.is_none());
    assert_eq!(capture.stats.nodes_visited, 0);
    assert!(!capture.stats.limit_hit);
}

// ── budget ────────────────────────────────────────────────────────────────

#[test]
fn shrinking_node_budget_never_visits_more() {
    let tree = snapshot(grid_of(20));
    let total = collect_structure(&tree, SnapshotTree::ROOT, Budget::default()).stats.nodes_visited;
    assert_eq!(total, 41);

    let mut previous = usize::MAX;
    for cap in (0..=45).rev() {
        let capture = collect_structure(&tree, SnapshotTree::ROOT, Budget::default().with_max_nodes(cap));
        let visited = capture.stats.nodes_visited;
        assert!(visited <= previous, "cap {cap}: {visited} > {previous}");
        assert_eq!(visited, cap.min(total));
        assert_eq!(capture.stats.limit_hit, visited == cap, "cap {cap}");
        previous = visited;
    }
}

#[test]
fn budget_warning_is_recorded_once() {
    let tree = snapshot(grid_of(10));
    let capture = collect_structure(&tree, SnapshotTree::ROOT, Budget::default().with_max_nodes(5));
    let budget_warnings: Vec<_> = capture
        .warnings
        .iter()
        .filter(|w| matches!(w.kind, WarningKind::BudgetExceeded(_)))
        .collect();
    assert_eq!(budget_warnings.len(), 1);
    assert_eq!(budget_warnings[0].kind, WarningKind::BudgetExceeded(LimitKind::Nodes));
    assert_eq!(budget_warnings[0].to_string(), "node budget of 5 exhausted");
    assert_eq!(capture.root.unwrap().subtree_len(), 5);
}

#[test]
fn depth_budget_cuts_deep_chains() {
    let mut node = json!({ "tag": "span", "rect": [0, 0, 1, 1] });
    for _ in 0..40 {
        node = json!({ "tag": "div", "rect": [0, 0, 1, 1], "children": [node] });
    }
    let tree = snapshot(node);
    let capture = collect_structure(&tree, SnapshotTree::ROOT, Budget::default().with_max_depth(8));
    assert_eq!(capture.stats.nodes_visited, 8);
    assert!(capture.stats.limit_hit);
    assert_eq!(capture.warnings[0].kind, WarningKind::BudgetExceeded(LimitKind::Depth));
}

// ── end to end ────────────────────────────────────────────────────────────

#[tokio::test]
async fn margins_are_wrapped_before_encoding() {
    let tree = snapshot(json!({
        "tag": "body",
        "rect": [0, 0, 400, 300],
        "style": { "margin-top": "8px" },
        "children": [
            { "tag": "h1", "rect": [0, 16, 400, 40], "style": { "margin-top": "16px", "margin-bottom": "16px" },
              "children": [{ "text": "Title", "rect": [0, 16, 120, 40] }] },
            { "tag": "span", "rect": [0, 72, 400, 20], "style": { "display": "inline" },
              "children": [{ "text": "inline", "rect": [0, 72, 40, 20] }] }
        ]
    }));
    let capture = collect(&tree, SnapshotTree::ROOT, &NoAssets, Budget::default()).await;
    let root = capture.root.unwrap();
    assert!(root.iter().all(|n| n.margin.is_zero()));

    let wrapper = &root.children[0];
    assert_eq!(wrapper.y, 0.0);
    assert_eq!(wrapper.height, 72.0);
    assert_eq!(wrapper.children[0].name, "h1");

    let flat = flatten(&root);
    assert_eq!(flat.children[1].text_content().unwrap().characters, "inline");

    let viewport = ViewportMeta::new(1280.0, 720.0, 1.0, "file://fixture");
    let text = encode(&[flat.clone()], &viewport).unwrap();
    assert_eq!(decode(&text).unwrap().layers, vec![flat]);
}

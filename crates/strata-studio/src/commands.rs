use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use strata_capture::{Budget, Snapshot, SnapshotTree, collect};
use strata_ir::analysis::{detect_components, extract_tokens};
use strata_ir::{InterchangeDocument, LayerNode, ViewportMeta, decode, encode};
use strata_scene::{BuildOptions, MemoryHost, SceneBuilder};

fn read_document(path: &Path) -> Result<InterchangeDocument> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    decode(&text).with_context(|| format!("decoding {}", path.display()))
}

pub async fn capture(
    snapshot: &Path,
    output: Option<&Path>,
    max_nodes: usize,
    max_depth: usize,
    timeout: u64,
) -> Result<()> {
    let text = fs::read_to_string(snapshot).with_context(|| format!("reading {}", snapshot.display()))?;
    let (tree, assets, viewport) = Snapshot::from_json(&text)
        .with_context(|| format!("parsing snapshot {}", snapshot.display()))?
        .into_parts();

    let budget = Budget::default()
        .with_max_nodes(max_nodes)
        .with_max_depth(max_depth)
        .with_max_duration(Duration::from_secs(timeout));
    let capture = collect(&tree, SnapshotTree::ROOT, &assets, budget).await;
    if capture.root.is_none() {
        bail!("nothing rendered at the snapshot root");
    }

    let meta = ViewportMeta::new(viewport.width, viewport.height, viewport.pixel_ratio, viewport.origin);
    let document = encode(capture.layers(), &meta)?;
    match output {
        Some(path) => fs::write(path, &document).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{document}"),
    }
    for warning in &capture.warnings {
        log::warn!("{warning}");
    }
    log::info!(
        "captured {} nodes with {} warnings{}",
        capture.stats.nodes_visited,
        capture.warnings.len(),
        if capture.stats.limit_hit { " (budget reached)" } else { "" }
    );
    Ok(())
}

pub fn inspect(path: &Path) -> Result<()> {
    let document = read_document(path)?;
    println!(
        "{} v{}  {}×{} @{}x  {}",
        document.magic,
        document.schema_version,
        document.viewport.width,
        document.viewport.height,
        document.viewport.pixel_ratio,
        document.viewport.source_origin
    );
    println!("{} layers", document.layer_count());
    for root in &document.layers {
        print_layers(root);
    }
    Ok(())
}

fn print_layers(root: &LayerNode) {
    let mut stack = vec![(root, 0usize)];
    while let Some((layer, depth)) = stack.pop() {
        println!(
            "{:indent$}{} {:?} ({}, {}) {}×{}",
            "",
            layer.kind().label(),
            layer.name,
            layer.x,
            layer.y,
            layer.width,
            layer.height,
            indent = depth * 2
        );
        stack.extend(layer.children.iter().rev().map(|c| (c, depth + 1)));
    }
}

pub fn build(path: &Path, batch_size: usize, fallback_font: String) -> Result<()> {
    let document = read_document(path)?;
    let options = BuildOptions { fallback_family: fallback_font, ..BuildOptions::default() }.with_batch_size(batch_size);

    let mut host = MemoryHost::new().with_standard_fonts();
    let report = SceneBuilder::new(&mut host, options).build(&document.layers);
    for root in &report.roots {
        print!("{}", host.outline(*root));
    }
    log::info!(
        "{} nodes built, {} placeholders, {} images",
        report.nodes_built,
        report.placeholders,
        report.images_registered
    );
    Ok(())
}

pub fn tokens(path: &Path) -> Result<()> {
    let document = read_document(path)?;
    let tokens = extract_tokens(&document.layers);
    println!("{}", serde_json::to_string_pretty(&tokens)?);
    Ok(())
}

pub fn components(path: &Path) -> Result<()> {
    let document = read_document(path)?;
    let report = detect_components(&document.layers);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

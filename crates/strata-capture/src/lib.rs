//! Capture side of **strata**: walks a rendered element tree into layer IR.
//!
//! The page is reached through two seams:
//!
//! - [`SourceTree`] exposes nodes, computed styles and measured rects.
//! - [`AssetResolver`] fetches image bytes after the walk.
//!
//! [`SnapshotTree`] and [`SnapshotAssets`] implement both over a JSON page
//! snapshot, which is what the studio binary and the tests feed in.
//!
//! ```rust
//! use strata_capture::{collect, Budget, NoAssets, Snapshot, SnapshotTree};
//!
//! let json = r#"{"viewport":{"width":320,"height":200},
//!     "root":{"tag":"body","rect":[0,0,320,200],"style":{"background-color":"white"}}}"#;
//! let (tree, _, _) = Snapshot::from_json(json).unwrap().into_parts();
//! let capture = futures::executor::block_on(collect(&tree, SnapshotTree::ROOT, &NoAssets, Budget::default()));
//! assert_eq!(capture.stats.nodes_visited, 1);
//! assert_eq!(capture.root.unwrap().fills.len(), 1);
//! ```

pub mod collector;
pub mod content;
pub mod css;
pub mod error;
pub mod governor;
pub mod layout;
pub mod normalize;
pub mod paint;
pub mod snapshot;
pub mod source;

pub use collector::{Capture, CaptureStats, Warning, WarningKind, collect, collect_structure};
pub use content::{ContentKind, sanitize_svg};
pub use error::CaptureError;
pub use governor::{Budget, Governor, HARD_DEPTH_CEILING, LimitKind};
pub use snapshot::{MAX_SNAPSHOT_NESTING, Snapshot, SnapshotAssets, SnapshotTree, SnapshotViewport};
pub use source::{AssetResolver, ComputedStyle, NoAssets, NodeId, NodeKind, PseudoElement, PseudoSlot, SourceTree};

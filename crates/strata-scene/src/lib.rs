//! Scene construction for **strata**.
//!
//! A [`SceneBuilder`] walks layer IR and drives a [`TargetHost`]: one frame,
//! text or vector node per layer, positioned relative to its parent, with
//! auto-layout properties mapped to what the host can express. Failures are
//! local; a layer that cannot be built becomes a marked placeholder and its
//! siblings are unaffected.
//!
//! [`MemoryHost`] records the result as a plain node table and is what the
//! command-line tool and the tests build against.
//!
//! ```rust
//! use strata_engine::coords::Rect;
//! use strata_ir::LayerNode;
//! use strata_scene::{BuildOptions, MemoryHost, SceneBuilder};
//!
//! let root = LayerNode::frame("card", Rect::new(40.0, 40.0, 200.0, 120.0))
//!     .with_child(LayerNode::frame("badge", Rect::new(50.0, 50.0, 20.0, 20.0)));
//! let mut host = MemoryHost::new();
//! let report = SceneBuilder::new(&mut host, BuildOptions::default()).build(&[root]);
//! let badge = host.node(report.roots[0]).unwrap().children[0];
//! assert_eq!(host.node(badge).unwrap().position.x, 10.0);
//! ```

pub mod builder;
pub mod error;
pub mod host;
pub mod memory;

pub use builder::{BuildOptions, BuildReport, SceneBuilder, auto_layout};
pub use error::HostError;
pub use host::{AutoLayout, AxisDirection, ChildLayout, ImageHandle, SceneNodeId, TargetHost, TextResize};
pub use memory::{MemoryHost, SceneNode, SceneNodeKind, SceneText};

//! Layer-tree intermediate representation for **strata**.
//!
//! The IR is the hand-off point between capture (a rendered page walked into
//! [`LayerNode`]s) and scene construction (layers rebuilt as auto-layout
//! frames). It has no dependency on either side.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`layer`] | `LayerNode`, content payloads, layout descriptor |
//! | [`flatten`] | content-only wrapper elision |
//! | [`format`] | versioned, checksummed interchange document |
//! | [`error`] | `FormatError`, `ErrorCode` |
//! | [`analysis`] | repeated-component detection and design tokens |
//!
//! # Quick start
//!
//! ```rust
//! use strata_engine::coords::Rect;
//! use strata_ir::format::{decode, encode, ViewportMeta};
//! use strata_ir::LayerNode;
//!
//! let root = LayerNode::frame("body", Rect::new(0.0, 0.0, 1280.0, 720.0));
//! let viewport = ViewportMeta::new(1280.0, 720.0, 2.0, "https://example.com");
//! let text = encode(&[root.clone()], &viewport).unwrap();
//! let doc = decode(&text).unwrap();
//! assert_eq!(doc.layers, vec![root]);
//! ```

pub mod analysis;
pub mod error;
pub mod flatten;
pub mod format;
pub mod layer;

pub use error::{ErrorCode, FormatError};
pub use flatten::{flatten, flatten_in_place, flattened_children, is_content_only};
pub use format::{decode, encode, InterchangeDocument, ViewportMeta};
pub use layer::{
    AxisSizing, CounterAxisAlign, LayerContent, LayerKind, LayerNode, LayoutDescriptor,
    LayoutMode, Positioning, PrimaryAxisAlign, SelfAlign, SemanticTag, Sizing, TextAlign,
    TextCase, TextContent, TextDecoration,
};

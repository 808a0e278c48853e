use thiserror::Error;

/// Failures while reading a source or capturing one node.
///
/// Node-level errors never escape [`collect`](crate::collect): the node is
/// dropped and the error becomes a warning.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("snapshot is not valid: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("snapshot nests {depth} levels deep, the limit is {limit}")]
    TooDeep { depth: usize, limit: usize },

    #[error("<{tag}> has non-finite geometry")]
    Geometry { tag: String },

    #[error("vector markup rejected: {0}")]
    Svg(String),
}

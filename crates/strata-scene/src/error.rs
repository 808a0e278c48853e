use strata_engine::raster::RasterError;
use strata_engine::text::FontName;
use thiserror::Error;

use crate::host::SceneNodeId;

/// Failures reported by a [`TargetHost`](crate::TargetHost) or while
/// materializing one layer.
///
/// None of these abort a build: the failing layer is replaced by a marked
/// placeholder and its siblings continue.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("font {0} is not available")]
    FontUnavailable(FontName),

    #[error("image rejected: {0}")]
    InvalidImage(String),

    #[error("vector markup rejected: {0}")]
    Vector(String),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("unknown scene node {0:?}")]
    UnknownNode(SceneNodeId),

    #[error("host refused {operation}: {reason}")]
    Rejected { operation: &'static str, reason: String },
}

use serde::{Deserialize, Serialize};

/// Where image or vector bytes come from before they are resolved.
///
/// `Url` covers `src`, `poster`, `background-image: url(..)` and `data:` URIs.
/// `Snapshot` asks the source provider for a raster of a live element it
/// cannot express as a URL (canvas, video frame); the key is provider-defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetRef {
    Url { url: String },
    Snapshot { key: u64 },
}

impl AssetRef {
    #[inline]
    pub fn url(url: impl Into<String>) -> Self {
        AssetRef::Url { url: url.into() }
    }
}

/// Opaque reference to image bytes.
///
/// Lifecycle: `Pending` while the collector walks, `Inline` once resolved
/// (base64 in serialized form), `Handle` after a scene host registered the
/// bytes and returned a reusable identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    Pending { asset: AssetRef },
    Inline {
        #[serde(with = "base64_bytes")]
        bytes: Vec<u8>,
    },
    Handle { id: String },
}

impl ImageRef {
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, ImageRef::Pending { .. })
    }

    #[inline]
    pub fn inline_bytes(&self) -> Option<&[u8]> {
        match self {
            ImageRef::Inline { bytes } => Some(bytes),
            _ => None,
        }
    }
}

/// How an image paint maps onto its layer bounds.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScaleMode {
    /// Cover the bounds, cropping overflow (CSS `cover`, `object-fit: fill`).
    #[default]
    Fill,
    /// Fit inside the bounds (CSS `contain`, `scale-down`).
    Fit,
    /// Keep intrinsic size, cropped (CSS `none`).
    Crop,
    /// Repeat (CSS `background-repeat: repeat` with an explicit size).
    Tile,
}

impl ScaleMode {
    /// Maps an `object-fit` / `background-size` keyword.
    pub fn from_css(keyword: &str) -> Self {
        match keyword.trim() {
            "contain" | "scale-down" => ScaleMode::Fit,
            "none" => ScaleMode::Crop,
            _ => ScaleMode::Fill,
        }
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}

//! Versioned, checksummed interchange document.
//!
//! The document is compact JSON. Its checksum is the lowercase hex SHA-256 of
//! the document rendered without the `checksum` member; decode recomputes it
//! before any other field is trusted, and additionally requires the text to
//! be exactly the canonical rendering, so every byte of the payload is
//! covered. Numbers round-trip exactly (`float_roundtrip`), so a re-rendered
//! document hashes the same as the one `encode` wrote.
//!
//! Nesting is unbounded in `serde_json` here; [`MAX_LAYER_DEPTH`] and
//! [`MAX_NESTING`] bound it instead, on both sides.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::FormatError;
use crate::layer::LayerNode;

/// Magic constant identifying a strata layer document.
pub const MAGIC: &str = "strata/layers";

/// Schema version written by this crate.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Readers accept any document whose major version equals this.
pub const SCHEMA_MAJOR: u64 = 1;

const CHECKSUM_KEY: &str = "checksum";

/// Deepest layer tree `encode` writes. Capture depth is clamped to 256 and
/// outer-spacing wrappers can double it.
pub const MAX_LAYER_DEPTH: usize = 520;

/// Deepest JSON nesting `decode` parses: two levels per layer (node and
/// `children`), plus the document envelope and per-layer value objects.
pub const MAX_NESTING: usize = 2 * MAX_LAYER_DEPTH + 16;

// ── Document types ────────────────────────────────────────────────────────

/// Where and how the layers were captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportMeta {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
    /// Unix time in milliseconds. Zero means "stamp on encode".
    pub captured_at: u64,
    pub source_origin: String,
}

impl ViewportMeta {
    pub fn new(width: f32, height: f32, pixel_ratio: f32, source_origin: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
            captured_at: 0,
            source_origin: source_origin.into(),
        }
    }

    #[must_use]
    pub fn captured_at(mut self, unix_ms: u64) -> Self {
        self.captured_at = unix_ms;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterchangeDocument {
    pub magic: String,
    pub schema_version: String,
    pub viewport: ViewportMeta,
    pub layers: Vec<LayerNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl InterchangeDocument {
    /// Total number of layers across all roots.
    pub fn layer_count(&self) -> usize {
        self.layers.iter().map(LayerNode::subtree_len).sum()
    }
}

// ── Encode ────────────────────────────────────────────────────────────────

/// Encodes `layers` into a checksummed document string.
///
/// Stamps the current schema version, and the current time when
/// `viewport.captured_at` is zero.
pub fn encode(layers: &[LayerNode], viewport: &ViewportMeta) -> Result<String, FormatError> {
    let depth = layers.iter().map(layer_depth).max().unwrap_or(0);
    if depth > MAX_LAYER_DEPTH {
        return Err(FormatError::Encode(format!(
            "layer tree is {depth} levels deep, the limit is {MAX_LAYER_DEPTH}"
        )));
    }

    let mut viewport = viewport.clone();
    if viewport.captured_at == 0 {
        viewport.captured_at = now_unix_ms();
    }

    let doc = InterchangeDocument {
        magic: MAGIC.to_owned(),
        schema_version: SCHEMA_VERSION.to_owned(),
        viewport,
        layers: layers.to_vec(),
        checksum: None,
    };

    let mut value = serde_json::to_value(&doc).map_err(|e| FormatError::Encode(e.to_string()))?;
    let checksum = checksum_of(&value)?;
    match value.as_object_mut() {
        Some(map) => {
            map.insert(CHECKSUM_KEY.to_owned(), Value::String(checksum));
        }
        None => return Err(FormatError::Encode("document is not an object".into())),
    }
    serde_json::to_string(&value).map_err(|e| FormatError::Encode(e.to_string()))
}

/// Levels in the tree under `root`, counting `root` as 1.
fn layer_depth(root: &LayerNode) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(root, 1usize)];
    while let Some((node, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        stack.extend(node.children.iter().map(|c| (c, depth + 1)));
    }
    deepest
}

fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn checksum_of(value: &Value) -> Result<String, FormatError> {
    let canonical = serde_json::to_string(value).map_err(|e| FormatError::Encode(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

// ── Decode ────────────────────────────────────────────────────────────────

/// Decodes and validates a document. Any failed check rejects the whole
/// document.
///
/// Order: JSON, checksum, magic, version, viewport, layers, schema.
pub fn decode(text: &str) -> Result<InterchangeDocument, FormatError> {
    let value = parse_bounded(text, MAX_NESTING).map_err(FormatError::Malformed)?;
    let Some(map) = value.as_object() else {
        return Err(FormatError::Malformed("top level is not an object".into()));
    };

    check_checksum(map, &value, text)?;
    check_magic(map)?;
    check_version(map)?;
    check_viewport(map)?;
    if !map.get("layers").is_some_and(Value::is_array) {
        return Err(FormatError::MissingLayers);
    }

    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    InterchangeDocument::deserialize(&mut de).map_err(|e| FormatError::Schema(e.to_string()))
}

/// Deepest `[`/`{` nesting in `text`, ignoring brackets inside strings.
pub fn nesting_depth(text: &str) -> usize {
    let (mut depth, mut deepest) = (0usize, 0usize);
    let (mut in_string, mut escaped) = (false, false);
    for b in text.bytes() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Parses `text` into a [`Value`] without `serde_json`'s fixed recursion
/// limit, refusing anything nested deeper than `limit`.
pub fn parse_bounded(text: &str, limit: usize) -> Result<Value, String> {
    let depth = nesting_depth(text);
    if depth > limit {
        return Err(format!("nesting depth {depth} exceeds {limit}"));
    }
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de).map_err(|e| e.to_string())?;
    de.end().map_err(|e| e.to_string())?;
    Ok(value)
}

fn check_magic(map: &Map<String, Value>) -> Result<(), FormatError> {
    match map.get("magic").and_then(Value::as_str) {
        Some(MAGIC) => Ok(()),
        other => Err(FormatError::BadMagic { found: other.map(str::to_owned) }),
    }
}

fn check_version(map: &Map<String, Value>) -> Result<(), FormatError> {
    let found = map.get("schemaVersion").and_then(Value::as_str).unwrap_or_default();
    match semver::Version::parse(found) {
        Ok(v) if v.major == SCHEMA_MAJOR => Ok(()),
        _ => Err(FormatError::VersionMismatch {
            found: found.to_owned(),
            supported: SCHEMA_VERSION,
        }),
    }
}

fn check_viewport(map: &Map<String, Value>) -> Result<(), FormatError> {
    let Some(vp) = map.get("viewport").and_then(Value::as_object) else {
        return Err(FormatError::MissingViewport { field: "viewport" });
    };

    let positive = |field: &'static str| {
        match vp.get(field).and_then(Value::as_f64) {
            Some(v) if v.is_finite() && v > 0.0 => Ok(()),
            _ => Err(FormatError::MissingViewport { field }),
        }
    };
    positive("width")?;
    positive("height")?;
    positive("pixelRatio")?;

    if vp.get("capturedAt").and_then(Value::as_u64).is_none() {
        return Err(FormatError::MissingViewport { field: "capturedAt" });
    }
    if vp.get("sourceOrigin").and_then(Value::as_str).is_none() {
        return Err(FormatError::MissingViewport { field: "sourceOrigin" });
    }
    Ok(())
}

fn check_checksum(map: &Map<String, Value>, value: &Value, text: &str) -> Result<(), FormatError> {
    let expected = match map.get(CHECKSUM_KEY) {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(FormatError::MissingChecksum),
    };

    let stripped: Map<String, Value> = map
        .iter()
        .filter(|(k, _)| k.as_str() != CHECKSUM_KEY)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let actual = checksum_of(&Value::Object(stripped))?;
    if actual != expected {
        return Err(FormatError::ChecksumMismatch { expected, actual });
    }

    // Bytes outside the canonical rendering (spacing, escapes, number
    // spellings) are not covered by the hash, so they are refused too.
    let canonical = serde_json::to_string(value).map_err(|e| FormatError::Encode(e.to_string()))?;
    if canonical != text.trim() {
        return Err(FormatError::ChecksumMismatch {
            expected,
            actual: "non-canonical document text".into(),
        });
    }
    Ok(())
}

//! Bitmap probing and vector rasterization.
//!
//! Scene hosts use these helpers to validate image bytes before registering
//! them and to fall back to a PNG when vector markup cannot be instantiated
//! natively.

use std::io::Cursor;

use resvg::{tiny_skia, usvg};

use crate::coords::Vec2;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("unrecognized image data: {0}")]
    Decode(String),
    #[error("invalid vector markup: {0}")]
    Svg(#[from] usvg::Error),
    #[error("cannot rasterize at {width}x{height}")]
    BadSize { width: u32, height: u32 },
    #[error("png encoding failed: {0}")]
    Encode(String),
}

/// Pixel dimensions of an encoded bitmap, read from its header only.
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32), RasterError> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RasterError::Decode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| RasterError::Decode(e.to_string()))
}

/// Cheap sniff for SVG text (optionally behind an XML prolog or BOM).
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    let text = head.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// Intrinsic size declared by vector markup (`width`/`height` or `viewBox`).
pub fn svg_intrinsic_size(markup: &str) -> Result<Vec2, RasterError> {
    let tree = usvg::Tree::from_str(markup, &usvg::Options::default())?;
    let size = tree.size();
    Ok(Vec2::new(size.width(), size.height()))
}

/// Renders vector markup into a PNG of exactly `width × height` pixels.
pub fn rasterize_svg(markup: &str, width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
    let tree = usvg::Tree::from_str(markup, &usvg::Options::default())?;
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(RasterError::BadSize { width, height })?;

    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| RasterError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="12" viewBox="0 0 24 12"><rect width="24" height="12" fill="red"/></svg>"#;

    #[test]
    fn sniffs_svg_text() {
        assert!(looks_like_svg(SQUARE.as_bytes()));
        assert!(looks_like_svg(b"<?xml version=\"1.0\"?>\n<svg></svg>"));
        assert!(!looks_like_svg(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn reads_intrinsic_size() {
        let size = svg_intrinsic_size(SQUARE).unwrap();
        assert_eq!(size, Vec2::new(24.0, 12.0));
    }

    #[test]
    fn rasterized_png_has_requested_dimensions() {
        let png = rasterize_svg(SQUARE, 48, 24).unwrap();
        assert_eq!(image_dimensions(&png).unwrap(), (48, 24));
    }

    #[test]
    fn zero_size_raster_is_rejected() {
        assert!(matches!(rasterize_svg(SQUARE, 0, 10), Err(RasterError::BadSize { .. })));
    }

    #[test]
    fn garbage_is_not_an_image() {
        assert!(image_dimensions(b"definitely not pixels").is_err());
    }
}

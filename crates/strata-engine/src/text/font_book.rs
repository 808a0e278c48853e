use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::Vec2;

/// Error returned by [`FontBook::register`] and [`FontBook::lookup`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FontLoadError {
    #[error("font {0} is not available")]
    NotFound(FontName),
    #[error("font {name} could not be parsed: {reason}")]
    Parse { name: FontName, reason: String },
}

/// Family + style pair, e.g. `Inter` / `Semi Bold Italic`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl FontName {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self { family: family.into(), style: style.into() }
    }

    /// Builds the conventional style name for a CSS weight and italic flag.
    pub fn from_weight(family: impl Into<String>, weight: u16, italic: bool) -> Self {
        let base = match weight {
            0..=149 => "Thin",
            150..=249 => "Extra Light",
            250..=349 => "Light",
            350..=449 => "Regular",
            450..=549 => "Medium",
            550..=649 => "Semi Bold",
            650..=749 => "Bold",
            750..=849 => "Extra Bold",
            _ => "Black",
        };
        let style = match (base, italic) {
            ("Regular", true) => "Italic".to_string(),
            (b, true) => format!("{b} Italic"),
            (b, false) => b.to_string(),
        };
        Self::new(family, style)
    }

    /// Same family, `Regular` style.
    #[must_use]
    pub fn regular(&self) -> Self {
        Self::new(self.family.clone(), "Regular")
    }
}

impl fmt::Display for FontName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.style)
    }
}

/// Opaque handle to a font known to a [`FontBook`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// Registry of fonts a scene host can use.
///
/// A font is either *declared* (the host knows it exists, e.g. a system font,
/// but holds no outlines) or *registered* from TrueType/OpenType bytes, in
/// which case it is parsed with `fontdue` and used for measurement.
#[derive(Default)]
pub struct FontBook {
    faces: Vec<Option<fontdue::Font>>,
    by_name: HashMap<FontName, FontId>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as available without outline data.
    pub fn declare(&mut self, name: FontName) -> FontId {
        if let Some(id) = self.by_name.get(&name) {
            return *id;
        }
        let id = FontId(self.faces.len());
        self.faces.push(None);
        self.by_name.insert(name, id);
        id
    }

    /// Parses and stores a TrueType or OpenType font under `name`.
    pub fn register(&mut self, name: FontName, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError::Parse { name: name.clone(), reason: e.to_string() })?;
        let id = match self.by_name.get(&name) {
            Some(id) => {
                self.faces[id.0] = Some(font);
                *id
            }
            None => {
                let id = FontId(self.faces.len());
                self.faces.push(Some(font));
                self.by_name.insert(name, id);
                id
            }
        };
        Ok(id)
    }

    /// Resolves `name` to a handle.
    pub fn lookup(&self, name: &FontName) -> Result<FontId, FontLoadError> {
        self.by_name.get(name).copied().ok_or_else(|| FontLoadError::NotFound(name.clone()))
    }

    pub fn contains(&self, name: &FontName) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Computes the bounding box of a laid-out single-style string.
    ///
    /// Returns `(width, height)` in CSS pixels. Declared fonts without
    /// outlines fall back to an average-advance estimate of `0.55 × size` per
    /// character and `1.2 × size` per line.
    #[must_use]
    pub fn measure_text(&self, text: &str, id: FontId, size: f32, max_width: Option<f32>) -> Vec2 {
        use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

        let Some(Some(font)) = self.faces.get(id.0) else {
            return estimate(text, size, max_width);
        };

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings { max_width, ..LayoutSettings::default() });
        layout.append(&[font], &TextStyle::new(text, size, 0));

        let glyphs = layout.glyphs();
        if glyphs.is_empty() {
            return Vec2::new(0.0, size * 1.2);
        }

        // Pen position after each glyph rather than the bitmap edge, so the
        // measured width never wraps when reused as a max width.
        let w = glyphs
            .iter()
            .map(|g| {
                let m = font.metrics_indexed(g.key.glyph_index, size);
                (g.x - m.xmin as f32 + m.advance_width).max(0.0)
            })
            .fold(0.0f32, f32::max);
        let h = layout.height().max(size);
        Vec2::new(w, h)
    }
}

fn estimate(text: &str, size: f32, max_width: Option<f32>) -> Vec2 {
    let line_h = size * 1.2;
    let advance = size * 0.55;
    let mut lines = 0usize;
    let mut widest = 0.0f32;
    for line in text.split('\n') {
        let natural = line.chars().count() as f32 * advance;
        match max_width {
            Some(max) if max > 0.0 && natural > max => {
                lines += (natural / max).ceil() as usize;
                widest = widest.max(max);
            }
            _ => {
                lines += 1;
                widest = widest.max(natural);
            }
        }
    }
    Vec2::new(widest, lines.max(1) as f32 * line_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_names_follow_weight() {
        assert_eq!(FontName::from_weight("Inter", 400, false).style, "Regular");
        assert_eq!(FontName::from_weight("Inter", 700, false).style, "Bold");
        assert_eq!(FontName::from_weight("Inter", 400, true).style, "Italic");
        assert_eq!(FontName::from_weight("Inter", 600, true).style, "Semi Bold Italic");
    }

    #[test]
    fn declared_font_resolves() {
        let mut book = FontBook::new();
        let id = book.declare(FontName::new("Inter", "Regular"));
        assert_eq!(book.lookup(&FontName::new("Inter", "Regular")), Ok(id));
        assert!(matches!(
            book.lookup(&FontName::new("Inter", "Bold")),
            Err(FontLoadError::NotFound(_))
        ));
    }

    #[test]
    fn garbage_bytes_fail_to_register() {
        let mut book = FontBook::new();
        let err = book.register(FontName::new("Broken", "Regular"), b"not a font").unwrap_err();
        assert!(matches!(err, FontLoadError::Parse { .. }));
        assert!(book.is_empty());
    }

    #[test]
    fn estimate_wraps_at_max_width() {
        let mut book = FontBook::new();
        let id = book.declare(FontName::new("Inter", "Regular"));
        let one_line = book.measure_text("abcd", id, 10.0, None);
        assert!((one_line.y - 12.0).abs() < 1e-4);
        let wrapped = book.measure_text("abcdefghijklmnopqrst", id, 10.0, Some(50.0));
        assert!(wrapped.y > one_line.y);
        assert!(wrapped.x <= 50.0);
    }
}

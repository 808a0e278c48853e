//! Element content classification and vector markup sanitizing.

use std::borrow::Cow;

use quick_xml::{Reader, Writer};
use quick_xml::events::{BytesStart, Event};
use strata_ir::SemanticTag;

use crate::error::CaptureError;

/// How an element's own content is captured. Chosen once per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `<img>`: bitmap asset from `src`.
    Image,
    /// `<video>`: poster image, else a raster snapshot.
    Video,
    /// `<canvas>`: raster snapshot.
    Canvas,
    /// `<picture>`: the asset of its `<img>` child.
    Picture,
    /// Inline `<svg>`: sanitized markup.
    Vector,
    /// `<iframe>` and friends: recursed when readable, else a labeled placeholder.
    EmbeddedFrame,
    /// `<input>`, `<textarea>`, `<select>`: frame plus value/placeholder text.
    FormControl,
    /// Everything else: a frame whose children are captured.
    Plain,
}

impl ContentKind {
    pub fn classify(tag: &str) -> Self {
        match tag {
            "img" => ContentKind::Image,
            "video" => ContentKind::Video,
            "canvas" => ContentKind::Canvas,
            "picture" => ContentKind::Picture,
            "svg" => ContentKind::Vector,
            "iframe" | "frame" | "embed" | "object" => ContentKind::EmbeddedFrame,
            "input" | "textarea" | "select" => ContentKind::FormControl,
            _ => ContentKind::Plain,
        }
    }

    /// Whether the element's DOM children are walked.
    #[inline]
    pub fn walks_children(self) -> bool {
        matches!(self, ContentKind::Plain | ContentKind::EmbeddedFrame)
    }
}

/// Tags that never render.
pub fn is_metadata_tag(tag: &str) -> bool {
    matches!(
        tag,
        "script" | "style" | "meta" | "link" | "head" | "title" | "noscript" | "template" | "base"
    )
}

/// Semantic meaning of an element, from its tag, `type` and `role`.
pub fn semantic_tag(tag: &str, input_type: Option<&str>, role: Option<&str>) -> Option<SemanticTag> {
    if role == Some("button") {
        return Some(SemanticTag::Button);
    }
    match tag {
        "button" => Some(SemanticTag::Button),
        "input" if matches!(input_type, Some("button" | "submit" | "reset")) => Some(SemanticTag::Button),
        "input" | "textarea" | "select" => Some(SemanticTag::Input),
        "img" | "picture" | "video" | "canvas" | "svg" => Some(SemanticTag::Image),
        "section" | "header" | "footer" | "main" | "nav" | "article" | "aside" => Some(SemanticTag::Section),
        "div" => Some(SemanticTag::Container),
        _ => None,
    }
}

// ── Vector sanitizing ─────────────────────────────────────────────────────

const FORBIDDEN_ELEMENTS: [&str; 2] = ["script", "foreignobject"];
const FORBIDDEN_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:text/html"];

fn is_forbidden_element(local_name: &[u8]) -> bool {
    let name = String::from_utf8_lossy(local_name).to_ascii_lowercase();
    FORBIDDEN_ELEMENTS.contains(&name.as_str())
}

fn is_forbidden_value(value: &str) -> bool {
    let squashed: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    FORBIDDEN_SCHEMES.iter().any(|s| squashed.contains(s))
}

/// Strips script-bearing content from SVG markup: `<script>` and
/// `<foreignObject>` subtrees, `on*` handler attributes, and attributes
/// whose value carries a `javascript:`, `vbscript:` or `data:text/html` URI.
/// Comments, processing instructions and doctypes are dropped too.
pub fn sanitize_svg(markup: &str) -> Result<String, CaptureError> {
    let mut reader = Reader::from_str(markup);
    let mut writer = Writer::new(Vec::with_capacity(markup.len()));
    let mut skip_depth = 0usize;
    let mut saw_root = false;

    loop {
        let event = reader.read_event().map_err(|e| CaptureError::Svg(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(_) if skip_depth > 0 => skip_depth += 1,
            Event::End(_) if skip_depth > 0 => skip_depth -= 1,
            _ if skip_depth > 0 => {}

            Event::Start(e) if is_forbidden_element(e.local_name().as_ref()) => skip_depth = 1,
            Event::Empty(e) if is_forbidden_element(e.local_name().as_ref()) => {}

            Event::Start(e) => {
                saw_root = true;
                let clean = clean_element(&reader, &e)?;
                write(&mut writer, Event::Start(clean))?;
            }
            Event::Empty(e) => {
                saw_root = true;
                let clean = clean_element(&reader, &e)?;
                write(&mut writer, Event::Empty(clean))?;
            }
            Event::Comment(_) | Event::PI(_) | Event::DocType(_) | Event::Decl(_) => {}
            other => write(&mut writer, other)?,
        }
    }

    if !saw_root {
        return Err(CaptureError::Svg("no elements".into()));
    }
    String::from_utf8(writer.into_inner()).map_err(|e| CaptureError::Svg(e.to_string()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), CaptureError> {
    writer.write_event(event).map_err(|e| CaptureError::Svg(e.to_string()))
}

fn clean_element(reader: &Reader<&[u8]>, element: &BytesStart<'_>) -> Result<BytesStart<'static>, CaptureError> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut clean = BytesStart::new(name);

    for attr in element.attributes() {
        let attr = attr.map_err(|e| CaptureError::Svg(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let local = key.rsplit(':').next().unwrap_or(&key).to_ascii_lowercase();
        if local.starts_with("on") {
            continue;
        }

        let raw = reader.decoder().decode(attr.value.as_ref()).unwrap_or_default();
        let value: Cow<'_, str> = match quick_xml::escape::unescape(&raw) {
            Ok(v) => v,
            // Unresolvable entities could hide a scheme; drop the attribute.
            Err(_) => continue,
        };
        if is_forbidden_value(&value) {
            continue;
        }
        clean.push_attribute((key.as_str(), value.as_ref()));
    }
    Ok(clean.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_closed() {
        assert_eq!(ContentKind::classify("img"), ContentKind::Image);
        assert_eq!(ContentKind::classify("iframe"), ContentKind::EmbeddedFrame);
        assert_eq!(ContentKind::classify("textarea"), ContentKind::FormControl);
        assert_eq!(ContentKind::classify("span"), ContentKind::Plain);
        assert!(!ContentKind::Image.walks_children());
    }

    #[test]
    fn semantics() {
        assert_eq!(semantic_tag("button", None, None), Some(SemanticTag::Button));
        assert_eq!(semantic_tag("input", Some("submit"), None), Some(SemanticTag::Button));
        assert_eq!(semantic_tag("input", Some("text"), None), Some(SemanticTag::Input));
        assert_eq!(semantic_tag("a", None, Some("button")), Some(SemanticTag::Button));
        assert_eq!(semantic_tag("span", None, None), None);
    }

    // ── sanitize_svg ──────────────────────────────────────────────────────

    #[test]
    fn strips_scripts_and_handlers() {
        let dirty = r#"<svg xmlns="http://www.w3.org/2000/svg" onload="alert(1)" width="10" height="10"><script>alert(2)</script><rect width="10" height="10" onclick="x()" fill="red"/><foreignObject><div>hi</div></foreignObject></svg>"#;
        let clean = sanitize_svg(dirty).unwrap();
        assert!(!clean.contains("script"));
        assert!(!clean.contains("alert"));
        assert!(!clean.contains("onclick"));
        assert!(!clean.contains("foreignObject"));
        assert!(clean.contains(r#"fill="red""#));
        assert!(clean.contains(r#"width="10""#));
    }

    #[test]
    fn strips_dangerous_uris() {
        let dirty = r#"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><a xlink:href="java&#115;cript:alert(1)"><circle r="1"/></a><image href="data:text/html;base64,AAAA"/><image href="logo.png"/></svg>"#;
        let clean = sanitize_svg(dirty).unwrap();
        assert!(!clean.to_ascii_lowercase().contains("javascript"));
        assert!(!clean.contains("data:text/html"));
        assert!(clean.contains("logo.png"));
        assert!(clean.contains("<circle"));
    }

    #[test]
    fn rejects_broken_markup() {
        assert!(sanitize_svg("<svg><g></svg>").is_err());
        assert!(sanitize_svg("just text").is_err());
    }
}

//! Box paint extraction: backgrounds, borders, radii, effects and text style.

use strata_engine::coords::{CornerRadii, Rect};
use strata_engine::paint::{AssetRef, Color, ImageRef, Paint, ScaleMode, StrokeAlign};
use strata_ir::{LayerNode, TextAlign, TextContent};

use crate::css::{self, BackgroundLayer, Length};
use crate::layout;
use crate::source::ComputedStyle;

/// Family used when a style names none.
pub const DEFAULT_FAMILY: &str = "Inter";

/// Fills, strokes, corner radii and effects of a box.
///
/// Fills are bottom-first: background color, then background-image layers
/// in reverse declaration order.
pub fn apply_box_paint(node: &mut LayerNode, style: &ComputedStyle) {
    if let Some(fill) = css::parse_color(style.get("background-color")).and_then(Paint::solid) {
        node.fills.push(fill);
    }
    let layers = css::parse_background_images(style.get("background-image"));
    for layer in layers.into_iter().rev() {
        match layer {
            BackgroundLayer::Gradient(paint) => node.fills.push(paint),
            BackgroundLayer::Url(url) => node.fills.push(Paint::image(
                ImageRef::Pending { asset: AssetRef::url(url) },
                background_scale_mode(style),
            )),
        }
    }

    apply_border(node, style);
    apply_radii(node, style);

    node.effects.extend(css::parse_box_shadow(style.get("box-shadow")));
    node.effects.extend(css::parse_drop_shadow(style.get("filter")));
    node.effects.extend(css::parse_backdrop_blur(style.get("backdrop-filter")));
}

fn background_scale_mode(style: &ComputedStyle) -> ScaleMode {
    match style.get("background-size") {
        "cover" => ScaleMode::Fill,
        "contain" => ScaleMode::Fit,
        _ if style.get("background-repeat").starts_with("repeat") => ScaleMode::Tile,
        other => ScaleMode::from_css(other),
    }
}

/// One uniform stroke. Mixed sides collapse to the widest visible side.
fn apply_border(node: &mut LayerNode, style: &ComputedStyle) {
    let widths = layout::border_widths(style);
    let sides = [("top", widths.top), ("right", widths.right), ("bottom", widths.bottom), ("left", widths.left)];

    let widest = sides
        .iter()
        .filter(|(_, w)| *w > 0.0)
        .filter_map(|(name, w)| {
            let color = css::parse_color(style.get(&format!("border-{name}-color")))?;
            (!color.is_transparent()).then_some((*w, color))
        })
        .max_by(|a, b| a.0.total_cmp(&b.0));

    if let Some((weight, color)) = widest
        && let Some(stroke) = Paint::solid(color)
    {
        node.strokes.push(stroke);
        node.stroke_weight = Some(weight);
        node.stroke_align = Some(StrokeAlign::Inside);
    }
}

fn apply_radii(node: &mut LayerNode, style: &ComputedStyle) {
    let shortest = node.width.min(node.height);
    let corner = |name: &str| {
        let value = style.get(name);
        // Elliptical radii (`8px 4px`) use their horizontal component.
        let first = value.split_whitespace().next().unwrap_or("");
        match css::parse_length(first) {
            Length::Px(v) => v,
            Length::Percent(p) => shortest * p / 100.0,
            Length::Auto => 0.0,
        }
        .max(0.0)
    };
    let radii = CornerRadii::new(
        corner("border-top-left-radius"),
        corner("border-top-right-radius"),
        corner("border-bottom-right-radius"),
        corner("border-bottom-left-radius"),
    );
    if radii.is_zero() {
        return;
    }
    if radii.is_uniform() {
        node.corner_radius = Some(radii.top_left.min(shortest / 2.0));
    } else {
        node.corner_radii = Some(radii.clamped());
    }
}

/// Text payload from a resolved style.
pub fn text_content(characters: String, style: &ComputedStyle) -> TextContent {
    let size = style.font_size();
    let decoration = match style.get("text-decoration-line") {
        "" => style.get("text-decoration"),
        line => line,
    };
    TextContent {
        characters,
        font_family: css::parse_font_family(style.get("font-family"))
            .unwrap_or_else(|| DEFAULT_FAMILY.to_owned()),
        font_weight: css::parse_font_weight(style.get("font-weight")),
        font_size: size,
        italic: style.get("font-style").starts_with("italic") || style.get("font-style").starts_with("oblique"),
        align: match style.get("text-align") {
            "center" => TextAlign::Center,
            "right" | "end" => TextAlign::Right,
            "justify" => TextAlign::Justified,
            _ => TextAlign::Left,
        },
        line_height: css::parse_line_height(style.get("line-height"), size),
        letter_spacing: css::parse_letter_spacing(style.get("letter-spacing"), size),
        case: css::parse_text_transform(style.get("text-transform")),
        decoration: css::parse_text_decoration(decoration),
    }
}

/// Text color as a fill, `None` when transparent.
pub fn text_fill(style: &ComputedStyle) -> Option<Paint> {
    let color = css::parse_color(style.get("color")).unwrap_or(Color::black());
    Paint::solid(color)
}

/// Content box of `rect` under `style` (border box minus border and padding).
pub fn content_box(rect: Rect, style: &ComputedStyle) -> Rect {
    rect.inset(layout::border_widths(style)).inset(layout::padding(style))
}

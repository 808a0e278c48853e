//! Parsers for computed-style declarations.
//!
//! Every function is pure and tolerant: malformed input yields `None`, an
//! empty list or the property's initial value, never an error. Inputs are
//! expected in resolved (computed) form, so lengths are mostly `px`.

use strata_engine::coords::Vec2;
use strata_engine::paint::{Color, ColorStop, Effect, Gradient, Paint};
use strata_ir::{TextCase, TextDecoration};

// ── Splitting ─────────────────────────────────────────────────────────────

/// Splits `input` on `sep`, ignoring separators nested inside parentheses.
/// Pieces are trimmed; empty pieces are dropped.
pub fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    split_with(input, |c| c == sep)
}

/// Whitespace variant of [`split_top_level`].
pub fn split_whitespace_top_level(input: &str) -> Vec<&str> {
    split_with(input, char::is_whitespace)
}

fn split_with(input: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && is_sep(c) => {
                out.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    out.push(&input[start..]);
    out.into_iter().map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// `name(args)` → `(name, args)`.
fn function_call(input: &str) -> Option<(&str, &str)> {
    let open = input.find('(')?;
    let inner = input[open + 1..].trim_end().strip_suffix(')')?;
    Some((input[..open].trim(), inner))
}

// ── Lengths ───────────────────────────────────────────────────────────────

/// A resolved or keyword length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    /// Percentage of the containing block, e.g. `50.0` for `50%`.
    Percent(f32),
    /// `auto` and every content keyword (`fit-content`, `max-content`, ..).
    Auto,
}

pub fn parse_length(input: &str) -> Length {
    let s = input.trim();
    if let Some(p) = s.strip_suffix('%') {
        return p.trim().parse().map(Length::Percent).unwrap_or(Length::Auto);
    }
    parse_px(s).map(Length::Px).unwrap_or(Length::Auto)
}

/// `12px`, `-3.5px` or a bare number.
pub fn parse_px(input: &str) -> Option<f32> {
    let s = input.trim();
    let num = s.strip_suffix("px").unwrap_or(s);
    let v: f32 = num.trim().parse().ok()?;
    v.is_finite().then_some(v)
}

/// Angle in degrees from `deg`, `grad`, `rad`, `turn` or a bare zero.
pub fn parse_angle(input: &str) -> Option<f32> {
    let s = input.trim();
    let num = |suffix: &str| s.strip_suffix(suffix).and_then(|n| n.trim().parse::<f32>().ok());
    let deg = if let Some(v) = num("deg") {
        v
    } else if let Some(v) = num("grad") {
        v * 0.9
    } else if let Some(v) = num("rad") {
        v.to_degrees()
    } else if let Some(v) = num("turn") {
        v * 360.0
    } else if s == "0" {
        0.0
    } else {
        return None;
    };
    deg.is_finite().then_some(deg)
}

// ── Color ─────────────────────────────────────────────────────────────────

/// Parses `#rgb[a]`, `#rrggbb[aa]`, `rgb[a]()`, `hsl[a]()` and named colors.
pub fn parse_color(input: &str) -> Option<Color> {
    let s = input.trim().to_ascii_lowercase();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some((name, args)) = function_call(&s) {
        return match name {
            "rgb" | "rgba" => parse_rgb_args(args),
            "hsl" | "hsla" => parse_hsl_args(args),
            _ => None,
        };
    }
    named_color(&s)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let (r, g, b, a) = match hex.len() {
        3 => (nibble(0)?, nibble(1)?, nibble(2)?, 255),
        4 => (nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
        6 => (byte(0)?, byte(2)?, byte(4)?, 255),
        8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
        _ => return None,
    };
    Some(Color::from_srgb_u8(r, g, b, a))
}

/// Splits color-function arguments in either comma or space/slash syntax.
fn color_args(args: &str) -> Option<([&str; 3], Option<&str>)> {
    if args.contains(',') {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        return match parts.as_slice() {
            [a, b, c] => Some(([*a, *b, *c], None)),
            [a, b, c, alpha] => Some(([*a, *b, *c], Some(*alpha))),
            _ => None,
        };
    }
    let (channels, alpha) = match args.split_once('/') {
        Some((c, a)) => (c, Some(a.trim())),
        None => (args, None),
    };
    match channels.split_whitespace().collect::<Vec<_>>().as_slice() {
        [a, b, c] => Some(([*a, *b, *c], alpha)),
        _ => None,
    }
}

fn parse_alpha(input: Option<&str>) -> Option<f32> {
    match input {
        None => Some(1.0),
        Some(a) => match a.strip_suffix('%') {
            Some(p) => p.trim().parse::<f32>().ok().map(|v| v / 100.0),
            None => a.parse().ok(),
        },
    }
    .map(|a: f32| a.clamp(0.0, 1.0))
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let (channels, alpha) = color_args(args)?;
    let channel = |s: &str| -> Option<f32> {
        let v = match s.strip_suffix('%') {
            Some(p) => p.trim().parse::<f32>().ok()? / 100.0,
            None => s.parse::<f32>().ok()? / 255.0,
        };
        Some(v.clamp(0.0, 1.0))
    };
    Some(Color::from_srgb(
        channel(channels[0])?,
        channel(channels[1])?,
        channel(channels[2])?,
        parse_alpha(alpha)?,
    ))
}

fn parse_hsl_args(args: &str) -> Option<Color> {
    let (channels, alpha) = color_args(args)?;
    let hue = parse_angle(channels[0]).or_else(|| channels[0].parse().ok())?;
    let pct = |s: &str| -> Option<f32> {
        let v: f32 = s.strip_suffix('%').unwrap_or(s).trim().parse().ok()?;
        Some((v / 100.0).clamp(0.0, 1.0))
    };
    let (r, g, b) = hsl_to_rgb(hue, pct(channels[1])?, pct(channels[2])?);
    Some(Color::from_srgb(r, g, b, parse_alpha(alpha)?))
}

fn hsl_to_rgb(hue: f32, sat: f32, light: f32) -> (f32, f32, f32) {
    let c = (1.0 - (2.0 * light - 1.0).abs()) * sat;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = light - c / 2.0;
    (r + m, g + m, b + m)
}

fn named_color(name: &str) -> Option<Color> {
    let rgb = |r, g, b| Some(Color::from_srgb_u8(r, g, b, 255));
    match name {
        "transparent" => Some(Color::transparent()),
        "black" => rgb(0, 0, 0),
        "white" => rgb(255, 255, 255),
        "red" => rgb(255, 0, 0),
        "green" => rgb(0, 128, 0),
        "lime" => rgb(0, 255, 0),
        "blue" => rgb(0, 0, 255),
        "navy" => rgb(0, 0, 128),
        "yellow" => rgb(255, 255, 0),
        "orange" => rgb(255, 165, 0),
        "purple" => rgb(128, 0, 128),
        "fuchsia" | "magenta" => rgb(255, 0, 255),
        "aqua" | "cyan" => rgb(0, 255, 255),
        "teal" => rgb(0, 128, 128),
        "olive" => rgb(128, 128, 0),
        "maroon" => rgb(128, 0, 0),
        "silver" => rgb(192, 192, 192),
        "gray" | "grey" => rgb(128, 128, 128),
        "lightgray" | "lightgrey" => rgb(211, 211, 211),
        "darkgray" | "darkgrey" => rgb(169, 169, 169),
        _ => None,
    }
}

// ── Shadows and filters ───────────────────────────────────────────────────

fn parse_shadow(item: &str) -> Option<Effect> {
    let mut inset = false;
    let mut color = None;
    let mut lengths = Vec::with_capacity(4);

    for token in split_whitespace_top_level(item) {
        if token == "inset" {
            inset = true;
        } else if let Some(v) = parse_px(token) {
            lengths.push(v);
        } else if let Some(c) = parse_color(token) {
            color = Some(c);
        } else {
            return None;
        }
    }
    if !(2..=4).contains(&lengths.len()) {
        return None;
    }

    let color = color.unwrap_or(Color::black());
    let offset = Vec2::new(lengths[0], lengths[1]);
    let radius = lengths.get(2).copied().unwrap_or(0.0);
    let spread = lengths.get(3).copied().unwrap_or(0.0);
    Some(if inset {
        Effect::inner_shadow(color, offset, radius, spread)
    } else {
        Effect::drop_shadow(color, offset, radius, spread)
    })
}

/// `box-shadow`: comma list, `inset`, 2–4 lengths, color anywhere.
/// Invisible shadows are dropped.
pub fn parse_box_shadow(input: &str) -> Vec<Effect> {
    if input.trim() == "none" {
        return Vec::new();
    }
    split_top_level(input, ',')
        .into_iter()
        .filter_map(parse_shadow)
        .filter(Effect::is_visible)
        .collect()
}

/// Every `drop-shadow(..)` in a `filter` declaration.
pub fn parse_drop_shadow(filter: &str) -> Vec<Effect> {
    split_whitespace_top_level(filter)
        .into_iter()
        .filter_map(function_call)
        .filter(|(name, _)| *name == "drop-shadow")
        .filter_map(|(_, args)| parse_shadow(args))
        .filter(|e| e.is_shadow() && e.is_visible())
        .collect()
}

/// `backdrop-filter: blur(Npx)`.
pub fn parse_backdrop_blur(input: &str) -> Option<Effect> {
    split_whitespace_top_level(input)
        .into_iter()
        .filter_map(function_call)
        .find(|(name, _)| *name == "blur")
        .and_then(|(_, args)| parse_px(args))
        .filter(|r| *r > 0.0)
        .map(Effect::background_blur)
}

// ── Gradients and backgrounds ─────────────────────────────────────────────

/// `linear-gradient(..)` or `radial-gradient(..)`. `repeating-` variants are
/// read as their non-repeating form.
pub fn parse_gradient(input: &str) -> Option<Paint> {
    let (name, args) = function_call(input.trim())?;
    let name = name.to_ascii_lowercase();
    let name = name.strip_prefix("repeating-").unwrap_or(name.as_str());
    let parts = split_top_level(args, ',');

    let gradient = match name {
        "linear-gradient" => {
            let direction = parts.first().and_then(|p| parse_direction(p));
            let skip = usize::from(direction.is_some());
            Gradient::new(parse_stops(parts.get(skip..)?)?, direction.unwrap_or(180.0))
        }
        "radial-gradient" => {
            // A leading shape/size/position argument carries no color.
            let skip = usize::from(parts.first().is_some_and(|p| parse_stop(p).is_none()));
            Gradient::new(parse_stops(parts.get(skip..)?)?, 0.0)
        }
        _ => return None,
    };

    if !gradient.is_valid() || gradient.is_invisible() {
        return None;
    }
    Some(match name {
        "linear-gradient" => Paint::LinearGradient(gradient),
        _ => Paint::RadialGradient(gradient),
    })
}

fn parse_direction(arg: &str) -> Option<f32> {
    let arg = arg.trim();
    let Some(side) = arg.strip_prefix("to ") else {
        return parse_angle(arg);
    };
    let mut words: Vec<&str> = side.split_whitespace().collect();
    words.sort_unstable();
    Some(match words.as_slice() {
        ["top"] => 0.0,
        ["right", "top"] => 45.0,
        ["right"] => 90.0,
        ["bottom", "right"] => 135.0,
        ["bottom"] => 180.0,
        ["bottom", "left"] => 225.0,
        ["left"] => 270.0,
        ["left", "top"] => 315.0,
        _ => return None,
    })
}

/// One stop argument: a color followed by zero, one or two positions.
/// Positions that cannot be resolved to a fraction stay implicit.
fn parse_stop(arg: &str) -> Option<(Color, Vec<Option<f32>>)> {
    let tokens = split_whitespace_top_level(arg);
    let (first, rest) = tokens.split_first()?;
    let color = parse_color(first)?;
    let positions = rest
        .iter()
        .map(|t| t.strip_suffix('%').and_then(|p| p.trim().parse::<f32>().ok()).map(|p| p / 100.0))
        .collect();
    Some((color, positions))
}

fn parse_stops(args: &[&str]) -> Option<Vec<ColorStop>> {
    let mut raw: Vec<(Color, Option<f32>)> = Vec::with_capacity(args.len());
    for arg in args {
        let (color, positions) = parse_stop(arg)?;
        if positions.is_empty() {
            raw.push((color, None));
        } else {
            raw.extend(positions.into_iter().map(|p| (color, p)));
        }
    }
    if raw.len() < 2 {
        return None;
    }

    let last = raw.len() - 1;
    raw[0].1.get_or_insert(0.0);
    raw[last].1.get_or_insert(1.0);

    // Implicit interior positions are spread evenly between known neighbours.
    let mut i = 1;
    while i < last {
        if raw[i].1.is_some() {
            i += 1;
            continue;
        }
        let prev = raw[i - 1].1.unwrap_or(0.0);
        let mut j = i;
        while raw[j].1.is_none() {
            j += 1;
        }
        let next = raw[j].1.unwrap_or(1.0);
        let span = (j - i + 1) as f32;
        for (k, slot) in raw[i..j].iter_mut().enumerate() {
            slot.1 = Some(prev + (next - prev) * (k + 1) as f32 / span);
        }
        i = j;
    }

    let mut floor = 0.0f32;
    Some(
        raw.into_iter()
            .map(|(color, pos)| {
                floor = pos.unwrap_or(floor).max(floor);
                ColorStop::new(floor.clamp(0.0, 1.0), color)
            })
            .collect(),
    )
}

/// One `background-image` layer.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundLayer {
    Url(String),
    Gradient(Paint),
}

/// `background-image` layers in declaration order (top-most first).
pub fn parse_background_images(input: &str) -> Vec<BackgroundLayer> {
    split_top_level(input, ',')
        .into_iter()
        .filter_map(|layer| {
            if let Some(url) = parse_url(layer) {
                Some(BackgroundLayer::Url(url))
            } else {
                parse_gradient(layer).map(BackgroundLayer::Gradient)
            }
        })
        .collect()
}

/// `url("..")`, `url('..')` or `url(..)`.
pub fn parse_url(input: &str) -> Option<String> {
    let (name, args) = function_call(input.trim())?;
    if !name.eq_ignore_ascii_case("url") {
        return None;
    }
    let url = args.trim().trim_matches(|c| c == '"' || c == '\'');
    (!url.is_empty()).then(|| url.to_owned())
}

// ── Layout ────────────────────────────────────────────────────────────────

/// `gap` as `(row, column)`. One value applies to both axes.
pub fn parse_gap(input: &str) -> (f32, f32) {
    let value = |s: &str| parse_px(s).unwrap_or(0.0).max(0.0);
    match input.split_whitespace().collect::<Vec<_>>().as_slice() {
        [both] => (value(*both), value(*both)),
        [row, column, ..] => (value(*row), value(*column)),
        [] => (0.0, 0.0),
    }
}

/// Rotation in degrees from a computed `transform`, `None` when unrotated.
pub fn parse_transform_rotation(input: &str) -> Option<f32> {
    let (name, args) = function_call(input.trim())?;
    let deg = match name {
        "matrix" | "matrix3d" => {
            let nums: Vec<f32> = args.split(',').filter_map(|n| n.trim().parse().ok()).collect();
            let (a, b) = (*nums.first()?, *nums.get(1)?);
            b.atan2(a).to_degrees()
        }
        "rotate" | "rotateZ" => parse_angle(args)?,
        _ => return None,
    };
    (deg.is_finite() && deg.abs() > 0.01).then_some(deg)
}

// ── Typography ────────────────────────────────────────────────────────────

/// Line height in px. `normal` resolves to `1.2 × font_size`.
pub fn parse_line_height(input: &str, font_size: f32) -> Option<f32> {
    let s = input.trim();
    if s == "normal" {
        return Some(font_size * 1.2);
    }
    if let Some(p) = s.strip_suffix('%') {
        return p.trim().parse::<f32>().ok().map(|v| v / 100.0 * font_size);
    }
    if let Some(em) = s.strip_suffix("em") {
        return em.trim().parse::<f32>().ok().map(|v| v * font_size);
    }
    if let Some(px) = s.strip_suffix("px") {
        return px.trim().parse().ok();
    }
    s.parse::<f32>().ok().map(|v| v * font_size)
}

/// Letter spacing in px. `normal` is zero.
pub fn parse_letter_spacing(input: &str, font_size: f32) -> f32 {
    let s = input.trim();
    if let Some(em) = s.strip_suffix("em") {
        return em.trim().parse::<f32>().map(|v| v * font_size).unwrap_or(0.0);
    }
    parse_px(s).unwrap_or(0.0)
}

pub fn parse_text_transform(input: &str) -> TextCase {
    match input.trim() {
        "uppercase" => TextCase::Upper,
        "lowercase" => TextCase::Lower,
        "capitalize" => TextCase::Title,
        _ => TextCase::Original,
    }
}

/// Reads `text-decoration` or `text-decoration-line`.
pub fn parse_text_decoration(input: &str) -> TextDecoration {
    if input.contains("underline") {
        TextDecoration::Underline
    } else if input.contains("line-through") {
        TextDecoration::Strikethrough
    } else {
        TextDecoration::None
    }
}

pub fn parse_font_weight(input: &str) -> u16 {
    match input.trim() {
        "bold" | "bolder" => 700,
        "lighter" => 300,
        s => s.parse::<f32>().map(|w| w.clamp(1.0, 1000.0) as u16).unwrap_or(400),
    }
}

/// First family of a `font-family` list, unquoted.
pub fn parse_font_family(input: &str) -> Option<String> {
    input
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
        .find(|f| !f.is_empty())
        .map(str::to_owned)
}

/// Collapses whitespace runs to one space and trims, unless `white-space`
/// preserves it.
pub fn collapse_whitespace(text: &str, white_space: &str) -> String {
    if white_space.starts_with("pre") || white_space == "break-spaces" {
        return text.to_owned();
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_engine::paint::EffectKind;

    fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color::from_srgb_u8(r, g, b, a)
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    // ── splitting ─────────────────────────────────────────────────────────

    #[test]
    fn split_respects_parentheses() {
        let parts = split_top_level("rgb(0, 0, 0) 1px 2px, inset 0 0 3px red", ',');
        assert_eq!(parts, ["rgb(0, 0, 0) 1px 2px", "inset 0 0 3px red"]);
        assert_eq!(split_whitespace_top_level(" rgba(1, 2, 3, 0.5)  4px "), ["rgba(1, 2, 3, 0.5)", "4px"]);
    }

    // ── colors ────────────────────────────────────────────────────────────

    #[test]
    fn hex_forms() {
        assert_eq!(parse_color("#f00"), Some(rgba(255, 0, 0, 255)));
        assert_eq!(parse_color("#ff000080"), Some(rgba(255, 0, 0, 128)));
        assert_eq!(parse_color("#0f08"), Some(rgba(0, 255, 0, 136)));
        assert_eq!(parse_color("#12345"), None);
    }

    #[test]
    fn functional_forms() {
        assert_eq!(parse_color("rgb(10, 20, 30)").map(Color::to_srgb_u8), Some([10, 20, 30, 255]));
        let c = parse_color("rgba(0, 0, 0, 0.5)").unwrap();
        assert!(approx(c.a, 0.5));
        let c = parse_color("rgb(255 128 0 / 25%)").unwrap();
        assert_eq!(c.to_srgb_u8(), [255, 128, 0, 64]);
        assert_eq!(parse_color("hsl(120, 100%, 50%)").map(Color::to_srgb_u8), Some([0, 255, 0, 255]));
        assert_eq!(parse_color("hsla(0deg 100% 50% / 0.5)").map(Color::to_srgb_u8), Some([255, 0, 0, 128]));
    }

    #[test]
    fn named_and_transparent() {
        assert_eq!(parse_color("Transparent"), Some(Color::transparent()));
        assert_eq!(parse_color("white"), Some(rgba(255, 255, 255, 255)));
        assert_eq!(parse_color("notacolor"), None);
    }

    // ── shadows ───────────────────────────────────────────────────────────

    #[test]
    fn box_shadow_list() {
        let fx = parse_box_shadow("rgba(0, 0, 0, 0.2) 0px 2px 4px 0px, inset 0px 0px 0px 1px rgb(255, 0, 0)");
        assert_eq!(fx.len(), 2);
        assert_eq!(fx[0].kind, EffectKind::DropShadow);
        assert_eq!(fx[0].offset, Vec2::new(0.0, 2.0));
        assert_eq!(fx[0].radius, 4.0);
        assert_eq!(fx[1].kind, EffectKind::InnerShadow);
        assert_eq!(fx[1].spread, 1.0);
    }

    #[test]
    fn transparent_and_none_shadows_vanish() {
        assert!(parse_box_shadow("none").is_empty());
        assert!(parse_box_shadow("rgba(0, 0, 0, 0) 0px 2px 4px").is_empty());
        assert!(parse_box_shadow("1px").is_empty());
    }

    #[test]
    fn drop_shadow_filter() {
        let fx = parse_drop_shadow("blur(2px) drop-shadow(rgb(0, 0, 0) 1px 1px 2px) drop-shadow(red 0px 4px)");
        assert_eq!(fx.len(), 2);
        assert_eq!(fx[1].offset, Vec2::new(0.0, 4.0));
    }

    #[test]
    fn backdrop_blur() {
        let fx = parse_backdrop_blur("blur(12px)").unwrap();
        assert_eq!(fx.kind, EffectKind::BackgroundBlur);
        assert_eq!(fx.radius, 12.0);
        assert!(parse_backdrop_blur("none").is_none());
    }

    // ── gradients ─────────────────────────────────────────────────────────

    #[test]
    fn linear_gradient_with_side_keyword() {
        let Some(Paint::LinearGradient(g)) =
            parse_gradient("linear-gradient(to right, rgb(255, 0, 0), rgb(0, 0, 255))")
        else {
            panic!("expected a linear gradient");
        };
        assert_eq!(g.angle, 90.0);
        assert_eq!(g.stops.len(), 2);
        assert_eq!(g.stops[1].position, 1.0);
    }

    #[test]
    fn implicit_positions_are_interpolated() {
        let Some(Paint::LinearGradient(g)) =
            parse_gradient("linear-gradient(0.25turn, red, white, blue 50%, black, green)")
        else {
            panic!("expected a linear gradient");
        };
        assert_eq!(g.angle, 90.0);
        let pos: Vec<f32> = g.stops.iter().map(|s| s.position).collect();
        assert!(approx(pos[1], 0.25));
        assert!(approx(pos[2], 0.5));
        assert!(approx(pos[3], 0.75));
        assert!(approx(pos[4], 1.0));
    }

    #[test]
    fn radial_and_repeating() {
        assert!(matches!(
            parse_gradient("radial-gradient(circle at center, red 0%, blue 100%)"),
            Some(Paint::RadialGradient(_))
        ));
        let Some(Paint::LinearGradient(g)) =
            parse_gradient("repeating-linear-gradient(45deg, red 0%, red 10%, blue 10%, blue 20%)")
        else {
            panic!("expected a linear gradient");
        };
        assert_eq!(g.angle, 45.0);
        assert_eq!(g.stops.len(), 4);
    }

    #[test]
    fn background_layers() {
        let layers = parse_background_images(
            "url(\"https://x.test/a.png\"), linear-gradient(rgb(0, 0, 0), rgb(255, 255, 255))",
        );
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0], BackgroundLayer::Url("https://x.test/a.png".into()));
        assert!(parse_background_images("none").is_empty());
    }

    // ── layout / transforms ───────────────────────────────────────────────

    #[test]
    fn gap_and_lengths() {
        assert_eq!(parse_gap("10px"), (10.0, 10.0));
        assert_eq!(parse_gap("8px 16px"), (8.0, 16.0));
        assert_eq!(parse_gap("normal"), (0.0, 0.0));
        assert_eq!(parse_length("50%"), Length::Percent(50.0));
        assert_eq!(parse_length("120px"), Length::Px(120.0));
        assert_eq!(parse_length("0"), Length::Px(0.0));
        assert_eq!(parse_length("auto"), Length::Auto);
        assert_eq!(parse_length("fit-content"), Length::Auto);
    }

    #[test]
    fn rotation_from_matrix_and_rotate() {
        let deg = parse_transform_rotation("matrix(0.707107, 0.707107, -0.707107, 0.707107, 0, 0)").unwrap();
        assert!(approx(deg, 45.0));
        assert_eq!(parse_transform_rotation("rotate(0.5turn)"), Some(180.0));
        assert_eq!(parse_transform_rotation("matrix(1, 0, 0, 1, 10, 20)"), None);
        assert_eq!(parse_transform_rotation("none"), None);
    }

    // ── typography ────────────────────────────────────────────────────────

    #[test]
    fn line_height_forms() {
        assert_eq!(parse_line_height("normal", 10.0), Some(12.0));
        assert_eq!(parse_line_height("1.5", 10.0), Some(15.0));
        assert_eq!(parse_line_height("20px", 10.0), Some(20.0));
        assert_eq!(parse_line_height("150%", 10.0), Some(15.0));
        assert_eq!(parse_line_height("2em", 10.0), Some(20.0));
    }

    #[test]
    fn letter_spacing_and_keywords() {
        assert_eq!(parse_letter_spacing("normal", 16.0), 0.0);
        assert_eq!(parse_letter_spacing("0.5em", 16.0), 8.0);
        assert_eq!(parse_letter_spacing("1.5px", 16.0), 1.5);
        assert_eq!(parse_text_transform("uppercase"), TextCase::Upper);
        assert_eq!(parse_text_transform("capitalize"), TextCase::Title);
        assert_eq!(parse_text_decoration("underline solid rgb(0, 0, 0)"), TextDecoration::Underline);
        assert_eq!(parse_text_decoration("line-through"), TextDecoration::Strikethrough);
        assert_eq!(parse_font_weight("bold"), 700);
        assert_eq!(parse_font_weight("600"), 600);
        assert_eq!(parse_font_family("\"Helvetica Neue\", Arial, sans-serif").as_deref(), Some("Helvetica Neue"));
    }

    #[test]
    fn whitespace_collapsing() {
        assert_eq!(collapse_whitespace("  hello \n   world ", "normal"), "hello world");
        assert_eq!(collapse_whitespace("a\n  b", "pre-wrap"), "a\n  b");
    }
}

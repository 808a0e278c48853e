use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::layer::{LayerContent, LayerNode};

/// Share of spacing occurrences that must sit on a grid for it to be inferred.
const SCALE_THRESHOLD: f32 = 0.8;

/// Minimum occurrences for a spacing value to become a token.
const MIN_SPACING_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorUsage {
    Fill,
    Stroke,
    Text,
    Effect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorToken {
    pub hex: String,
    pub usages: BTreeSet<ColorUsage>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyToken {
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpacingToken {
    pub value: u32,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpacingScale {
    Base4,
    Base8,
}

impl SpacingScale {
    #[inline]
    pub fn unit(self) -> u32 {
        match self {
            SpacingScale::Base4 => 4,
            SpacingScale::Base8 => 8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignTokens {
    /// Most used first.
    pub colors: Vec<ColorToken>,
    /// Most used first.
    pub typography: Vec<TypographyToken>,
    /// Ascending by value.
    pub spacing: Vec<SpacingToken>,
    pub spacing_scale: Option<SpacingScale>,
}

/// Aggregates colors, type styles and spacing over every layer of `roots`.
pub fn extract_tokens(roots: &[LayerNode]) -> DesignTokens {
    let mut colors: HashMap<String, ColorToken> = HashMap::new();
    let mut type_styles: HashMap<(String, u32, u16), TypographyToken> = HashMap::new();
    let mut spacing: HashMap<u32, usize> = HashMap::new();

    let mut note_color = |hex: String, usage: ColorUsage| {
        let token = colors.entry(hex.clone()).or_insert_with(|| ColorToken {
            hex,
            usages: BTreeSet::new(),
            count: 0,
        });
        token.usages.insert(usage);
        token.count += 1;
    };

    for node in roots.iter().flat_map(LayerNode::iter) {
        let fill_usage = match node.content {
            LayerContent::Text(_) => ColorUsage::Text,
            _ => ColorUsage::Fill,
        };
        for color in node.fills.iter().filter_map(|p| p.solid_color()) {
            note_color(color.to_hex(), fill_usage);
        }
        for color in node.strokes.iter().filter_map(|p| p.solid_color()) {
            note_color(color.to_hex(), ColorUsage::Stroke);
        }
        for effect in node.effects.iter().filter(|e| e.is_shadow()) {
            note_color(effect.color.to_hex(), ColorUsage::Effect);
        }

        if let LayerContent::Text(text) = &node.content {
            let key = (
                text.font_family.clone(),
                (text.font_size * 100.0).round() as u32,
                text.font_weight,
            );
            type_styles
                .entry(key)
                .or_insert_with(|| TypographyToken {
                    font_family: text.font_family.clone(),
                    font_size: text.font_size,
                    font_weight: text.font_weight,
                    count: 0,
                })
                .count += 1;
        }

        let layout = &node.layout;
        let gaps = [layout.item_spacing, layout.counter_axis_spacing];
        for v in layout.padding.sides().into_iter().chain(gaps) {
            let rounded = v.round();
            if rounded >= 1.0 {
                *spacing.entry(rounded as u32).or_default() += 1;
            }
        }
    }

    let mut colors: Vec<ColorToken> = colors.into_values().collect();
    colors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.hex.cmp(&b.hex)));

    let mut typography: Vec<TypographyToken> = type_styles.into_values().collect();
    typography.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.font_family.cmp(&b.font_family))
            .then_with(|| a.font_size.total_cmp(&b.font_size))
            .then_with(|| a.font_weight.cmp(&b.font_weight))
    });

    let mut spacing: Vec<SpacingToken> = spacing
        .into_iter()
        .filter(|&(_, count)| count >= MIN_SPACING_COUNT)
        .map(|(value, count)| SpacingToken { value, count })
        .collect();
    spacing.sort_by_key(|t| t.value);

    let spacing_scale = infer_scale(&spacing);
    DesignTokens { colors, typography, spacing, spacing_scale }
}

/// Picks the grid that at least 80 % of spacing occurrences sit on, within
/// 1px. Base 8 wins over base 4 when both qualify.
pub fn infer_scale(spacing: &[SpacingToken]) -> Option<SpacingScale> {
    let total: usize = spacing.iter().map(|t| t.count).sum();
    if total == 0 {
        return None;
    }

    [SpacingScale::Base8, SpacingScale::Base4].into_iter().find(|scale| {
        let unit = scale.unit();
        let on_grid: usize = spacing
            .iter()
            .filter(|t| {
                let rem = t.value % unit;
                rem.min(unit - rem) <= 1
            })
            .map(|t| t.count)
            .sum();
        on_grid as f32 / total as f32 >= SCALE_THRESHOLD
    })
}

//! Box/flex/grid classification into the auto-layout vocabulary.

use strata_engine::coords::Edges;
use strata_ir::{
    AxisSizing, CounterAxisAlign, LayoutDescriptor, LayoutMode, Positioning, PrimaryAxisAlign,
    SelfAlign, Sizing,
};

use crate::css::{self, Length};
use crate::source::ComputedStyle;

/// Outer display type, as far as layout classification cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Flex,
    Grid,
    Block,
    Inline,
    Contents,
    None,
}

impl DisplayKind {
    pub fn of(style: &ComputedStyle) -> Self {
        match style.get("display") {
            "flex" | "inline-flex" => DisplayKind::Flex,
            "grid" | "inline-grid" => DisplayKind::Grid,
            "inline" | "inline-block" | "ruby" => DisplayKind::Inline,
            "contents" => DisplayKind::Contents,
            "none" => DisplayKind::None,
            // block, flow-root, list-item, table*, and an unset value
            _ => DisplayKind::Block,
        }
    }
}

/// What a child needs to know about the container it sits in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentFlow {
    pub display: DisplayKind,
    pub mode: LayoutMode,
    /// Children stretch across the counter axis (`align-items: stretch`).
    pub stretch: bool,
    /// `*-reverse` flex direction.
    pub reverse: bool,
}

impl ParentFlow {
    #[inline]
    pub fn is_auto_layout(&self) -> bool {
        self.mode != LayoutMode::None
    }
}

/// Container half of a layout descriptor plus the flow children will see.
pub fn classify_container(style: &ComputedStyle, has_children: bool) -> (LayoutDescriptor, ParentFlow) {
    let display = DisplayKind::of(style);
    let mut layout = LayoutDescriptor {
        padding: padding(style),
        ..LayoutDescriptor::default()
    };
    let mut flow = ParentFlow {
        display,
        mode: LayoutMode::None,
        stretch: false,
        reverse: false,
    };

    match display {
        DisplayKind::Flex => {
            let direction = style.get("flex-direction");
            flow.reverse = direction.ends_with("-reverse");
            layout.mode = if direction.starts_with("column") {
                LayoutMode::Vertical
            } else {
                LayoutMode::Horizontal
            };
            layout.wrap = style.get("flex-wrap").starts_with("wrap");
            apply_gaps(&mut layout, style);

            layout.primary_axis_align = primary_align(style.get("justify-content"), flow.reverse);
            let align_items = style.get("align-items");
            layout.counter_axis_align = counter_align(align_items, layout.mode);
            flow.stretch = matches!(align_items, "" | "normal" | "stretch");
        }
        DisplayKind::Grid => {
            let columns = track_count(style.get("grid-template-columns"));
            if columns > 1 {
                layout.mode = LayoutMode::Horizontal;
                layout.wrap = true;
            } else {
                layout.mode = LayoutMode::Vertical;
            }
            apply_gaps(&mut layout, style);
            layout.counter_axis_align = counter_align(style.get("align-items"), layout.mode);
        }
        DisplayKind::Block if has_children => {
            layout.mode = LayoutMode::Vertical;
            flow.stretch = true;
        }
        _ => {}
    }

    flow.mode = layout.mode;
    (layout, flow)
}

pub fn padding(style: &ComputedStyle) -> Edges {
    Edges::new(
        style.px("padding-top"),
        style.px("padding-right"),
        style.px("padding-bottom"),
        style.px("padding-left"),
    )
    .non_negative()
}

/// Positive margins only; `auto` and negative values are dropped.
pub fn margin(style: &ComputedStyle) -> Edges {
    Edges::new(
        style.px("margin-top"),
        style.px("margin-right"),
        style.px("margin-bottom"),
        style.px("margin-left"),
    )
    .non_negative()
}

pub fn border_widths(style: &ComputedStyle) -> Edges {
    let side = |name: &str| {
        let style_kw = style.get(&format!("border-{name}-style"));
        if matches!(style_kw, "none" | "hidden") {
            0.0
        } else {
            style.px(&format!("border-{name}-width"))
        }
    };
    Edges::new(side("top"), side("right"), side("bottom"), side("left")).non_negative()
}

fn apply_gaps(layout: &mut LayoutDescriptor, style: &ComputedStyle) {
    let (mut row, mut column) = css::parse_gap(style.get("gap"));
    if let Some(v) = css::parse_px(style.get("row-gap")) {
        row = v.max(0.0);
    }
    if let Some(v) = css::parse_px(style.get("column-gap")) {
        column = v.max(0.0);
    }
    let (main, cross) = match layout.mode {
        LayoutMode::Vertical => (row, column),
        _ => (column, row),
    };
    layout.item_spacing = main;
    layout.counter_axis_spacing = cross;
}

fn track_count(template: &str) -> usize {
    if template.is_empty() || template == "none" {
        return 0;
    }
    css::split_whitespace_top_level(template)
        .into_iter()
        .filter(|t| !t.starts_with('['))
        .map(|t| {
            t.strip_prefix("repeat(")
                .and_then(|args| args.split(',').next())
                .and_then(|n| n.trim().parse::<usize>().ok())
                .unwrap_or(1)
        })
        .sum()
}

fn primary_align(justify: &str, reverse: bool) -> PrimaryAxisAlign {
    let align = match justify {
        "center" => PrimaryAxisAlign::Center,
        "space-between" | "space-around" | "space-evenly" => PrimaryAxisAlign::SpaceBetween,
        "flex-end" | "end" | "right" => PrimaryAxisAlign::Max,
        _ => PrimaryAxisAlign::Min,
    };
    // Reversed children are re-ordered, so packing flips sides.
    match (reverse, align) {
        (true, PrimaryAxisAlign::Min) => PrimaryAxisAlign::Max,
        (true, PrimaryAxisAlign::Max) => PrimaryAxisAlign::Min,
        _ => align,
    }
}

fn counter_align(align_items: &str, mode: LayoutMode) -> CounterAxisAlign {
    match align_items {
        "center" => CounterAxisAlign::Center,
        "flex-end" | "end" | "self-end" => CounterAxisAlign::Max,
        "baseline" | "first baseline" if mode == LayoutMode::Horizontal => CounterAxisAlign::Baseline,
        _ => CounterAxisAlign::Min,
    }
}

// ── Child properties ──────────────────────────────────────────────────────

/// Child half of a layout descriptor: sizing, growth, self-align and
/// positioning. `parent` is `None` for the capture root.
///
/// Per axis, the first rule that applies wins:
/// 1. explicit px length → `Fixed`
/// 2. percentage length → `Fill`
/// 3. positive `flex-grow` on the parent's main axis → `Fill`
/// 4. display default: flex/grid children `Hug` (cross axis `Fill` under a
///    stretching vertical flex parent), block-flow children `Fill` width and
///    `Hug` height, root and non-flow children `Fixed`.
pub fn apply_child_layout(layout: &mut LayoutDescriptor, style: &ComputedStyle, parent: Option<&ParentFlow>) {
    if matches!(style.get("position"), "absolute" | "fixed") {
        layout.positioning = Positioning::Absolute;
        layout.sizing = AxisSizing::new(Sizing::Fixed, Sizing::Fixed);
        return;
    }
    let Some(parent) = parent else {
        layout.sizing = AxisSizing::new(Sizing::Fixed, Sizing::Fixed);
        return;
    };

    let grow = css::parse_px(style.get("flex-grow")).unwrap_or(0.0).max(0.0);
    let flex_child = parent.display == DisplayKind::Flex;
    if flex_child {
        layout.growth = grow;
    }
    layout.self_align = self_align(style.get("align-self"));

    let main_is_horizontal = parent.mode == LayoutMode::Horizontal;
    let defaults = default_sizing(parent, layout.self_align);

    let resolve = |declared: &str, is_main: bool, fallback: Sizing| match css::parse_length(declared) {
        Length::Px(_) => Sizing::Fixed,
        Length::Percent(_) => Sizing::Fill,
        Length::Auto if flex_child && is_main && grow > 0.0 => Sizing::Fill,
        Length::Auto => fallback,
    };

    layout.sizing = AxisSizing::new(
        resolve(style.get("width"), main_is_horizontal, defaults.horizontal),
        resolve(style.get("height"), !main_is_horizontal && parent.is_auto_layout(), defaults.vertical),
    );
}

fn default_sizing(parent: &ParentFlow, self_align: Option<SelfAlign>) -> AxisSizing {
    match parent.display {
        DisplayKind::Flex | DisplayKind::Grid => {
            let stretched = match self_align {
                Some(SelfAlign::Stretch) => true,
                Some(_) => false,
                None => parent.stretch,
            };
            if parent.display == DisplayKind::Flex && parent.mode == LayoutMode::Vertical && stretched {
                AxisSizing::new(Sizing::Fill, Sizing::Hug)
            } else {
                AxisSizing::new(Sizing::Hug, Sizing::Hug)
            }
        }
        DisplayKind::Block if parent.is_auto_layout() => AxisSizing::new(Sizing::Fill, Sizing::Hug),
        _ => AxisSizing::new(Sizing::Fixed, Sizing::Fixed),
    }
}

fn self_align(value: &str) -> Option<SelfAlign> {
    match value {
        "flex-start" | "start" | "self-start" => Some(SelfAlign::Min),
        "center" => Some(SelfAlign::Center),
        "flex-end" | "end" | "self-end" => Some(SelfAlign::Max),
        "stretch" => Some(SelfAlign::Stretch),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(pairs: &[(&str, &str)]) -> ComputedStyle {
        pairs.iter().copied().collect()
    }

    fn flex_parent(direction: &str, align_items: &str) -> ParentFlow {
        classify_container(
            &style(&[("display", "flex"), ("flex-direction", direction), ("align-items", align_items)]),
            true,
        )
        .1
    }

    // ── containers ────────────────────────────────────────────────────────

    #[test]
    fn flex_row_with_gap() {
        let (layout, flow) = classify_container(
            &style(&[
                ("display", "flex"),
                ("flex-direction", "row"),
                ("gap", "10px"),
                ("justify-content", "space-between"),
                ("align-items", "center"),
                ("padding-left", "4px"),
            ]),
            true,
        );
        assert_eq!(layout.mode, LayoutMode::Horizontal);
        assert_eq!(layout.item_spacing, 10.0);
        assert_eq!(layout.primary_axis_align, PrimaryAxisAlign::SpaceBetween);
        assert_eq!(layout.counter_axis_align, CounterAxisAlign::Center);
        assert_eq!(layout.padding.left, 4.0);
        assert!(!flow.stretch);
    }

    #[test]
    fn column_reverse_flips_packing() {
        let (layout, flow) = classify_container(
            &style(&[("display", "flex"), ("flex-direction", "column-reverse"), ("row-gap", "6px")]),
            true,
        );
        assert_eq!(layout.mode, LayoutMode::Vertical);
        assert_eq!(layout.item_spacing, 6.0);
        assert_eq!(layout.primary_axis_align, PrimaryAxisAlign::Max);
        assert!(flow.reverse);
    }

    #[test]
    fn grid_columns_decide_direction() {
        let (layout, _) = classify_container(
            &style(&[("display", "grid"), ("grid-template-columns", "100px 100px 100px"), ("gap", "8px 12px")]),
            true,
        );
        assert_eq!(layout.mode, LayoutMode::Horizontal);
        assert!(layout.wrap);
        assert_eq!(layout.item_spacing, 12.0);
        assert_eq!(layout.counter_axis_spacing, 8.0);

        let (layout, _) = classify_container(&style(&[("display", "grid"), ("grid-template-columns", "1fr")]), true);
        assert_eq!(layout.mode, LayoutMode::Vertical);
        assert_eq!(track_count("repeat(4, 1fr)"), 4);
    }

    #[test]
    fn block_is_vertical_only_with_children() {
        let block = style(&[("display", "block")]);
        assert_eq!(classify_container(&block, true).0.mode, LayoutMode::Vertical);
        assert_eq!(classify_container(&block, false).0.mode, LayoutMode::None);
        assert_eq!(classify_container(&style(&[("display", "inline")]), true).0.mode, LayoutMode::None);
    }

    // ── sizing precedence ─────────────────────────────────────────────────

    fn sizing(child: &[(&str, &str)], parent: Option<&ParentFlow>) -> AxisSizing {
        let mut layout = LayoutDescriptor::default();
        apply_child_layout(&mut layout, &style(child), parent);
        layout.sizing
    }

    #[test]
    fn fixed_beats_percent_beats_growth() {
        let row = flex_parent("row", "center");
        assert_eq!(sizing(&[("width", "120px"), ("flex-grow", "1")], Some(&row)).horizontal, Sizing::Fixed);
        assert_eq!(sizing(&[("width", "50%")], Some(&row)).horizontal, Sizing::Fill);
        assert_eq!(sizing(&[("width", "auto"), ("flex-grow", "1")], Some(&row)).horizontal, Sizing::Fill);
        assert_eq!(sizing(&[("width", "auto")], Some(&row)).horizontal, Sizing::Hug);
    }

    #[test]
    fn growth_only_fills_main_axis() {
        let row = flex_parent("row", "center");
        let s = sizing(&[("flex-grow", "2")], Some(&row));
        assert_eq!(s, AxisSizing::new(Sizing::Fill, Sizing::Hug));
    }

    #[test]
    fn stretching_column_fills_width() {
        let column = flex_parent("column", "stretch");
        assert_eq!(sizing(&[], Some(&column)), AxisSizing::new(Sizing::Fill, Sizing::Hug));
        let s = sizing(&[("align-self", "center")], Some(&column));
        assert_eq!(s, AxisSizing::new(Sizing::Hug, Sizing::Hug));
    }

    #[test]
    fn block_flow_and_root_defaults() {
        let (_, block) = classify_container(&style(&[("display", "block")]), true);
        assert_eq!(sizing(&[], Some(&block)), AxisSizing::new(Sizing::Fill, Sizing::Hug));
        assert_eq!(sizing(&[], None), AxisSizing::new(Sizing::Fixed, Sizing::Fixed));
    }

    #[test]
    fn absolute_children_leave_the_flow() {
        let row = flex_parent("row", "center");
        let mut layout = LayoutDescriptor::default();
        apply_child_layout(&mut layout, &style(&[("position", "absolute"), ("width", "50%")]), Some(&row));
        assert_eq!(layout.positioning, Positioning::Absolute);
        assert_eq!(layout.sizing, AxisSizing::new(Sizing::Fixed, Sizing::Fixed));
    }
}

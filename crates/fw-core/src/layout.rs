//! Layout resolver.
//!
//! Decides, per element, whether it is placed absolutely or participates in
//! its parent's flow, and how each axis is sized. Also arranges the children
//! of flex/grid containers into concrete rectangles. Every function here is
//! pure; resolution at one nesting level never reads or writes another's.

use crate::geometry::{Bounds, Point, Size};
use crate::model::{Align, Display, Element, FlexDirection, Justify, LayoutProps, ResizeMode};

/// Where an element's origin comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// At `position`, relative to the parent's origin.
    Absolute { x: f32, y: f32 },
    /// Determined by the parent's flex/grid arrangement.
    Flow,
}

/// Effective sizing of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisSizing {
    Fixed(f32),
    /// Follows content extent.
    Hug,
    /// Takes a share of the free main-axis space.
    Grow,
    /// Spans the parent's inner cross-axis extent (or the grid cell).
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLayout {
    pub placement: Placement,
    pub width: AxisSizing,
    pub height: AxisSizing,
}

impl ResolvedLayout {
    pub fn is_flow(&self) -> bool {
        self.placement == Placement::Flow
    }
}

/// Resolve an element against its parent's layout (`None` for page roots).
pub fn resolve_element(element: &Element, parent_layout: Option<&LayoutProps>) -> ResolvedLayout {
    let layout = &element.layout;
    match parent_layout.filter(|p| p.is_auto()) {
        None => {
            // "fill" has nothing to fill outside a flow; it degrades to the stored size.
            let axis = |mode: ResizeMode, stored: f32| match mode {
                ResizeMode::Hug => AxisSizing::Hug,
                ResizeMode::Fixed | ResizeMode::Fill => AxisSizing::Fixed(stored),
            };
            ResolvedLayout {
                placement: Placement::Absolute {
                    x: element.position.x,
                    y: element.position.y,
                },
                width: axis(layout.resize_x, element.size.width),
                height: axis(layout.resize_y, element.size.height),
            }
        }
        Some(parent) => {
            let (x_is_main, y_is_main) = match parent.display {
                Display::Grid => (false, false),
                _ => match parent.flex_direction {
                    FlexDirection::Row => (true, false),
                    FlexDirection::Column => (false, true),
                },
            };
            let axis = |mode: ResizeMode, stored: f32, main: bool| match mode {
                ResizeMode::Fixed => AxisSizing::Fixed(stored),
                ResizeMode::Hug => AxisSizing::Hug,
                ResizeMode::Fill if main => AxisSizing::Grow,
                ResizeMode::Fill => AxisSizing::Stretch,
            };
            ResolvedLayout {
                placement: Placement::Flow,
                width: axis(layout.resize_x, element.size.width, x_is_main),
                height: axis(layout.resize_y, element.size.height, y_is_main),
            }
        }
    }
}

/// One child handed to [`arrange_flow`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowItem {
    /// Preferred size: the stored size for fixed axes, the hugged extent for hug axes.
    pub size: Size,
    pub width: AxisSizing,
    pub height: AxisSizing,
}

impl FlowItem {
    pub fn new(size: Size, resolved: &ResolvedLayout) -> Self {
        Self {
            size,
            width: resolved.width,
            height: resolved.height,
        }
    }
}

/// Arrange flow children inside `container` (absolute bounds of the parent).
///
/// Returns one rectangle per item, in item order. Block containers return
/// each item at the container origin with its preferred size.
pub fn arrange_flow(container: Bounds, layout: &LayoutProps, items: &[FlowItem]) -> Vec<Bounds> {
    match layout.display {
        Display::Block => items
            .iter()
            .map(|it| Bounds::from_origin_size(container.origin(), it.size))
            .collect(),
        Display::Flex => arrange_flex(container, layout, items),
        Display::Grid => arrange_grid(container, layout, items),
    }
}

fn inner_box(container: Bounds, layout: &LayoutProps) -> Bounds {
    let p = layout.padding;
    Bounds::new(
        container.x + p.left,
        container.y + p.top,
        (container.width - p.horizontal()).max(0.0),
        (container.height - p.vertical()).max(0.0),
    )
}

fn arrange_flex(container: Bounds, layout: &LayoutProps, items: &[FlowItem]) -> Vec<Bounds> {
    if items.is_empty() {
        return Vec::new();
    }
    let inner = inner_box(container, layout);
    let row = layout.flex_direction == FlexDirection::Row;

    // Project everything onto (main, cross) so one pass serves both directions.
    let (main_len, cross_len) = if row {
        (inner.width, inner.height)
    } else {
        (inner.height, inner.width)
    };
    let split = |it: &FlowItem| {
        if row {
            (it.width, it.height, it.size.width, it.size.height)
        } else {
            (it.height, it.width, it.size.height, it.size.width)
        }
    };

    let gaps = layout.gap * (items.len() - 1) as f32;
    let growers = items
        .iter()
        .filter(|it| matches!(split(it).0, AxisSizing::Grow))
        .count();
    let fixed_main: f32 = items
        .iter()
        .map(|it| match split(it) {
            (AxisSizing::Grow, ..) => 0.0,
            (_, _, main, _) => main,
        })
        .sum();
    let free = (main_len - fixed_main - gaps).max(0.0);
    let grow_share = if growers > 0 { free / growers as f32 } else { 0.0 };
    let leftover = if growers > 0 { 0.0 } else { free };

    let (mut cursor, spacing) = match layout.justify {
        Justify::Start => (0.0, layout.gap),
        Justify::Center => (leftover / 2.0, layout.gap),
        Justify::End => (leftover, layout.gap),
        Justify::SpaceBetween if items.len() > 1 => {
            (0.0, layout.gap + leftover / (items.len() - 1) as f32)
        }
        Justify::SpaceBetween => (0.0, layout.gap),
    };

    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let (main_mode, cross_mode, main_pref, cross_pref) = split(it);
        let main = match main_mode {
            AxisSizing::Grow => grow_share,
            _ => main_pref,
        };
        let cross = match cross_mode {
            AxisSizing::Stretch => cross_len,
            AxisSizing::Hug if layout.align == Align::Stretch => cross_len,
            _ => cross_pref,
        };
        let cross_offset = match layout.align {
            Align::Start | Align::Stretch => 0.0,
            Align::Center => (cross_len - cross) / 2.0,
            Align::End => cross_len - cross,
        };
        let rect = if row {
            Bounds::new(inner.x + cursor, inner.y + cross_offset, main, cross)
        } else {
            Bounds::new(inner.x + cross_offset, inner.y + cursor, cross, main)
        };
        out.push(rect);
        cursor += main + spacing;
    }
    out
}

fn arrange_grid(container: Bounds, layout: &LayoutProps, items: &[FlowItem]) -> Vec<Bounds> {
    let inner = inner_box(container, layout);
    let cols = layout.grid_columns.max(1) as usize;
    let cell_w = ((inner.width - layout.gap * (cols - 1) as f32) / cols as f32).max(0.0);

    let mut out = Vec::with_capacity(items.len());
    let mut y = inner.y;
    for row in items.chunks(cols) {
        let row_h = row.iter().map(|it| it.size.height).fold(0.0, f32::max);
        for (col, it) in row.iter().enumerate() {
            let x = inner.x + col as f32 * (cell_w + layout.gap);
            let w = match it.width {
                AxisSizing::Stretch | AxisSizing::Grow => cell_w,
                _ => it.size.width,
            };
            let h = match it.height {
                AxisSizing::Stretch | AxisSizing::Grow => row_h,
                _ => it.size.height,
            };
            out.push(Bounds::new(x, y, w, h));
        }
        y += row_h + layout.gap;
    }
    out
}

/// Approximate text extent until real shaping is available.
pub fn text_extent(content: &str) -> Size {
    Size::new(content.chars().count() as f32 * 8.0, 20.0)
}

/// Content extent of `element` given its children's `(position, size)`.
///
/// Leaves with text measure their content; other leaves report their stored
/// size. Containers measure their children per their own display mode, plus
/// padding.
pub fn hug_size(element: &Element, children: &[(Point, Size)]) -> Size {
    if !element.is_container() {
        return match &element.content {
            Some(text) => text_extent(text),
            None => element.size,
        };
    }
    let layout = &element.layout;
    let pad = layout.padding;
    if children.is_empty() {
        return Size::new(pad.horizontal(), pad.vertical());
    }
    let gaps = layout.gap * (children.len() - 1) as f32;
    let content = match layout.display {
        Display::Block => {
            let right = children.iter().map(|(p, s)| p.x + s.width).fold(0.0, f32::max);
            let bottom = children.iter().map(|(p, s)| p.y + s.height).fold(0.0, f32::max);
            Size::new(right, bottom)
        }
        Display::Flex => {
            let sum_w: f32 = children.iter().map(|(_, s)| s.width).sum();
            let sum_h: f32 = children.iter().map(|(_, s)| s.height).sum();
            let max_w = children.iter().map(|(_, s)| s.width).fold(0.0, f32::max);
            let max_h = children.iter().map(|(_, s)| s.height).fold(0.0, f32::max);
            match layout.flex_direction {
                FlexDirection::Row => Size::new(sum_w + gaps, max_h),
                FlexDirection::Column => Size::new(max_w, sum_h + gaps),
            }
        }
        Display::Grid => {
            let cols = layout.grid_columns.max(1) as usize;
            let max_w = children.iter().map(|(_, s)| s.width).fold(0.0, f32::max);
            let used_cols = cols.min(children.len());
            let width = max_w * used_cols as f32 + layout.gap * (used_cols - 1) as f32;
            let rows: Vec<f32> = children
                .chunks(cols)
                .map(|row| row.iter().map(|(_, s)| s.height).fold(0.0, f32::max))
                .collect();
            let height = rows.iter().sum::<f32>() + layout.gap * (rows.len() - 1) as f32;
            Size::new(width, height)
        }
    };
    Size::new(
        content.width + pad.horizontal(),
        content.height + pad.vertical(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ElementId;
    use crate::model::{ElementType, Padding};
    use pretty_assertions::assert_eq;

    fn element(kind: ElementType, w: f32, h: f32) -> Element {
        let mut el = Element::new(ElementId::intern("layout_probe"), kind);
        el.size = Size::new(w, h);
        el
    }

    fn fixed(w: f32, h: f32) -> FlowItem {
        FlowItem {
            size: Size::new(w, h),
            width: AxisSizing::Fixed(w),
            height: AxisSizing::Fixed(h),
        }
    }

    #[test]
    fn absolute_parent_places_at_position() {
        let mut el = element(ElementType::Frame, 100.0, 50.0);
        el.position = Point::new(12.0, 34.0);
        el.layout.resize_x = ResizeMode::Fill;
        el.layout.resize_y = ResizeMode::Hug;
        let r = resolve_element(&el, Some(&LayoutProps::default()));
        assert_eq!(r.placement, Placement::Absolute { x: 12.0, y: 34.0 });
        assert_eq!(r.width, AxisSizing::Fixed(100.0));
        assert_eq!(r.height, AxisSizing::Hug);
    }

    #[test]
    fn fill_maps_to_main_or_cross_axis() {
        let mut el = element(ElementType::Box, 40.0, 40.0);
        el.layout.resize_x = ResizeMode::Fill;
        el.layout.resize_y = ResizeMode::Fill;

        let row = LayoutProps::flex(FlexDirection::Row, 0.0, 0.0);
        let r = resolve_element(&el, Some(&row));
        assert!(r.is_flow());
        assert_eq!((r.width, r.height), (AxisSizing::Grow, AxisSizing::Stretch));

        let column = LayoutProps::flex(FlexDirection::Column, 0.0, 0.0);
        let c = resolve_element(&el, Some(&column));
        assert_eq!((c.width, c.height), (AxisSizing::Stretch, AxisSizing::Grow));
    }

    #[test]
    fn nested_flow_container_resolves_each_level_alone() {
        // A row that is itself a column child: its own children see only the row.
        let mut inner = element(ElementType::Row, 200.0, 60.0);
        inner.layout.resize_x = ResizeMode::Fill;
        let outer = LayoutProps::flex(FlexDirection::Column, 0.0, 0.0);
        let as_child = resolve_element(&inner, Some(&outer));
        assert_eq!(as_child.width, AxisSizing::Stretch);

        let mut grandchild = element(ElementType::Text, 50.0, 20.0);
        grandchild.layout.resize_x = ResizeMode::Fill;
        let r = resolve_element(&grandchild, Some(&inner.layout));
        assert_eq!(r.width, AxisSizing::Grow);
    }

    #[test]
    fn column_with_padding_and_gap() {
        let layout = LayoutProps::flex(FlexDirection::Column, 10.0, 20.0);
        let rects = arrange_flow(
            Bounds::new(0.0, 0.0, 300.0, 400.0),
            &layout,
            &[fixed(100.0, 40.0), fixed(100.0, 30.0)],
        );
        assert_eq!(rects[0], Bounds::new(20.0, 20.0, 100.0, 40.0));
        assert_eq!(rects[1], Bounds::new(20.0, 70.0, 100.0, 30.0));
    }

    #[test]
    fn row_grow_takes_free_space() {
        let layout = LayoutProps::flex(FlexDirection::Row, 10.0, 0.0);
        let grow = FlowItem {
            size: Size::new(0.0, 20.0),
            width: AxisSizing::Grow,
            height: AxisSizing::Stretch,
        };
        let rects = arrange_flow(
            Bounds::new(100.0, 0.0, 300.0, 50.0),
            &layout,
            &[fixed(90.0, 20.0), grow],
        );
        assert_eq!(rects[0], Bounds::new(100.0, 0.0, 90.0, 20.0));
        assert_eq!(rects[1], Bounds::new(200.0, 0.0, 200.0, 50.0));
    }

    #[test]
    fn justify_and_align() {
        let mut layout = LayoutProps::flex(FlexDirection::Row, 0.0, 0.0);
        layout.justify = Justify::SpaceBetween;
        layout.align = Align::Center;
        let rects = arrange_flow(
            Bounds::new(0.0, 0.0, 100.0, 40.0),
            &layout,
            &[fixed(20.0, 10.0), fixed(20.0, 20.0)],
        );
        assert_eq!(rects[0], Bounds::new(0.0, 15.0, 20.0, 10.0));
        assert_eq!(rects[1], Bounds::new(80.0, 10.0, 20.0, 20.0));

        layout.justify = Justify::End;
        let end = arrange_flow(Bounds::new(0.0, 0.0, 100.0, 40.0), &layout, &[fixed(20.0, 10.0)]);
        assert_eq!(end[0].x, 80.0);
    }

    #[test]
    fn grid_wraps_into_equal_cells() {
        let mut layout = LayoutProps::grid(2, 10.0);
        layout.padding = Padding::uniform(5.0);
        let stretch = FlowItem {
            size: Size::new(10.0, 30.0),
            width: AxisSizing::Stretch,
            height: AxisSizing::Fixed(30.0),
        };
        let rects = arrange_flow(
            Bounds::new(0.0, 0.0, 220.0, 200.0),
            &layout,
            &[stretch, fixed(50.0, 40.0), fixed(50.0, 20.0)],
        );
        assert_eq!(rects[0], Bounds::new(5.0, 5.0, 100.0, 30.0));
        assert_eq!(rects[1], Bounds::new(115.0, 5.0, 50.0, 40.0));
        assert_eq!(rects[2], Bounds::new(5.0, 55.0, 50.0, 20.0));
    }

    #[test]
    fn hug_measures_text_and_children() {
        let mut text = element(ElementType::Text, 1.0, 1.0);
        text.content = Some("Hello".into());
        assert_eq!(hug_size(&text, &[]), Size::new(40.0, 20.0));

        let stack = element(ElementType::Stack, 0.0, 0.0);
        let kids = [
            (Point::ZERO, Size::new(100.0, 40.0)),
            (Point::ZERO, Size::new(60.0, 30.0)),
        ];
        // column, gap 8, padding 8
        assert_eq!(hug_size(&stack, &kids), Size::new(116.0, 94.0));

        let frame = element(ElementType::Frame, 0.0, 0.0);
        let placed = [(Point::new(10.0, 20.0), Size::new(50.0, 50.0))];
        assert_eq!(hug_size(&frame, &placed), Size::new(60.0, 70.0));
    }
}

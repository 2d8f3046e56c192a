//! Document → flat render list.
//!
//! Walks each page depth-first from its root, resolving every child against
//! its parent's layout. Absolutely placed children accumulate their parent's
//! origin; flow children get their rectangle from `arrange_flow`. The output
//! is in paint order (parents before children, siblings in `children` order).

use fw_core::{
    AxisSizing, Bounds, Document, Element, ElementId, ElementType, FlowItem, PageId, Placement,
    Point, ResolvedLayout, Size, arrange_flow, hug_size, resolve_element,
};

/// How a node's on-screen rectangle was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Every ancestor up to the page is absolutely laid out.
    Absolute,
    /// Some ancestor is auto-laid-out; geometry is flow-determined.
    Flow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub id: ElementId,
    pub kind: ElementType,
    pub depth: usize,
    /// Canvas-space rectangle.
    pub bounds: Bounds,
    pub anchor: Anchor,
    pub locked: bool,
    pub is_page_root: bool,
}

/// Render list for one page. Empty for unknown pages or a hidden root.
pub fn build_render_list(doc: &Document, page: PageId) -> Vec<RenderNode> {
    let mut out = Vec::new();
    let Some(page) = doc.page(page) else {
        return out;
    };
    let Some(root) = doc.element(page.root).filter(|r| r.visible) else {
        return out;
    };
    let size = measure(doc, root, &resolve_element(root, None));
    let bounds = Bounds::from_origin_size(page.origin, size);
    walk(doc, root, bounds, 0, Anchor::Absolute, true, &mut out);
    out
}

/// Render lists of every page, concatenated in page order.
pub fn build_document_list(doc: &Document) -> Vec<RenderNode> {
    doc.pages
        .iter()
        .flat_map(|p| build_render_list(doc, p.id))
        .collect()
}

fn walk(
    doc: &Document,
    el: &Element,
    bounds: Bounds,
    depth: usize,
    anchor: Anchor,
    is_page_root: bool,
    out: &mut Vec<RenderNode>,
) {
    out.push(RenderNode {
        id: el.id,
        kind: el.kind,
        depth,
        bounds,
        anchor,
        locked: el.locked,
        is_page_root,
    });

    let children: Vec<&Element> = el
        .children
        .iter()
        .filter_map(|c| doc.element(*c))
        .filter(|c| c.visible)
        .collect();
    if children.is_empty() {
        return;
    }

    let resolved: Vec<ResolvedLayout> = children
        .iter()
        .map(|c| resolve_element(c, Some(&el.layout)))
        .collect();

    if el.layout.is_auto() {
        let items: Vec<FlowItem> = children
            .iter()
            .zip(&resolved)
            .map(|(c, r)| FlowItem::new(measure(doc, c, r), r))
            .collect();
        let rects = arrange_flow(bounds, &el.layout, &items);
        for (child, rect) in children.iter().zip(rects) {
            walk(doc, child, rect, depth + 1, Anchor::Flow, false, out);
        }
    } else {
        for (child, r) in children.iter().zip(&resolved) {
            let offset = match r.placement {
                Placement::Absolute { x, y } => Point::new(x, y),
                Placement::Flow => Point::ZERO,
            };
            let rect = Bounds::from_origin_size(bounds.origin() + offset, measure(doc, child, r));
            walk(doc, child, rect, depth + 1, anchor, false, out);
        }
    }
}

/// Size `el` is drawn at when its parent does not arrange it: [`measure`]
/// against the parent's layout, so hug axes report content extent.
pub fn laid_out_size(doc: &Document, el: &Element) -> Size {
    let parent_layout = el.parent.and_then(|p| doc.element(p)).map(|p| &p.layout);
    measure(doc, el, &resolve_element(el, parent_layout))
}

/// Preferred size of `el`: stored size for fixed axes, content extent for
/// hug axes. Grow/stretch axes report the stored size; the parent's
/// arrangement replaces it.
pub fn measure(doc: &Document, el: &Element, resolved: &ResolvedLayout) -> Size {
    let hugs = matches!(resolved.width, AxisSizing::Hug) || matches!(resolved.height, AxisSizing::Hug);
    let content = hugs.then(|| {
        let kids: Vec<(Point, Size)> = el
            .children
            .iter()
            .filter_map(|c| doc.element(*c))
            .filter(|c| c.visible)
            .map(|c| {
                let r = resolve_element(c, Some(&el.layout));
                (c.position, measure(doc, c, &r))
            })
            .collect();
        hug_size(el, &kids)
    });
    let pick = |axis: AxisSizing, stored: f32, hugged: Option<f32>| match axis {
        AxisSizing::Fixed(v) => v,
        AxisSizing::Hug => hugged.unwrap_or(stored),
        AxisSizing::Grow | AxisSizing::Stretch => stored,
    };
    Size::new(
        pick(resolved.width, el.size.width, content.map(|s| s.width)),
        pick(resolved.height, el.size.height, content.map(|s| s.height)),
    )
}

//! Canvas2D software renderer.
//!
//! Draws a render list to an HTML `<canvas>` via `CanvasRenderingContext2d`.
//! Element geometry is painted under the viewport transform; selection
//! handles, hover outlines and the marquee are painted in screen space so
//! their thickness does not scale with zoom.

use fw_core::{Bounds, Document, Element, ElementId, ElementType, Viewport};
use fw_render::{Outline, RenderNode, selection_outline};
use web_sys::CanvasRenderingContext2d;

/// Theme-dependent colors for the canvas renderer.
pub struct CanvasTheme {
    pub bg: &'static str,
    pub grid: &'static str,
    pub page_label: &'static str,
    pub placeholder: &'static str,
    pub accent: &'static str,
}

impl CanvasTheme {
    pub fn light() -> Self {
        Self {
            bg: "#F5F5F7",
            grid: "rgba(0, 0, 0, 0.05)",
            page_label: "#86868B",
            placeholder: "#9CA3AF",
            accent: "#0D99FF",
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: "#1C1C1E",
            grid: "rgba(255, 255, 255, 0.04)",
            page_label: "#98989D",
            placeholder: "#636366",
            accent: "#0D99FF",
        }
    }
}

/// Everything one frame needs besides the document.
pub struct Frame<'a> {
    pub nodes: &'a [RenderNode],
    pub viewport: &'a Viewport,
    pub selection: &'a [ElementId],
    pub hovered: Option<ElementId>,
    /// Screen-space rubber band.
    pub marquee: Option<Bounds>,
}

/// Render one frame.
pub fn render_scene(
    ctx: &CanvasRenderingContext2d,
    doc: &Document,
    frame: &Frame<'_>,
    theme: &CanvasTheme,
) {
    let vp = frame.viewport;
    let (w, h) = (f64::from(vp.surface.width), f64::from(vp.surface.height));

    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.set_fill_style_str(theme.bg);
    ctx.fill_rect(0.0, 0.0, w, h);
    draw_grid(ctx, w, h, theme);

    let c = vp.center();
    let zoom = f64::from(vp.zoom);
    let _ = ctx.set_transform(
        zoom,
        0.0,
        0.0,
        zoom,
        f64::from(c.x + vp.pan.x),
        f64::from(c.y + vp.pan.y),
    );
    for node in frame.nodes {
        if let Some(el) = doc.element(node.id) {
            draw_node(ctx, node, el, theme);
        }
    }

    // Overlays in screen space.
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    for node in frame.nodes.iter().filter(|n| n.is_page_root) {
        draw_page_label(ctx, doc, node, vp, theme);
    }
    if let Some(hovered) = frame.hovered
        && !frame.selection.contains(&hovered)
        && let Some(node) = frame.nodes.iter().find(|n| n.id == hovered)
    {
        let b = vp.canvas_rect_to_screen(&node.bounds);
        ctx.set_stroke_style_str(theme.accent);
        ctx.set_line_width(1.0);
        ctx.stroke_rect(
            f64::from(b.x),
            f64::from(b.y),
            f64::from(b.width),
            f64::from(b.height),
        );
    }
    draw_selection(ctx, doc, frame, theme);
    if let Some(rect) = frame.marquee {
        draw_marquee_rect(ctx, &rect, theme);
    }
}

fn draw_node(
    ctx: &CanvasRenderingContext2d,
    node: &RenderNode,
    el: &Element,
    theme: &CanvasTheme,
) {
    let b = &node.bounds;
    let (x, y, w, h) = (
        f64::from(b.x),
        f64::from(b.y),
        f64::from(b.width),
        f64::from(b.height),
    );
    let styles = &el.styles;

    ctx.save();
    ctx.set_global_alpha(f64::from(styles.opacity()));

    let radius = f64::from(styles.radius());
    if let Some(fill) = styles.fill() {
        rounded_rect_path(ctx, x, y, w, h, radius);
        ctx.set_fill_style_str(&fill.to_css());
        ctx.fill();
    }
    if let Some(stroke) = styles.stroke() {
        rounded_rect_path(ctx, x, y, w, h, radius);
        ctx.set_stroke_style_str(&stroke.to_css());
        ctx.set_line_width(f64::from(styles.stroke_width()));
        ctx.stroke();
    }

    match el.kind {
        ElementType::Image | ElementType::Video | ElementType::Icon => {
            draw_placeholder_cross(ctx, x, y, w, h, theme);
        }
        _ => {}
    }
    if let Some(text) = &el.content {
        draw_text(ctx, el, text, x, y, w, h);
    }

    ctx.restore();
}

fn draw_text(
    ctx: &CanvasRenderingContext2d,
    el: &Element,
    text: &str,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
) {
    let size = match el.kind {
        ElementType::Heading => 24.0,
        _ => 14.0,
    };
    let color = el.styles.get("color").unwrap_or("#111111");
    ctx.set_font(&format!("{size}px Inter, sans-serif"));
    ctx.set_fill_style_str(color);
    if el.kind == ElementType::Button {
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let _ = ctx.fill_text_with_max_width(text, x + w / 2.0, y + h / 2.0, w);
    } else {
        ctx.set_text_align("left");
        ctx.set_text_baseline("top");
        let _ = ctx.fill_text_with_max_width(text, x, y + 2.0, w);
    }
}

fn draw_placeholder_cross(
    ctx: &CanvasRenderingContext2d,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    theme: &CanvasTheme,
) {
    ctx.set_stroke_style_str(theme.placeholder);
    ctx.set_line_width(1.0);
    ctx.begin_path();
    ctx.move_to(x, y);
    ctx.line_to(x + w, y + h);
    ctx.move_to(x + w, y);
    ctx.line_to(x, y + h);
    ctx.stroke();
}

fn draw_page_label(
    ctx: &CanvasRenderingContext2d,
    doc: &Document,
    node: &RenderNode,
    vp: &Viewport,
    theme: &CanvasTheme,
) {
    let Some(el) = doc.element(node.id) else {
        return;
    };
    let origin = vp.canvas_to_screen(node.bounds.origin());
    ctx.set_font("12px Inter, sans-serif");
    ctx.set_fill_style_str(theme.page_label);
    ctx.set_text_align("left");
    ctx.set_text_baseline("bottom");
    let _ = ctx.fill_text(&el.name, f64::from(origin.x), f64::from(origin.y) - 4.0);
}

/// Absolute outlines get a solid frame (plus handles for a single
/// selection); flow-placed elements get a dashed inline outline.
fn draw_selection(
    ctx: &CanvasRenderingContext2d,
    doc: &Document,
    frame: &Frame<'_>,
    theme: &CanvasTheme,
) {
    let single = frame.selection.len() == 1;
    for id in frame.selection {
        let Some(node) = frame.nodes.iter().find(|n| n.id == *id) else {
            continue;
        };
        let b = frame.viewport.canvas_rect_to_screen(&node.bounds);
        let (x, y, w, h) = (
            f64::from(b.x),
            f64::from(b.y),
            f64::from(b.width),
            f64::from(b.height),
        );
        ctx.save();
        ctx.set_stroke_style_str(theme.accent);
        ctx.set_line_width(1.5);
        match selection_outline(doc, *id) {
            Some(Outline::Absolute(_)) => {
                ctx.stroke_rect(x, y, w, h);
                if single && !node.locked {
                    draw_selection_handles(ctx, x, y, w, h);
                }
            }
            _ => {
                let _ = ctx.set_line_dash(&js_sys::Array::of2(
                    &wasm_bindgen::JsValue::from_f64(3.0),
                    &wasm_bindgen::JsValue::from_f64(3.0),
                ));
                ctx.stroke_rect(x, y, w, h);
            }
        }
        ctx.restore();
    }
}

fn draw_selection_handles(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64) {
    let handle_size = 6.0;
    let half = handle_size / 2.0;

    ctx.set_fill_style_str("#FFFFFF");
    let points = [
        (x, y),
        (x + w / 2.0, y),
        (x + w, y),
        (x + w, y + h / 2.0),
        (x + w, y + h),
        (x + w / 2.0, y + h),
        (x, y + h),
        (x, y + h / 2.0),
    ];
    for (hx, hy) in points {
        ctx.fill_rect(hx - half, hy - half, handle_size, handle_size);
        ctx.stroke_rect(hx - half, hy - half, handle_size, handle_size);
    }
}

fn draw_grid(ctx: &CanvasRenderingContext2d, width: f64, height: f64, theme: &CanvasTheme) {
    ctx.set_fill_style_str(theme.grid);
    let spacing = 20.0;
    let mut x = 0.0;
    while x < width {
        let mut y = 0.0;
        while y < height {
            ctx.fill_rect(x, y, 1.0, 1.0);
            y += spacing;
        }
        x += spacing;
    }
}

/// Draw the marquee (rubber-band) selection rectangle.
fn draw_marquee_rect(ctx: &CanvasRenderingContext2d, rect: &Bounds, theme: &CanvasTheme) {
    let (x, y, w, h) = (
        f64::from(rect.x),
        f64::from(rect.y),
        f64::from(rect.width),
        f64::from(rect.height),
    );
    if w < 1.0 && h < 1.0 {
        return;
    }

    ctx.save();
    ctx.set_fill_style_str("rgba(13, 153, 255, 0.08)");
    ctx.fill_rect(x, y, w, h);
    ctx.set_stroke_style_str(theme.accent);
    ctx.set_line_width(1.0);
    let _ = ctx.set_line_dash(&js_sys::Array::of2(
        &wasm_bindgen::JsValue::from_f64(4.0),
        &wasm_bindgen::JsValue::from_f64(4.0),
    ));
    ctx.stroke_rect(x, y, w, h);
    ctx.restore();
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}

//! Render list → Vello drawing commands.
//!
//! Emits one fill and one optional stroke per node, transformed by the
//! viewport, followed by selection outlines on top of everything.

use crate::hit::{Outline, selection_outline};
use crate::scene::RenderNode;
use fw_core::{Bounds, Document, ElementId, Styles, Viewport};
use kurbo::{Affine, Rect, RoundedRect, Stroke};
use peniko::{Color, Fill};
use vello::Scene;

const SELECTION: Color = Color::from_rgba8(0x0D, 0x99, 0xFF, 0xFF);
const INLINE_SELECTION: Color = Color::from_rgba8(0x0D, 0x99, 0xFF, 0x80);

/// Affine mapping canvas space to screen space for `viewport`.
pub fn view_transform(viewport: &Viewport) -> Affine {
    let c = viewport.center();
    Affine::translate((
        f64::from(c.x + viewport.pan.x),
        f64::from(c.y + viewport.pan.y),
    )) * Affine::scale(f64::from(viewport.zoom))
}

/// Paint `nodes` into a freshly-cleared `scene`.
///
/// The caller presents the scene through its own renderer.
pub fn paint_scene(
    scene: &mut Scene,
    doc: &Document,
    nodes: &[RenderNode],
    viewport: &Viewport,
    selection: &[ElementId],
) {
    let transform = view_transform(viewport);
    for node in nodes {
        let Some(el) = doc.element(node.id) else {
            continue;
        };
        paint_node(scene, transform, node, &el.styles);
        if let Some(text) = &el.content {
            log::trace!("text {} {:?} at {:?}", node.id, text, node.bounds.origin());
        }
    }

    let hairline = 1.5 / f64::from(viewport.zoom.max(0.01));
    for id in selection {
        let Some(node) = nodes.iter().find(|n| n.id == *id) else {
            continue;
        };
        let color = match selection_outline(doc, *id) {
            Some(Outline::Absolute(_)) => SELECTION,
            _ => INLINE_SELECTION,
        };
        scene.stroke(
            &Stroke::new(hairline),
            transform,
            color,
            None,
            &to_rect(&node.bounds),
        );
    }
}

fn paint_node(scene: &mut Scene, transform: Affine, node: &RenderNode, styles: &Styles) {
    let shape = RoundedRect::from_rect(to_rect(&node.bounds), f64::from(styles.radius()));
    let opacity = styles.opacity();

    if let Some(fill) = styles.fill() {
        let [r, g, b, a] = fill.to_rgba8();
        let color = Color::from_rgba8(r, g, b, a).multiply_alpha(opacity);
        scene.fill(Fill::NonZero, transform, color, None, &shape);
    }
    if let Some(stroke) = styles.stroke() {
        let [r, g, b, a] = stroke.to_rgba8();
        let color = Color::from_rgba8(r, g, b, a).multiply_alpha(opacity);
        let width = f64::from(styles.stroke_width());
        scene.stroke(&Stroke::new(width), transform, color, None, &shape);
    }
}

fn to_rect(b: &Bounds) -> Rect {
    Rect::new(
        f64::from(b.left()),
        f64::from(b.top()),
        f64::from(b.right()),
        f64::from(b.bottom()),
    )
}

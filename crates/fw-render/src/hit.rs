//! Hit testing: point → element, rectangle → elements.
//!
//! Point queries reverse-walk a render list (last painted = topmost).
//! Marquee queries walk every page in order and keep traversal order.

use crate::scene::{Anchor, RenderNode, build_document_list, laid_out_size};
use fw_core::{Bounds, Document, ElementId, Point};

/// Topmost selectable element under `point` (canvas space).
///
/// Page roots are background and never hit; locked elements are transparent
/// to clicks. Returns `None` when only background is under the point.
pub fn hit_test(nodes: &[RenderNode], point: Point) -> Option<ElementId> {
    nodes
        .iter()
        .rev()
        .find(|n| !n.is_page_root && !n.locked && n.bounds.contains(point))
        .map(|n| n.id)
}

/// Topmost container under `point` that could receive `dragged` as children:
/// not one of them, not inside one of them, and not locked. Falls back to
/// page roots, so any point over an artboard yields a target.
pub fn container_at(
    doc: &Document,
    nodes: &[RenderNode],
    point: Point,
    dragged: &[ElementId],
) -> Option<ElementId> {
    nodes
        .iter()
        .rev()
        .filter(|n| n.kind.is_container() && !n.locked && n.bounds.contains(point))
        .find(|n| {
            !dragged
                .iter()
                .any(|d| *d == n.id || doc.is_ancestor_of(*d, n.id))
        })
        .map(|n| n.id)
}

/// Marquee selection over a prebuilt list.
///
/// Selectable nodes are the absolutely anchored, unlocked, non-root ones
/// whose rectangle overlaps `rect` with open-interval semantics. Locked
/// nodes are skipped but their descendants are still considered.
pub fn marquee_select(nodes: &[RenderNode], rect: &Bounds) -> Vec<ElementId> {
    nodes
        .iter()
        .filter(|n| !n.is_page_root && !n.locked && n.anchor == Anchor::Absolute)
        .filter(|n| n.bounds.intersects(rect))
        .map(|n| n.id)
        .collect()
}

/// Marquee selection across every page of `doc`, in traversal order.
pub fn hit_test_marquee(doc: &Document, rect: &Bounds) -> Vec<ElementId> {
    let hits = marquee_select(&build_document_list(doc), rect);
    log::trace!("marquee {rect:?} -> {} hit(s)", hits.len());
    hits
}

/// Geometry for the selection decoration of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outline {
    /// Canvas-space rectangle.
    Absolute(Bounds),
    /// No stable absolute offset exists; decorate the element inline.
    Inline,
}

/// Walk from `id` up to its page root, accumulating offsets. Short-circuits
/// to [`Outline::Inline`] at the first auto-laid-out ancestor.
pub fn selection_outline(doc: &Document, id: ElementId) -> Option<Outline> {
    let el = doc.element(id)?;
    let size = laid_out_size(doc, el);
    let mut offset = el.position;
    let mut current = el;

    if el.parent.is_none() {
        let page = doc.pages.iter().find(|p| p.root == id)?;
        return Some(Outline::Absolute(Bounds::from_origin_size(page.origin, size)));
    }

    while let Some(parent_id) = current.parent {
        let parent = doc.element(parent_id)?;
        if parent.layout.is_auto() {
            return Some(Outline::Inline);
        }
        match parent.parent {
            Some(_) => offset = offset + parent.position,
            None => {
                let page = doc.pages.iter().find(|p| p.root == parent_id)?;
                offset = offset + page.origin;
            }
        }
        current = parent;
    }
    Some(Outline::Absolute(Bounds::from_origin_size(offset, size)))
}

//! Integration tests: screen-space marquee → viewport mapping → hit tester.

use fw_core::{Bounds, Document, Element, ElementId, ElementType, Point, Size, Viewport};
use fw_render::hit_test_marquee;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Page root 800×600 at the canvas origin with frames at (0,0) and (200,0).
fn scene(reverse: bool) -> (Document, ElementId, ElementId) {
    let mut doc = Document::new();
    let page = doc.add_page("Scenario", Point::ZERO, Size::new(800.0, 600.0));
    let root = doc.page(page).unwrap().root;
    let a = ElementId::intern("ms_frame_a");
    let b = ElementId::intern("ms_frame_b");
    for (id, x) in [(a, 0.0), (b, 200.0)] {
        let mut el = Element::new(id, ElementType::Frame);
        el.position = Point::new(x, 0.0);
        el.size = Size::new(100.0, 100.0);
        doc.elements.insert(id, el);
    }
    let order = if reverse { [b, a] } else { [a, b] };
    for id in order {
        doc.attach(id, root, None);
    }
    (doc, a, b)
}

fn select_screen(doc: &Document, vp: &Viewport, from: Point, to: Point) -> Vec<ElementId> {
    hit_test_marquee(doc, &vp.screen_rect_to_canvas(from, to))
}

#[test]
fn canvas_marquee_selects_first_frame_only() {
    init();
    let (doc, a, _) = scene(false);
    let sel = hit_test_marquee(
        &doc,
        &Bounds::from_corners(Point::new(-10.0, -10.0), Point::new(150.0, 150.0)),
    );
    assert_eq!(sel, vec![a]);
}

#[test]
fn same_screen_marquee_after_zoom_covers_transformed_region() {
    init();
    let (doc, a, _) = scene(false);
    let mut vp = Viewport::new(Size::new(800.0, 600.0));

    let from = vp.canvas_to_screen(Point::new(-10.0, -10.0));
    let to = vp.canvas_to_screen(Point::new(150.0, 150.0));
    assert_eq!(select_screen(&doc, &vp, from, to), vec![a]);

    vp.zoom = 2.0;
    let region = vp.screen_rect_to_canvas(from, to);
    assert_eq!(region, Bounds::new(-5.0, -5.0, 80.0, 80.0));
    // The halved region still overlaps the first frame.
    assert_eq!(select_screen(&doc, &vp, from, to), vec![a]);
}

#[test]
fn screen_marquee_between_frames_selects_neither_after_zoom() {
    init();
    let (doc, _, b) = scene(false);
    let mut vp = Viewport::new(Size::new(800.0, 600.0));

    let from = vp.canvas_to_screen(Point::new(250.0, -10.0));
    let to = vp.canvas_to_screen(Point::new(310.0, 110.0));
    assert_eq!(select_screen(&doc, &vp, from, to), vec![b]);

    vp.zoom = 2.0;
    assert_eq!(
        vp.screen_rect_to_canvas(from, to),
        Bounds::new(125.0, -5.0, 30.0, 60.0)
    );
    assert!(select_screen(&doc, &vp, from, to).is_empty());
}

#[test]
fn selection_set_is_independent_of_sibling_order() {
    init();
    let rect = Bounds::new(-50.0, -50.0, 400.0, 200.0);
    let (forward, _, _) = scene(false);
    let (reversed, _, _) = scene(true);

    let a: BTreeSet<String> = hit_test_marquee(&forward, &rect)
        .iter()
        .map(|id| id.to_string())
        .collect();
    let b: BTreeSet<String> = hit_test_marquee(&reversed, &rect)
        .iter()
        .map(|id| id.to_string())
        .collect();
    assert_eq!(a.len(), 2);
    assert_eq!(a, b);
}

#[test]
fn hidden_and_locked_frames_never_selected() {
    init();
    let (mut doc, a, b) = scene(false);
    doc.element_mut(a).unwrap().visible = false;
    doc.element_mut(b).unwrap().locked = true;
    let everything = Bounds::new(-1000.0, -1000.0, 3000.0, 3000.0);
    assert!(hit_test_marquee(&doc, &everything).is_empty());
}

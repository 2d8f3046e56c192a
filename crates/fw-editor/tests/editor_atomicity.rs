//! Integration tests: edits routed through the `Editor` land whole or not
//! at all.
//!
//! - a compound shortcut that fails part-way leaves no partial writes
//! - undo/redo in the middle of a pointer drag aborts the drag, so later
//!   pointer moves cannot edit the document behind history's back

use fw_core::{ElementType, Point};
use fw_editor::{Editor, EditorConfig, InputEvent, Modifiers, ShortcutAction};
use pretty_assertions::assert_eq;

fn editor() -> Editor {
    let _ = env_logger::builder().is_test(true).try_init();
    Editor::new(EditorConfig::default()).unwrap()
}

fn down(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerDown {
        x,
        y,
        modifiers: Modifiers::NONE,
    }
}

fn mv(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerMove {
        x,
        y,
        modifiers: Modifiers::NONE,
    }
}

fn up(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerUp {
        x,
        y,
        modifiers: Modifiers::NONE,
    }
}

// ─── Compound edits ─────────────────────────────────────────────────────

#[test]
fn duplicate_including_page_root_writes_nothing() {
    let mut ed = editor();
    let frame = ed.add_element(ElementType::Frame, None).unwrap();
    let root = ed.store().current_root().unwrap();
    ed.select(&[frame, root], false);
    let before = ed.store().document().clone();

    assert!(!ed.perform(ShortcutAction::Duplicate));
    assert_eq!(ed.store().document(), &before);
    assert_eq!(ed.store().selection(), &[frame, root]);
    assert_eq!(ed.store().history_labels(), vec!["Insert frame"]);

    // The next real edit commits only its own change.
    ed.select(&[frame], false);
    assert!(ed.perform(ShortcutAction::Duplicate));
    assert_eq!(ed.store().document().elements.len(), before.elements.len() + 1);
    assert_eq!(
        ed.store().history_labels(),
        vec!["Insert frame", "Duplicate"]
    );
}

#[test]
fn failing_closure_rolls_back_earlier_steps() {
    let mut ed = editor();
    let frame = ed.add_element(ElementType::Frame, None).unwrap();
    let root = ed.store().current_root().unwrap();
    let before = ed.store().document().clone();

    let out = ed.edit("Move then delete root", |s| {
        s.move_element(frame, Point::new(5.0, 5.0))?;
        s.delete_element(root)
    });
    assert!(out.is_err());
    assert_eq!(ed.store().document(), &before);
    assert_eq!(ed.store().history_labels(), vec!["Insert frame"]);
}

// ─── Undo during a drag ─────────────────────────────────────────────────

#[test]
fn undo_mid_drag_aborts_the_drag() {
    let mut ed = editor();
    let frame = ed.add_element(ElementType::Frame, None).unwrap();
    let inserted_at = ed.store().element(frame).unwrap().position;
    ed.edit("Place", |s| s.move_element(frame, Point::ZERO)).unwrap();

    // Canvas (50,50) at zoom 1 is screen (450,350).
    ed.handle(&down(450.0, 350.0));
    ed.handle(&mv(470.0, 350.0));
    assert!(ed.store().in_gesture());

    assert_eq!(ed.undo().unwrap().as_deref(), Some("Place"));
    assert!(!ed.store().in_gesture());
    assert_eq!(ed.store().element(frame).unwrap().position, inserted_at);

    // The rest of the drag no longer moves anything.
    ed.handle(&mv(500.0, 350.0));
    assert!(!ed.handle(&up(500.0, 350.0)));
    assert_eq!(ed.store().element(frame).unwrap().position, inserted_at);
    assert_eq!(ed.store().history_labels(), vec!["Insert frame"]);
    assert!(ed.store().can_redo());

    assert_eq!(ed.redo().unwrap().as_deref(), Some("Place"));
    assert_eq!(ed.store().element(frame).unwrap().position, Point::ZERO);
}

#[test]
fn discrete_edit_mid_drag_discards_the_partial_drag() {
    let mut ed = editor();
    let frame = ed.add_element(ElementType::Frame, None).unwrap();
    ed.edit("Place", |s| s.move_element(frame, Point::ZERO)).unwrap();

    ed.handle(&down(450.0, 350.0));
    ed.handle(&mv(480.0, 350.0));
    assert!(ed.perform(ShortcutAction::Nudge {
        dx: 0,
        dy: 1,
        large: false,
    }));
    ed.handle(&mv(520.0, 350.0));
    ed.handle(&up(520.0, 350.0));

    assert_eq!(ed.store().element(frame).unwrap().position, Point::new(0.0, 1.0));
    assert_eq!(
        ed.store().history_labels(),
        vec!["Insert frame", "Place", "Nudge"]
    );
}

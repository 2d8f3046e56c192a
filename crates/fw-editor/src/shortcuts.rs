//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.
//! The shortcut map lives in Rust so it's shared across WASM and native.

use fw_core::ElementType;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    ToolSelect,
    ToolHand,

    // ── Insert ──
    Insert(ElementType),

    // ── Edit ──
    Undo,
    Redo,
    Delete,
    SelectAll,
    Duplicate,
    Copy,
    Cut,
    Paste,
    /// Arrow keys; `large` when shift is held.
    Nudge { dx: i8, dy: i8, large: bool },

    // ── Structure ──
    Group,
    Ungroup,
    WrapInFrame,
    ToggleLock,
    ToggleVisibility,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ZoomToFit,
    /// Space held: temporary hand tool.
    PanStart,

    // ── UI ──
    Deselect,
}

fn arrow(key: &str) -> Option<(i8, i8)> {
    match key {
        "ArrowLeft" => Some((-1, 0)),
        "ArrowRight" => Some((1, 0)),
        "ArrowUp" => Some((0, -1)),
        "ArrowDown" => Some((0, 1)),
        _ => None,
    }
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                "g" | "G" => Some(ShortcutAction::Ungroup),
                "l" | "L" => Some(ShortcutAction::ToggleLock),
                "h" | "H" => Some(ShortcutAction::ToggleVisibility),
                _ => None,
            };
        }

        if cmd && alt {
            return match key {
                // ⌥ may turn "g" into "©" on macOS; hosts pass `KeyboardEvent.key`.
                "g" | "G" | "©" => Some(ShortcutAction::WrapInFrame),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "c" | "C" => Some(ShortcutAction::Copy),
                "x" | "X" => Some(ShortcutAction::Cut),
                "v" | "V" => Some(ShortcutAction::Paste),
                "g" | "G" => Some(ShortcutAction::Group),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        if shift {
            if let Some((dx, dy)) = arrow(key) {
                return Some(ShortcutAction::Nudge {
                    dx,
                    dy,
                    large: true,
                });
            }
            return match key {
                "!" | "1" => Some(ShortcutAction::ZoomToFit),
                _ => None,
            };
        }

        if alt {
            return None;
        }

        if let Some((dx, dy)) = arrow(key) {
            return Some(ShortcutAction::Nudge {
                dx,
                dy,
                large: false,
            });
        }

        // ── Single keys (no modifiers) ──
        match key {
            "v" | "V" => Some(ShortcutAction::ToolSelect),
            "h" | "H" => Some(ShortcutAction::ToolHand),
            "f" | "F" => Some(ShortcutAction::Insert(ElementType::Frame)),
            "t" | "T" => Some(ShortcutAction::Insert(ElementType::Text)),
            "i" | "I" => Some(ShortcutAction::Insert(ElementType::Image)),
            "b" | "B" => Some(ShortcutAction::Insert(ElementType::Button)),
            "r" | "R" => Some(ShortcutAction::Insert(ElementType::Box)),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            " " => Some(ShortcutAction::PanStart),
            _ => None,
        }
    }
}

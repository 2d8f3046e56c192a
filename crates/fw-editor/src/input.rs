//! Input abstraction layer.
//!
//! Normalizes pointer, wheel and keyboard events from the host into one
//! enum consumed by the editor. Pointer coordinates are screen pixels
//! relative to the canvas surface.

use fw_core::Point;

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// ⌘ on macOS, ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Unit of a wheel delta (`WheelEvent.deltaMode`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    pub dx: f32,
    pub dy: f32,
    pub mode: DeltaMode,
    pub modifiers: Modifiers,
    /// Pointer position at the time of the event.
    pub pointer: Point,
    /// Host timestamp in milliseconds.
    pub time_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32, modifiers: Modifiers },
    PointerMove { x: f32, y: f32, modifiers: Modifiers },
    PointerUp { x: f32, y: f32, modifiers: Modifiers },
    Wheel(WheelInput),
    KeyDown { key: String, modifiers: Modifiers },
    KeyUp { key: String },
}

impl InputEvent {
    /// Screen position if this is a pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. } => Some(Point::new(*x, *y)),
            Self::Wheel(w) => Some(w.pointer),
            Self::KeyDown { .. } | Self::KeyUp { .. } => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::KeyDown { modifiers, .. } => *modifiers,
            Self::Wheel(w) => w.modifiers,
            Self::KeyUp { .. } => Modifiers::NONE,
        }
    }
}

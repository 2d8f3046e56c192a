//! Pan/zoom viewport and the screen ↔ canvas mapping.
//!
//! Pages render centred on the visible surface, offset by `pan` and scaled by
//! `zoom`: `canvas = (screen - surface_center - pan) / zoom`.

use crate::geometry::{Bounds, Point, Size};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Size of the visible drawing surface in screen pixels.
    pub surface: Size,
    pub pan: Point,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            surface: Size::new(800.0, 600.0),
            pan: Point::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(surface: Size) -> Self {
        Self {
            surface,
            ..Self::default()
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.surface.width / 2.0, self.surface.height / 2.0)
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        (screen - self.center() - self.pan) * (1.0 / self.zoom)
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        canvas * self.zoom + self.center() + self.pan
    }

    /// Canvas-space rectangle spanned by two screen-space corners.
    pub fn screen_rect_to_canvas(&self, a: Point, b: Point) -> Bounds {
        Bounds::from_corners(self.screen_to_canvas(a), self.screen_to_canvas(b))
    }

    pub fn canvas_rect_to_screen(&self, rect: &Bounds) -> Bounds {
        let origin = self.canvas_to_screen(rect.origin());
        Bounds::new(
            origin.x,
            origin.y,
            rect.width * self.zoom,
            rect.height * self.zoom,
        )
    }

    /// Change zoom while keeping the canvas point under `anchor` (screen
    /// space) visually fixed.
    pub fn zoom_around(&mut self, anchor: Point, new_zoom: f32) {
        let fixed = self.screen_to_canvas(anchor);
        self.zoom = new_zoom;
        self.pan = anchor - self.center() - fixed * new_zoom;
    }

    /// Centre `bounds` on the surface at the largest zoom (within limits)
    /// that leaves `padding` screen pixels around it.
    pub fn fit(&mut self, bounds: &Bounds, padding: f32, min_zoom: f32, max_zoom: f32) {
        let avail_w = (self.surface.width - 2.0 * padding).max(1.0);
        let avail_h = (self.surface.height - 2.0 * padding).max(1.0);
        let zoom = if bounds.width <= 0.0 || bounds.height <= 0.0 {
            1.0
        } else {
            (avail_w / bounds.width).min(avail_h / bounds.height)
        };
        self.zoom = zoom.clamp(min_zoom, max_zoom);
        self.pan = Point::ZERO - bounds.center() * self.zoom;
    }

    pub fn reset(&mut self) {
        self.pan = Point::ZERO;
        self.zoom = 1.0;
    }
}

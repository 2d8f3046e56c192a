//! Wheel gesture classification, pan/zoom, and inertial panning.
//!
//! Every wheel event is classified once, normalized to pixel deltas, and
//! applied to a [`Viewport`]. Pan bursts leave a velocity behind which
//! [`GestureController::tick`] decays frame by frame once the wheel goes
//! quiet. Any new wheel event cancels an in-flight inertial pan first.

use crate::config::EditorConfig;
use crate::input::{DeltaMode, WheelInput};
use fw_core::{Point, Viewport};

/// How a wheel event is interpreted, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelGesture {
    /// Ctrl + pixel delta: trackpad pinch.
    PinchZoom,
    /// ⌘/ctrl + line or page delta.
    ModifierZoom,
    /// Two-finger scroll or any horizontal delta.
    Pan,
    /// Plain discrete wheel notches.
    WheelZoom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    Zoomed { from: f32, to: f32 },
    Panned { delta: Point },
    /// Below the noise threshold or clamped to the current zoom.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Inertia {
    Idle,
    /// Waiting for the wheel to go quiet since the last pan event.
    Pending { since: f64 },
    Running,
}

pub struct GestureController {
    config: EditorConfig,
    velocity: Point,
    last_pan_ms: Option<f64>,
    inertia: Inertia,
}

impl GestureController {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            velocity: Point::ZERO,
            last_pan_ms: None,
            inertia: Inertia::Idle,
        }
    }

    pub fn classify(input: &WheelInput) -> WheelGesture {
        let ctrl = input.modifiers.ctrl;
        let pixel = input.mode == DeltaMode::Pixel;
        if ctrl && pixel {
            WheelGesture::PinchZoom
        } else if input.modifiers.command() {
            WheelGesture::ModifierZoom
        } else if pixel || input.dx != 0.0 {
            WheelGesture::Pan
        } else {
            WheelGesture::WheelZoom
        }
    }

    /// Convert line/page deltas to pixels.
    fn normalize(&self, viewport: &Viewport, input: &WheelInput) -> Point {
        let (sx, sy) = match input.mode {
            DeltaMode::Pixel => (1.0, 1.0),
            DeltaMode::Line => (self.config.wheel_line_height, self.config.wheel_line_height),
            DeltaMode::Page => (viewport.surface.width, viewport.surface.height),
        };
        Point::new(input.dx * sx, input.dy * sy)
    }

    /// Apply one wheel event. `zoom_target` is the screen point that should
    /// stay fixed while zooming (the selection centroid); the pointer is used
    /// when it is `None`.
    pub fn on_wheel(
        &mut self,
        viewport: &mut Viewport,
        input: &WheelInput,
        zoom_target: Option<Point>,
    ) -> GestureOutcome {
        self.cancel_inertia();
        let delta = self.normalize(viewport, input);
        let gesture = Self::classify(input);
        let sensitivity = match gesture {
            WheelGesture::PinchZoom => self.config.pinch_sensitivity,
            WheelGesture::ModifierZoom => self.config.modifier_zoom_sensitivity,
            WheelGesture::WheelZoom => self.config.wheel_zoom_sensitivity,
            WheelGesture::Pan => return self.pan(viewport, delta, input.time_ms),
        };

        let from = viewport.zoom;
        let to = self.config.clamp_zoom(from * (-delta.y * sensitivity).exp());
        if (to - from).abs() < self.config.zoom_noise {
            return GestureOutcome::Ignored;
        }
        let anchor = zoom_target.unwrap_or(input.pointer);
        viewport.zoom_around(anchor, to);
        log::trace!("{gesture:?}: zoom {from:.3} -> {to:.3}");
        GestureOutcome::Zoomed { from, to }
    }

    fn pan(&mut self, viewport: &mut Viewport, delta: Point, now_ms: f64) -> GestureOutcome {
        viewport.pan = viewport.pan - delta;
        let burst = self
            .last_pan_ms
            .is_some_and(|last| now_ms - last < self.config.pan_burst_ms);
        self.velocity = if burst {
            delta * -self.config.inertia_velocity_scale
        } else {
            Point::ZERO
        };
        self.last_pan_ms = Some(now_ms);
        self.inertia = Inertia::Pending { since: now_ms };
        GestureOutcome::Panned { delta }
    }

    /// Advance inertial panning to `now_ms`. Returns `true` when the
    /// viewport moved this frame.
    pub fn tick(&mut self, viewport: &mut Viewport, now_ms: f64) -> bool {
        match self.inertia {
            Inertia::Idle => return false,
            Inertia::Pending { since } => {
                if now_ms - since < self.config.inertia_delay_ms {
                    return false;
                }
                self.inertia = Inertia::Running;
            }
            Inertia::Running => {}
        }

        let stop = self.config.inertia_stop;
        if self.velocity.x.abs() < stop && self.velocity.y.abs() < stop {
            self.cancel_inertia();
            return false;
        }
        viewport.pan = viewport.pan + self.velocity;
        self.velocity = self.velocity * self.config.inertia_friction;
        true
    }

    pub fn cancel_inertia(&mut self) {
        if self.inertia == Inertia::Running {
            log::trace!("inertia cancelled");
        }
        self.inertia = Inertia::Idle;
        self.velocity = Point::ZERO;
    }

    /// Whether `tick` still has work to do.
    pub fn is_animating(&self) -> bool {
        self.inertia != Inertia::Idle
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use fw_core::Size;

    fn wheel(dx: f32, dy: f32, mode: DeltaMode, modifiers: Modifiers, t: f64) -> WheelInput {
        WheelInput {
            dx,
            dy,
            mode,
            modifiers,
            pointer: Point::new(400.0, 300.0),
            time_ms: t,
        }
    }

    const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    #[test]
    fn classification_priority() {
        let px = DeltaMode::Pixel;
        let line = DeltaMode::Line;
        assert_eq!(
            GestureController::classify(&wheel(0.0, 5.0, px, CTRL, 0.0)),
            WheelGesture::PinchZoom
        );
        assert_eq!(
            GestureController::classify(&wheel(0.0, 3.0, line, CTRL, 0.0)),
            WheelGesture::ModifierZoom
        );
        assert_eq!(
            GestureController::classify(&wheel(0.0, 5.0, px, Modifiers::NONE, 0.0)),
            WheelGesture::Pan
        );
        assert_eq!(
            GestureController::classify(&wheel(2.0, 3.0, line, Modifiers::NONE, 0.0)),
            WheelGesture::Pan
        );
        assert_eq!(
            GestureController::classify(&wheel(0.0, 3.0, line, Modifiers::NONE, 0.0)),
            WheelGesture::WheelZoom
        );
    }

    #[test]
    fn pinch_zoom_keeps_pointer_fixed() {
        let mut g = GestureController::new(EditorConfig::default());
        let mut vp = Viewport::new(Size::new(800.0, 600.0));
        let input = wheel(0.0, -50.0, DeltaMode::Pixel, CTRL, 0.0);
        let anchor_canvas = vp.screen_to_canvas(input.pointer);

        let outcome = g.on_wheel(&mut vp, &input, None);
        let expected = (50.0_f32 * 0.008).exp();
        assert!(matches!(outcome, GestureOutcome::Zoomed { .. }));
        assert!((vp.zoom - expected).abs() < 1e-5);
        let back = vp.canvas_to_screen(anchor_canvas);
        assert!(back.distance(input.pointer) < 1e-3);
    }

    #[test]
    fn zoom_is_clamped_and_noise_ignored() {
        let mut g = GestureController::new(EditorConfig::default());
        let mut vp = Viewport::default();
        g.on_wheel(&mut vp, &wheel(0.0, -10_000.0, DeltaMode::Pixel, CTRL, 0.0), None);
        assert_eq!(vp.zoom, 4.0);
        let again = g.on_wheel(&mut vp, &wheel(0.0, -10.0, DeltaMode::Pixel, CTRL, 1.0), None);
        assert_eq!(again, GestureOutcome::Ignored);
        assert_eq!(vp.zoom, 4.0);
    }

    #[test]
    fn pan_burst_then_inertia_decays_to_rest() {
        let mut g = GestureController::new(EditorConfig::default());
        let mut vp = Viewport::default();
        let px = DeltaMode::Pixel;
        g.on_wheel(&mut vp, &wheel(0.0, 20.0, px, Modifiers::NONE, 0.0), None);
        g.on_wheel(&mut vp, &wheel(0.0, 20.0, px, Modifiers::NONE, 16.0), None);
        assert_eq!(vp.pan, Point::new(0.0, -40.0));
        assert!((g.velocity().y + 6.0).abs() < 1e-4);

        // Still inside the quiet window.
        assert!(!g.tick(&mut vp, 50.0));
        assert!(g.tick(&mut vp, 100.0));
        assert!((vp.pan.y + 46.0).abs() < 1e-4);

        let mut t = 100.0;
        while g.tick(&mut vp, t) {
            t += 16.0;
        }
        assert!(!g.is_animating());
        assert!(vp.pan.y < -50.0);
    }

    #[test]
    fn slow_pan_leaves_no_velocity() {
        let mut g = GestureController::new(EditorConfig::default());
        let mut vp = Viewport::default();
        let px = DeltaMode::Pixel;
        g.on_wheel(&mut vp, &wheel(10.0, 0.0, px, Modifiers::NONE, 0.0), None);
        g.on_wheel(&mut vp, &wheel(10.0, 0.0, px, Modifiers::NONE, 500.0), None);
        assert_eq!(g.velocity(), Point::ZERO);
        assert!(!g.tick(&mut vp, 1000.0));
        assert_eq!(vp.pan, Point::new(-20.0, 0.0));
    }

    #[test]
    fn new_wheel_event_cancels_inertia() {
        let mut g = GestureController::new(EditorConfig::default());
        let mut vp = Viewport::default();
        let px = DeltaMode::Pixel;
        g.on_wheel(&mut vp, &wheel(0.0, 20.0, px, Modifiers::NONE, 0.0), None);
        g.on_wheel(&mut vp, &wheel(0.0, 20.0, px, Modifiers::NONE, 10.0), None);
        assert!(g.tick(&mut vp, 200.0));
        g.on_wheel(&mut vp, &wheel(0.0, -30.0, DeltaMode::Pixel, CTRL, 210.0), None);
        assert!(!g.is_animating());
        assert_eq!(g.velocity(), Point::ZERO);
    }

    #[test]
    fn line_deltas_are_scaled_before_zoom() {
        let mut g = GestureController::new(EditorConfig::default());
        let mut vp = Viewport::default();
        g.on_wheel(&mut vp, &wheel(0.0, -3.0, DeltaMode::Line, Modifiers::NONE, 0.0), None);
        let expected = (3.0_f32 * 16.0 * 0.002).exp();
        assert!((vp.zoom - expected).abs() < 1e-5);
    }
}

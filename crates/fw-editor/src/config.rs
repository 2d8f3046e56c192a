//! Editor tuning constants.
//!
//! Every threshold the store, gesture controller and tools consult lives
//! here so hosts can override any subset from JSON.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo entries kept.
    pub history_depth: usize,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// `exp(-dy * s)` sensitivity for ctrl + pixel-delta wheel (trackpad pinch).
    pub pinch_sensitivity: f32,
    /// Sensitivity for ⌘/ctrl + scroll with non-pixel deltas.
    pub modifier_zoom_sensitivity: f32,
    /// Sensitivity for plain discrete wheel notches.
    pub wheel_zoom_sensitivity: f32,
    /// Zoom changes smaller than this are ignored.
    pub zoom_noise: f32,
    /// Pan events closer together than this (ms) feed the velocity estimate.
    pub pan_burst_ms: f64,
    /// Quiet time (ms) after the last pan event before inertia starts.
    pub inertia_delay_ms: f64,
    pub inertia_velocity_scale: f32,
    pub inertia_friction: f32,
    /// Inertia stops once both velocity components fall below this.
    pub inertia_stop: f32,
    /// A marquee smaller than this (screen px, both axes) is a click.
    pub marquee_min: f32,
    pub nudge_small: f32,
    pub nudge_large: f32,
    /// Canvas offset applied to duplicated and pasted elements.
    pub duplicate_offset: f32,
    /// Multiplier for keyboard zoom in/out.
    pub zoom_step: f32,
    /// Screen padding kept around content by zoom-to-fit.
    pub fit_padding: f32,
    /// Screen-space pick radius of resize handles.
    pub handle_radius: f32,
    /// Pixels per `DOM_DELTA_LINE` wheel unit.
    pub wheel_line_height: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: 200,
            min_zoom: 0.1,
            max_zoom: 4.0,
            pinch_sensitivity: 0.008,
            modifier_zoom_sensitivity: 0.003,
            wheel_zoom_sensitivity: 0.002,
            zoom_noise: 0.001,
            pan_burst_ms: 50.0,
            inertia_delay_ms: 80.0,
            inertia_velocity_scale: 0.3,
            inertia_friction: 0.92,
            inertia_stop: 0.5,
            marquee_min: 5.0,
            nudge_small: 1.0,
            nudge_large: 10.0,
            duplicate_offset: 10.0,
            zoom_step: 1.25,
            fit_padding: 40.0,
            handle_radius: 6.0,
            wheel_line_height: 16.0,
        }
    }
}

impl EditorConfig {
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

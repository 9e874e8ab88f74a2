//! Editor tuning values.

use serde::{Deserialize, Serialize};

use crate::{EditorError, Result};

/// Fixed parameters of the floor-plan editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Screen margin before world origin (pixels).
    pub padding_px: f64,
    /// Screen pixels per metre at zoom 1.
    pub pixels_per_meter: f64,
    /// Handle grab distance at zoom 1 (metres); divided by zoom.
    pub handle_tolerance: f64,
    /// Smallest zoom factor.
    pub min_zoom: f64,
    /// Largest zoom factor.
    pub max_zoom: f64,
    /// Grid that drag and resize points snap to (metres).
    pub snap: f64,
    /// Smallest aisle extent (metres).
    pub min_aisle_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            padding_px: 40.0,
            pixels_per_meter: 20.0,
            handle_tolerance: 0.5,
            min_zoom: 0.1,
            max_zoom: 5.0,
            snap: 1.0,
            min_aisle_size: 1.0,
        }
    }
}

impl EditorConfig {
    /// Validate the config.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("pixels_per_meter", self.pixels_per_meter),
            ("handle_tolerance", self.handle_tolerance),
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("snap", self.snap),
            ("min_aisle_size", self.min_aisle_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EditorError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.min_zoom > self.max_zoom {
            return Err(EditorError::InvalidConfig(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if !self.padding_px.is_finite() {
            return Err(EditorError::InvalidConfig("padding_px must be finite".into()));
        }
        Ok(())
    }

    /// Round a world coordinate to the snap grid.
    pub fn snap_value(&self, v: f64) -> f64 {
        (v / self.snap).round() * self.snap
    }
}

//! Editor configuration.
//!
//! Every tunable constant of the editor lives in [`EditorConfig`]. The defaults
//! reproduce the reference sizing (a 400x400 canvas, 20%..500% zoom, a 100 unit
//! pan limit). Hosts may override any field by deserializing a partial object;
//! missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::presets::PresetFrame;

/// Errors raised by [`EditorConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Canvas must have a non-zero size.
    #[error("Canvas size must be non-zero")]
    ZeroCanvas,

    /// Scale limits are not a valid positive range.
    #[error("Invalid scale range: min ({min}) must be positive and not exceed max ({max})")]
    InvalidScaleRange { min: f64, max: f64 },

    /// Pan limit must be non-negative.
    #[error("Invalid max offset: {0}")]
    InvalidOffset(f64),

    /// Decoded images must be allowed at least one pixel.
    #[error("Max image size must be non-zero")]
    ZeroImageSize,

    /// Undo history must hold at least one entry.
    #[error("History capacity must be non-zero")]
    ZeroHistory,

    /// Undo history larger than [`MAX_HISTORY_CAPACITY`].
    #[error("History capacity {0} exceeds the maximum")]
    HistoryTooLarge(usize),

    /// Canvas larger than [`MAX_CANVAS_SIZE`].
    #[error("Canvas size {0} exceeds the maximum")]
    CanvasTooLarge(u32),

    /// A step, speed or interval is negative or not a finite number.
    #[error("Invalid {name}: {value}")]
    InvalidStep { name: &'static str, value: f64 },
}

/// Largest accepted canvas edge.
pub const MAX_CANVAS_SIZE: u32 = 4096;

/// Largest accepted undo history.
pub const MAX_HISTORY_CAPACITY: usize = 1000;

/// Bounds applied to every [`TransformState`](crate::TransformState) mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformLimits {
    /// Smallest allowed scale factor.
    pub min_scale: f64,
    /// Largest allowed scale factor.
    pub max_scale: f64,
    /// Position is clamped to `[-max_offset, max_offset]` on both axes.
    pub max_offset: f64,
}

impl Default for TransformLimits {
    fn default() -> Self {
        Self {
            min_scale: 0.2,
            max_scale: 5.0,
            max_offset: 100.0,
        }
    }
}

/// Full editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Width and height of the square output canvas, in logical units.
    pub canvas_size: u32,
    /// Scale and pan bounds.
    #[serde(flatten)]
    pub limits: TransformLimits,
    /// Uploads larger than this on either edge are downscaled on load.
    pub max_image_size: u32,
    /// Maximum number of undo snapshots kept.
    pub history_capacity: usize,
    /// Scale change per wheel delta unit.
    pub zoom_speed: f64,
    /// Arrow key nudge distance.
    pub nudge_step: f64,
    /// Scale change per `+`/`-` keypress.
    pub key_zoom_step: f64,
    /// Scale change per zoom-in/zoom-out button press.
    pub button_zoom_step: f64,
    /// Rotation change per rotate-left/right button press, in degrees.
    pub rotate_step: f64,
    /// Minimum interval between rate-limited updates (wheel, sliders).
    pub rate_limit_ms: f64,
    /// File name handed to the download sink on export.
    pub export_file_name: String,
    /// Ordered preset frame catalog.
    pub presets: Vec<PresetFrame>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_size: 400,
            limits: TransformLimits::default(),
            max_image_size: 1024,
            history_capacity: 10,
            zoom_speed: 0.001,
            nudge_step: 5.0,
            key_zoom_step: 0.05,
            button_zoom_step: 0.1,
            rotate_step: 15.0,
            rate_limit_ms: 50.0,
            export_file_name: "fb-profile-picture.png".to_string(),
            presets: crate::presets::default_presets(),
        }
    }
}

impl EditorConfig {
    /// Create a configuration with the reference defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that the configured limits describe a usable editor.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_size == 0 {
            return Err(ConfigError::ZeroCanvas);
        }
        if self.canvas_size > MAX_CANVAS_SIZE {
            return Err(ConfigError::CanvasTooLarge(self.canvas_size));
        }
        let TransformLimits {
            min_scale,
            max_scale,
            max_offset,
        } = self.limits;
        if !(min_scale > 0.0 && min_scale <= max_scale && max_scale.is_finite()) {
            return Err(ConfigError::InvalidScaleRange {
                min: min_scale,
                max: max_scale,
            });
        }
        if !(max_offset >= 0.0 && max_offset.is_finite()) {
            return Err(ConfigError::InvalidOffset(max_offset));
        }
        if self.max_image_size == 0 {
            return Err(ConfigError::ZeroImageSize);
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        if self.history_capacity > MAX_HISTORY_CAPACITY {
            return Err(ConfigError::HistoryTooLarge(self.history_capacity));
        }
        let steps = [
            ("zoomSpeed", self.zoom_speed),
            ("nudgeStep", self.nudge_step),
            ("keyZoomStep", self.key_zoom_step),
            ("buttonZoomStep", self.button_zoom_step),
            ("rotateStep", self.rotate_step),
            ("rateLimitMs", self.rate_limit_ms),
        ];
        for (name, value) in steps {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidStep { name, value });
            }
        }
        Ok(())
    }

    /// Canvas size as a float, for geometry.
    pub fn canvas_extent(&self) -> f64 {
        self.canvas_size as f64
    }

    /// Zoom control range in percent, `(min, max)`.
    pub fn zoom_percent_range(&self) -> (f64, f64) {
        (self.limits.min_scale * 100.0, self.limits.max_scale * 100.0)
    }
}

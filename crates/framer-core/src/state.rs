//! The canonical subject transform.

use serde::{Deserialize, Serialize};

use crate::config::TransformLimits;
use crate::geometry::{clamp, clamp_offset, normalize_degrees, Point};

/// Scale, offset and rotation of the subject image beneath the frame.
///
/// `position` is the offset of the subject's center from the canvas center, in
/// canvas units. `rotation` is in degrees, normalized to `[0, 360)`.
///
/// Construct or modify through the `with_*` methods so the limits hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub scale: f64,
    pub position: Point,
    pub rotation: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformState {
    /// Scale 1, centered, unrotated.
    pub const IDENTITY: TransformState = TransformState {
        scale: 1.0,
        position: Point::ORIGIN,
        rotation: 0.0,
    };

    /// Copy with `scale` clamped into the limits.
    pub fn with_scale(self, scale: f64, limits: &TransformLimits) -> Self {
        Self {
            scale: clamp(scale, limits.min_scale, limits.max_scale),
            ..self
        }
    }

    /// Copy with both position axes clamped into the limits.
    pub fn with_position(self, position: Point, limits: &TransformLimits) -> Self {
        Self {
            position: clamp_offset(position, limits.max_offset),
            ..self
        }
    }

    /// Copy with `rotation` normalized modulo 360.
    pub fn with_rotation(self, rotation: f64) -> Self {
        Self {
            rotation: normalize_degrees(rotation),
            ..self
        }
    }

    /// Re-apply every bound. Used on snapshots restored from outside.
    pub fn clamped(self, limits: &TransformLimits) -> Self {
        self.with_scale(self.scale, limits)
            .with_position(self.position, limits)
            .with_rotation(self.rotation)
    }

    /// Whether every bound holds.
    pub fn is_within(&self, limits: &TransformLimits) -> bool {
        self.scale >= limits.min_scale
            && self.scale <= limits.max_scale
            && self.position.x.abs() <= limits.max_offset
            && self.position.y.abs() <= limits.max_offset
            && (0.0..360.0).contains(&self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_default() {
        let state = TransformState::default();
        assert_eq!(state.scale, 1.0);
        assert_eq!(state.position, Point::ORIGIN);
        assert_eq!(state.rotation, 0.0);
    }

    #[test]
    fn test_with_scale_clamps() {
        let limits = TransformLimits::default();
        let state = TransformState::IDENTITY.with_scale(9.0, &limits);
        assert_eq!(state.scale, 5.0);
        let state = state.with_scale(0.01, &limits);
        assert_eq!(state.scale, 0.2);
    }

    #[test]
    fn test_with_position_clamps() {
        let limits = TransformLimits::default();
        let state = TransformState::IDENTITY.with_position(Point::new(105.0, -300.0), &limits);
        assert_eq!(state.position, Point::new(100.0, -100.0));
    }

    #[test]
    fn test_with_rotation_wraps() {
        let state = TransformState::IDENTITY.with_rotation(-15.0);
        assert_eq!(state.rotation, 345.0);
        let state = state.with_rotation(375.0);
        assert_eq!(state.rotation, 15.0);
    }

    #[test]
    fn test_clamped_and_is_within() {
        let limits = TransformLimits::default();
        let wild = TransformState {
            scale: 42.0,
            position: Point::new(-500.0, 7.0),
            rotation: -90.0,
        };
        assert!(!wild.is_within(&limits));
        let tame = wild.clamped(&limits);
        assert!(tame.is_within(&limits));
        assert_eq!(tame.scale, 5.0);
        assert_eq!(tame.position, Point::new(-100.0, 7.0));
        assert_eq!(tame.rotation, 270.0);
    }
}

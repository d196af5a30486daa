//! The interpreter's output vocabulary.

use crate::config::TransformLimits;
use crate::geometry::Point;
use crate::state::TransformState;

/// A change to the transform, absolute or relative to the current state.
///
/// [`Change::apply`] always clamps, so no change can leave the limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change {
    /// Move the subject to an absolute offset.
    Position(Point),
    /// Set an absolute scale.
    Scale(f64),
    /// Set scale and position together (pinch zoom about a point).
    ScaleAndPosition { scale: f64, position: Point },
    /// Set an absolute rotation in degrees.
    Rotation(f64),
    /// Offset the current position.
    Translate(Point),
    /// Offset the current scale.
    ScaleBy(f64),
    /// Offset the current rotation in degrees.
    RotateBy(f64),
}

impl Change {
    pub fn apply(self, state: TransformState, limits: &TransformLimits) -> TransformState {
        match self {
            Change::Position(position) => state.with_position(position, limits),
            Change::Scale(scale) => state.with_scale(scale, limits),
            Change::ScaleAndPosition { scale, position } => state
                .with_scale(scale, limits)
                .with_position(position, limits),
            Change::Rotation(rotation) => state.with_rotation(rotation),
            Change::Translate(delta) => state.with_position(state.position + delta, limits),
            Change::ScaleBy(delta) => state.with_scale(state.scale + delta, limits),
            Change::RotateBy(delta) => state.with_rotation(state.rotation + delta),
        }
    }
}

/// What the owner of the transform store should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// A continuous gesture is starting: snapshot, change nothing.
    Checkpoint,
    /// Live update inside a gesture that already snapshotted.
    Update(Change),
    /// Discrete action: snapshot, then apply.
    Commit(Change),
}

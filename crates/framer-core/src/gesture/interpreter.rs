//! The gesture state machine.
//!
//! Each input channel is independent:
//!
//! - **Pointer**: down captures a drag anchor and snapshots; move streams live
//!   positions; up/leave ends the drag.
//! - **Touch**: one touch behaves like the pointer. Two touches enter pinch mode:
//!   the inter-touch distance ratio drives scale, and the pinch midpoint is held
//!   visually stationary via [`zoom_about_point`]. A gesture snapshots once when
//!   it starts, never per move.
//! - **Wheel**: every event commits a new scale.
//! - **Keyboard**: arrows nudge position, `+`/`=`/`-` nudge scale; one commit per press.

use crate::config::{EditorConfig, TransformLimits};
use crate::geometry::{
    clamp, pinch_center_to_canvas_offset, screen_delta_to_canvas, zoom_about_point, Point, Rect,
};
use crate::state::TransformState;

use super::input::Key;
use super::intent::{Change, Intent};

/// Step sizes and limits used by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    pub limits: TransformLimits,
    /// Scale change per wheel delta unit.
    pub zoom_speed: f64,
    /// Arrow key nudge distance.
    pub nudge_step: f64,
    /// Scale change per `+`/`-` press.
    pub key_zoom_step: f64,
}

impl From<&EditorConfig> for GestureSettings {
    fn from(config: &EditorConfig) -> Self {
        Self {
            limits: config.limits,
            zoom_speed: config.zoom_speed,
            nudge_step: config.nudge_step,
            key_zoom_step: config.key_zoom_step,
        }
    }
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

/// Transient per-gesture bookkeeping. Never part of undo history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureContext {
    /// A pointer or single-touch drag is in progress.
    pub dragging: bool,
    /// Pointer position minus subject position at drag start.
    pub drag_anchor: Point,
    /// Inter-touch distance at the previous pinch event.
    pub pinch_distance: Option<f64>,
}

/// Turns raw input into [`Intent`]s.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    settings: GestureSettings,
    context: GestureContext,
    canvas_rect: Rect,
}

impl GestureInterpreter {
    /// `canvas_rect` is the display surface's screen-space bounds, used to
    /// place pinch midpoints on the canvas.
    pub fn new(settings: GestureSettings, canvas_rect: Rect) -> Self {
        Self {
            settings,
            context: GestureContext::default(),
            canvas_rect,
        }
    }

    pub fn context(&self) -> &GestureContext {
        &self.context
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    /// Update the display surface bounds (after layout or scroll).
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn canvas_rect(&self) -> Rect {
        self.canvas_rect
    }

    /// Forget any in-progress gesture.
    pub fn reset(&mut self) {
        self.context = GestureContext::default();
    }

    // --- Pointer ---

    pub fn pointer_down(&mut self, pointer: Point, state: &TransformState) -> Option<Intent> {
        self.begin_drag(pointer, state);
        Some(Intent::Checkpoint)
    }

    pub fn pointer_move(&mut self, pointer: Point) -> Option<Intent> {
        self.drag_to(pointer)
    }

    /// Pointer released or left the surface.
    pub fn pointer_up(&mut self) -> Option<Intent> {
        self.context.dragging = false;
        None
    }

    // --- Touch ---

    /// `touches` is the full list of active touches after the start event.
    pub fn touch_start(&mut self, touches: &[Point], state: &TransformState) -> Option<Intent> {
        match touches {
            [only] => {
                self.begin_drag(*only, state);
                Some(Intent::Checkpoint)
            }
            [a, b] => {
                // Second finger joined: the drag anchor is left as is
                self.context.pinch_distance = Some(a.distance(*b));
                Some(Intent::Checkpoint)
            }
            _ => None,
        }
    }

    /// `touches` is the full list of active touches after the move event.
    pub fn touch_move(&mut self, touches: &[Point], state: &TransformState) -> Option<Intent> {
        match touches {
            [only] => self.drag_to(*only),
            [a, b] => self.pinch(*a, *b, state),
            _ => None,
        }
    }

    /// Any touch lifted: both the drag and the pinch trackers end.
    pub fn touch_end(&mut self) -> Option<Intent> {
        self.context.dragging = false;
        self.context.pinch_distance = None;
        None
    }

    // --- Wheel / keyboard ---

    /// Positive `delta_y` (scroll down) zooms out.
    pub fn wheel(&mut self, delta_y: f64, state: &TransformState) -> Option<Intent> {
        let scale = state.scale - delta_y * self.settings.zoom_speed;
        Some(Intent::Commit(Change::Scale(scale)))
    }

    pub fn key_down(&mut self, key: Key) -> Option<Intent> {
        let step = self.settings.nudge_step;
        let zoom_step = self.settings.key_zoom_step;
        let change = match key {
            Key::ArrowUp => Change::Translate(Point::new(0.0, -step)),
            Key::ArrowDown => Change::Translate(Point::new(0.0, step)),
            Key::ArrowLeft => Change::Translate(Point::new(-step, 0.0)),
            Key::ArrowRight => Change::Translate(Point::new(step, 0.0)),
            Key::ZoomIn => Change::ScaleBy(zoom_step),
            Key::ZoomOut => Change::ScaleBy(-zoom_step),
            Key::Other => return None,
        };
        Some(Intent::Commit(change))
    }

    fn begin_drag(&mut self, pointer: Point, state: &TransformState) {
        self.context.dragging = true;
        self.context.drag_anchor = pointer - state.position;
    }

    fn drag_to(&mut self, pointer: Point) -> Option<Intent> {
        if !self.context.dragging {
            return None;
        }
        let position = screen_delta_to_canvas(pointer, self.context.drag_anchor);
        Some(Intent::Update(Change::Position(position)))
    }

    fn pinch(&mut self, a: Point, b: Point, state: &TransformState) -> Option<Intent> {
        let distance = a.distance(b);
        let previous = match self.context.pinch_distance {
            Some(d) if d > 0.0 => d,
            _ => {
                // No usable baseline yet; this event seeds it
                self.context.pinch_distance = Some(distance);
                return None;
            }
        };
        self.context.pinch_distance = Some(distance);

        let limits = &self.settings.limits;
        let scale = clamp(
            state.scale * (distance / previous),
            limits.min_scale,
            limits.max_scale,
        );
        let anchor = pinch_center_to_canvas_offset(a.midpoint(b), self.canvas_rect);
        let position = zoom_about_point(state.position, anchor, state.scale, scale);
        Some(Intent::Update(Change::ScaleAndPosition { scale, position }))
    }
}

//! Coordinate-space helpers shared by the gesture interpreter and compositor.
//!
//! Three spaces are involved:
//!
//! - **Screen space**: pointer/touch coordinates reported by the host (client pixels).
//! - **Canvas space**: the fixed `canvas_size x canvas_size` output surface, origin top-left.
//! - **Centered canvas space**: canvas space with the origin moved to the canvas midpoint.
//!   Subject position offsets and zoom anchors live here.
//!
//! Rotation angles are in degrees, positive = clockwise on a y-down surface.
//! Everything here is a pure function.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point or vector in any of the coordinate spaces above.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points.
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Screen-space bounding rectangle of the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A rect of the given size at the screen origin.
    pub fn square(size: f64) -> Self {
        Self::new(0.0, 0.0, size, size)
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Clamp `v` into `[lo, hi]`.
///
/// Unlike [`f64::clamp`] this never panics when `lo > hi`; `lo` wins, which
/// matches `max(lo, min(hi, v))`.
#[inline]
pub fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(v))
}

/// Clamp both axes of `p` into `[-limit, limit]`.
#[inline]
pub fn clamp_offset(p: Point, limit: f64) -> Point {
    Point::new(clamp(p.x, -limit, limit), clamp(p.y, -limit, limit))
}

/// New (unclamped) subject position for a drag.
///
/// `drag_anchor` is the pointer position minus the subject position captured
/// at gesture start, so the subject keeps its offset relative to the pointer.
#[inline]
pub fn screen_delta_to_canvas(pointer: Point, drag_anchor: Point) -> Point {
    pointer - drag_anchor
}

/// Rotate `point` about `center` by `angle_degrees`.
pub fn pivot_rotate(point: Point, center: Point, angle_degrees: f64) -> Point {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

/// Map a screen-space pinch midpoint into centered canvas space.
pub fn pinch_center_to_canvas_offset(center_screen: Point, canvas_rect: Rect) -> Point {
    center_screen - canvas_rect.center()
}

/// Position that keeps `anchor` visually stationary while scale goes `s0 -> s1`.
///
/// `anchor` is in centered canvas space. The result is unclamped.
pub fn zoom_about_point(position: Point, anchor: Point, s0: f64, s1: f64) -> Point {
    Point::new(
        position.x + (anchor.x / s0 - anchor.x / s1),
        position.y + (anchor.y / s0 - anchor.y / s1),
    )
}

/// Normalize an angle into `[0, 360)`.
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Express a normalized angle in `(-180, 180]`.
#[inline]
pub fn signed_degrees(angle: f64) -> f64 {
    let a = normalize_degrees(angle);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}

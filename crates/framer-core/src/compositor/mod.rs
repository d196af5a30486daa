//! Compositing the subject and frame into the canvas, and the repeating
//! render task that drives it.
//!
//! # Layers
//!
//! Every pass paints, bottom to top:
//!
//! 1. the background fill (the subject's dominant color, white without one)
//! 2. the subject, scaled and rotated about the canvas center
//! 3. the frame overlay, stretched over the full canvas
//!
//! The order matters: the frame masks the subject, and the background shows
//! through wherever the subject is transparent or does not reach.

mod render_loop;
mod scene;

pub use render_loop::{FrameScheduler, RenderLoop, SceneIdentity};
pub use scene::{CompositeFrame, Compositor, Scene};

//! `requestAnimationFrame` as a [`FrameScheduler`].

use framer_core::FrameScheduler;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::types::js_error_message;

/// Schedules `callback` on the next display refresh.
///
/// The callback is owned here so it lives exactly as long as the render loop
/// that may still have a frame requested.
pub struct RafScheduler {
    window: Window,
    callback: Closure<dyn FnMut(f64)>,
}

impl RafScheduler {
    pub fn new(window: Window, callback: Closure<dyn FnMut(f64)>) -> Self {
        Self { window, callback }
    }
}

impl FrameScheduler for RafScheduler {
    type Ticket = i32;

    fn request(&mut self) -> Option<i32> {
        self.window
            .request_animation_frame(self.callback.as_ref().unchecked_ref())
            .map_err(|e| log::warn!("requestAnimationFrame failed: {}", js_error_message(&e)))
            .ok()
    }

    fn cancel(&mut self, ticket: i32) {
        if let Err(e) = self.window.cancel_animation_frame(ticket) {
            log::warn!("cancelAnimationFrame failed: {}", js_error_message(&e));
        }
    }
}

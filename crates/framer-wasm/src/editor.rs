//! The editor as seen from JavaScript.
//!
//! [`JsEditor`] owns an [`EditorSession`], a 2D canvas context to paint into,
//! and a [`RenderLoop`] driven by `requestAnimationFrame`. The page forwards
//! DOM events to the matching methods; coordinates are client (viewport)
//! pixels as found on `MouseEvent` and `Touch`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use framer_core::{EditorConfig, EditorSession, Key, Point, RenderLoop};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData, Window};

use crate::download::AnchorDownload;
use crate::locale::JsLocale;
use crate::scheduler::RafScheduler;
use crate::types::{points_from_flat, rect_from_bounds, to_js_error, JsExportedFile};

struct Inner {
    session: EditorSession,
    render_loop: RenderLoop<RafScheduler>,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    window: Window,
}

impl Inner {
    fn on_animation_frame(&mut self) {
        if !self.render_loop.on_frame() {
            return;
        }
        let now = now_ms(&self.window);
        let frame = self.session.tick(now);
        let painted = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(frame.pixels()),
            frame.width(),
            frame.height(),
        )
        .and_then(|data| self.context.put_image_data(&data, 0.0, 0.0));
        if let Err(e) = painted {
            log::error!("failed to paint frame: {:?}", e);
        }
    }

    /// Start of a user gesture: re-measure the canvas and revive a stalled loop.
    fn begin_interaction(&mut self) {
        self.refresh_canvas_rect();
        if self.render_loop.is_stalled() {
            self.sync_loop();
        }
    }

    fn refresh_canvas_rect(&mut self) {
        let bounds = self.canvas.get_bounding_client_rect();
        self.session.set_canvas_rect(rect_from_bounds(
            bounds.left(),
            bounds.top(),
            bounds.width(),
            bounds.height(),
        ));
    }

    fn sync_loop(&mut self) {
        let identity = self.session.scene_identity();
        self.render_loop.sync_identity(identity);
    }

    fn now(&self) -> f64 {
        now_ms(&self.window)
    }
}

fn now_ms(window: &Window) -> f64 {
    window
        .performance()
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Interactive profile picture editor bound to a `<canvas>`.
#[wasm_bindgen]
pub struct JsEditor {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl JsEditor {
    /// Attach to `canvas`. `config` is an optional partial configuration
    /// object; omitted fields keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: JsValue) -> Result<JsEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let session = EditorSession::new(config).map_err(to_js_error)?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let size = session.config().canvas_size;
        canvas.set_width(size);
        canvas.set_height(size);
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        let inner = Rc::new_cyclic(|weak: &Weak<RefCell<Inner>>| {
            let weak = weak.clone();
            let callback = Closure::wrap(Box::new(move |_timestamp: f64| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                match inner.try_borrow_mut() {
                    Ok(mut inner) => inner.on_animation_frame(),
                    Err(_) => log::warn!("animation frame skipped: editor busy"),
                };
            }) as Box<dyn FnMut(f64)>);

            RefCell::new(Inner {
                render_loop: RenderLoop::new(RafScheduler::new(window.clone(), callback)),
                session,
                canvas,
                context,
                window,
            })
        });

        {
            let mut guard = inner.borrow_mut();
            guard.refresh_canvas_rect();
            let identity = guard.session.scene_identity();
            guard.render_loop.start(identity);
        }
        log::info!("editor attached ({}x{} canvas)", size, size);

        Ok(JsEditor { inner })
    }

    // --- Images ---

    /// Load the user's photo from its file bytes.
    pub fn load_subject(&self, bytes: &[u8]) -> Result<(), JsValue> {
        let mut inner = self.inner.borrow_mut();
        inner.session.load_subject(bytes).map_err(to_js_error)?;
        inner.sync_loop();
        Ok(())
    }

    /// Load a custom frame overlay from its file bytes.
    pub fn load_frame(&self, bytes: &[u8]) -> Result<(), JsValue> {
        let mut inner = self.inner.borrow_mut();
        inner.session.load_frame(bytes).map_err(to_js_error)?;
        inner.sync_loop();
        Ok(())
    }

    /// Install the preset `name` from the bytes fetched at its url.
    pub fn select_preset(&self, name: &str, bytes: &[u8]) -> Result<(), JsValue> {
        let mut inner = self.inner.borrow_mut();
        inner.session.select_preset(name, bytes).map_err(to_js_error)?;
        inner.sync_loop();
        Ok(())
    }

    /// `[{ name, url }]` of the preset frames.
    pub fn presets(&self) -> Result<JsValue, JsValue> {
        let inner = self.inner.borrow();
        serde_wasm_bindgen::to_value(inner.session.presets()).map_err(to_js_error)
    }

    // --- Pointer and touch ---

    pub fn pointer_down(&self, client_x: f64, client_y: f64) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner.begin_interaction();
        inner.session.pointer_down(Point::new(client_x, client_y))
    }

    pub fn pointer_move(&self, client_x: f64, client_y: f64) -> bool {
        self.inner
            .borrow_mut()
            .session
            .pointer_move(Point::new(client_x, client_y))
    }

    /// Call on `mouseup` and `mouseleave`.
    pub fn pointer_up(&self) {
        self.inner.borrow_mut().session.pointer_up();
    }

    /// `touches` is `[x0, y0, x1, y1, ...]` in client coordinates.
    pub fn touch_start(&self, touches: &[f64]) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner.begin_interaction();
        inner.session.touch_start(&points_from_flat(touches))
    }

    pub fn touch_move(&self, touches: &[f64]) -> bool {
        self.inner
            .borrow_mut()
            .session
            .touch_move(&points_from_flat(touches))
    }

    pub fn touch_end(&self) {
        self.inner.borrow_mut().session.touch_end();
    }

    // --- Wheel, keys, sliders ---

    pub fn wheel(&self, delta_y: f64) -> bool {
        let mut inner = self.inner.borrow_mut();
        let now = inner.now();
        inner.session.wheel(now, delta_y)
    }

    /// `key` is `KeyboardEvent.key`. Returns `true` if the editor handled it
    /// and the page should `preventDefault()`.
    pub fn key_down(&self, key: &str) -> bool {
        self.inner
            .borrow_mut()
            .session
            .key_down(Key::from_browser(key))
    }

    pub fn set_zoom_percent(&self, percent: f64) -> bool {
        let mut inner = self.inner.borrow_mut();
        let now = inner.now();
        inner.session.set_zoom_percent(now, percent)
    }

    pub fn set_rotation(&self, degrees: f64) -> bool {
        let mut inner = self.inner.borrow_mut();
        let now = inner.now();
        inner.session.set_rotation_degrees(now, degrees)
    }

    // --- Buttons ---

    pub fn zoom_in(&self) -> bool {
        self.inner.borrow_mut().session.zoom_in()
    }

    pub fn zoom_out(&self) -> bool {
        self.inner.borrow_mut().session.zoom_out()
    }

    pub fn rotate_left(&self) -> bool {
        self.inner.borrow_mut().session.rotate_left()
    }

    pub fn rotate_right(&self) -> bool {
        self.inner.borrow_mut().session.rotate_right()
    }

    pub fn reset(&self) -> bool {
        self.inner.borrow_mut().session.reset()
    }

    pub fn undo(&self) -> bool {
        self.inner.borrow_mut().session.undo()
    }

    // --- Presentation ---

    /// Snapshot of control state for the page to render.
    pub fn controls(&self) -> Result<JsValue, JsValue> {
        let inner = self.inner.borrow();
        serde_wasm_bindgen::to_value(&inner.session.controls()).map_err(to_js_error)
    }

    pub fn status_line(&self, locale: &JsLocale) -> String {
        self.inner.borrow().session.status_line(&locale.context)
    }

    // --- Export ---

    /// Encode the composite without saving it.
    pub fn export_png(&self) -> Result<JsExportedFile, JsValue> {
        let inner = self.inner.borrow();
        let file = inner.session.export().map_err(to_js_error)?;
        Ok(file.into())
    }

    /// Encode the composite and save it through a browser download.
    pub fn download(&self) -> Result<(), JsValue> {
        let inner = self.inner.borrow();
        inner
            .session
            .download(&mut AnchorDownload)
            .map_err(to_js_error)?;
        Ok(())
    }

    /// Stop rendering and release both images.
    pub fn destroy(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.render_loop.stop();
        inner.session.unload();
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn canvas() -> HtmlCanvasElement {
        web_sys::window()
            .unwrap()
            .document()
            .unwrap()
            .create_element("canvas")
            .unwrap()
            .dyn_into()
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_editor_sizes_canvas() {
        let canvas = canvas();
        let _editor = JsEditor::new(canvas.clone(), JsValue::UNDEFINED).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (400, 400));
    }

    #[wasm_bindgen_test]
    fn test_controls_disabled_without_subject() {
        let editor = JsEditor::new(canvas(), JsValue::NULL).unwrap();
        assert!(!editor.zoom_in());
        assert!(!editor.undo());
        assert!(editor.export_png().is_err());
    }

    #[wasm_bindgen_test]
    fn test_rejects_undecodable_subject() {
        let editor = JsEditor::new(canvas(), JsValue::UNDEFINED).unwrap();
        assert!(editor.load_subject(&[1, 2, 3]).is_err());
    }
}

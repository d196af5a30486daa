//! The editing session: one subject, one frame, one transform.
//!
//! [`EditorSession`] is the single owner of everything the editor mutates. It
//! routes raw input through the [`GestureInterpreter`], applies the resulting
//! intents to the [`TransformStore`] under the commit protocol, owns both image
//! slots, and renders through its [`Compositor`].
//!
//! Every input handler is a no-op while no subject is loaded. Wheel events and
//! slider drags go through [`RateLimiter`]s; values they hold back are applied
//! by [`EditorSession::tick`], which the host calls once per render loop frame.
//!
//! Time is always supplied by the host as milliseconds on a monotonic clock.

use serde::Serialize;
use thiserror::Error;

use crate::asset::{AssetKind, AssetLoader, ImageAsset, ResourceLedger};
use crate::color::{dominant_color, Rgb};
use crate::compositor::{CompositeFrame, Compositor, Scene, SceneIdentity};
use crate::config::{ConfigError, EditorConfig};
use crate::decode::DecodeError;
use crate::export::{export_composite, DownloadSink, ExportError, ExportedFile};
use crate::geometry::{clamp, signed_degrees, Point, Rect};
use crate::gesture::{Change, GestureContext, GestureInterpreter, GestureSettings, Intent, Key};
use crate::history::TransformStore;
use crate::locale::{KeyValueStore, LocaleContext};
use crate::presets::{find_preset, PresetFrame};
use crate::rate_limit::RateLimiter;
use crate::state::TransformState;

use std::rc::Rc;

/// Errors from loading an image into one of the session's slots.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The bytes could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// No preset with that name exists in the catalog.
    #[error("Unknown preset frame: {0}")]
    UnknownPreset(String),
}

/// Which controls the host should enable, and what they display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsState {
    pub has_subject: bool,
    pub has_frame: bool,
    /// Zoom, rotate, reset and download all follow this.
    pub controls_enabled: bool,
    pub can_undo: bool,
    /// Value shown by the zoom slider, in percent.
    pub zoom_percent: f64,
    pub zoom_min_percent: f64,
    pub zoom_max_percent: f64,
    /// Value shown by the rotation slider, in `(-180, 180]`.
    pub rotation_degrees: f64,
    /// CSS cursor for the canvas.
    pub cursor: &'static str,
    pub selected_preset: Option<String>,
    pub history_len: usize,
    /// CSS color of the background fill.
    pub background: String,
}

/// One editing session.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    store: TransformStore,
    gestures: GestureInterpreter,
    loader: AssetLoader,
    compositor: Compositor,
    subject: Option<ImageAsset>,
    frame: Option<ImageAsset>,
    selected_preset: Option<String>,
    background: Rgb,
    wheel: RateLimiter<f64>,
    zoom_slider: RateLimiter<f64>,
    rotation_slider: RateLimiter<f64>,
}

impl EditorSession {
    /// Create a session with its own resource ledger.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] if `config` does not validate.
    pub fn new(config: EditorConfig) -> Result<Self, ConfigError> {
        Self::with_ledger(config, ResourceLedger::new())
    }

    /// Create a session whose asset handles are tracked by `ledger`.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] if `config` does not validate.
    pub fn with_ledger(config: EditorConfig, ledger: Rc<ResourceLedger>) -> Result<Self, ConfigError> {
        config.validate()?;
        let canvas = Rect::square(config.canvas_extent());
        let interval = config.rate_limit_ms;
        Ok(Self {
            store: TransformStore::new(config.limits, config.history_capacity),
            gestures: GestureInterpreter::new(GestureSettings::from(&config), canvas),
            loader: AssetLoader::new(ledger, config.max_image_size),
            compositor: Compositor::new(config.canvas_size),
            subject: None,
            frame: None,
            selected_preset: None,
            background: Rgb::WHITE,
            wheel: RateLimiter::new(interval),
            zoom_slider: RateLimiter::new(interval),
            rotation_slider: RateLimiter::new(interval),
            config,
        })
    }

    // --- Accessors ---

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> TransformState {
        self.store.state()
    }

    pub fn history_len(&self) -> usize {
        self.store.history().len()
    }

    pub fn can_undo(&self) -> bool {
        self.has_subject() && self.store.can_undo()
    }

    pub fn has_subject(&self) -> bool {
        self.subject.is_some()
    }

    pub fn subject(&self) -> Option<&ImageAsset> {
        self.subject.as_ref()
    }

    pub fn frame(&self) -> Option<&ImageAsset> {
        self.frame.as_ref()
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn selected_preset(&self) -> Option<&str> {
        self.selected_preset.as_deref()
    }

    pub fn presets(&self) -> &[PresetFrame] {
        &self.config.presets
    }

    pub fn gesture_context(&self) -> &GestureContext {
        self.gestures.context()
    }

    pub fn ledger(&self) -> &Rc<ResourceLedger> {
        self.loader.ledger()
    }

    /// Where the canvas currently sits on screen, for pinch math.
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.gestures.set_canvas_rect(rect);
    }

    // --- Image slots ---

    /// Decode `bytes` as the new subject.
    ///
    /// On success the transform returns to identity, history and the gesture
    /// context are cleared, pending rate-limited values are dropped and the
    /// background color is resampled. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Decode`] if the bytes are not a decodable image.
    pub fn load_subject(&mut self, bytes: &[u8]) -> Result<SceneIdentity, LoadError> {
        let asset = self
            .loader
            .load_upload(bytes, AssetKind::Subject)
            .inspect_err(|e| log::warn!("subject upload rejected: {}", e))?;
        self.background = dominant_color(asset.bitmap());
        self.subject = Some(asset);
        self.store.clear();
        self.gestures.reset();
        self.cancel_pending();
        Ok(self.scene_identity())
    }

    /// Decode `bytes` as a custom frame. Clears the preset selection.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Decode`] if the bytes are not a decodable image.
    pub fn load_frame(&mut self, bytes: &[u8]) -> Result<SceneIdentity, LoadError> {
        let asset = self
            .loader
            .load_upload(bytes, AssetKind::Frame)
            .inspect_err(|e| log::warn!("frame upload rejected: {}", e))?;
        self.install_frame(asset);
        self.selected_preset = None;
        Ok(self.scene_identity())
    }

    /// Install the preset `name`, whose overlay bytes the host fetched from
    /// its catalog url.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnknownPreset`] if `name` is not in the catalog and
    /// [`LoadError::Decode`] if the bytes do not decode. Either way nothing
    /// changes.
    pub fn select_preset(&mut self, name: &str, bytes: &[u8]) -> Result<SceneIdentity, LoadError> {
        if find_preset(&self.config.presets, name).is_none() {
            return Err(LoadError::UnknownPreset(name.to_string()));
        }
        let asset = self
            .loader
            .load_preset(bytes)
            .inspect_err(|e| log::warn!("preset {} rejected: {}", name, e))?;
        self.install_frame(asset);
        self.selected_preset = Some(name.to_string());
        Ok(self.scene_identity())
    }

    /// Release both images and forget the transform.
    pub fn unload(&mut self) {
        self.subject = None;
        self.frame = None;
        self.selected_preset = None;
        self.background = Rgb::WHITE;
        self.store.clear();
        self.gestures.reset();
        self.cancel_pending();
        self.compositor.clear_frame_cache();
    }

    /// Identity of the current image pair, for restarting the render loop.
    pub fn scene_identity(&self) -> SceneIdentity {
        (
            self.subject.as_ref().map(ImageAsset::id),
            self.frame.as_ref().map(ImageAsset::id),
        )
    }

    fn install_frame(&mut self, asset: ImageAsset) {
        self.frame = Some(asset);
        self.compositor.clear_frame_cache();
    }

    // --- Pointer and touch ---

    pub fn pointer_down(&mut self, pointer: Point) -> bool {
        if !self.has_subject() {
            return false;
        }
        let state = self.store.state();
        let intent = self.gestures.pointer_down(pointer, &state);
        self.dispatch(intent)
    }

    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        if !self.has_subject() {
            return false;
        }
        let intent = self.gestures.pointer_move(pointer);
        self.dispatch(intent)
    }

    /// Pointer released or left the canvas.
    pub fn pointer_up(&mut self) {
        self.gestures.pointer_up();
    }

    pub fn touch_start(&mut self, touches: &[Point]) -> bool {
        if !self.has_subject() {
            return false;
        }
        let state = self.store.state();
        let intent = self.gestures.touch_start(touches, &state);
        self.dispatch(intent)
    }

    pub fn touch_move(&mut self, touches: &[Point]) -> bool {
        if !self.has_subject() {
            return false;
        }
        let state = self.store.state();
        let intent = self.gestures.touch_move(touches, &state);
        self.dispatch(intent)
    }

    pub fn touch_end(&mut self) {
        self.gestures.touch_end();
    }

    // --- Wheel and keyboard ---

    /// Scroll zoom, rate limited. Returns `true` if the scale changed now.
    pub fn wheel(&mut self, now_ms: f64, delta_y: f64) -> bool {
        if !self.has_subject() {
            return false;
        }
        match self.wheel.submit(now_ms, delta_y) {
            Some(delta_y) => self.apply_wheel(delta_y),
            None => false,
        }
    }

    /// Returns `true` if the key was handled.
    pub fn key_down(&mut self, key: Key) -> bool {
        if !self.has_subject() {
            return false;
        }
        let intent = self.gestures.key_down(key);
        self.dispatch(intent)
    }

    // --- Sliders ---

    /// Zoom slider moved to `percent`, rate limited.
    pub fn set_zoom_percent(&mut self, now_ms: f64, percent: f64) -> bool {
        if !self.has_subject() || !percent.is_finite() {
            return false;
        }
        let (lo, hi) = self.config.zoom_percent_range();
        let percent = clamp(percent, lo, hi);
        match self.zoom_slider.submit(now_ms, percent) {
            Some(percent) => self.commit(Change::Scale(percent / 100.0)),
            None => false,
        }
    }

    /// Rotation slider moved to `degrees`, rate limited.
    pub fn set_rotation_degrees(&mut self, now_ms: f64, degrees: f64) -> bool {
        if !self.has_subject() || !degrees.is_finite() {
            return false;
        }
        let degrees = clamp(degrees, -180.0, 180.0);
        match self.rotation_slider.submit(now_ms, degrees) {
            Some(degrees) => self.commit(Change::Rotation(degrees)),
            None => false,
        }
    }

    // --- Buttons ---

    pub fn zoom_in(&mut self) -> bool {
        let step = self.config.button_zoom_step;
        self.discrete(Change::ScaleBy(step))
    }

    pub fn zoom_out(&mut self) -> bool {
        let step = self.config.button_zoom_step;
        self.discrete(Change::ScaleBy(-step))
    }

    pub fn rotate_left(&mut self) -> bool {
        let step = self.config.rotate_step;
        self.discrete(Change::RotateBy(-step))
    }

    pub fn rotate_right(&mut self) -> bool {
        let step = self.config.rotate_step;
        self.discrete(Change::RotateBy(step))
    }

    /// Commit a return to identity.
    pub fn reset(&mut self) -> bool {
        if !self.has_subject() {
            return false;
        }
        self.cancel_pending();
        self.store.reset();
        true
    }

    /// Restore the previous snapshot. Returns `false` if there is none.
    pub fn undo(&mut self) -> bool {
        if !self.has_subject() {
            return false;
        }
        self.cancel_pending();
        self.store.undo()
    }

    // --- Rendering ---

    /// Apply rate-limited values whose interval has elapsed.
    ///
    /// Returns `true` if the state changed.
    pub fn flush(&mut self, now_ms: f64) -> bool {
        let mut changed = false;
        if let Some(delta_y) = self.wheel.poll(now_ms) {
            changed |= self.apply_wheel(delta_y);
        }
        if let Some(percent) = self.zoom_slider.poll(now_ms) {
            changed |= self.commit(Change::Scale(percent / 100.0));
        }
        if let Some(degrees) = self.rotation_slider.poll(now_ms) {
            changed |= self.commit(Change::Rotation(degrees));
        }
        changed
    }

    /// One render loop frame: flush held values, then composite.
    pub fn tick(&mut self, now_ms: f64) -> CompositeFrame<'_> {
        self.flush(now_ms);
        let scene = Scene {
            state: self.store.state(),
            subject: self.subject.as_ref(),
            frame: self.frame.as_ref(),
            background: self.background,
        };
        self.compositor.render(&scene)
    }

    /// What a render pass would draw right now.
    pub fn scene(&self) -> Scene<'_> {
        Scene {
            state: self.store.state(),
            subject: self.subject.as_ref(),
            frame: self.frame.as_ref(),
            background: self.background,
        }
    }

    // --- Export ---

    /// Render the composite once and encode it.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NoSubject`] without a subject, or the encoding error.
    pub fn export(&self) -> Result<ExportedFile, ExportError> {
        if !self.has_subject() {
            return Err(ExportError::NoSubject);
        }
        export_composite(
            &self.scene(),
            self.config.canvas_size,
            &self.config.export_file_name,
        )
    }

    /// Export and hand the file to `sink`.
    ///
    /// # Errors
    ///
    /// Returns any error from [`export`](Self::export) or from the sink.
    pub fn download(&self, sink: &mut dyn DownloadSink) -> Result<ExportedFile, ExportError> {
        let file = self.export()?;
        sink.deliver(&file)?;
        Ok(file)
    }

    // --- Presentation ---

    pub fn controls(&self) -> ControlsState {
        let state = self.store.state();
        let (zoom_min_percent, zoom_max_percent) = self.config.zoom_percent_range();
        let zoom_percent = self
            .zoom_slider
            .pending()
            .copied()
            .unwrap_or_else(|| (state.scale * 100.0).round());
        let rotation_degrees = self
            .rotation_slider
            .pending()
            .copied()
            .unwrap_or_else(|| signed_degrees(state.rotation));
        let has_subject = self.has_subject();

        ControlsState {
            has_subject,
            has_frame: self.frame.is_some(),
            controls_enabled: has_subject,
            can_undo: self.can_undo(),
            zoom_percent,
            zoom_min_percent,
            zoom_max_percent,
            rotation_degrees,
            cursor: if has_subject { "move" } else { "default" },
            selected_preset: self.selected_preset.clone(),
            history_len: self.history_len(),
            background: self.background.to_css(),
        }
    }

    /// `"Scale: 1.00 | Position: (0, 0) | Rotation: 0°"` with translated labels.
    pub fn status_line<S: KeyValueStore>(&self, locale: &LocaleContext<S>) -> String {
        let state = self.store.state();
        format!(
            "{}: {:.2} | {}: ({}, {}) | {}: {}°",
            locale.t("scale"),
            state.scale,
            locale.t("position"),
            whole(state.position.x),
            whole(state.position.y),
            locale.t("rotation"),
            whole(state.rotation),
        )
    }

    // --- Internals ---

    fn dispatch(&mut self, intent: Option<Intent>) -> bool {
        match intent {
            None => false,
            Some(Intent::Checkpoint) => {
                self.store.checkpoint();
                true
            }
            Some(Intent::Update(change)) => {
                self.store.update(|state, limits| change.apply(state, limits));
                true
            }
            Some(Intent::Commit(change)) => self.commit(change),
        }
    }

    fn commit(&mut self, change: Change) -> bool {
        self.store.commit(|state, limits| change.apply(state, limits));
        true
    }

    fn discrete(&mut self, change: Change) -> bool {
        if !self.has_subject() {
            return false;
        }
        self.commit(change)
    }

    fn apply_wheel(&mut self, delta_y: f64) -> bool {
        let state = self.store.state();
        let intent = self.gestures.wheel(delta_y, &state);
        self.dispatch(intent)
    }

    fn cancel_pending(&mut self) {
        self.wheel.cancel();
        self.zoom_slider.cancel();
        self.rotation_slider.cancel();
    }
}

/// Round to a whole number for display, without a `-0`.
fn whole(v: f64) -> f64 {
    v.round() + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedImage;
    use crate::locale::{Language, MemoryStore};
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = DecodedImage::filled(width, height, rgba);
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&img.pixels, width, height, ExtendedColorType::Rgba8)
            .unwrap();
        out
    }

    fn session() -> EditorSession {
        EditorSession::new(EditorConfig::default()).unwrap()
    }

    fn loaded() -> EditorSession {
        let mut s = session();
        s.load_subject(&png(40, 30, [200, 10, 10, 255])).unwrap();
        s
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EditorConfig::default();
        config.history_capacity = 0;
        assert!(matches!(
            EditorSession::new(config),
            Err(ConfigError::ZeroHistory)
        ));

        let mut config = EditorConfig::default();
        config.rotate_step = f64::NAN;
        assert!(matches!(
            EditorSession::new(config),
            Err(ConfigError::InvalidStep { .. })
        ));

        let mut config = EditorConfig::default();
        config.history_capacity = usize::MAX / 2;
        assert!(matches!(
            EditorSession::new(config),
            Err(ConfigError::HistoryTooLarge(_))
        ));
    }

    #[test]
    fn test_inputs_are_noops_without_subject() {
        let mut s = session();
        assert!(!s.pointer_down(Point::new(10.0, 10.0)));
        assert!(!s.pointer_move(Point::new(50.0, 10.0)));
        assert!(!s.touch_start(&[Point::new(1.0, 1.0)]));
        assert!(!s.wheel(0.0, -100.0));
        assert!(!s.key_down(Key::ArrowRight));
        assert!(!s.set_zoom_percent(0.0, 300.0));
        assert!(!s.set_rotation_degrees(0.0, 45.0));
        assert!(!s.zoom_in());
        assert!(!s.rotate_left());
        assert!(!s.reset());
        assert!(!s.undo());
        assert_eq!(s.state(), TransformState::IDENTITY);
        assert_eq!(s.history_len(), 0);
        assert!(matches!(s.export(), Err(ExportError::NoSubject)));
    }

    #[test]
    fn test_arrow_nudges_and_clamps() {
        let mut s = loaded();
        assert!(s.key_down(Key::ArrowRight));
        assert_eq!(s.state().position, Point::new(5.0, 0.0));

        for _ in 0..18 {
            s.key_down(Key::ArrowRight);
        }
        assert_close(s.state().position.x, 95.0);
        for _ in 0..21 {
            s.key_down(Key::ArrowRight);
        }
        assert_close(s.state().position.x, 100.0);
        // Capacity bound holds through many commits
        assert_eq!(s.history_len(), 10);
    }

    #[test]
    fn test_other_key_is_ignored() {
        let mut s = loaded();
        assert!(!s.key_down(Key::Other));
        assert_eq!(s.history_len(), 0);
    }

    #[test]
    fn test_rotate_left_wraps() {
        let mut s = loaded();
        s.rotate_left();
        assert_close(s.state().rotation, 345.0);
        assert_close(s.controls().rotation_degrees, -15.0);
        s.rotate_right();
        s.rotate_right();
        assert_close(s.state().rotation, 15.0);
    }

    #[test]
    fn test_zoom_buttons_clamp() {
        let mut s = loaded();
        s.zoom_in();
        assert_close(s.state().scale, 1.1);
        for _ in 0..60 {
            s.zoom_out();
        }
        assert_close(s.state().scale, 0.2);
    }

    #[test]
    fn test_undo_restores_exact_previous_state() {
        let mut s = loaded();
        s.key_down(Key::ArrowDown);
        s.rotate_right();
        let before = s.state();
        s.zoom_in();
        assert!(s.undo());
        assert_eq!(s.state(), before);
        assert!(s.undo());
        assert!(s.undo());
        assert_eq!(s.state(), TransformState::IDENTITY);
        assert!(!s.undo());
        assert!(!s.controls().can_undo);
    }

    #[test]
    fn test_reset_is_undoable() {
        let mut s = loaded();
        s.key_down(Key::ArrowLeft);
        s.zoom_in();
        let before = s.state();
        assert!(s.reset());
        assert_eq!(s.state(), TransformState::IDENTITY);
        s.undo();
        assert_eq!(s.state(), before);
    }

    #[test]
    fn test_pointer_drag_snapshots_once() {
        let mut s = loaded();
        assert!(s.pointer_down(Point::new(200.0, 200.0)));
        assert!(s.pointer_move(Point::new(210.0, 205.0)));
        assert!(s.pointer_move(Point::new(230.0, 190.0)));
        s.pointer_up();
        assert_eq!(s.state().position, Point::new(30.0, -10.0));
        assert_eq!(s.history_len(), 1);
        assert!(!s.pointer_move(Point::new(300.0, 300.0)));

        s.undo();
        assert_eq!(s.state().position, Point::ORIGIN);
    }

    #[test]
    fn test_pinch_zoom_about_midpoint() {
        let mut s = loaded();
        s.set_canvas_rect(Rect::square(400.0));
        // Midpoint (240, 200) is 40 right of the canvas center
        let start = [Point::new(220.0, 200.0), Point::new(260.0, 200.0)];
        let spread = [Point::new(200.0, 200.0), Point::new(280.0, 200.0)];
        assert!(s.touch_start(&start));
        assert!(s.touch_move(&spread));
        s.touch_end();

        assert_close(s.state().scale, 2.0);
        assert_close(s.state().position.x, 20.0);
        assert_close(s.state().position.y, 0.0);
        assert_eq!(s.history_len(), 1);
        assert!(!s.gesture_context().dragging);
        assert_eq!(s.gesture_context().pinch_distance, None);
    }

    #[test]
    fn test_wheel_is_rate_limited() {
        let mut s = loaded();
        assert!(s.wheel(0.0, -100.0));
        assert_close(s.state().scale, 1.1);

        // Inside the interval: held, the latest delta wins
        assert!(!s.wheel(10.0, -100.0));
        assert!(!s.wheel(20.0, -200.0));
        assert_close(s.state().scale, 1.1);
        assert_eq!(s.history_len(), 1);

        assert!(!s.flush(30.0));
        assert!(s.flush(60.0));
        assert_close(s.state().scale, 1.3);
        assert_eq!(s.history_len(), 2);
    }

    #[test]
    fn test_zoom_slider_shows_pending_value() {
        let mut s = loaded();
        assert!(s.set_zoom_percent(0.0, 150.0));
        assert_close(s.state().scale, 1.5);

        assert!(!s.set_zoom_percent(10.0, 180.0));
        let controls = s.controls();
        assert_close(controls.zoom_percent, 180.0);
        assert_close(s.state().scale, 1.5);

        s.tick(100.0);
        assert_close(s.state().scale, 1.8);
        assert_close(s.controls().zoom_percent, 180.0);
    }

    #[test]
    fn test_zoom_slider_clamps_out_of_range() {
        let mut s = loaded();
        s.set_zoom_percent(0.0, 9000.0);
        assert_close(s.state().scale, 5.0);
        s.set_zoom_percent(100.0, 1.0);
        assert_close(s.state().scale, 0.2);
    }

    #[test]
    fn test_rotation_slider_normalizes() {
        let mut s = loaded();
        s.set_rotation_degrees(0.0, -90.0);
        assert_close(s.state().rotation, 270.0);
        assert_close(s.controls().rotation_degrees, -90.0);
    }

    #[test]
    fn test_undo_drops_pending_slider_value() {
        let mut s = loaded();
        s.set_zoom_percent(0.0, 150.0);
        s.set_zoom_percent(10.0, 300.0);
        assert!(s.undo());
        s.flush(100.0);
        assert_close(s.state().scale, 1.0);
    }

    #[test]
    fn test_loading_subject_resets_everything() {
        let mut s = loaded();
        s.zoom_in();
        s.key_down(Key::ArrowUp);
        s.pointer_down(Point::new(1.0, 1.0));
        s.set_zoom_percent(1000.0, 150.0);
        s.set_zoom_percent(1010.0, 200.0);

        s.load_subject(&png(10, 10, [0, 0, 200, 255])).unwrap();
        assert_eq!(s.state(), TransformState::IDENTITY);
        assert_eq!(s.history_len(), 0);
        assert!(!s.gesture_context().dragging);
        assert_eq!(s.background(), Rgb::new(0, 0, 200));
        assert!(!s.flush(5000.0));
    }

    #[test]
    fn test_failed_subject_load_preserves_state() {
        let mut s = loaded();
        s.zoom_in();
        let id = s.scene_identity();
        let before = s.state();

        assert!(matches!(
            s.load_subject(b"definitely not an image"),
            Err(LoadError::Decode(_))
        ));
        assert_eq!(s.state(), before);
        assert_eq!(s.history_len(), 1);
        assert_eq!(s.scene_identity(), id);
    }

    #[test]
    fn test_frame_and_preset_selection() {
        let mut s = loaded();
        s.select_preset("Option 2", &png(8, 8, [0, 0, 0, 0])).unwrap();
        assert_eq!(s.selected_preset(), Some("Option 2"));

        s.load_frame(&png(8, 8, [0, 0, 0, 0])).unwrap();
        assert_eq!(s.selected_preset(), None);

        assert!(matches!(
            s.select_preset("Nope", &png(8, 8, [0; 4])),
            Err(LoadError::UnknownPreset(_))
        ));
        assert_eq!(s.selected_preset(), None);
    }

    #[test]
    fn test_failed_frame_load_preserves_slot() {
        let mut s = loaded();
        s.select_preset("Option 1", &png(8, 8, [0, 0, 0, 0])).unwrap();
        let frame_id = s.frame().map(ImageAsset::id);
        let identity = s.scene_identity();
        let live = s.ledger().live_count();

        assert!(matches!(
            s.load_frame(b"garbage"),
            Err(LoadError::Decode(_))
        ));
        assert_eq!(s.selected_preset(), Some("Option 1"));
        assert_eq!(s.frame().map(ImageAsset::id), frame_id);
        assert_eq!(s.scene_identity(), identity);

        assert!(matches!(
            s.select_preset("Option 2", b"garbage"),
            Err(LoadError::Decode(_))
        ));
        assert_eq!(s.selected_preset(), Some("Option 1"));
        assert_eq!(s.frame().map(ImageAsset::id), frame_id);
        assert_eq!(s.scene_identity(), identity);
        assert_eq!(s.ledger().live_count(), live);
    }

    #[test]
    fn test_replacing_images_releases_handles() {
        let ledger = ResourceLedger::new();
        let mut s = EditorSession::with_ledger(EditorConfig::default(), Rc::clone(&ledger)).unwrap();
        s.load_subject(&png(4, 4, [1, 1, 1, 255])).unwrap();
        s.load_subject(&png(4, 4, [2, 2, 2, 255])).unwrap();
        s.load_frame(&png(4, 4, [0; 4])).unwrap();
        s.select_preset("Option 1", &png(4, 4, [0; 4])).unwrap();
        assert_eq!(ledger.live_count(), 2);

        s.unload();
        assert_eq!(ledger.live_count(), 0);

        s.load_subject(&png(4, 4, [3, 3, 3, 255])).unwrap();
        drop(s);
        assert_eq!(ledger.live_count(), 0);
    }

    #[test]
    fn test_scene_identity_tracks_slots() {
        let mut s = session();
        assert_eq!(s.scene_identity(), (None, None));
        let after_subject = s.load_subject(&png(4, 4, [9, 9, 9, 255])).unwrap();
        assert!(after_subject.0.is_some());
        let after_frame = s.load_frame(&png(4, 4, [0; 4])).unwrap();
        assert_eq!(after_frame.0, after_subject.0);
        assert!(after_frame.1.is_some());
    }

    #[test]
    fn test_controls_state() {
        let mut s = session();
        let controls = s.controls();
        assert!(!controls.controls_enabled);
        assert_eq!(controls.cursor, "default");
        assert_close(controls.zoom_min_percent, 20.0);
        assert_close(controls.zoom_max_percent, 500.0);

        s.load_subject(&png(4, 4, [9, 9, 9, 255])).unwrap();
        let controls = s.controls();
        assert!(controls.controls_enabled);
        assert!(!controls.can_undo);
        assert_eq!(controls.cursor, "move");
        assert_close(controls.zoom_percent, 100.0);
        assert_eq!(controls.background, "rgb(9,9,9)");

        s.zoom_in();
        assert!(s.controls().can_undo);
    }

    #[test]
    fn test_status_line() {
        let mut s = loaded();
        let mut locale = LocaleContext::load(MemoryStore::new());
        locale.set_language(Language::En);
        assert_eq!(
            s.status_line(&locale),
            "Scale: 1.00 | Position: (0, 0) | Rotation: 0°"
        );

        s.key_down(Key::ArrowLeft);
        s.rotate_left();
        assert_eq!(
            s.status_line(&locale),
            "Scale: 1.00 | Position: (-5, 0) | Rotation: 345°"
        );

        locale.set_language(Language::Vi);
        assert!(s.status_line(&locale).starts_with("Tỷ lệ: 1.00"));
    }

    #[test]
    fn test_tick_renders_canvas() {
        let mut s = loaded();
        let frame = s.tick(0.0);
        assert_eq!((frame.width(), frame.height()), (400, 400));
        assert_eq!(frame.pixel(200, 200), [200, 10, 10, 255]);
        // Outside the 40x30 subject: the sampled background
        assert_eq!(frame.pixel(0, 0), [200, 10, 10, 255]);
    }

    #[test]
    fn test_export_scenario() {
        let mut config = EditorConfig::default();
        config.presets = vec![PresetFrame::new("Circle 0", "/frames/circle-0.png")];
        let mut s = EditorSession::new(config).unwrap();

        // Photo: blue, with a transparent strip that exposes the background
        let mut photo = DecodedImage::filled(800, 600, [20, 40, 200, 255]);
        for y in 0..600u32 {
            for x in 500..520u32 {
                let idx = ((y * 800 + x) * 4) as usize;
                photo.pixels[idx..idx + 4].copy_from_slice(&[0, 0, 0, 0]);
            }
        }
        let mut photo_png = Vec::new();
        PngEncoder::new(&mut photo_png)
            .write_image(&photo.pixels, 800, 600, ExtendedColorType::Rgba8)
            .unwrap();
        s.load_subject(&photo_png).unwrap();
        assert_eq!(s.subject().map(|a| (a.width(), a.height())), Some((800, 600)));

        // Frame: a 10px opaque border
        let mut ring = DecodedImage::filled(400, 400, [0, 0, 0, 0]);
        for y in 0..400u32 {
            for x in 0..400u32 {
                if x < 10 || y < 10 || x >= 390 || y >= 390 {
                    let idx = ((y * 400 + x) * 4) as usize;
                    ring.pixels[idx..idx + 4].copy_from_slice(&[255, 255, 0, 255]);
                }
            }
        }
        let mut ring_png = Vec::new();
        PngEncoder::new(&mut ring_png)
            .write_image(&ring.pixels, 400, 400, ExtendedColorType::Rgba8)
            .unwrap();
        s.select_preset("Circle 0", &ring_png).unwrap();

        let file = s.export().unwrap();
        assert_eq!(file.file_name, "fb-profile-picture.png");
        let out = image::load_from_memory(&file.bytes).unwrap().into_rgba8();
        assert_eq!(out.dimensions(), (400, 400));
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 0, 255]);
        assert_eq!(out.get_pixel(100, 200).0, [20, 40, 200, 255]);
        // Background is the photo's dominant color
        assert_eq!(out.get_pixel(310, 200).0, [20, 40, 200, 255]);
        assert_eq!(s.background(), Rgb::new(20, 40, 200));
    }

    struct Collect(Vec<String>);

    impl DownloadSink for Collect {
        fn deliver(&mut self, file: &ExportedFile) -> Result<(), ExportError> {
            self.0.push(file.file_name.clone());
            Ok(())
        }
    }

    #[test]
    fn test_download_hands_file_to_sink() {
        let s = loaded();
        let mut sink = Collect(Vec::new());
        s.download(&mut sink).unwrap();
        assert_eq!(sink.0, vec!["fb-profile-picture.png".to_string()]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::decode::DecodedImage;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Key(u8),
        Wheel(f64, f64),
        Zoom(f64, f64),
        Rotate(f64, f64),
        Drag(f64, f64),
        Pinch(f64),
        Button(u8),
        Undo,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..6).prop_map(Op::Key),
            (0.0f64..200.0, -2000.0f64..2000.0).prop_map(|(t, d)| Op::Wheel(t, d)),
            (0.0f64..200.0, -1000.0f64..1000.0).prop_map(|(t, p)| Op::Zoom(t, p)),
            (0.0f64..200.0, -720.0f64..720.0).prop_map(|(t, r)| Op::Rotate(t, r)),
            (-600.0f64..600.0, -600.0f64..600.0).prop_map(|(x, y)| Op::Drag(x, y)),
            (1.0f64..400.0).prop_map(Op::Pinch),
            (0u8..5).prop_map(Op::Button),
            Just(Op::Undo),
        ]
    }

    fn loaded() -> EditorSession {
        let img = DecodedImage::filled(8, 8, [1, 2, 3, 255]);
        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(&img.pixels, 8, 8, ExtendedColorType::Rgba8)
            .unwrap();
        let mut s = EditorSession::new(EditorConfig::default()).unwrap();
        s.load_subject(&png).unwrap();
        s
    }

    proptest! {
        /// No input sequence can push the transform out of bounds, and the
        /// history never exceeds its capacity.
        #[test]
        fn prop_limits_hold_for_any_input(ops in prop::collection::vec(op_strategy(), 1..60)) {
            let mut s = loaded();
            let limits = s.config().limits;
            let mut now = 0.0;
            for op in ops {
                match op {
                    Op::Key(k) => {
                        let key = [Key::ArrowUp, Key::ArrowDown, Key::ArrowLeft, Key::ArrowRight, Key::ZoomIn, Key::ZoomOut][k as usize];
                        s.key_down(key);
                    }
                    Op::Wheel(dt, d) => { now += dt; s.wheel(now, d); }
                    Op::Zoom(dt, p) => { now += dt; s.set_zoom_percent(now, p); }
                    Op::Rotate(dt, r) => { now += dt; s.set_rotation_degrees(now, r); }
                    Op::Drag(x, y) => {
                        s.pointer_down(Point::new(200.0, 200.0));
                        s.pointer_move(Point::new(200.0 + x, 200.0 + y));
                        s.pointer_up();
                    }
                    Op::Pinch(d) => {
                        s.touch_start(&[Point::new(150.0, 200.0), Point::new(250.0, 200.0)]);
                        s.touch_move(&[Point::new(200.0 - d / 2.0, 200.0), Point::new(200.0 + d / 2.0, 200.0)]);
                        s.touch_end();
                    }
                    Op::Button(b) => {
                        match b {
                            0 => s.zoom_in(),
                            1 => s.zoom_out(),
                            2 => s.rotate_left(),
                            3 => s.rotate_right(),
                            _ => s.reset(),
                        };
                    }
                    Op::Undo => { s.undo(); }
                }
                now += 1.0;
                s.flush(now);
                let state = s.state();
                prop_assert!(state.is_within(&limits), "out of bounds: {:?}", state);
                prop_assert!(s.history_len() <= 10);
            }
        }
    }
}

//! WASM-compatible wrapper types and conversions.

use framer_core::{ExportedFile, Point, Rect};
use wasm_bindgen::prelude::*;

/// An encoded export handed to JavaScript.
///
/// The host may save `bytes` itself instead of calling `download()`.
#[wasm_bindgen]
pub struct JsExportedFile {
    file_name: String,
    mime_type: String,
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl JsExportedFile {
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.mime_type.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the PNG bytes as Uint8Array.
    ///
    /// Note: This creates a copy of the data.
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl From<ExportedFile> for JsExportedFile {
    fn from(file: ExportedFile) -> Self {
        Self {
            file_name: file.file_name,
            mime_type: file.mime_type.to_string(),
            width: file.width,
            height: file.height,
            bytes: file.bytes,
        }
    }
}

/// Pair up a flat `[x0, y0, x1, y1, ...]` coordinate list.
///
/// A trailing odd value is ignored.
pub(crate) fn points_from_flat(coords: &[f64]) -> Vec<Point> {
    coords
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}

/// Build a [`Rect`] from a `DOMRect`-like set of values.
pub(crate) fn rect_from_bounds(left: f64, top: f64, width: f64, height: f64) -> Rect {
    Rect::new(left, top, width, height)
}

/// Best-effort message from a thrown JavaScript value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Convert any displayable error into a `JsValue` for throwing.
pub(crate) fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

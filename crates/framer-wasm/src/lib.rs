//! Framer WASM - WebAssembly bindings for the Framer editor
//!
//! This crate exposes framer-core to the browser: it paints into a
//! `<canvas>`, drives rendering from `requestAnimationFrame`, keeps the
//! language preference in `localStorage`, and saves exports as downloads.
//!
//! # Module Structure
//!
//! - `editor` - `JsEditor`, the canvas-bound editing session
//! - `locale` - `JsLocale`, language switch and string lookup
//! - `scheduler` - `requestAnimationFrame` frame scheduler
//! - `storage` - `localStorage` key-value store
//! - `download` - blob URL download of exported files
//! - `types` - WASM-compatible wrapper types
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor, JsLocale } from '@framer/wasm';
//!
//! await init();
//!
//! const editor = new JsEditor(canvas, undefined);
//! const locale = new JsLocale();
//! editor.load_subject(new Uint8Array(await file.arrayBuffer()));
//! canvas.addEventListener('mousedown', e => editor.pointer_down(e.clientX, e.clientY));
//! label.textContent = editor.status_line(locale);
//! ```

use wasm_bindgen::prelude::*;

mod download;
mod editor;
mod locale;
mod scheduler;
mod storage;
mod types;

pub use editor::JsEditor;
pub use locale::JsLocale;
pub use types::JsExportedFile;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (e.g. hot reload) finds the logger already installed
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}

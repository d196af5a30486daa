//! Language switch bindings.

use framer_core::{Language, LocaleContext};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::storage::BrowserStore;
use crate::types::to_js_error;

#[derive(Serialize)]
struct LanguageOption {
    code: &'static str,
    name: &'static str,
}

/// The active interface language, persisted in `localStorage`.
#[wasm_bindgen]
pub struct JsLocale {
    pub(crate) context: LocaleContext<BrowserStore>,
}

#[wasm_bindgen]
impl JsLocale {
    /// Restore the saved language, or the default.
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsLocale {
        JsLocale {
            context: LocaleContext::load(BrowserStore::local()),
        }
    }

    /// Current language code.
    #[wasm_bindgen(getter)]
    pub fn language(&self) -> String {
        self.context.language().code().to_string()
    }

    /// Switch language. Returns `false` for an unknown code.
    pub fn set_language(&mut self, code: &str) -> bool {
        self.context.set_language_code(code)
    }

    /// Translate `id`, falling back to `id`.
    pub fn t(&self, id: &str) -> String {
        self.context.t(id).to_string()
    }

    /// `[{ code, name }]` for the language picker.
    pub fn languages(&self) -> Result<JsValue, JsValue> {
        let options: Vec<LanguageOption> = Language::ALL
            .iter()
            .map(|l| LanguageOption {
                code: l.code(),
                name: l.native_name(),
            })
            .collect();
        serde_wasm_bindgen::to_value(&options).map_err(to_js_error)
    }
}

impl Default for JsLocale {
    fn default() -> Self {
        Self::new()
    }
}

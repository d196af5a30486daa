//! User-facing strings and the persisted language preference.
//!
//! Strings are looked up by a fixed set of ids. An id with no translation
//! falls back to the id itself, so a missing entry shows up as its key rather
//! than as an empty label.
//!
//! The chosen language is the only thing the editor persists. It goes through
//! a [`KeyValueStore`] supplied by the host; if that store fails, the context
//! keeps working in memory and logs a warning.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key holding the language code.
pub const LANGUAGE_STORAGE_KEY: &str = "language";

/// Errors from a [`KeyValueStore`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The store cannot be reached at all (disabled, private mode, ...).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A write was rejected.
    #[error("Storage write failed: {0}")]
    WriteFailed(String),
}

/// Durable string key-value storage.
pub trait KeyValueStore {
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the value was not stored.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store, for tests and hosts without durable storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Supported interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Vi,
}

impl Language {
    /// In the order the language picker lists them.
    pub const ALL: [Language; 2] = [Language::Vi, Language::En];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Vi => "vi",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::En),
            "vi" => Some(Language::Vi),
            _ => None,
        }
    }

    /// Name of the language in that language.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Vi => "Tiếng Việt",
        }
    }

    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Language::En => EN,
            Language::Vi => VI,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

const EN: &[(&str, &str)] = &[
    ("title", "Facebook Profile Picture Builder"),
    ("uploadProfile", "Upload Profile Picture"),
    ("uploadFrame", "Upload Frame (PNG with transparency)"),
    ("instructions", "Instructions:"),
    (
        "desktopInstructions",
        "Desktop: Drag to move, scroll to zoom, arrow keys to adjust position, +/- to zoom.",
    ),
    ("mobileInstructions", "Mobile: Tap and drag to move, pinch to zoom."),
    ("reset", "Reset"),
    ("undo", "Undo"),
    ("download", "Download Profile Picture"),
    ("scale", "Scale"),
    ("position", "Position"),
    ("selectFrame", "Select Frame"),
    ("zoom", "Zoom"),
    ("rotation", "Rotation"),
];

const VI: &[(&str, &str)] = &[
    ("title", "Trình tạo ảnh đại diện Facebook"),
    ("uploadProfile", "Tải lên ảnh đại diện"),
    ("uploadFrame", "Tải lên khung (PNG có độ trong suốt)"),
    ("instructions", "Hướng dẫn:"),
    (
        "desktopInstructions",
        "Máy tính: Kéo để di chuyển, cuộn để phóng to/thu nhỏ, phím mũi tên để điều chỉnh vị trí, +/- để phóng to/thu nhỏ.",
    ),
    (
        "mobileInstructions",
        "Di động: Chạm và kéo để di chuyển, chụm để phóng to/thu nhỏ.",
    ),
    ("reset", "Đặt lại"),
    ("undo", "Hoàn tác"),
    ("download", "Tải ảnh đại diện"),
    ("scale", "Tỷ lệ"),
    ("position", "Vị trí"),
    ("selectFrame", "Chọn khung"),
    ("zoom", "Thu phóng"),
    ("rotation", "Xoay"),
];

/// Translation of `id` in `language`, if there is one.
pub fn translate(language: Language, id: &str) -> Option<&'static str> {
    language
        .table()
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, text)| *text)
}

/// The active language, its persistence, and string lookup.
#[derive(Debug)]
pub struct LocaleContext<S: KeyValueStore> {
    language: Language,
    store: S,
}

impl<S: KeyValueStore> LocaleContext<S> {
    /// Restore the saved language from `store`, falling back to the default
    /// when nothing valid is stored or the store cannot be read.
    pub fn load(store: S) -> Self {
        let saved = match store.get(LANGUAGE_STORAGE_KEY) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("language preference unavailable: {}", e);
                None
            }
        };
        let language = saved
            .as_deref()
            .and_then(Language::from_code)
            .unwrap_or_default();

        let mut context = Self { language, store };
        if saved.as_deref() != Some(language.code()) {
            context.persist();
        }
        context
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Switch language and persist the choice.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.persist();
    }

    /// Switch by language code. Unknown codes are ignored and return `false`.
    pub fn set_language_code(&mut self, code: &str) -> bool {
        match Language::from_code(code) {
            Some(language) => {
                self.set_language(language);
                true
            }
            None => false,
        }
    }

    /// Text for `id` in the active language, or `id` itself.
    pub fn t<'a>(&self, id: &'a str) -> &'a str {
        translate(self.language, id).unwrap_or(id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.set(LANGUAGE_STORAGE_KEY, self.language.code()) {
            log::warn!("could not save language preference: {}", e);
        }
    }
}

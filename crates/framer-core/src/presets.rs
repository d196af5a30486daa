//! Preset frame catalog.

use serde::{Deserialize, Serialize};

/// A bundled frame overlay the user can pick instead of uploading one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetFrame {
    /// Display name, also the selection key.
    pub name: String,
    /// Location the host fetches the overlay bytes from.
    pub url: String,
}

impl PresetFrame {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// The catalog shipped with the editor.
pub fn default_presets() -> Vec<PresetFrame> {
    (1..=4)
        .map(|n| PresetFrame::new(format!("Option {n}"), format!("/frames/option-{n}.png")))
        .collect()
}

/// Find a preset by name.
pub fn find_preset<'a>(catalog: &'a [PresetFrame], name: &str) -> Option<&'a PresetFrame> {
    catalog.iter().find(|p| p.name == name)
}

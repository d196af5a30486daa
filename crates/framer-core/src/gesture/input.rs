//! Input event types consumed by the gesture interpreter.

/// A keyboard key relevant to the editor.
///
/// Built from the browser's `KeyboardEvent.key` string with [`Key::from_browser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// `+` or `=` (the unshifted `+` key on most layouts).
    ZoomIn,
    /// `-`.
    ZoomOut,
    /// Anything else; ignored.
    Other,
}

impl Key {
    /// Map a `KeyboardEvent.key` value.
    pub fn from_browser(name: &str) -> Self {
        match name {
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "+" | "=" => Key::ZoomIn,
            "-" => Key::ZoomOut,
            _ => Key::Other,
        }
    }

    pub fn is_arrow(self) -> bool {
        matches!(
            self,
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight
        )
    }
}

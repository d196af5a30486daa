//! Export of the finished composite.
//!
//! Export renders the scene once into a fresh canvas-sized buffer, independent
//! of the live preview surface, and encodes it as PNG. Handing the bytes to
//! the user is the job of a [`DownloadSink`] supplied by the host.

use thiserror::Error;

use crate::compositor::{Compositor, Scene};
use crate::encode::{encode_png, EncodeError};

/// MIME type of every export.
pub const EXPORT_MIME_TYPE: &str = "image/png";

/// Errors that can occur while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There is no subject image to export.
    #[error("Nothing to export: no subject image loaded")]
    NoSubject,

    /// The composite could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The host failed to deliver the file.
    #[error("Download failed: {0}")]
    Delivery(String),
}

/// An encoded export, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Receives the exported file and saves it on the user's side.
pub trait DownloadSink {
    /// # Errors
    ///
    /// Returns [`ExportError::Delivery`] if the file could not be handed over.
    fn deliver(&mut self, file: &ExportedFile) -> Result<(), ExportError>;
}

/// Render `scene` at `canvas_size` and encode it as a PNG named `file_name`.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if PNG encoding fails.
pub fn export_composite(
    scene: &Scene<'_>,
    canvas_size: u32,
    file_name: &str,
) -> Result<ExportedFile, ExportError> {
    let mut compositor = Compositor::new(canvas_size);
    let frame = compositor.render(scene);
    let (width, height) = (frame.width(), frame.height());
    let bytes = encode_png(frame.pixels(), width, height)?;

    log::info!(
        "exported {} ({}x{}, {} bytes)",
        file_name,
        width,
        height,
        bytes.len()
    );

    Ok(ExportedFile {
        file_name: file_name.to_string(),
        mime_type: EXPORT_MIME_TYPE,
        width,
        height,
        bytes,
    })
}

//! Image resizing for the upload size cap and the frame overlay cache.
//!
//! All functions return new `DecodedImage` instances without modifying the input.

use super::{DecodeError, DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::EmptyImage` for a zero target size and
/// `DecodeError::CorruptedFile` if the source buffer does not match its dimensions.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgba = image
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Pixel buffer size mismatch".to_string()))?;

    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgba_image(resized))
}

/// Resize an image so neither edge exceeds `max_edge`, preserving aspect ratio.
///
/// Images that already fit are returned unchanged; this never upscales.
///
/// # Errors
///
/// Returns `DecodeError::EmptyImage` if `max_edge` is zero.
pub fn resize_to_fit(
    image: &DecodedImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::EmptyImage {
            width: 0,
            height: 0,
        });
    }

    if image.width <= max_edge && image.height <= max_edge {
        return Ok(image.clone());
    }

    let (new_width, new_height) = fit_dimensions(image.width, image.height, max_edge);
    log::debug!(
        "downscaling {}x{} to {}x{}",
        image.width,
        image.height,
        new_width,
        new_height
    );
    resize(image, new_width, new_height, filter)
}

/// Largest dimensions within `max_edge` that keep the aspect ratio.
fn fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = (max_edge as f64 / width as f64).min(max_edge as f64 / height as f64);
    let new_width = (width as f64 * ratio).round() as u32;
    let new_height = (height as f64 * ratio).round() as u32;
    (new_width.clamp(1, max_edge), new_height.clamp(1, max_edge))
}

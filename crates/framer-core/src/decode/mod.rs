//! Image decoding for uploaded subjects and frames.
//!
//! This module provides functionality for:
//! - Decoding any supported raster format (PNG, JPEG, GIF, WebP, BMP) to RGBA
//! - Honoring EXIF orientation on photos
//! - Downscaling to a maximum edge length while preserving aspect ratio
//!
//! # Architecture
//!
//! Decoding is synchronous. The host reads the file (or fetches a preset) and
//! hands the bytes over once they are available; until then the corresponding
//! asset slot simply stays empty.
//!
//! # Examples
//!
//! ```ignore
//! use framer_core::decode::{decode_image, resize_to_fit, FilterType};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! let image = resize_to_fit(&image, 1024, FilterType::Bilinear).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod raster;
mod resize;
mod types;

pub use raster::{decode_image, decode_image_no_orientation};
pub use resize::{resize, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};

//! Image encoding for export.
//!
//! The composite is written as PNG so the transparent corners a frame may
//! leave survive the round trip to the user's disk.

mod png;

pub use png::{encode_png, EncodeError, PNG_SIGNATURE};

//! Dominant-color sampling for the canvas background fill.
//!
//! The background behind the subject is painted with the most common color of
//! the subject, so transparent or uncovered margins blend in instead of showing
//! as empty canvas.
//!
//! ## Algorithm
//!
//! 1. Visit every `SAMPLE_STRIDE`th pixel (a sparse grid, not the full image).
//! 2. Skip fully transparent pixels.
//! 3. Quantize each RGB channel to `QUANT_BITS` bits and count bucket hits.
//! 4. The bucket with the most hits wins; ties go to the bucket seen first.
//! 5. The result is the mean of the samples that landed in the winning bucket.
//!
//! A fully transparent image yields white.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// Sample every Nth pixel.
const SAMPLE_STRIDE: usize = 5;

/// Bits kept per channel when bucketing.
const QUANT_BITS: u32 = 5;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// CSS `rgb(r,g,b)` notation.
    pub fn to_css(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

#[derive(Default)]
struct Bucket {
    order: usize,
    count: u32,
    sum: [u64; 3],
}

/// Most frequent quantized color of `image`, or white if nothing is visible.
pub fn dominant_color(image: &DecodedImage) -> Rgb {
    let shift = 8 - QUANT_BITS;
    let mut buckets: HashMap<(u8, u8, u8), Bucket> = HashMap::new();

    for px in image
        .pixels
        .chunks_exact(DecodedImage::CHANNELS)
        .step_by(SAMPLE_STRIDE)
    {
        if px[3] == 0 {
            continue;
        }
        let key = (px[0] >> shift, px[1] >> shift, px[2] >> shift);
        let next_order = buckets.len();
        let bucket = buckets.entry(key).or_insert_with(|| Bucket {
            order: next_order,
            ..Bucket::default()
        });
        bucket.count += 1;
        bucket.sum[0] += px[0] as u64;
        bucket.sum[1] += px[1] as u64;
        bucket.sum[2] += px[2] as u64;
    }

    buckets
        .values()
        .max_by(|a, b| a.count.cmp(&b.count).then(b.order.cmp(&a.order)))
        .map(|bucket| {
            let n = bucket.count as u64;
            Rgb::new(
                (bucket.sum[0] / n) as u8,
                (bucket.sum[1] / n) as u8,
                (bucket.sum[2] / n) as u8,
            )
        })
        .unwrap_or(Rgb::WHITE)
}

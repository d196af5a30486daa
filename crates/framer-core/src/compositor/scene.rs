//! Software compositor.
//!
//! The subject is drawn by inverse mapping: for each canvas pixel we undo the
//! rotation about the canvas center, then the translate and scale, and sample
//! the subject bitmap bilinearly at the resulting point.
//!
//! For a canvas of size `C` and a subject of size `(w, h)` at scale `s`, the
//! subject's top-left corner before rotation sits at
//!
//! ```text
//! origin = position + (C - (w, h) * s) / 2
//! ```
//!
//! and a canvas point `p` maps back to subject pixel
//!
//! ```text
//! q = rotate(p, canvas_center, -rotation)
//! u = (q - origin) / s
//! ```

use image::RgbaImage;

use crate::asset::{AssetId, ImageAsset};
use crate::color::Rgb;
use crate::decode::{resize, DecodedImage, FilterType};
use crate::geometry::{pivot_rotate, Point};
use crate::state::TransformState;

/// Everything one render pass reads.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub state: TransformState,
    pub subject: Option<&'a ImageAsset>,
    pub frame: Option<&'a ImageAsset>,
    pub background: Rgb,
}

/// One rendered composite, borrowed from the compositor's surface.
///
/// Valid until the next render call.
#[derive(Debug, Clone, Copy)]
pub struct CompositeFrame<'a> {
    surface: &'a RgbaImage,
}

impl<'a> CompositeFrame<'a> {
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Straight RGBA pixels, row-major.
    pub fn pixels(&self) -> &'a [u8] {
        self.surface.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.surface.get_pixel(x, y).0
    }
}

/// Renders [`Scene`]s into a reusable canvas-sized surface.
#[derive(Debug)]
pub struct Compositor {
    canvas_size: u32,
    surface: RgbaImage,
    frame_cache: Option<(AssetId, RgbaImage)>,
}

impl Compositor {
    pub fn new(canvas_size: u32) -> Self {
        Self {
            canvas_size,
            surface: RgbaImage::new(canvas_size, canvas_size),
            frame_cache: None,
        }
    }

    /// Paint `scene` and return the result.
    pub fn render(&mut self, scene: &Scene<'_>) -> CompositeFrame<'_> {
        self.fill(scene.background);
        if let Some(subject) = scene.subject {
            self.draw_subject(subject.bitmap(), &scene.state);
        }
        if let Some(frame) = scene.frame {
            self.draw_frame(frame);
        }
        CompositeFrame {
            surface: &self.surface,
        }
    }

    /// Drop the cached full-canvas frame, if any.
    pub fn clear_frame_cache(&mut self) {
        self.frame_cache = None;
    }

    fn fill(&mut self, color: Rgb) {
        let rgba = image::Rgba(color.to_rgba());
        for px in self.surface.pixels_mut() {
            *px = rgba;
        }
    }

    fn draw_subject(&mut self, bitmap: &DecodedImage, state: &TransformState) {
        if bitmap.is_empty() || state.scale <= 0.0 {
            return;
        }
        let size = self.canvas_size as f64;
        let center = Point::new(size / 2.0, size / 2.0);
        let scale = state.scale;
        let origin = Point::new(
            state.position.x + (size - bitmap.width as f64 * scale) / 2.0,
            state.position.y + (size - bitmap.height as f64 * scale) / 2.0,
        );

        for (x, y, dst) in self.surface.enumerate_pixels_mut() {
            let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let q = pivot_rotate(p, center, -state.rotation);
            let u = (q.x - origin.x) / scale;
            let v = (q.y - origin.y) / scale;
            if let Some(src) = sample_bilinear(bitmap, u, v) {
                dst.0 = blend_over(src, dst.0);
            }
        }
    }

    fn draw_frame(&mut self, frame: &ImageAsset) {
        let cached = matches!(&self.frame_cache, Some((id, _)) if *id == frame.id());
        if !cached {
            let size = self.canvas_size;
            let stretched = resize(frame.bitmap(), size, size, FilterType::Bilinear)
                .ok()
                .and_then(|img| RgbaImage::from_raw(img.width, img.height, img.pixels));
            match stretched {
                Some(img) => self.frame_cache = Some((frame.id(), img)),
                None => {
                    log::warn!("frame #{} could not be fitted to the canvas", frame.id());
                    self.frame_cache = None;
                    return;
                }
            }
        }
        if let Some((_, overlay)) = &self.frame_cache {
            for (dst, src) in self.surface.pixels_mut().zip(overlay.pixels()) {
                dst.0 = blend_over(src.0, dst.0);
            }
        }
    }
}

/// Bilinear RGBA sample at subject coordinates `(u, v)`, in pixel units with
/// the origin at the top-left corner of the bitmap.
///
/// Returns `None` outside the bitmap. Taps past the edge reuse the edge pixel,
/// and colors are weighted by alpha so transparent neighbors do not bleed.
fn sample_bilinear(image: &DecodedImage, u: f64, v: f64) -> Option<[u8; 4]> {
    let (w, h) = (image.width as f64, image.height as f64);
    if !(u >= 0.0 && u < w && v >= 0.0 && v < h) {
        return None;
    }

    // Pixel centers sit at half-integers
    let x = u - 0.5;
    let y = v - 0.5;
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let max_x = image.width as i64 - 1;
    let max_y = image.height as i64 - 1;
    let cx0 = (x0 as i64).clamp(0, max_x) as u32;
    let cx1 = (x0 as i64 + 1).clamp(0, max_x) as u32;
    let cy0 = (y0 as i64).clamp(0, max_y) as u32;
    let cy1 = (y0 as i64 + 1).clamp(0, max_y) as u32;

    let taps = [
        (image.pixel(cx0, cy0), (1.0 - fx) * (1.0 - fy)),
        (image.pixel(cx1, cy0), fx * (1.0 - fy)),
        (image.pixel(cx0, cy1), (1.0 - fx) * fy),
        (image.pixel(cx1, cy1), fx * fy),
    ];

    let mut alpha = 0.0;
    let mut color = [0.0f64; 3];
    for (px, weight) in taps {
        let a = px[3] as f64 * weight;
        alpha += a;
        for i in 0..3 {
            color[i] += px[i] as f64 * a;
        }
    }

    if alpha <= 0.0 {
        return Some([0, 0, 0, 0]);
    }
    Some([
        (color[0] / alpha).clamp(0.0, 255.0).round() as u8,
        (color[1] / alpha).clamp(0.0, 255.0).round() as u8,
        (color[2] / alpha).clamp(0.0, 255.0).round() as u8,
        alpha.clamp(0.0, 255.0).round() as u8,
    ])
}

/// Source-over for straight-alpha pixels.
fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as f64 / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    if sa >= 1.0 {
        return src;
    }
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src[i] as f64 * sa + dst[i] as f64 * da * (1.0 - sa)) / out_a;
        out[i] = c.clamp(0.0, 255.0).round() as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    out
}

//! Rect-of-interest debug rendering
//!
//! Draws the capture frame in sensor orientation with the rect of interest
//! highlighted, so a mapping can be eyeballed against what the preview
//! shows.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::models::{CaptureFormat, Rect};

const BACKGROUND: Rgb<u8> = Rgb([40, 40, 40]);
const REGION: Rgb<u8> = Rgb([90, 90, 90]);
const OUTLINE: Rgb<u8> = Rgb([0, 220, 90]);

/// Canvas size for `format`, scaled so the longer side is `max_side`
pub fn canvas_size(format: &CaptureFormat, max_side: u32) -> (u32, u32) {
    let (w, h) = (format.dimensions.width, format.dimensions.height);
    let scale = max_side.max(1) as f32 / w.max(h).max(1.0);
    (
        ((w * scale).round() as u32).max(1),
        ((h * scale).round() as u32).max(1),
    )
}

/// Render the capture frame with `roi` (normalized) highlighted
pub fn render_overlay(format: &CaptureFormat, roi: Rect, max_side: u32) -> RgbImage {
    let (width, height) = canvas_size(format, max_side);
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    let x0 = (roi.x * width as f32).floor().clamp(0.0, (width - 1) as f32) as u32;
    let y0 = (roi.y * height as f32).floor().clamp(0.0, (height - 1) as f32) as u32;
    let x1 = (roi.max_x() * width as f32).ceil().clamp(1.0, width as f32) as u32;
    let y1 = (roi.max_y() * height as f32).ceil().clamp(1.0, height as f32) as u32;

    for y in y0..y1 {
        for x in x0..x1 {
            let edge = x == x0 || y == y0 || x + 1 == x1 || y + 1 == y1;
            img.put_pixel(x, y, if edge { OUTLINE } else { REGION });
        }
    }
    img
}

/// Render and write a PNG
pub fn save_overlay<P: AsRef<Path>>(
    path: P,
    format: &CaptureFormat,
    roi: Rect,
    max_side: u32,
) -> Result<(), image::ImageError> {
    render_overlay(format, roi, max_side).save(path)
}

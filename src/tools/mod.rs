//! Helpers for tests, benchmarks and the `scantool` binary
//!
//! - [`sim`]: an in-memory platform implementing every collaborator trait
//! - [`overlay`]: PNG rendering of a mapped rect of interest

pub mod overlay;
pub mod sim;

use std::fs;
use std::io;
use std::path::Path;

use crate::error::RegionError;
use crate::models::{CaptureFormat, Rect, Rotation, Size, VideoGravity};
use crate::session::region::map_to_capture_space;

/// Read a payload file, or stdin when `path` is `-`
pub fn read_payload<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let path = path.as_ref();
    if path.as_os_str() == "-" {
        io::read_to_string(io::stdin())
    } else {
        fs::read_to_string(path)
    }
}

/// Parse `WxH`
pub fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let width = w.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let height = h.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok(Size::new(width, height))
}

/// Parse `x,y,w,h`
pub fn parse_rect(s: &str) -> Result<Rect, String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| e.to_string()))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(Rect::new(*x, *y, *w, *h)),
        _ => Err(format!("expected x,y,w,h, got '{s}'")),
    }
}

/// Map a region given CLI-style arguments; `None` region means full preview
pub fn map_region(
    preview: Size,
    video: Size,
    rotation_degrees: i32,
    gravity: VideoGravity,
    region: Option<Rect>,
) -> Result<(CaptureFormat, Rect), String> {
    let rotation = Rotation::from_degrees(rotation_degrees)
        .ok_or_else(|| format!("rotation must be a multiple of 90, got {rotation_degrees}"))?;
    let format = CaptureFormat {
        dimensions: video,
        rotation,
    };
    let ui_rect = region.unwrap_or_else(|| Rect::from_size(preview));
    let roi = map_to_capture_space(ui_rect, &format, preview, gravity)
        .map_err(|e: RegionError| e.to_string())?;
    Ok((format, roi))
}

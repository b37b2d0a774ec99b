//! Scan window to capture space mapping
//!
//! The metadata output takes its rect of interest in normalized sensor
//! coordinates: `[0,1] x [0,1]`, origin top-left, in the sensor's native
//! orientation. The scan window is drawn in view coordinates over a preview
//! that scales (and possibly crops) the rotated video. Mapping therefore
//! runs view rect -> displayed video rect -> normalized display -> sensor.

use crate::error::RegionError;
use crate::models::{CaptureFormat, Point, Rect, Rotation, Size, VideoGravity};

/// Where the displayed video lands inside the preview bounds
pub fn video_rect_in_preview(displayed: Size, preview: Size, gravity: VideoGravity) -> Rect {
    let (width, height) = match gravity {
        VideoGravity::Resize => (preview.width, preview.height),
        VideoGravity::ResizeAspect | VideoGravity::ResizeAspectFill => {
            let sx = preview.width / displayed.width;
            let sy = preview.height / displayed.height;
            let scale = if gravity == VideoGravity::ResizeAspect {
                sx.min(sy)
            } else {
                sx.max(sy)
            };
            (displayed.width * scale, displayed.height * scale)
        }
    };
    Rect::new(
        (preview.width - width) / 2.0,
        (preview.height - height) / 2.0,
        width,
        height,
    )
}

/// Normalized display point back into normalized sensor orientation
fn display_to_sensor(p: Point, rotation: Rotation) -> Point {
    match rotation {
        Rotation::Deg0 => p,
        Rotation::Deg90 => Point::new(p.y, 1.0 - p.x),
        Rotation::Deg180 => Point::new(1.0 - p.x, 1.0 - p.y),
        Rotation::Deg270 => Point::new(1.0 - p.y, p.x),
    }
}

/// Map `ui_rect` (view coordinates) to a normalized capture-space rect
pub fn map_to_capture_space(
    ui_rect: Rect,
    format: &CaptureFormat,
    preview: Size,
    gravity: VideoGravity,
) -> Result<Rect, RegionError> {
    if preview.is_degenerate() {
        return Err(RegionError::DegenerateGeometry("preview bounds"));
    }
    if format.dimensions.is_degenerate() {
        return Err(RegionError::DegenerateGeometry("capture format"));
    }
    if ui_rect.is_empty() {
        return Err(RegionError::DegenerateGeometry("scan region"));
    }

    let video = video_rect_in_preview(format.displayed_size(), preview, gravity);
    let normalize = |p: Point| {
        Point::new(
            (p.x - video.x) / video.width,
            (p.y - video.y) / video.height,
        )
    };

    let a = display_to_sensor(normalize(ui_rect.origin()), format.rotation);
    let b = display_to_sensor(normalize(ui_rect.far_corner()), format.rotation);
    Rect::from_corners(a, b)
        .intersection(&Rect::unit())
        .ok_or(RegionError::OutsideFrame)
}

/// Recomputes the rect of interest for every capture format change
#[derive(Debug, Clone)]
pub struct RegionMapper {
    scan_region: Rect,
    preview: Size,
    gravity: VideoGravity,
    remaps: u64,
}

impl RegionMapper {
    /// Mapper for a fixed scan region inside a preview of size `preview`
    pub fn new(scan_region: Rect, preview: Size, gravity: VideoGravity) -> Self {
        Self {
            scan_region,
            preview,
            gravity,
            remaps: 0,
        }
    }

    /// The scan window in view coordinates
    pub fn scan_region(&self) -> Rect {
        self.scan_region
    }

    /// Preview scaling mode
    pub fn gravity(&self) -> VideoGravity {
        self.gravity
    }

    /// How many format changes have been mapped
    pub fn remap_count(&self) -> u64 {
        self.remaps
    }

    /// Fresh mapping for the new format
    pub fn on_format_changed(&mut self, format: &CaptureFormat) -> Result<Rect, RegionError> {
        self.remaps += 1;
        let rect = map_to_capture_space(self.scan_region, format, self.preview, self.gravity)?;
        log::debug!(
            "rect of interest for {}x{} @{}: ({:.3}, {:.3}, {:.3}, {:.3})",
            format.dimensions.width,
            format.dimensions.height,
            format.rotation.degrees(),
            rect.x,
            rect.y,
            rect.width,
            rect.height
        );
        Ok(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_identity_when_aspect_matches() {
        let format = CaptureFormat::new(1280.0, 720.0, Rotation::Deg0);
        let preview = Size::new(640.0, 360.0);
        let rect = map_to_capture_space(
            Rect::new(160.0, 90.0, 320.0, 180.0),
            &format,
            preview,
            VideoGravity::ResizeAspectFill,
        )
        .unwrap();
        assert!(rect.approx_eq(&Rect::new(0.25, 0.25, 0.5, 0.5), EPS), "{rect:?}");
    }

    #[test]
    fn test_portrait_aspect_fill_crops_sides() {
        // 1080x1920 displayed video filled into 300x600: 337.5 wide, 18.75 cropped per side.
        let format = CaptureFormat::new(1920.0, 1080.0, Rotation::Deg90);
        let preview = Size::new(300.0, 600.0);
        let rect = map_to_capture_space(
            Rect::from_size(preview),
            &format,
            preview,
            VideoGravity::ResizeAspectFill,
        )
        .unwrap();
        let crop = 18.75 / 337.5;
        assert!(
            rect.approx_eq(&Rect::new(0.0, crop, 1.0, 1.0 - 2.0 * crop), EPS),
            "{rect:?}"
        );
    }

    #[test]
    fn test_aspect_fit_letterbox_is_clamped() {
        let format = CaptureFormat::new(800.0, 400.0, Rotation::Deg0);
        let preview = Size::new(400.0, 400.0);
        let full = map_to_capture_space(
            Rect::from_size(preview),
            &format,
            preview,
            VideoGravity::ResizeAspect,
        )
        .unwrap();
        assert!(full.approx_eq(&Rect::unit(), EPS));

        let left_half = map_to_capture_space(
            Rect::new(0.0, 100.0, 200.0, 200.0),
            &format,
            preview,
            VideoGravity::ResizeAspect,
        )
        .unwrap();
        assert!(left_half.approx_eq(&Rect::new(0.0, 0.0, 0.5, 1.0), EPS));
    }

    #[test]
    fn test_rotations_move_top_left_corner() {
        let preview = Size::new(100.0, 100.0);
        let corner = Rect::new(0.0, 0.0, 50.0, 50.0);
        let expected = [
            (Rotation::Deg0, Rect::new(0.0, 0.0, 0.5, 0.5)),
            (Rotation::Deg90, Rect::new(0.0, 0.5, 0.5, 0.5)),
            (Rotation::Deg180, Rect::new(0.5, 0.5, 0.5, 0.5)),
            (Rotation::Deg270, Rect::new(0.5, 0.0, 0.5, 0.5)),
        ];
        for (rotation, want) in expected {
            let format = CaptureFormat::new(500.0, 500.0, rotation);
            let got = map_to_capture_space(corner, &format, preview, VideoGravity::Resize).unwrap();
            assert!(got.approx_eq(&want, EPS), "{rotation:?}: {got:?}");
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        let format = CaptureFormat::new(0.0, 720.0, Rotation::Deg0);
        assert_eq!(
            map_to_capture_space(Rect::unit(), &format, Size::new(10.0, 10.0), VideoGravity::Resize),
            Err(RegionError::DegenerateGeometry("capture format"))
        );
        let format = CaptureFormat::new(1280.0, 720.0, Rotation::Deg0);
        assert_eq!(
            map_to_capture_space(Rect::unit(), &format, Size::default(), VideoGravity::Resize),
            Err(RegionError::DegenerateGeometry("preview bounds"))
        );
    }

    #[test]
    fn test_region_outside_video() {
        let format = CaptureFormat::new(800.0, 400.0, Rotation::Deg0);
        let result = map_to_capture_space(
            Rect::new(0.0, 0.0, 400.0, 50.0),
            &format,
            Size::new(400.0, 400.0),
            VideoGravity::ResizeAspect,
        );
        assert_eq!(result, Err(RegionError::OutsideFrame));
    }

    #[test]
    fn test_mapper_recomputes_on_each_change() {
        let preview = Size::new(300.0, 600.0);
        let mut mapper = RegionMapper::new(
            Rect::new(50.0, 200.0, 200.0, 200.0),
            preview,
            VideoGravity::ResizeAspectFill,
        );
        let portrait = CaptureFormat::new(1920.0, 1080.0, Rotation::Deg90);
        let square = CaptureFormat::new(1000.0, 1000.0, Rotation::Deg0);

        let first = mapper.on_format_changed(&portrait).unwrap();
        let second = mapper.on_format_changed(&square).unwrap();
        let third = mapper.on_format_changed(&portrait).unwrap();

        assert_eq!(mapper.remap_count(), 3);
        assert!(!first.approx_eq(&second, EPS));
        assert_eq!(first, third);
        let fresh = map_to_capture_space(
            mapper.scan_region(),
            &square,
            preview,
            VideoGravity::ResizeAspectFill,
        )
        .unwrap();
        assert_eq!(second, fresh);
    }
}

use std::fmt;
use std::str::FromStr;

use super::Size;

/// Clockwise rotation applied to the sensor image for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    /// Sensor orientation matches the display
    #[default]
    Deg0,
    /// Quarter turn clockwise (portrait phone, landscape sensor)
    Deg90,
    /// Half turn
    Deg180,
    /// Three quarter turns clockwise
    Deg270,
}

impl Rotation {
    /// Build from degrees; only multiples of 90 are accepted
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Rotation in degrees
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Quarter turns swap the displayed aspect ratio
    pub fn is_quarter_turn(&self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// Geometry of the active video input, signalled by the platform on change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureFormat {
    /// Sensor frame dimensions in pixels
    pub dimensions: Size,
    /// How the sensor image is rotated for display
    pub rotation: Rotation,
}

impl CaptureFormat {
    /// Create a capture format
    pub fn new(width: f32, height: f32, rotation: Rotation) -> Self {
        Self {
            dimensions: Size::new(width, height),
            rotation,
        }
    }

    /// Frame size as shown on screen (after rotation)
    pub fn displayed_size(&self) -> Size {
        if self.rotation.is_quarter_turn() {
            self.dimensions.transposed()
        } else {
            self.dimensions
        }
    }
}

/// How the preview scales video into its bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoGravity {
    /// Stretch to fill, ignoring aspect ratio
    Resize,
    /// Fit inside the bounds, letterboxing as needed
    ResizeAspect,
    /// Fill the bounds, cropping overflow
    #[default]
    ResizeAspectFill,
}

impl fmt::Display for VideoGravity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VideoGravity::Resize => "resize",
            VideoGravity::ResizeAspect => "aspect",
            VideoGravity::ResizeAspectFill => "fill",
        };
        f.write_str(name)
    }
}

impl FromStr for VideoGravity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resize" | "stretch" => Ok(VideoGravity::Resize),
            "aspect" | "resizeaspect" | "fit" => Ok(VideoGravity::ResizeAspect),
            "fill" | "resizeaspectfill" | "aspectfill" => Ok(VideoGravity::ResizeAspectFill),
            other => Err(format!("unknown video gravity '{other}'")),
        }
    }
}

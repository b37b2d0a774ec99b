//! Error taxonomy for scan sessions
//!
//! Every failure is contained at the component that detects it: capture
//! configuration errors stop the session and show a static notice, contact
//! parse errors are logged and handed to the decode listener, permission
//! denial routes to the settings prompt. Nothing here escalates to a panic.

/// Capture session configuration failures; unrecoverable for the session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// The device has no default video input
    #[error("no camera device available")]
    NoDevice,
    /// The video input could not be created or attached to the session
    #[error("capture session rejected the camera input: {0}")]
    InputRejected(String),
    /// The metadata output could not be attached to the session
    #[error("capture session rejected the metadata output: {0}")]
    OutputRejected(String),
}

/// Reasons a vCard payload could not become a contact record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactParseError {
    /// Marker present but no `BEGIN:VCARD` content line
    #[error("payload has no BEGIN:VCARD line")]
    MissingBegin,
    /// Card never closed with `END:VCARD`
    #[error("vCard is missing END:VCARD")]
    MissingEnd,
    /// A content line without a `name:value` separator
    #[error("malformed vCard line {line}")]
    MalformedLine {
        /// 1-based line number after unfolding
        line: usize,
    },
    /// `VERSION` other than 2.1, 3.0 or 4.0
    #[error("unsupported vCard version '{0}'")]
    UnsupportedVersion(String),
    /// Quoted-printable value with a bad escape
    #[error("invalid quoted-printable value on line {line}")]
    InvalidQuotedPrintable {
        /// 1-based line number after unfolding
        line: usize,
    },
    /// Card parsed but no recognized property was set
    #[error("vCard has no contact fields")]
    NoContactFields,
}

/// Rect-of-interest mapping failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegionError {
    /// Preview bounds or capture format has no area
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
    /// Scan region lies entirely outside the visible video
    #[error("scan region does not overlap the capture frame")]
    OutsideFrame,
}

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A value could not be parsed
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Setting name
        key: String,
        /// Parser message
        reason: String,
    },
    /// The symbology allow-list must name at least one family
    #[error("symbology allow-list is empty")]
    EmptyAllowList,
}

/// Umbrella error for callers that want a single type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    /// Camera access refused; recoverable through system settings
    #[error("camera permission denied")]
    PermissionDenied,
    /// Session configuration failed
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// Contact payload was unusable
    #[error(transparent)]
    ContactParse(#[from] ContactParseError),
    /// Mapping failed
    #[error(transparent)]
    Region(#[from] RegionError),
    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub mod contact;
pub mod format;
pub mod geometry;
pub mod permission;
pub mod symbol;

pub use contact::{ContactField, ContactRecord, Labeled, PostalAddress, StructuredName};
pub use format::{CaptureFormat, Rotation, VideoGravity};
pub use geometry::{Point, Rect, Size};
pub use permission::PermissionState;
pub use symbol::{DecodedSymbol, DetectedSymbol, Symbology};

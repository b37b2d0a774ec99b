//! barcode_scanner - portable QR scan session
//!
//! A scan view opens the camera once permission allows, restricts the
//! platform decoder to QR codes inside a scan window, stops on the first
//! hit, and opens a contact editor when the payload is a vCard. Camera,
//! decoder, permission system and UI are host collaborators reached
//! through the traits in [`platform`].
//!
//! ```
//! use barcode_scanner::config::CreationArgs;
//! use barcode_scanner::models::{DetectedSymbol, PermissionState, Rect, Symbology};
//! use barcode_scanner::tools::sim::SimPlatform;
//! use barcode_scanner::view::ScanViewFactory;
//!
//! let platform = SimPlatform::new(PermissionState::Authorized);
//! let mut view = ScanViewFactory::default()
//!     .create(Rect::new(0.0, 0.0, 320.0, 480.0), 1, &CreationArgs::new(), platform.services())
//!     .unwrap();
//! view.view();
//! platform.camera.emit_symbols(vec![DetectedSymbol::new(Symbology::Qr, "hello")]);
//! view.pump();
//! assert!(!view.is_capturing());
//! assert_eq!(platform.listener.log().raw, vec!["hello".to_string()]);
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Scan configuration and environment overrides
pub mod config;
/// Error taxonomy
pub mod error;
/// Core data structures (geometry, formats, symbols, contacts)
pub mod models;
/// Payload classification and vCard parsing
pub mod payload;
/// Host collaborator traits
pub mod platform;
/// Method channel handler
pub mod plugin;
/// Session components (permission, capture, mapping, sink, lifecycle)
pub mod session;
/// Simulator and debugging helpers
pub mod tools;
/// Embeddable scan view
pub mod view;

pub use error::{CaptureError, ContactParseError, RegionError, ScanError};
pub use models::{
    CaptureFormat, ContactRecord, DecodedSymbol, DetectedSymbol, PermissionState, Rect, Size,
    Symbology, VideoGravity,
};
pub use payload::{Action, PayloadRouter};
pub use plugin::{BarcodeScannerPlugin, MethodResult, PlatformInfo};
pub use view::{ScanViewController, ScanViewFactory, ViewPhase};

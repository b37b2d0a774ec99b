//! Capture-and-decode session components
//!
//! - [`permission`]: camera permission gate
//! - [`capture`]: native capture session ownership
//! - [`region`]: scan window to capture space mapping
//! - [`sink`]: first-hit symbol selection
//! - [`lifecycle`]: attach/detach/dispose coordination
//! - [`events`]: UI-affine event delivery

pub mod capture;
pub mod events;
pub mod lifecycle;
pub mod permission;
pub mod region;
pub mod sink;

pub use capture::CaptureSession;
pub use events::{EventQueue, EventSender, PermissionReply, ScanEvent, Subscription};
pub use lifecycle::SessionLifecycle;
pub use permission::{GateOutcome, PermissionGate};
pub use region::{RegionMapper, map_to_capture_space};
pub use sink::DecodeSink;

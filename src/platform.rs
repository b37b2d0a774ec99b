//! Seams to the host platform
//!
//! The scan view owns no camera, decoder or UI of its own. Each external
//! collaborator is a trait object handed over at construction, and every
//! call into them happens on the view's thread.

use crate::config::NoticeText;
use crate::error::ContactParseError;
use crate::models::{ContactRecord, PermissionState, Rect, Symbology};
use crate::session::events::{EventSender, PermissionReply, Subscription};

/// Camera permission system
pub trait CameraPermissions {
    /// Current authorization status
    fn status(&self) -> PermissionState;

    /// Show the system prompt; the answer arrives through `reply`
    fn request_access(&mut self, reply: PermissionReply);
}

/// System settings deep-link
pub trait SettingsLinker {
    /// Open the app's settings page; false when no handler is available
    fn open_settings(&mut self) -> bool;
}

/// A video capture device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDevice {
    /// Platform identifier
    pub id: String,
    /// Human readable name
    pub name: String,
}

/// Device discovery and session factory
pub trait CameraSystem {
    /// Default video input, if the device has a camera
    fn default_video_device(&mut self) -> Option<VideoDevice>;

    /// Fresh, unconfigured native session
    fn create_session(&mut self) -> Box<dyn NativeCaptureSession>;

    /// Post [`ScanEvent::FormatChanged`](crate::session::ScanEvent) on every
    /// input format change until the subscription is dropped
    fn observe_format_changes(&mut self, events: EventSender) -> Subscription;
}

/// A native capture session. Dropping it releases inputs and outputs.
pub trait NativeCaptureSession {
    /// Attach the device input; `Err` carries the platform's reason
    fn add_input(&mut self, device: &VideoDevice) -> Result<(), String>;

    /// Attach a metadata output restricted to `symbologies`; detections are
    /// posted as [`ScanEvent::SymbolsDetected`](crate::session::ScanEvent)
    fn add_metadata_output(
        &mut self,
        symbologies: &[Symbology],
        events: EventSender,
    ) -> Result<(), String>;

    /// Restrict detection to a normalized rect in capture space
    fn set_rect_of_interest(&mut self, rect: Rect);

    /// Begin frame delivery
    fn start_running(&mut self);

    /// End frame delivery
    fn stop_running(&mut self);

    /// Whether frames are being delivered
    fn is_running(&self) -> bool;
}

/// Presentation surface owned by the host UI framework
pub trait ScanUi {
    /// Static "scanning not supported" alert
    fn show_unsupported_notice(&mut self, notice: &NoticeText);

    /// Overlay with a button that posts
    /// [`ScanEvent::SettingsRequested`](crate::session::ScanEvent)
    fn show_settings_prompt(&mut self, button_title: &str);

    /// Native editor for a new contact
    fn present_contact_editor(&mut self, record: &ContactRecord);

    /// Close the contact editor
    fn dismiss_contact_editor(&mut self);
}

/// Consumer for results that do not open the contact editor
pub trait DecodeListener {
    /// Decoded text that is not a contact card
    fn on_raw_result(&mut self, text: &str);

    /// A contact card that could not be parsed. Not shown to the user.
    fn on_contact_parse_failed(&mut self, _error: &ContactParseError) {}
}

/// Listener that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl DecodeListener for LoggingListener {
    fn on_raw_result(&mut self, text: &str) {
        log::info!("scanned raw result ({} bytes)", text.len());
    }
}

/// All collaborators a scan view needs
pub struct PlatformServices {
    /// Permission system
    pub permissions: Box<dyn CameraPermissions>,
    /// Settings deep-link
    pub settings: Box<dyn SettingsLinker>,
    /// Camera system
    pub camera: Box<dyn CameraSystem>,
    /// UI presentation
    pub ui: Box<dyn ScanUi>,
    /// Raw result consumer
    pub listener: Box<dyn DecodeListener>,
}

//! In-memory platform
//!
//! Every collaborator records what was asked of it behind a shared handle,
//! so tests and `scantool simulate` can drive a scan view and inspect the
//! platform side afterwards. Clones share state.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::config::NoticeText;
use crate::error::ContactParseError;
use crate::models::{CaptureFormat, ContactRecord, DetectedSymbol, PermissionState, Rect, Symbology};
use crate::platform::{
    CameraPermissions, CameraSystem, DecodeListener, NativeCaptureSession, PlatformServices,
    ScanUi, SettingsLinker, VideoDevice,
};
use crate::session::events::{EventSender, PermissionReply, ScanEvent, Subscription};

/// Recorded camera state
#[derive(Debug, Default)]
pub struct SimCameraState {
    /// Whether a default video device exists
    pub has_device: bool,
    /// Reason to reject the device input
    pub reject_input: Option<String>,
    /// Reason to reject the metadata output
    pub reject_output: Option<String>,
    /// Native sessions ever created
    pub sessions_created: usize,
    /// Native sessions not yet dropped
    pub live_sessions: usize,
    /// Whether any session delivers frames
    pub running: bool,
    /// `start_running` calls
    pub start_calls: usize,
    /// `stop_running` calls
    pub stop_calls: usize,
    /// Allow-list the output was configured with
    pub output_symbologies: Vec<Symbology>,
    /// Every rect of interest applied, oldest first
    pub rects_of_interest: Vec<Rect>,
    /// Registered format observers
    pub format_observers: usize,
    format_sender: Option<EventSender>,
    output_sender: Option<EventSender>,
}

/// Simulated camera system
#[derive(Debug, Clone)]
pub struct SimCamera {
    state: Rc<RefCell<SimCameraState>>,
}

impl SimCamera {
    /// Camera with a working default device
    pub fn new() -> Self {
        let state = SimCameraState {
            has_device: true,
            ..Default::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Device without a camera
    pub fn without_device() -> Self {
        Self {
            state: Rc::new(RefCell::new(SimCameraState::default())),
        }
    }

    /// Read recorded state
    pub fn state(&self) -> Ref<'_, SimCameraState> {
        self.state.borrow()
    }

    /// Adjust behaviour
    pub fn state_mut(&self) -> RefMut<'_, SimCameraState> {
        self.state.borrow_mut()
    }

    /// Most recent rect of interest
    pub fn last_rect_of_interest(&self) -> Option<Rect> {
        self.state.borrow().rects_of_interest.last().copied()
    }

    /// Signal an input format change; false when nobody observes
    pub fn emit_format(&self, format: CaptureFormat) -> bool {
        let sender = self.state.borrow().format_sender.clone();
        match sender {
            Some(sender) => sender.post(ScanEvent::FormatChanged(format)),
            None => false,
        }
    }

    /// Deliver one frame's detections; only a running session delivers
    pub fn emit_symbols(&self, batch: Vec<DetectedSymbol>) -> bool {
        let sender = {
            let state = self.state.borrow();
            if !state.running {
                return false;
            }
            state.output_sender.clone()
        };
        match sender {
            Some(sender) => sender.post(ScanEvent::SymbolsDetected(batch)),
            None => false,
        }
    }
}

impl Default for SimCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraSystem for SimCamera {
    fn default_video_device(&mut self) -> Option<VideoDevice> {
        self.state.borrow().has_device.then(|| VideoDevice {
            id: "sim:0".to_string(),
            name: "Simulated back camera".to_string(),
        })
    }

    fn create_session(&mut self) -> Box<dyn NativeCaptureSession> {
        {
            let mut state = self.state.borrow_mut();
            state.sessions_created += 1;
            state.live_sessions += 1;
        }
        Box::new(SimNativeSession {
            state: self.state.clone(),
            running: false,
            owns_output: false,
        })
    }

    fn observe_format_changes(&mut self, events: EventSender) -> Subscription {
        {
            let mut state = self.state.borrow_mut();
            state.format_observers += 1;
            state.format_sender = Some(events);
        }
        let state = self.state.clone();
        Subscription::new(move || {
            let mut state = state.borrow_mut();
            state.format_observers = state.format_observers.saturating_sub(1);
            if state.format_observers == 0 {
                state.format_sender = None;
            }
        })
    }
}

struct SimNativeSession {
    state: Rc<RefCell<SimCameraState>>,
    running: bool,
    owns_output: bool,
}

impl NativeCaptureSession for SimNativeSession {
    fn add_input(&mut self, _device: &VideoDevice) -> Result<(), String> {
        match self.state.borrow().reject_input.clone() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    fn add_metadata_output(
        &mut self,
        symbologies: &[Symbology],
        events: EventSender,
    ) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = state.reject_output.clone() {
            return Err(reason);
        }
        state.output_symbologies = symbologies.to_vec();
        state.output_sender = Some(events);
        self.owns_output = true;
        Ok(())
    }

    fn set_rect_of_interest(&mut self, rect: Rect) {
        self.state.borrow_mut().rects_of_interest.push(rect);
    }

    fn start_running(&mut self) {
        self.running = true;
        let mut state = self.state.borrow_mut();
        state.running = true;
        state.start_calls += 1;
    }

    fn stop_running(&mut self) {
        self.running = false;
        let mut state = self.state.borrow_mut();
        state.running = false;
        state.stop_calls += 1;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

impl Drop for SimNativeSession {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.live_sessions = state.live_sessions.saturating_sub(1);
        if self.running {
            state.running = false;
        }
        if self.owns_output {
            state.output_sender = None;
        }
    }
}

/// Recorded permission state
#[derive(Debug, Default)]
pub struct SimPermissionState {
    /// Current status
    pub status: PermissionState,
    /// Prompts shown
    pub requests: usize,
    pending: Option<PermissionReply>,
}

/// Simulated permission system
#[derive(Debug, Clone)]
pub struct SimPermissions {
    state: Rc<RefCell<SimPermissionState>>,
}

impl SimPermissions {
    /// Permission system reporting `status`
    pub fn new(status: PermissionState) -> Self {
        let state = SimPermissionState {
            status,
            ..Default::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Read recorded state
    pub fn state(&self) -> Ref<'_, SimPermissionState> {
        self.state.borrow()
    }

    /// Change the status, as a trip to system settings would
    pub fn set_status(&self, status: PermissionState) {
        self.state.borrow_mut().status = status;
    }

    /// Whether a prompt is on screen
    pub fn has_pending_prompt(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Answer the on-screen prompt; false when none is showing
    pub fn answer(&self, granted: bool) -> bool {
        let reply = {
            let mut state = self.state.borrow_mut();
            let reply = state.pending.take();
            if reply.is_some() {
                state.status = PermissionState::from_grant(granted);
            }
            reply
        };
        match reply {
            Some(reply) => {
                reply.resolve(granted);
                true
            }
            None => false,
        }
    }
}

impl CameraPermissions for SimPermissions {
    fn status(&self) -> PermissionState {
        self.state.borrow().status
    }

    fn request_access(&mut self, reply: PermissionReply) {
        let mut state = self.state.borrow_mut();
        state.requests += 1;
        state.pending = Some(reply);
    }
}

/// Simulated settings deep-link
#[derive(Debug, Clone)]
pub struct SimSettings {
    available: Rc<RefCell<bool>>,
    opened: Rc<RefCell<usize>>,
}

impl SimSettings {
    /// Deep-link that works when `available`
    pub fn new(available: bool) -> Self {
        Self {
            available: Rc::new(RefCell::new(available)),
            opened: Rc::new(RefCell::new(0)),
        }
    }

    /// Successful opens
    pub fn opened(&self) -> usize {
        *self.opened.borrow()
    }
}

impl SettingsLinker for SimSettings {
    fn open_settings(&mut self) -> bool {
        if !*self.available.borrow() {
            return false;
        }
        *self.opened.borrow_mut() += 1;
        true
    }
}

/// Everything presented on screen
#[derive(Debug, Default)]
pub struct UiLog {
    /// Unsupported notices shown
    pub notices: Vec<NoticeText>,
    /// Settings prompts shown, by button title
    pub settings_prompts: Vec<String>,
    /// Contacts handed to the editor
    pub editors: Vec<ContactRecord>,
    /// Whether the editor is on screen
    pub editor_open: bool,
    /// Editor dismissals
    pub dismissals: usize,
}

/// UI that records presentations
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    log: Rc<RefCell<UiLog>>,
}

impl RecordingUi {
    /// Read the log
    pub fn log(&self) -> Ref<'_, UiLog> {
        self.log.borrow()
    }
}

impl ScanUi for RecordingUi {
    fn show_unsupported_notice(&mut self, notice: &NoticeText) {
        self.log.borrow_mut().notices.push(notice.clone());
    }

    fn show_settings_prompt(&mut self, button_title: &str) {
        self.log
            .borrow_mut()
            .settings_prompts
            .push(button_title.to_string());
    }

    fn present_contact_editor(&mut self, record: &ContactRecord) {
        let mut log = self.log.borrow_mut();
        log.editors.push(record.clone());
        log.editor_open = true;
    }

    fn dismiss_contact_editor(&mut self) {
        let mut log = self.log.borrow_mut();
        log.editor_open = false;
        log.dismissals += 1;
    }
}

/// Results handed to the listener
#[derive(Debug, Default)]
pub struct ListenerLog {
    /// Raw texts
    pub raw: Vec<String>,
    /// Contact parse failures
    pub parse_failures: Vec<ContactParseError>,
}

/// Listener that records results
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    log: Rc<RefCell<ListenerLog>>,
}

impl RecordingListener {
    /// Read the log
    pub fn log(&self) -> Ref<'_, ListenerLog> {
        self.log.borrow()
    }
}

impl DecodeListener for RecordingListener {
    fn on_raw_result(&mut self, text: &str) {
        self.log.borrow_mut().raw.push(text.to_string());
    }

    fn on_contact_parse_failed(&mut self, error: &ContactParseError) {
        self.log.borrow_mut().parse_failures.push(error.clone());
    }
}

/// A complete simulated platform
#[derive(Debug, Clone)]
pub struct SimPlatform {
    /// Camera
    pub camera: SimCamera,
    /// Permission system
    pub permissions: SimPermissions,
    /// Settings deep-link
    pub settings: SimSettings,
    /// Presentation log
    pub ui: RecordingUi,
    /// Result log
    pub listener: RecordingListener,
}

impl SimPlatform {
    /// Platform with a camera and the given permission status
    pub fn new(status: PermissionState) -> Self {
        Self {
            camera: SimCamera::new(),
            permissions: SimPermissions::new(status),
            settings: SimSettings::new(true),
            ui: RecordingUi::default(),
            listener: RecordingListener::default(),
        }
    }

    /// Platform whose device has no camera
    pub fn without_camera(status: PermissionState) -> Self {
        Self {
            camera: SimCamera::without_device(),
            ..Self::new(status)
        }
    }

    /// Boxed collaborators sharing this platform's state
    pub fn services(&self) -> PlatformServices {
        PlatformServices {
            permissions: Box::new(self.permissions.clone()),
            settings: Box::new(self.settings.clone()),
            camera: Box::new(self.camera.clone()),
            ui: Box::new(self.ui.clone()),
            listener: Box::new(self.listener.clone()),
        }
    }
}

//! Embeddable scan view
//!
//! The host creates a [`ScanViewController`] through [`ScanViewFactory`],
//! asks for its view (which runs the permission gate and starts capture),
//! forwards platform events by pumping the controller's queue on the UI
//! thread, and calls [`ScanViewController::dispose`] on teardown.

use crate::config::{CreationArgs, ScanConfig};
use crate::error::ConfigError;
use crate::models::{ContactField, Rect};
use crate::payload::{Action, PayloadRouter, RouterState};
use crate::platform::PlatformServices;
use crate::session::{
    EventQueue, EventSender, GateOutcome, PermissionGate, RegionMapper, ScanEvent,
    SessionLifecycle,
};

/// Where a scan view is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    /// Constructed, view not materialized yet
    Created,
    /// Permission prompt on screen
    AwaitingPermission,
    /// Access denied; settings prompt shown
    PermissionRequired,
    /// Capture running, waiting for a hit
    Scanning,
    /// A hit was taken; capture stopped
    Stopped,
    /// Camera unavailable; notice shown
    Unsupported,
    /// Torn down
    Disposed,
}

/// Renderable view description handed back to the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewHandle {
    /// Host-assigned identifier
    pub view_id: i64,
    /// Frame in host coordinates
    pub frame: Rect,
    /// Scan window in view coordinates
    pub scan_window: Rect,
}

/// Builds scan views with a shared base configuration
#[derive(Debug, Clone, Default)]
pub struct ScanViewFactory {
    config: ScanConfig,
}

impl ScanViewFactory {
    /// Factory with an explicit configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Factory configured from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(ScanConfig::from_env()?))
    }

    /// Base configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Create a view for `frame`; creation arguments override the base config
    pub fn create(
        &self,
        frame: Rect,
        view_id: i64,
        args: &CreationArgs,
        services: PlatformServices,
    ) -> Result<ScanViewController, ConfigError> {
        let config = self.config.clone().with_creation_args(args)?;
        Ok(ScanViewController::new(frame, view_id, config, services))
    }
}

/// One embedded scan view and everything it owns
pub struct ScanViewController {
    handle: ViewHandle,
    config: ScanConfig,
    services: PlatformServices,
    queue: EventQueue,
    gate: PermissionGate,
    lifecycle: SessionLifecycle,
    router: PayloadRouter,
    phase: ViewPhase,
}

impl ScanViewController {
    /// Controller for a view of `frame`
    pub fn new(frame: Rect, view_id: i64, config: ScanConfig, services: PlatformServices) -> Self {
        let bounds = Rect::from_size(frame.size());
        let scan_window = config.scan_window(bounds);
        let mapper = RegionMapper::new(scan_window, bounds.size(), config.gravity);
        let lifecycle = SessionLifecycle::new(mapper, config.symbologies.clone());
        Self {
            handle: ViewHandle {
                view_id,
                frame,
                scan_window,
            },
            config,
            services,
            queue: EventQueue::new(),
            gate: PermissionGate::new(),
            lifecycle,
            router: PayloadRouter::new(),
            phase: ViewPhase::Created,
        }
    }

    /// Materialize the view; the first call runs the permission gate
    pub fn view(&mut self) -> ViewHandle {
        if self.phase == ViewPhase::Created {
            log::debug!("materializing scan view {}", self.handle.view_id);
            self.run_gate();
        }
        self.handle
    }

    /// View description
    pub fn handle(&self) -> ViewHandle {
        self.handle
    }

    /// Current phase
    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    /// Effective configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Router state
    pub fn router_state(&self) -> RouterState {
        self.router.state()
    }

    /// Session ownership, for inspection
    pub fn lifecycle(&self) -> &SessionLifecycle {
        &self.lifecycle
    }

    /// Whether the camera is delivering frames
    pub fn is_capturing(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// Sender for platform callbacks that run off the UI thread
    pub fn event_sender(&self) -> EventSender {
        self.queue.sender()
    }

    /// Handle every queued event; returns how many were processed
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.try_next() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Handle one event on the UI thread
    pub fn handle_event(&mut self, event: ScanEvent) {
        if self.phase == ViewPhase::Disposed {
            log::debug!("view {} disposed; dropping {:?}", self.handle.view_id, event);
            return;
        }
        match event {
            ScanEvent::PermissionResolved { granted } => {
                if self.phase != ViewPhase::AwaitingPermission {
                    log::debug!("permission answer in {:?} ignored", self.phase);
                    return;
                }
                if let Some(outcome) = self.gate.resolve(granted) {
                    self.apply_gate(outcome);
                }
            }
            ScanEvent::FormatChanged(format) => {
                self.lifecycle.on_format_changed(&format);
            }
            ScanEvent::SymbolsDetected(batch) => {
                if let Some(hit) = self.lifecycle.on_symbols(&batch) {
                    self.phase = ViewPhase::Stopped;
                    let action = self.router.route(&hit.text);
                    self.dispatch(action);
                }
            }
            ScanEvent::SettingsRequested => {
                self.gate.open_settings(self.services.settings.as_mut());
            }
            ScanEvent::ContactEditorClosed => {
                if self.router.state() == RouterState::EditorOpen {
                    self.services.ui.dismiss_contact_editor();
                    self.router.editor_closed();
                }
            }
        }
    }

    /// Scan again after a hit or a denial; refused while the editor is open
    pub fn restart(&mut self) -> bool {
        if self.phase == ViewPhase::Disposed || !self.router.is_idle() {
            return false;
        }
        if self.phase == ViewPhase::Scanning && self.lifecycle.is_running() {
            return true;
        }
        self.run_gate();
        true
    }

    /// Per-field editor actions (call, mail, open URL) are always allowed
    pub fn should_perform_default_action(&self, _field: ContactField) -> bool {
        true
    }

    /// Stop capture, drop observers and pending events. Idempotent.
    pub fn dispose(&mut self) {
        if self.phase == ViewPhase::Disposed {
            return;
        }
        self.lifecycle.dispose();
        let dropped = self.queue.clear();
        self.phase = ViewPhase::Disposed;
        log::debug!(
            "scan view {} disposed ({} pending events dropped)",
            self.handle.view_id,
            dropped
        );
    }

    fn run_gate(&mut self) {
        let events = self.queue.sender();
        let outcome = self
            .gate
            .check_and_request(self.services.permissions.as_mut(), &events);
        self.apply_gate(outcome);
    }

    fn apply_gate(&mut self, outcome: GateOutcome) {
        match outcome {
            GateOutcome::Proceed => self.start_capture(),
            GateOutcome::Remediate => {
                self.lifecycle.detach();
                self.services
                    .ui
                    .show_settings_prompt(&self.config.settings_button_title);
                self.phase = ViewPhase::PermissionRequired;
            }
            GateOutcome::Pending => self.phase = ViewPhase::AwaitingPermission,
        }
    }

    fn start_capture(&mut self) {
        let events = self.queue.sender();
        match self.lifecycle.attach(self.services.camera.as_mut(), &events) {
            Ok(()) => self.phase = ViewPhase::Scanning,
            Err(err) => {
                log::warn!("scan view {}: {err}", self.handle.view_id);
                self.services.ui.show_unsupported_notice(&self.config.notice);
                self.phase = ViewPhase::Unsupported;
            }
        }
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::OpenContactEditor(record) => {
                log::info!(
                    "opening contact editor for {}",
                    record.display_name().unwrap_or_else(|| "unnamed contact".into())
                );
                self.services.ui.present_contact_editor(&record);
            }
            Action::ReportError(err) => self.services.listener.on_contact_parse_failed(&err),
            Action::DisplayRawResult(text) => self.services.listener.on_raw_result(&text),
        }
    }
}

impl Drop for ScanViewController {
    fn drop(&mut self) {
        self.dispose();
    }
}

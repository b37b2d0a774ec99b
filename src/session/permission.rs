use crate::models::PermissionState;
use crate::platform::{CameraPermissions, SettingsLinker};
use crate::session::events::{EventSender, PermissionReply};

/// What the caller should do after consulting the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Access granted: start capture now
    Proceed,
    /// Access refused: show the settings prompt, do not start capture
    Remediate,
    /// A prompt is on screen; the answer arrives as an event
    Pending,
}

impl GateOutcome {
    /// Permission state this outcome corresponds to
    pub fn state(&self) -> PermissionState {
        match self {
            GateOutcome::Proceed => PermissionState::Authorized,
            GateOutcome::Remediate => PermissionState::Denied,
            GateOutcome::Pending => PermissionState::Unknown,
        }
    }
}

/// Camera permission gate.
///
/// Status is queried fresh on every run, so a denial lifted in system
/// settings is picked up by the next session start. At most one prompt is
/// outstanding at a time.
#[derive(Debug, Default)]
pub struct PermissionGate {
    pending: bool,
}

impl PermissionGate {
    /// Create a gate with no outstanding prompt
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a prompt is waiting for the user
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Query the status and prompt once if it is still undetermined
    pub fn check_and_request(
        &mut self,
        permissions: &mut dyn CameraPermissions,
        events: &EventSender,
    ) -> GateOutcome {
        let status = permissions.status();
        if status != PermissionState::Unknown && self.pending {
            // Settled elsewhere (settings app); the outstanding answer is stale.
            log::debug!("permission settled as {status:?} while a prompt was pending");
            self.pending = false;
        }
        match status {
            PermissionState::Authorized => GateOutcome::Proceed,
            PermissionState::Denied => {
                log::info!("camera access denied; offering settings");
                GateOutcome::Remediate
            }
            PermissionState::Unknown => {
                if self.pending {
                    log::debug!("camera permission prompt already pending");
                } else {
                    self.pending = true;
                    log::debug!("requesting camera permission");
                    permissions.request_access(PermissionReply::new(events.clone()));
                }
                GateOutcome::Pending
            }
        }
    }

    /// Apply the answer to the outstanding prompt; `None` if none was pending
    pub fn resolve(&mut self, granted: bool) -> Option<GateOutcome> {
        if !self.pending {
            log::debug!("ignoring permission answer with no prompt pending");
            return None;
        }
        self.pending = false;
        Some(match PermissionState::from_grant(granted) {
            PermissionState::Authorized => GateOutcome::Proceed,
            _ => GateOutcome::Remediate,
        })
    }

    /// Follow the settings deep-link; a missing handler is logged, not fatal
    pub fn open_settings(&self, linker: &mut dyn SettingsLinker) -> bool {
        let opened = linker.open_settings();
        if !opened {
            log::warn!("settings deep-link unavailable");
        }
        opened
    }
}

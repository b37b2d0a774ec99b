use crate::error::CaptureError;
use crate::models::{Rect, Symbology};
use crate::platform::{CameraSystem, NativeCaptureSession};
use crate::session::events::EventSender;

/// Owns the native capture session for one scan view.
///
/// Configuration happens on the first `start`: default device, device
/// input, then a metadata output limited to the allow-list. A failure at
/// any step drops everything acquired so far; the session never keeps a
/// half-configured native session around.
pub struct CaptureSession {
    symbologies: Vec<Symbology>,
    native: Option<Box<dyn NativeCaptureSession>>,
}

impl CaptureSession {
    /// Unconfigured session restricted to `symbologies`
    pub fn new(symbologies: Vec<Symbology>) -> Self {
        Self {
            symbologies,
            native: None,
        }
    }

    /// Symbologies the output is restricted to
    pub fn symbologies(&self) -> &[Symbology] {
        &self.symbologies
    }

    /// Whether a native session is configured
    pub fn is_configured(&self) -> bool {
        self.native.is_some()
    }

    /// Whether frames are being delivered
    pub fn is_running(&self) -> bool {
        self.native.as_ref().is_some_and(|n| n.is_running())
    }

    /// Configure if needed, then start running if not already running
    pub fn start(
        &mut self,
        camera: &mut dyn CameraSystem,
        events: &EventSender,
    ) -> Result<(), CaptureError> {
        if self.native.is_none() {
            let native = self.configure(camera, events).inspect_err(|err| {
                log::warn!("capture configuration failed: {err}");
            })?;
            self.native = Some(native);
        }
        if let Some(native) = self.native.as_mut() {
            if !native.is_running() {
                native.start_running();
                log::debug!("capture started");
            }
        }
        Ok(())
    }

    fn configure(
        &self,
        camera: &mut dyn CameraSystem,
        events: &EventSender,
    ) -> Result<Box<dyn NativeCaptureSession>, CaptureError> {
        let device = camera.default_video_device().ok_or(CaptureError::NoDevice)?;
        log::debug!("using video device {} ({})", device.name, device.id);

        // Returning early drops `native`, releasing whatever was attached.
        let mut native = camera.create_session();
        native
            .add_input(&device)
            .map_err(CaptureError::InputRejected)?;

        if self.symbologies.is_empty() {
            return Err(CaptureError::OutputRejected(
                "symbology allow-list is empty".to_string(),
            ));
        }
        native
            .add_metadata_output(&self.symbologies, events.clone())
            .map_err(CaptureError::OutputRejected)?;
        Ok(native)
    }

    /// Stop frame delivery; safe to call when not running
    pub fn stop(&mut self) {
        if let Some(native) = self.native.as_mut() {
            if native.is_running() {
                native.stop_running();
                log::debug!("capture stopped");
            }
        }
    }

    /// Apply a rect of interest; false when no output is configured
    pub fn set_rect_of_interest(&mut self, rect: Rect) -> bool {
        match self.native.as_mut() {
            Some(native) => {
                native.set_rect_of_interest(rect);
                true
            }
            None => false,
        }
    }

    /// Stop and drop the native session
    pub fn release(&mut self) {
        self.stop();
        self.native = None;
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("symbologies", &self.symbologies)
            .field("configured", &self.is_configured())
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::events::EventQueue;
    use crate::tools::sim::SimCamera;

    #[test]
    fn test_start_configures_and_runs() {
        let queue = EventQueue::new();
        let camera = SimCamera::new();
        let mut session = CaptureSession::new(vec![Symbology::Qr]);
        session
            .start(&mut camera.clone(), &queue.sender())
            .expect("start");
        assert!(session.is_running());
        assert_eq!(camera.state().output_symbologies, vec![Symbology::Qr]);
        assert_eq!(camera.state().live_sessions, 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let queue = EventQueue::new();
        let camera = SimCamera::new();
        let mut session = CaptureSession::new(vec![Symbology::Qr]);
        session.stop();
        session.start(&mut camera.clone(), &queue.sender()).unwrap();
        session.stop();
        session.stop();
        assert!(!session.is_running());
        assert_eq!(camera.state().stop_calls, 1);
    }

    #[test]
    fn test_no_device() {
        let queue = EventQueue::new();
        let camera = SimCamera::without_device();
        let mut session = CaptureSession::new(vec![Symbology::Qr]);
        assert_eq!(
            session.start(&mut camera.clone(), &queue.sender()),
            Err(CaptureError::NoDevice)
        );
        assert!(!session.is_configured());
        assert_eq!(camera.state().sessions_created, 0);
    }

    #[test]
    fn test_rejected_output_releases_session() {
        let queue = EventQueue::new();
        let camera = SimCamera::new();
        camera.state_mut().reject_output = Some("output busy".into());
        let mut session = CaptureSession::new(vec![Symbology::Qr]);
        let err = session
            .start(&mut camera.clone(), &queue.sender())
            .unwrap_err();
        assert_eq!(err, CaptureError::OutputRejected("output busy".into()));
        assert!(!session.is_configured());
        assert_eq!(camera.state().sessions_created, 1);
        assert_eq!(camera.state().live_sessions, 0);
        assert!(!camera.state().running);
    }

    #[test]
    fn test_empty_allow_list_rejected() {
        let queue = EventQueue::new();
        let camera = SimCamera::new();
        let mut session = CaptureSession::new(Vec::new());
        assert!(matches!(
            session.start(&mut camera.clone(), &queue.sender()),
            Err(CaptureError::OutputRejected(_))
        ));
        assert_eq!(camera.state().live_sessions, 0);
    }

    #[test]
    fn test_rect_of_interest_needs_configuration() {
        let mut session = CaptureSession::new(vec![Symbology::Qr]);
        assert!(!session.set_rect_of_interest(Rect::unit()));
    }
}

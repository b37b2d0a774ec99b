use crate::error::CaptureError;
use crate::models::{CaptureFormat, DecodedSymbol, DetectedSymbol, Rect, Symbology};
use crate::platform::CameraSystem;
use crate::session::capture::CaptureSession;
use crate::session::events::{EventSender, Subscription};
use crate::session::region::RegionMapper;
use crate::session::sink::DecodeSink;

/// Owns the capture session, its format observer, the mapper and the sink.
///
/// Events are only acted on while attached with a live session; anything
/// that arrives after `detach` or `dispose` is dropped.
#[derive(Debug)]
pub struct SessionLifecycle {
    symbologies: Vec<Symbology>,
    session: Option<CaptureSession>,
    subscription: Option<Subscription>,
    mapper: RegionMapper,
    sink: DecodeSink,
    attached: bool,
}

impl SessionLifecycle {
    /// Detached lifecycle with no session yet
    pub fn new(mapper: RegionMapper, symbologies: Vec<Symbology>) -> Self {
        Self {
            sink: DecodeSink::new(symbologies.clone()),
            symbologies,
            session: None,
            subscription: None,
            mapper,
            attached: false,
        }
    }

    /// Observe format changes and start capture if it is not running.
    ///
    /// On failure the session reference is cleared and the observer dropped.
    pub fn attach(
        &mut self,
        camera: &mut dyn CameraSystem,
        events: &EventSender,
    ) -> Result<(), CaptureError> {
        if self.subscription.is_none() {
            self.subscription = Some(camera.observe_format_changes(events.clone()));
        }

        let symbologies = &self.symbologies;
        let session = self
            .session
            .get_or_insert_with(|| CaptureSession::new(symbologies.clone()));
        if let Err(err) = session.start(camera, events) {
            self.session = None;
            self.subscription = None;
            self.attached = false;
            self.sink.disarm();
            return Err(err);
        }

        self.sink.arm();
        self.attached = true;
        Ok(())
    }

    /// Drop the observer and stop capture; safe to repeat or call first
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        if let Some(session) = self.session.as_mut() {
            session.stop();
        }
        self.sink.disarm();
        self.attached = false;
    }

    /// Detach and release the native session
    pub fn dispose(&mut self) {
        self.detach();
        if let Some(mut session) = self.session.take() {
            session.release();
        }
    }

    /// Whether attach succeeded and detach has not run since
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether a session object exists
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Whether frames are being delivered
    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_running())
    }

    /// Whether a format observer is registered
    pub fn is_observing(&self) -> bool {
        self.subscription.is_some()
    }

    /// The region mapper
    pub fn mapper(&self) -> &RegionMapper {
        &self.mapper
    }

    /// Remap and apply the rect of interest; `None` when stale, stopped or unmappable
    pub fn on_format_changed(&mut self, format: &CaptureFormat) -> Option<Rect> {
        if !self.attached {
            log::debug!("format change after detach ignored");
            return None;
        }
        let session = self
            .session
            .as_mut()
            .filter(|s| s.is_configured() && s.is_running())?;
        match self.mapper.on_format_changed(format) {
            Ok(rect) => {
                session.set_rect_of_interest(rect);
                Some(rect)
            }
            Err(err) => {
                log::warn!("rect of interest not updated: {err}");
                None
            }
        }
    }

    /// Feed a detection batch to the sink
    pub fn on_symbols(&mut self, batch: &[DetectedSymbol]) -> Option<DecodedSymbol> {
        if !self.attached {
            log::debug!("symbols after detach ignored");
            return None;
        }
        let session = self.session.as_mut()?;
        self.sink.accept(batch, session)
    }
}

impl Drop for SessionLifecycle {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Rotation, Size, VideoGravity};
    use crate::session::events::{EventQueue, ScanEvent};
    use crate::tools::sim::SimCamera;

    fn lifecycle() -> SessionLifecycle {
        let preview = Size::new(300.0, 600.0);
        let mapper = RegionMapper::new(
            Rect::from_size(preview),
            preview,
            VideoGravity::ResizeAspectFill,
        );
        SessionLifecycle::new(mapper, vec![Symbology::Qr])
    }

    #[test]
    fn test_detach_without_attach() {
        let mut lc = lifecycle();
        lc.detach();
        lc.detach();
        lc.dispose();
        assert!(!lc.is_attached());
        assert!(!lc.has_session());
    }

    #[test]
    fn test_attach_is_idempotent() {
        let queue = EventQueue::new();
        let mut camera = SimCamera::new();
        let mut lc = lifecycle();
        lc.attach(&mut camera, &queue.sender()).unwrap();
        lc.attach(&mut camera, &queue.sender()).unwrap();
        assert!(lc.is_running());
        assert_eq!(camera.state().start_calls, 1);
        assert_eq!(camera.state().sessions_created, 1);
        assert_eq!(camera.state().format_observers, 1);
    }

    #[test]
    fn test_detach_unsubscribes_and_stops() {
        let queue = EventQueue::new();
        let mut camera = SimCamera::new();
        let mut lc = lifecycle();
        lc.attach(&mut camera, &queue.sender()).unwrap();
        lc.detach();
        assert!(!lc.is_running());
        assert!(!lc.is_observing());
        assert_eq!(camera.state().format_observers, 0);
        assert!(!camera.emit_format(CaptureFormat::new(1920.0, 1080.0, Rotation::Deg90)));
    }

    #[test]
    fn test_stale_format_event_after_detach() {
        let queue = EventQueue::new();
        let mut camera = SimCamera::new();
        let mut lc = lifecycle();
        lc.attach(&mut camera, &queue.sender()).unwrap();
        assert!(camera.emit_format(CaptureFormat::new(1920.0, 1080.0, Rotation::Deg90)));
        lc.detach();

        let Some(ScanEvent::FormatChanged(format)) = queue.try_next() else {
            panic!("expected queued format change");
        };
        assert_eq!(lc.on_format_changed(&format), None);
        assert_eq!(lc.mapper().remap_count(), 0);
        assert!(camera.state().rects_of_interest.is_empty());
    }

    #[test]
    fn test_failed_attach_clears_session() {
        let queue = EventQueue::new();
        let mut camera = SimCamera::without_device();
        let mut lc = lifecycle();
        assert_eq!(
            lc.attach(&mut camera, &queue.sender()),
            Err(CaptureError::NoDevice)
        );
        assert!(!lc.has_session());
        assert!(!lc.is_observing());
        assert_eq!(camera.state().format_observers, 0);
    }

    #[test]
    fn test_dispose_releases_native_session() {
        let queue = EventQueue::new();
        let mut camera = SimCamera::new();
        let mut lc = lifecycle();
        lc.attach(&mut camera, &queue.sender()).unwrap();
        lc.dispose();
        assert!(!lc.has_session());
        assert_eq!(camera.state().live_sessions, 0);
        assert!(!camera.state().running);
    }

    #[test]
    fn test_format_change_after_hit_is_not_applied() {
        let queue = EventQueue::new();
        let mut camera = SimCamera::new();
        let mut lc = lifecycle();
        lc.attach(&mut camera, &queue.sender()).unwrap();
        let hit = lc.on_symbols(&[DetectedSymbol::new(Symbology::Qr, "hello")]);
        assert_eq!(hit.map(|h| h.text), Some("hello".to_string()));
        assert!(!lc.is_running());

        let format = CaptureFormat::new(1920.0, 1080.0, Rotation::Deg90);
        assert_eq!(lc.on_format_changed(&format), None);
        assert_eq!(lc.mapper().remap_count(), 0);
        assert!(camera.state().rects_of_interest.is_empty());
    }
}

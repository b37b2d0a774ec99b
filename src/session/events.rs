//! UI-affine event delivery
//!
//! Capture and permission callbacks fire on platform queues. They never
//! touch session state directly: they post a [`ScanEvent`] through an
//! [`EventSender`] and the owning view drains the [`EventQueue`] on its
//! own thread.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::models::{CaptureFormat, DetectedSymbol};

/// Everything the platform can tell a scan view
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// The one-shot camera permission request finished
    PermissionResolved {
        /// Whether access was granted
        granted: bool,
    },
    /// The input port format description changed
    FormatChanged(CaptureFormat),
    /// The metadata output reported a batch of symbols for one frame
    SymbolsDetected(Vec<DetectedSymbol>),
    /// The user tapped the settings deep-link button
    SettingsRequested,
    /// The contact editor finished (saved or cancelled)
    ContactEditorClosed,
}

/// Cloneable, thread-safe handle for posting events to a view
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<ScanEvent>,
}

impl EventSender {
    /// Post an event; returns false when the view is gone
    pub fn post(&self, event: ScanEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("dropping {:?}: scan view is gone", err.0);
                false
            }
        }
    }
}

/// Receiving side, owned by the view
#[derive(Debug)]
pub struct EventQueue {
    tx: Sender<ScanEvent>,
    rx: Receiver<ScanEvent>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// New sender for a platform callback
    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Next pending event without blocking
    pub fn try_next(&self) -> Option<ScanEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Discard everything pending; returns how many events were dropped
    pub fn clear(&self) -> usize {
        let mut dropped = 0;
        while self.try_next().is_some() {
            dropped += 1;
        }
        dropped
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot reply for an asynchronous permission prompt.
///
/// Resolving consumes the reply. A reply dropped without an answer counts
/// as a refusal so the gate never waits forever.
#[derive(Debug)]
pub struct PermissionReply {
    sender: Option<EventSender>,
}

impl PermissionReply {
    pub(crate) fn new(sender: EventSender) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// Deliver the user's answer
    pub fn resolve(mut self, granted: bool) {
        if let Some(sender) = self.sender.take() {
            sender.post(ScanEvent::PermissionResolved { granted });
        }
    }
}

impl Drop for PermissionReply {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.take() {
            log::warn!("permission reply dropped unanswered; treating as denied");
            sender.post(ScanEvent::PermissionResolved { granted: false });
        }
    }
}

/// Scoped registration; dropping it unregisters the observer
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap the platform's unregister action
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unregister now
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_post_and_drain_in_order() {
        let queue = EventQueue::new();
        let sender = queue.sender();
        assert!(sender.post(ScanEvent::SettingsRequested));
        assert!(sender.post(ScanEvent::ContactEditorClosed));
        assert_eq!(queue.try_next(), Some(ScanEvent::SettingsRequested));
        assert_eq!(queue.try_next(), Some(ScanEvent::ContactEditorClosed));
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn test_post_from_another_thread() {
        let queue = EventQueue::new();
        let sender = queue.sender();
        std::thread::spawn(move || {
            sender.post(ScanEvent::PermissionResolved { granted: true });
        })
        .join()
        .unwrap();
        assert_eq!(
            queue.try_next(),
            Some(ScanEvent::PermissionResolved { granted: true })
        );
    }

    #[test]
    fn test_dropped_reply_counts_as_denied() {
        let queue = EventQueue::new();
        drop(PermissionReply::new(queue.sender()));
        assert_eq!(
            queue.try_next(),
            Some(ScanEvent::PermissionResolved { granted: false })
        );
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn test_subscription_cancels_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let sub = Subscription::new(move || counter.set(counter.get() + 1));
        sub.cancel();
        assert_eq!(calls.get(), 1);

        let counter = calls.clone();
        drop(Subscription::new(move || counter.set(counter.get() + 1)));
        assert_eq!(calls.get(), 2);
    }
}

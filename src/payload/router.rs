use crate::error::ContactParseError;
use crate::models::ContactRecord;
use crate::payload::vcard::{contains_vcard, parse_vcard};

/// What the view should do with a decoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Present the native editor for a new contact
    OpenContactEditor(ContactRecord),
    /// Contact card could not be parsed; logged, not shown to the user
    ReportError(ContactParseError),
    /// Hand plain text to the result consumer
    DisplayRawResult(String),
}

/// Router state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterState {
    /// Waiting for a decode hit
    #[default]
    Idle,
    /// Classifying a payload
    Routing,
    /// The contact editor is on screen
    EditorOpen,
}

/// Classifies decoded text and decides where it goes
#[derive(Debug, Default)]
pub struct PayloadRouter {
    state: RouterState,
}

impl PayloadRouter {
    /// Idle router
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> RouterState {
        self.state
    }

    /// Whether a new payload may be routed
    pub fn is_idle(&self) -> bool {
        self.state == RouterState::Idle
    }

    /// Classify `text` and move to the matching state
    pub fn route(&mut self, text: &str) -> Action {
        self.state = RouterState::Routing;
        let action = if contains_vcard(text) {
            match parse_vcard(text) {
                Ok(record) => Action::OpenContactEditor(record),
                Err(err) => {
                    log::warn!("contact card rejected: {err}");
                    Action::ReportError(err)
                }
            }
        } else {
            Action::DisplayRawResult(text.to_string())
        };
        self.state = match action {
            Action::OpenContactEditor(_) => RouterState::EditorOpen,
            Action::ReportError(_) | Action::DisplayRawResult(_) => RouterState::Idle,
        };
        action
    }

    /// The editor was dismissed
    pub fn editor_closed(&mut self) {
        if self.state == RouterState::EditorOpen {
            self.state = RouterState::Idle;
        }
    }
}

/// Camera access state as seen by the permission gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// The user has not been asked yet
    #[default]
    Unknown,
    /// Access granted
    Authorized,
    /// Access refused or restricted; changes only through system settings
    Denied,
}

impl PermissionState {
    /// State after a one-shot request resolves
    pub fn from_grant(granted: bool) -> Self {
        if granted {
            PermissionState::Authorized
        } else {
            PermissionState::Denied
        }
    }
}

//! Scan configuration
//!
//! Defaults reproduce the stock scan view: aspect-fill preview, QR only, a
//! scan window covering the whole view. Environment variables are read
//! once per process; creation arguments passed by the host override both.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::ConfigError;
use crate::models::{Rect, Symbology, VideoGravity};

/// Gravity override, e.g. `fill`, `aspect`, `resize`
pub const ENV_VIDEO_GRAVITY: &str = "SCANNER_VIDEO_GRAVITY";
/// Scan window inset as a fraction of the shorter view side
pub const ENV_WINDOW_INSET: &str = "SCANNER_WINDOW_INSET";
/// Comma separated symbology allow-list
pub const ENV_SYMBOLOGIES: &str = "SCANNER_SYMBOLOGIES";

/// Creation argument key for the gravity override
pub const ARG_GRAVITY: &str = "gravity";
/// Creation argument key for the scan window inset
pub const ARG_WINDOW_INSET: &str = "scanWindowInset";

/// Opaque creation arguments handed over by the host when embedding the view
pub type CreationArgs = HashMap<String, String>;

fn parse_env_f32(name: &str) -> Option<f32> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
}

fn parse_env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

static ENV_GRAVITY: OnceLock<Option<String>> = OnceLock::new();

fn env_gravity() -> Option<&'static str> {
    ENV_GRAVITY
        .get_or_init(|| parse_env_string(ENV_VIDEO_GRAVITY))
        .as_deref()
}

static ENV_INSET: OnceLock<Option<f32>> = OnceLock::new();

fn env_window_inset() -> Option<f32> {
    *ENV_INSET.get_or_init(|| parse_env_f32(ENV_WINDOW_INSET))
}

static ENV_ALLOW_LIST: OnceLock<Option<String>> = OnceLock::new();

fn env_symbologies() -> Option<&'static str> {
    ENV_ALLOW_LIST
        .get_or_init(|| parse_env_string(ENV_SYMBOLOGIES))
        .as_deref()
}

/// Text of the static "not supported" notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeText {
    /// Alert title
    pub title: String,
    /// Alert body
    pub message: String,
    /// Dismiss button
    pub dismiss: String,
}

impl Default for NoticeText {
    fn default() -> Self {
        Self {
            title: "Scanning not supported".to_string(),
            message: "Your device does not support scanning a code from an item. \
                      Please use a device with a camera."
                .to_string(),
            dismiss: "OK".to_string(),
        }
    }
}

/// Settings for one scan view
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Preview scaling mode
    pub gravity: VideoGravity,
    /// Symbologies the metadata output reports
    pub symbologies: Vec<Symbology>,
    /// Inset of the scan window, as a fraction of the shorter view side (0.0 to 0.5)
    pub window_inset: f32,
    /// Unsupported-device notice
    pub notice: NoticeText,
    /// Label of the settings deep-link button
    pub settings_button_title: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            gravity: VideoGravity::ResizeAspectFill,
            symbologies: vec![Symbology::Qr],
            window_inset: 0.0,
            notice: NoticeText::default(),
            settings_button_title: "Go to Settings".to_string(),
        }
    }
}

impl ScanConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(gravity) = env_gravity() {
            config.gravity = parse_gravity(ENV_VIDEO_GRAVITY, gravity)?;
        }
        if let Some(inset) = env_window_inset() {
            config.window_inset = validate_inset(ENV_WINDOW_INSET, inset)?;
        }
        if let Some(list) = env_symbologies() {
            config.symbologies = parse_symbologies(list)?;
        }
        Ok(config)
    }

    /// Apply host creation arguments; unknown keys are ignored
    pub fn with_creation_args(mut self, args: &CreationArgs) -> Result<Self, ConfigError> {
        if let Some(gravity) = args.get(ARG_GRAVITY) {
            self.gravity = parse_gravity(ARG_GRAVITY, gravity)?;
        }
        if let Some(inset) = args.get(ARG_WINDOW_INSET) {
            let value = inset
                .trim()
                .parse::<f32>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: ARG_WINDOW_INSET.to_string(),
                    reason: e.to_string(),
                })?;
            self.window_inset = validate_inset(ARG_WINDOW_INSET, value)?;
        }
        Ok(self)
    }

    /// Scan window in UI coordinates for a view with the given bounds
    pub fn scan_window(&self, bounds: Rect) -> Rect {
        let inset = bounds.width.min(bounds.height) * self.window_inset;
        bounds.inset(inset, inset)
    }
}

fn parse_gravity(key: &str, value: &str) -> Result<VideoGravity, ConfigError> {
    value.parse().map_err(|reason| ConfigError::InvalidValue {
        key: key.to_string(),
        reason,
    })
}

fn validate_inset(key: &str, value: f32) -> Result<f32, ConfigError> {
    if !(0.0..0.5).contains(&value) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("{value} is outside 0.0..0.5"),
        });
    }
    Ok(value)
}

/// Parse a comma separated allow-list, dropping duplicates
pub fn parse_symbologies(list: &str) -> Result<Vec<Symbology>, ConfigError> {
    let mut out = Vec::new();
    for item in list.split(',').filter(|s| !s.trim().is_empty()) {
        let symbology = item
            .parse::<Symbology>()
            .map_err(|reason| ConfigError::InvalidValue {
                key: ENV_SYMBOLOGIES.to_string(),
                reason,
            })?;
        if !out.contains(&symbology) {
            out.push(symbology);
        }
    }
    if out.is_empty() {
        return Err(ConfigError::EmptyAllowList);
    }
    Ok(out)
}

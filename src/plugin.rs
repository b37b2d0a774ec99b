//! Method channel surface
//!
//! The host transport registers [`BarcodeScannerPlugin`] on
//! [`CHANNEL_NAME`] and routes method calls to [`BarcodeScannerPlugin::handle`];
//! platform views of type [`VIEW_TYPE`] are built by the plugin's factory.

use crate::view::ScanViewFactory;

/// Method channel name
pub const CHANNEL_NAME: &str = "barcode_scanner";
/// Platform view type identifier
pub const VIEW_TYPE: &str = "barcode_scanner/scan_view";
/// The one supported method
pub const GET_PLATFORM_VERSION: &str = "getPlatformVersion";

/// Reply to a method call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodResult {
    /// String result
    Success(String),
    /// Unknown method
    NotImplemented,
}

/// Operating system name and version reported to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    /// OS display name, e.g. `iOS`
    pub os_name: String,
    /// OS version string
    pub version: String,
}

impl PlatformInfo {
    /// Explicit name and version
    pub fn new(os_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            os_name: os_name.into(),
            version: version.into(),
        }
    }

    /// The compile target's OS with a host-supplied version
    pub fn current(version: impl Into<String>) -> Self {
        let os_name = match std::env::consts::OS {
            "ios" => "iOS",
            "android" => "Android",
            "macos" => "macOS",
            "linux" => "Linux",
            "windows" => "Windows",
            other => other,
        };
        Self::new(os_name, version)
    }

    /// `"<name> <version>"`
    pub fn identifier(&self) -> String {
        format!("{} {}", self.os_name, self.version)
    }
}

/// Plugin entry point
#[derive(Debug, Clone)]
pub struct BarcodeScannerPlugin {
    info: PlatformInfo,
    factory: ScanViewFactory,
}

impl BarcodeScannerPlugin {
    /// Plugin answering with `info` and building views with `factory`
    pub fn new(info: PlatformInfo, factory: ScanViewFactory) -> Self {
        Self { info, factory }
    }

    /// Answer a method call; stateless
    pub fn handle(&self, method: &str) -> MethodResult {
        match method {
            GET_PLATFORM_VERSION => MethodResult::Success(self.info.identifier()),
            other => {
                log::debug!("method '{other}' not implemented on {CHANNEL_NAME}");
                MethodResult::NotImplemented
            }
        }
    }

    /// Factory for views of type [`VIEW_TYPE`]
    pub fn view_factory(&self) -> &ScanViewFactory {
        &self.factory
    }
}

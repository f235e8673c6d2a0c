//! Presentation shell: three screens over the scan session
//!
//! Screens never mutate session state directly. Each gesture maps to a
//! session transition or a navigation, and each `view()` is a pure function
//! of the session plus the screen's pending notice.

/// Static result screen
pub mod detected;
/// Home screen
pub mod entry;
/// Live camera screen
pub mod live_camera;
/// Route stack
pub mod navigation;

pub use detected::{DetectedScreen, DetectedView};
pub use entry::{EntryScreen, EntryView, PickOutcome};
pub use live_camera::{CameraView, LiveCameraScreen};
pub use navigation::{Navigator, Route};

use crate::adapters::ImageScanAdapter;
use crate::capability::{
    CameraPermission, DecodeProvider, ImageNormalizer, ImagePicker, QrRenderer,
};
use crate::config::ScanConfig;
use crate::error::{Capability, ScanError};
use std::sync::Arc;

/// Dismissible user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    message: String,
}

impl Notice {
    /// Notice with a custom message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Text to display
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Any failed scan; no symbol and provider errors read the same
    pub fn scan_failed() -> Self {
        Self::new("Could not read a QR code. Please try again.")
    }

    /// Permission refused for `capability`
    pub fn permission_denied(capability: Capability) -> Self {
        match capability {
            Capability::Camera => Self::new("Camera permission is needed to scan QR codes."),
            Capability::MediaLibrary => {
                Self::new("Photo library permission is needed to pick an image.")
            }
        }
    }

    /// Picker itself failed
    pub fn picker_failed() -> Self {
        Self::new("Error selecting image.")
    }
}

/// Every platform capability the screens need
#[derive(Clone)]
pub struct Capabilities {
    /// Decode engine
    pub decoder: Arc<dyn DecodeProvider>,
    /// Gallery picker
    pub picker: Arc<dyn ImagePicker>,
    /// Image re-encoder
    pub normalizer: Arc<dyn ImageNormalizer>,
    /// Camera permission
    pub camera: Arc<dyn CameraPermission>,
    /// QR generator
    pub renderer: Arc<dyn QrRenderer>,
}

/// Screen factory plus the navigation stack
pub struct ScannerApp {
    capabilities: Capabilities,
    config: ScanConfig,
    navigator: Navigator,
}

impl ScannerApp {
    /// App at the home route
    pub fn new(capabilities: Capabilities, config: ScanConfig) -> Self {
        Self {
            capabilities,
            config,
            navigator: Navigator::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Navigation stack
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Navigation stack, for gesture handlers
    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    /// Entry screen with a fresh session
    pub fn entry_screen(&self) -> EntryScreen {
        let adapter = ImageScanAdapter::new(
            Arc::clone(&self.capabilities.normalizer),
            Arc::clone(&self.capabilities.decoder),
        )
        .with_options(self.config.normalize)
        .with_symbol_types(self.config.symbol_types.clone());
        EntryScreen::new(Arc::clone(&self.capabilities.picker), adapter)
    }

    /// Live-camera screen with a fresh session
    pub fn live_camera_screen(&self) -> LiveCameraScreen {
        LiveCameraScreen::new(
            Arc::clone(&self.capabilities.decoder),
            Arc::clone(&self.capabilities.camera),
        )
    }

    /// Result screen for the current route, `None` unless it is `Detected`
    pub fn detected_screen(&self) -> Result<Option<DetectedScreen>, ScanError> {
        match self.navigator.current() {
            Route::Detected { qr_data } => DetectedScreen::open(
                qr_data.clone(),
                self.capabilities.renderer.as_ref(),
                self.config.render_size,
            )
            .map(Some),
            _ => Ok(None),
        }
    }
}

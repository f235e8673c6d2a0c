//! Platform capabilities consumed by the scan core
//!
//! Camera, media library, decode engine, image manipulation and QR rendering
//! are all injected through these traits. Desktop implementations live in
//! [`crate::providers`]; tests substitute fakes.

use crate::error::ScanError;
use crate::models::{ImageHandle, NormalizeOptions, PickedImage, RawSymbol, SymbolType};
use crate::providers::renderer::RenderedSymbol;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Answer to a permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Access allowed
    Granted,
    /// Access refused
    Denied,
}

impl PermissionStatus {
    /// True if granted
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Callback invoked by a streaming decode provider, once per decoded symbol
pub type ResultCallback = Arc<dyn Fn(RawSymbol) + Send + Sync>;

#[derive(Debug, Default)]
struct StreamFlags {
    stopped: AtomicBool,
    finished: AtomicBool,
}

/// Keeps a live decode stream running. Dropping it asks the provider to stop.
///
/// Stopping is advisory: a provider may deliver a few more callbacks, and the
/// live adapter drops those itself.
#[derive(Debug)]
pub struct StreamGuard {
    flags: Arc<StreamFlags>,
}

/// Provider side of a [`StreamGuard`]
#[derive(Debug, Clone)]
pub struct StreamControl {
    flags: Arc<StreamFlags>,
}

impl StreamGuard {
    /// New guard plus the control the provider keeps
    pub fn pair() -> (Self, StreamControl) {
        let flags = Arc::new(StreamFlags::default());
        let control = StreamControl {
            flags: Arc::clone(&flags),
        };
        (Self { flags }, control)
    }

    /// Ask the provider to stop emitting
    pub fn stop(&self) {
        self.flags.stopped.store(true, Ordering::Release);
    }

    /// True once the provider has no more frames
    pub fn is_finished(&self) -> bool {
        self.flags.finished.load(Ordering::Acquire)
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.stop();
    }
}

impl StreamControl {
    /// True once the consumer stopped the stream
    pub fn is_stopped(&self) -> bool {
        self.flags.stopped.load(Ordering::Acquire)
    }

    /// Mark the stream as exhausted
    pub fn finish(&self) {
        self.flags.finished.store(true, Ordering::Release);
    }
}

/// Decode engine: live frame stream and still images
#[async_trait]
pub trait DecodeProvider: Send + Sync {
    /// Begin delivering decoded symbols from the camera to `on_result`.
    ///
    /// The provider may keep emitting after a match, at its own cadence.
    fn scan_stream(&self, on_result: ResultCallback) -> Result<StreamGuard, ScanError>;

    /// Decode a still image, keeping only the requested symbologies
    async fn scan_image(
        &self,
        image: &ImageHandle,
        symbol_types: &[SymbolType],
    ) -> Result<Vec<RawSymbol>, ScanError>;
}

/// Gallery picker
#[async_trait]
pub trait ImagePicker: Send + Sync {
    /// Prompt for media-library access
    async fn request_media_permission(&self) -> Result<PermissionStatus, ScanError>;

    /// Let the user choose an image; `None` if they cancelled
    async fn pick_image(&self) -> Result<Option<PickedImage>, ScanError>;
}

/// Re-encodes an image to a canonical format
#[async_trait]
pub trait ImageNormalizer: Send + Sync {
    /// Produce a new handle holding the normalized image
    async fn normalize(
        &self,
        image: &ImageHandle,
        options: &NormalizeOptions,
    ) -> Result<ImageHandle, ScanError>;
}

/// Camera permission
#[async_trait]
pub trait CameraPermission: Send + Sync {
    /// Current status without prompting; `None` while undetermined
    fn status(&self) -> Option<PermissionStatus>;

    /// Prompt the user
    async fn request_permission(&self) -> Result<PermissionStatus, ScanError>;
}

/// Stateless QR generator
pub trait QrRenderer: Send + Sync {
    /// Render `text` as a QR symbol at most `size` pixels wide when possible
    fn render(&self, text: &str, size: u32) -> Result<RenderedSymbol, ScanError>;
}

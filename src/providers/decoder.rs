//! Desktop decode provider backed by `rqrr`

use crate::capability::{DecodeProvider, ResultCallback, StreamControl, StreamGuard};
use crate::error::ScanError;
use crate::models::{ImageHandle, RawSymbol, SymbolType};
use crate::providers::frames::FrameSource;
use crate::utils::grayscale::image_to_grayscale;
use async_trait::async_trait;
use image::DynamicImage;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Default delay between camera frames
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Longest wait for a stopped stream to hand the camera back
const RELEASE_TIMEOUT: Duration = Duration::from_secs(2);

/// Stop-flag polling period while idling between frames
const STOP_POLL: Duration = Duration::from_millis(5);

#[derive(Default)]
struct CameraState {
    source: Option<Box<dyn FrameSource>>,
    active: Option<StreamControl>,
}

/// Frame source shared with the camera thread; `released` fires when it comes back
#[derive(Default)]
struct CameraSlot {
    state: Mutex<CameraState>,
    released: Condvar,
}

impl CameraSlot {
    fn lock(&self) -> MutexGuard<'_, CameraState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the source, waiting out a stream that was stopped but has not exited yet
    fn acquire(&self) -> Option<Box<dyn FrameSource>> {
        let mut state = self.lock();
        let releasing = state.source.is_none()
            && state.active.as_ref().is_some_and(StreamControl::is_stopped);
        if releasing {
            trace!("waiting for previous camera stream to release");
            let (guard, wait) = self
                .released
                .wait_timeout_while(state, RELEASE_TIMEOUT, |s| s.source.is_none())
                .unwrap_or_else(PoisonError::into_inner);
            if wait.timed_out() {
                warn!(timeout = ?RELEASE_TIMEOUT, "camera not released in time");
            }
            state = guard;
        }
        state.source.take()
    }

    fn release(&self, source: Box<dyn FrameSource>) {
        self.lock().source = Some(source);
        self.released.notify_all();
    }
}

/// Decode QR symbols from a luma plane
///
/// # Arguments
/// * `luma` - Grayscale bytes (1 byte per pixel)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// Every grid that decoded, in detection order
pub fn decode_luma(luma: &[u8], width: usize, height: usize) -> Vec<RawSymbol> {
    if width == 0 || height == 0 || luma.len() < width * height {
        return Vec::new();
    }

    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| luma[y * width + x]);
    let grids = prepared.detect_grids();
    trace!(grids = grids.len(), width, height, "detected candidate grids");

    grids
        .into_iter()
        .filter_map(|grid| match grid.decode() {
            Ok((_meta, content)) => Some(RawSymbol::qr(content)),
            Err(err) => {
                trace!(%err, "grid failed to decode");
                None
            }
        })
        .collect()
}

/// Decode QR symbols from a decoded image
pub fn decode_image(image: &DynamicImage) -> Vec<RawSymbol> {
    let (luma, width, height) = image_to_grayscale(image);
    decode_luma(&luma, width, height)
}

/// Decode provider for desktop use.
///
/// Still images are decoded on the blocking pool. Live scanning needs a
/// [`FrameSource`] standing in for the camera; frames are pulled on a
/// dedicated thread at a fixed interval.
pub struct QrDecoder {
    camera: Arc<CameraSlot>,
    frame_interval: Duration,
}

impl QrDecoder {
    /// Provider without a camera; `scan_stream` fails
    pub fn new() -> Self {
        Self {
            camera: Arc::new(CameraSlot::default()),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }

    /// Provider streaming from `source`
    pub fn with_camera(source: impl FrameSource + 'static, frame_interval: Duration) -> Self {
        Self {
            camera: Arc::new(CameraSlot {
                state: Mutex::new(CameraState {
                    source: Some(Box::new(source)),
                    active: None,
                }),
                released: Condvar::new(),
            }),
            frame_interval,
        }
    }
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecodeProvider for QrDecoder {
    fn scan_stream(&self, on_result: ResultCallback) -> Result<StreamGuard, ScanError> {
        let source = self
            .camera
            .acquire()
            .ok_or_else(|| ScanError::provider("camera unavailable or already streaming"))?;

        let (guard, control) = StreamGuard::pair();
        self.camera.lock().active = Some(control.clone());
        let slot = Arc::clone(&self.camera);
        let interval = self.frame_interval;
        thread::Builder::new()
            .name("qr-camera".to_string())
            .spawn(move || run_camera(source, slot, control, on_result, interval))?;
        debug!(?interval, "camera stream started");
        Ok(guard)
    }

    async fn scan_image(
        &self,
        image: &ImageHandle,
        symbol_types: &[SymbolType],
    ) -> Result<Vec<RawSymbol>, ScanError> {
        if !symbol_types.contains(&SymbolType::Qr) {
            debug!(?symbol_types, "no supported symbology requested");
            return Ok(Vec::new());
        }
        let image = image.clone();
        let symbols = tokio::task::spawn_blocking(move || {
            let decoded = image.load()?;
            Ok::<_, ScanError>(decode_image(&decoded))
        })
        .await??;
        debug!(found = symbols.len(), "still image decoded");
        Ok(symbols)
    }
}

fn run_camera(
    mut source: Box<dyn FrameSource>,
    slot: Arc<CameraSlot>,
    control: StreamControl,
    on_result: ResultCallback,
    interval: Duration,
) {
    let mut frames = 0usize;
    while !control.is_stopped() {
        let Some(frame) = source.next_frame() else {
            debug!(frames, "camera out of frames");
            break;
        };
        frames += 1;
        match frame {
            Ok(frame) => {
                for symbol in decode_image(&frame) {
                    trace!(frame = frames, "symbol in frame");
                    on_result(symbol);
                }
            }
            Err(err) => warn!(%err, frame = frames, "skipping unreadable frame"),
        }
        idle(&control, interval);
    }

    // Hand the camera back so the next scan can stream again.
    slot.release(source);
    control.finish();
}

/// Sleep for `interval`, returning early once the stream is stopped
fn idle(control: &StreamControl, interval: Duration) {
    let deadline = Instant::now() + interval;
    while !control.is_stopped() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(STOP_POLL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::frames::MemoryFrames;

    #[test]
    fn test_decode_empty() {
        // Blank 10x10 plane
        assert!(decode_luma(&[255u8; 100], 10, 10).is_empty());
        assert!(decode_luma(&[], 0, 0).is_empty());
        // Buffer too small for the claimed size
        assert!(decode_luma(&[0u8; 10], 10, 10).is_empty());
    }

    #[test]
    fn test_stream_without_camera_fails() {
        let decoder = QrDecoder::new();
        let callback: ResultCallback = Arc::new(|_| {});
        assert!(matches!(
            decoder.scan_stream(callback),
            Err(ScanError::Provider(_))
        ));
    }

    fn blank_camera(frames: usize, interval: Duration) -> QrDecoder {
        let frames = MemoryFrames::new((0..frames).map(|_| DynamicImage::new_luma8(32, 32)));
        QrDecoder::with_camera(frames, interval)
    }

    #[test]
    fn test_restream_right_after_stop() {
        let decoder = blank_camera(50, Duration::from_millis(100));
        let callback: ResultCallback = Arc::new(|_| {});

        let first = decoder.scan_stream(Arc::clone(&callback)).unwrap();
        thread::sleep(Duration::from_millis(20));
        drop(first);

        let second = decoder.scan_stream(callback).unwrap();
        assert!(!second.is_finished());
    }

    #[test]
    fn test_second_live_stream_rejected() {
        let decoder = blank_camera(50, Duration::from_millis(100));
        let _first = decoder.scan_stream(Arc::new(|_| {})).unwrap();
        let started = Instant::now();
        assert!(matches!(
            decoder.scan_stream(Arc::new(|_| {})),
            Err(ScanError::Provider(_))
        ));
        // A running stream is not waited on
        assert!(started.elapsed() < RELEASE_TIMEOUT);
    }

    #[tokio::test]
    async fn test_scan_image_skips_unsupported_types() {
        let decoder = QrDecoder::new();
        // Never loaded: the filter short-circuits first
        let handle = ImageHandle::from_bytes(vec![0u8; 4]);
        let symbols = decoder
            .scan_image(&handle, &[SymbolType::Other("ean13".into())])
            .await
            .unwrap();
        assert!(symbols.is_empty());
    }

    #[tokio::test]
    async fn test_scan_image_reports_unreadable_input() {
        let decoder = QrDecoder::new();
        let handle = ImageHandle::from_bytes(vec![0u8; 4]);
        let err = decoder.scan_image(&handle, &[SymbolType::Qr]).await.unwrap_err();
        assert!(matches!(err, ScanError::Image(_)));
    }
}

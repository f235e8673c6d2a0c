//! Scripted capability fakes shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use qr_scan::models::{ImageHandle, NormalizeOptions, PickedImage, RawSymbol, SymbolType};
use qr_scan::providers::QrCodeRenderer;
use qr_scan::{
    CameraPermission, Capabilities, DecodeProvider, ImageNormalizer, ImagePicker,
    PermissionStatus, ResultCallback, ScanConfig, ScanError, ScannerApp, SessionHandle,
    SessionState, StreamControl, StreamGuard,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Decoder returning a scripted still-image answer and capturing the live callback
#[derive(Default)]
pub struct FakeDecoder {
    still: Mutex<Option<Result<Vec<RawSymbol>, ScanError>>>,
    callback: Mutex<Option<ResultCallback>>,
    control: Mutex<Option<StreamControl>>,
    pub stream_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub fail_stream: bool,
}

impl FakeDecoder {
    pub fn returning(symbols: Vec<RawSymbol>) -> Self {
        let decoder = Self::default();
        *decoder.still.lock().unwrap() = Some(Ok(symbols));
        decoder
    }

    pub fn failing(message: &str) -> Self {
        let decoder = Self::default();
        *decoder.still.lock().unwrap() = Some(Err(ScanError::provider(message)));
        decoder
    }

    pub fn broken_camera() -> Self {
        Self {
            fail_stream: true,
            ..Self::default()
        }
    }

    /// Deliver a symbol the way the camera would
    pub fn emit(&self, symbol: RawSymbol) {
        let callback = self
            .callback
            .lock()
            .unwrap()
            .clone()
            .expect("scan_stream was not called");
        callback(symbol);
    }

    pub fn stream_stopped(&self) -> bool {
        self.control
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(StreamControl::is_stopped)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecodeProvider for FakeDecoder {
    fn scan_stream(&self, on_result: ResultCallback) -> Result<StreamGuard, ScanError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stream {
            return Err(ScanError::provider("camera busy"));
        }
        *self.callback.lock().unwrap() = Some(on_result);
        let (guard, control) = StreamGuard::pair();
        *self.control.lock().unwrap() = Some(control);
        Ok(guard)
    }

    async fn scan_image(
        &self,
        _image: &ImageHandle,
        _symbol_types: &[SymbolType],
    ) -> Result<Vec<RawSymbol>, ScanError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        match self.still.lock().unwrap().take() {
            Some(answer) => answer,
            None => Ok(Vec::new()),
        }
    }
}

/// Normalizer that passes the handle through and records the session state it saw
pub struct FakeNormalizer {
    session: Mutex<Option<SessionHandle>>,
    pub seen: Mutex<Vec<SessionState>>,
    pub fail: bool,
}

impl FakeNormalizer {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn observe(&self, session: &SessionHandle) {
        *self.session.lock().unwrap() = Some(session.clone());
    }
}

#[async_trait]
impl ImageNormalizer for FakeNormalizer {
    async fn normalize(
        &self,
        image: &ImageHandle,
        _options: &NormalizeOptions,
    ) -> Result<ImageHandle, ScanError> {
        if let Some(session) = self.session.lock().unwrap().as_ref() {
            self.seen.lock().unwrap().push(session.snapshot());
        }
        if self.fail {
            return Err(ScanError::provider("cannot re-encode"));
        }
        Ok(image.clone())
    }
}

/// Picker with a scripted permission answer and selection
pub struct FakePicker {
    pub permission: PermissionStatus,
    pub selection: Option<PickedImage>,
    pub fail: bool,
    pub picks: AtomicUsize,
}

impl FakePicker {
    pub fn selecting(bytes: &[u8]) -> Self {
        Self {
            permission: PermissionStatus::Granted,
            selection: Some(PickedImage::new(ImageHandle::from_bytes(bytes.to_vec()))),
            fail: false,
            picks: AtomicUsize::new(0),
        }
    }

    pub fn cancelling() -> Self {
        Self {
            selection: None,
            ..Self::selecting(b"")
        }
    }

    pub fn denied() -> Self {
        Self {
            permission: PermissionStatus::Denied,
            ..Self::selecting(b"img")
        }
    }

    pub fn broken() -> Self {
        Self {
            fail: true,
            ..Self::selecting(b"img")
        }
    }
}

#[async_trait]
impl ImagePicker for FakePicker {
    async fn request_media_permission(&self) -> Result<PermissionStatus, ScanError> {
        Ok(self.permission)
    }

    async fn pick_image(&self) -> Result<Option<PickedImage>, ScanError> {
        self.picks.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ScanError::provider("picker crashed"));
        }
        Ok(self.selection.clone())
    }
}

/// Camera permission with a current status and a scripted prompt answer
pub struct FakeCamera {
    status: Mutex<Option<PermissionStatus>>,
    answer: PermissionStatus,
    pub requests: AtomicUsize,
}

impl FakeCamera {
    pub fn undetermined(answer: PermissionStatus) -> Self {
        Self {
            status: Mutex::new(None),
            answer,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn with_status(status: PermissionStatus) -> Self {
        Self {
            status: Mutex::new(Some(status)),
            answer: status,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraPermission for FakeCamera {
    fn status(&self) -> Option<PermissionStatus> {
        *self.status.lock().unwrap()
    }

    async fn request_permission(&self) -> Result<PermissionStatus, ScanError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.status.lock().unwrap() = Some(self.answer);
        Ok(self.answer)
    }
}

/// App wired to fakes, with handles kept for assertions
pub struct Harness {
    pub decoder: Arc<FakeDecoder>,
    pub picker: Arc<FakePicker>,
    pub normalizer: Arc<FakeNormalizer>,
    pub camera: Arc<FakeCamera>,
    pub app: ScannerApp,
}

impl Harness {
    pub fn new(decoder: FakeDecoder, picker: FakePicker, camera: FakeCamera) -> Self {
        Self::with_normalizer(decoder, picker, FakeNormalizer::new(), camera)
    }

    pub fn with_normalizer(
        decoder: FakeDecoder,
        picker: FakePicker,
        normalizer: FakeNormalizer,
        camera: FakeCamera,
    ) -> Self {
        let decoder = Arc::new(decoder);
        let picker = Arc::new(picker);
        let normalizer = Arc::new(normalizer);
        let camera = Arc::new(camera);
        let caps = Capabilities {
            decoder: decoder.clone(),
            picker: picker.clone(),
            normalizer: normalizer.clone(),
            camera: camera.clone(),
            renderer: Arc::new(QrCodeRenderer::new()),
        };
        Self {
            decoder,
            picker,
            normalizer,
            camera,
            app: ScannerApp::new(caps, ScanConfig::default()),
        }
    }
}

pub fn resolved_payload(state: &SessionState) -> Option<&str> {
    match state {
        SessionState::Resolved(result) => Some(result.payload()),
        _ => None,
    }
}

use super::navigation::{Navigator, Route};
use super::Notice;
use crate::adapters::LiveScanAdapter;
use crate::capability::{CameraPermission, DecodeProvider, PermissionStatus};
use crate::error::{Capability, FailureReason};
use crate::session::{SessionHandle, SessionState};
use std::sync::Arc;
use tracing::{debug, warn};

/// What the camera screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraView {
    /// Screen not opened yet; permission status unread
    Pending,
    /// "Grant permission" affordance while not granted, with the denial notice if one is pending
    PermissionRequired {
        /// Denial notice from the last prompt
        notice: Option<Notice>,
    },
    /// Viewfinder with the scan frame
    Scanning,
    /// Result overlay with "scan again"
    Detected {
        /// Symbology name
        symbol_type: String,
        /// Decoded text
        payload: String,
    },
    /// Dismissible notice
    Notice(Notice),
}

/// Live camera screen
pub struct LiveCameraScreen {
    session: SessionHandle,
    decoder: Arc<dyn DecodeProvider>,
    camera: Arc<dyn CameraPermission>,
    adapter: Option<LiveScanAdapter>,
    notice: Option<Notice>,
    opened: bool,
}

impl LiveCameraScreen {
    /// Screen with an idle session; nothing runs until [`LiveCameraScreen::open`]
    pub fn new(decoder: Arc<dyn DecodeProvider>, camera: Arc<dyn CameraPermission>) -> Self {
        Self {
            session: SessionHandle::new(),
            decoder,
            camera,
            adapter: None,
            notice: None,
            opened: false,
        }
    }

    /// The screen's scan session
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Screen appears: start scanning if the camera is already granted.
    /// Never prompts.
    pub fn open(&mut self) -> CameraView {
        self.opened = true;
        if self.camera.status() == Some(PermissionStatus::Granted) {
            self.activate();
        }
        self.view()
    }

    /// "Grant permission": the only gesture that prompts
    pub async fn grant_permission(&mut self) -> CameraView {
        self.opened = true;
        match self.camera.request_permission().await {
            Ok(PermissionStatus::Granted) => {
                self.notice = None;
                self.activate();
            }
            Ok(PermissionStatus::Denied) => {
                debug!("camera permission denied");
                self.notice = Some(Notice::permission_denied(Capability::Camera));
            }
            Err(err) => {
                warn!(%err, "camera permission request failed");
                self.notice = Some(Notice::permission_denied(Capability::Camera));
            }
        }
        self.view()
    }

    fn activate(&mut self) {
        if self.adapter.is_some() {
            return;
        }
        self.session.start();
        match LiveScanAdapter::attach(self.session.clone(), self.decoder.as_ref()) {
            Ok(adapter) => self.adapter = Some(adapter),
            Err(err) => {
                warn!(%err, "camera stream unavailable");
                self.session.on_failure(FailureReason::ProviderError);
            }
        }
    }

    /// Current view
    pub fn view(&self) -> CameraView {
        let state = self.session.snapshot();
        if let SessionState::Failed(_) = state {
            return CameraView::Notice(Notice::scan_failed());
        }
        if self.adapter.is_none() {
            let granted = self.camera.status() == Some(PermissionStatus::Granted);
            return if self.opened && (!granted || self.notice.is_some()) {
                CameraView::PermissionRequired {
                    notice: self.notice.clone(),
                }
            } else {
                CameraView::Pending
            };
        }
        match state {
            SessionState::Resolved(result) => CameraView::Detected {
                symbol_type: result.symbol_type().to_string(),
                payload: result.into_payload(),
            },
            _ => CameraView::Scanning,
        }
    }

    /// "Scan again" (also "close" on the result overlay)
    pub fn scan_again(&mut self) {
        self.session.reset();
        if self.adapter.is_some() {
            self.session.start();
        } else if self.camera.status() == Some(PermissionStatus::Granted) {
            self.activate();
        }
    }

    /// Dismiss a notice; a failed session goes back to idle
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
        self.session.reset();
    }

    /// "Show as QR" on a result; false if nothing is resolved
    pub fn show_as_qr(&self, navigator: &mut Navigator) -> bool {
        match self.session.snapshot() {
            SessionState::Resolved(result) => {
                navigator.navigate(Route::Detected {
                    qr_data: result.into_payload(),
                });
                true
            }
            _ => false,
        }
    }

    /// True once the camera has no more frames to offer
    pub fn stream_finished(&self) -> bool {
        self.adapter
            .as_ref()
            .is_none_or(LiveScanAdapter::stream_finished)
    }

    /// Leave the screen: stop forwarding results and go back
    pub fn leave(&mut self, navigator: &mut Navigator) {
        if let Some(mut adapter) = self.adapter.take() {
            adapter.detach();
        }
        self.session.reset();
        self.opened = false;
        navigator.go_back();
    }
}

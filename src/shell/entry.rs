use super::navigation::{Navigator, Route};
use super::Notice;
use crate::adapters::ImageScanAdapter;
use crate::capability::{ImagePicker, PermissionStatus};
use crate::error::Capability;
use crate::session::{SessionHandle, SessionState};
use std::sync::Arc;
use tracing::{debug, warn};

/// What the entry screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryView {
    /// "Scan with camera" and "Upload QR image"
    Menu,
    /// Reading the picked image
    Busy,
    /// Decoded payload with a close action
    Result {
        /// Decoded text
        payload: String,
    },
    /// Dismissible notice
    Notice(Notice),
}

/// How a pick gesture ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// Image went through normalize and decode; see the session for the result
    Scanned,
    /// Picker dismissed without a selection
    Cancelled,
    /// Media library permission refused
    PermissionDenied,
    /// Picker failed before an image was chosen
    PickerFailed,
    /// A scan was already shown or in progress
    Busy,
}

/// Home screen: start a live scan or scan a picked image
pub struct EntryScreen {
    session: SessionHandle,
    picker: Arc<dyn ImagePicker>,
    adapter: ImageScanAdapter,
    notice: Option<Notice>,
}

impl EntryScreen {
    /// Screen with an idle session
    pub fn new(picker: Arc<dyn ImagePicker>, adapter: ImageScanAdapter) -> Self {
        Self {
            session: SessionHandle::new(),
            picker,
            adapter,
            notice: None,
        }
    }

    /// The screen's scan session
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Current view
    pub fn view(&self) -> EntryView {
        if let Some(notice) = &self.notice {
            return EntryView::Notice(notice.clone());
        }
        match self.session.snapshot() {
            SessionState::Idle => EntryView::Menu,
            SessionState::Awaiting => EntryView::Busy,
            SessionState::Resolved(result) => EntryView::Result {
                payload: result.into_payload(),
            },
            SessionState::Failed(_) => EntryView::Notice(Notice::scan_failed()),
        }
    }

    /// "Scan with camera"
    pub fn start_live_scan(&self, navigator: &mut Navigator) {
        navigator.navigate(Route::Scanner);
    }

    /// "Upload QR image": permission, picker, then normalize and decode
    pub async fn pick_image(&mut self) -> PickOutcome {
        if self.notice.is_some() || !self.session.is_idle() {
            return PickOutcome::Busy;
        }

        match self.picker.request_media_permission().await {
            Ok(PermissionStatus::Granted) => {}
            Ok(PermissionStatus::Denied) => {
                self.notice = Some(Notice::permission_denied(Capability::MediaLibrary));
                return PickOutcome::PermissionDenied;
            }
            Err(err) => {
                warn!(%err, "media permission request failed");
                self.notice = Some(Notice::picker_failed());
                return PickOutcome::PickerFailed;
            }
        }

        let picked = match self.picker.pick_image().await {
            Ok(Some(picked)) => picked,
            Ok(None) => {
                debug!("image pick cancelled");
                return PickOutcome::Cancelled;
            }
            Err(err) => {
                warn!(%err, "image picker failed");
                self.notice = Some(Notice::picker_failed());
                return PickOutcome::PickerFailed;
            }
        };

        if self.adapter.scan(&self.session, picked).await.is_applied() {
            PickOutcome::Scanned
        } else {
            PickOutcome::Busy
        }
    }

    /// "Close" on the result or a notice; back to the menu
    pub fn close(&mut self) {
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
}

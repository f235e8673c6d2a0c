use crate::capability::{DecodeProvider, ResultCallback, StreamGuard};
use crate::error::ScanError;
use crate::models::RawSymbol;
use crate::session::{SessionHandle, Transition};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Forwards streaming decode results into a session.
///
/// Only the first non-empty result per `Awaiting` period reaches the session;
/// everything after it is dropped here, whatever the provider keeps emitting.
/// A failed frame is not an event: the next frame is simply awaited.
pub struct LiveScanAdapter {
    attached: Arc<AtomicBool>,
    guard: Option<StreamGuard>,
}

impl LiveScanAdapter {
    /// Subscribe to `provider` on behalf of `session`
    pub fn attach(session: SessionHandle, provider: &dyn DecodeProvider) -> Result<Self, ScanError> {
        let attached = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&attached);
        let callback: ResultCallback = Arc::new(move |symbol| {
            forward(&session, &flag, symbol);
        });
        let guard = provider.scan_stream(callback)?;
        debug!("live scan attached");
        Ok(Self {
            attached,
            guard: Some(guard),
        })
    }

    /// True until [`LiveScanAdapter::detach`]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// True once the provider ran out of frames
    pub fn stream_finished(&self) -> bool {
        self.guard.as_ref().is_none_or(StreamGuard::is_finished)
    }

    /// Stop forwarding and release the stream
    pub fn detach(&mut self) {
        if self.attached.swap(false, Ordering::AcqRel) {
            debug!("live scan detached");
        }
        self.guard = None;
    }
}

impl Drop for LiveScanAdapter {
    fn drop(&mut self) {
        self.detach();
    }
}

fn forward(session: &SessionHandle, attached: &AtomicBool, symbol: RawSymbol) -> Transition {
    if !attached.load(Ordering::Acquire) {
        trace!("callback after detach dropped");
        return Transition::Ignored;
    }
    let Some(result) = symbol.into_result() else {
        trace!("empty payload skipped");
        return Transition::Ignored;
    };
    session.on_decoded(result)
}

//! One-shot scan session state machine
//!
//! ```text
//! Idle --start--> Awaiting --on_decoded--> Resolved(result)
//!                          --on_failure--> Failed(reason)
//! Resolved | Failed --reset--> Idle
//! ```
//!
//! Every other call is an explicit no-op reported as [`Transition::Ignored`].
//! That makes `start` the only mutual exclusion between acquisition paths, and
//! it makes late results after a match harmless.

use crate::error::FailureReason;
use crate::models::ScanResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Current state of a scan session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No scan in progress
    #[default]
    Idle,
    /// Exactly one adapter owns the next transition
    Awaiting,
    /// First result latched
    Resolved(ScanResult),
    /// Scan ended without a result
    Failed(FailureReason),
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Awaiting => "awaiting",
            SessionState::Resolved(_) => "resolved",
            SessionState::Failed(_) => "failed",
        }
    }
}

/// Outcome of a transition call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed
    Applied,
    /// Call was not valid in the current state; nothing changed
    Ignored,
}

impl Transition {
    /// True if the state changed
    pub fn is_applied(self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// One user-initiated scan attempt, reusable through [`ScanSession::reset`]
#[derive(Debug, Default)]
pub struct ScanSession {
    state: SessionState,
    scans_started: u64,
}

impl ScanSession {
    /// New idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// True while idle
    pub fn is_idle(&self) -> bool {
        matches!(self.state, SessionState::Idle)
    }

    /// True while a result is pending
    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, SessionState::Awaiting)
    }

    /// Latched result, if resolved
    pub fn result(&self) -> Option<&ScanResult> {
        match &self.state {
            SessionState::Resolved(result) => Some(result),
            _ => None,
        }
    }

    /// Failure reason, if failed
    pub fn failure(&self) -> Option<FailureReason> {
        match self.state {
            SessionState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Number of `Idle -> Awaiting` transitions so far
    pub fn scans_started(&self) -> u64 {
        self.scans_started
    }

    /// `Idle -> Awaiting`
    pub fn start(&mut self) -> Transition {
        if !self.is_idle() {
            trace!(state = self.state.name(), "start ignored");
            return Transition::Ignored;
        }
        self.state = SessionState::Awaiting;
        self.scans_started += 1;
        debug!(scan = self.scans_started, "scan session awaiting");
        Transition::Applied
    }

    /// `Awaiting -> Resolved(result)`; dropped in any other state
    pub fn on_decoded(&mut self, result: ScanResult) -> Transition {
        if !self.is_awaiting() {
            trace!(state = self.state.name(), %result, "decoded result dropped");
            return Transition::Ignored;
        }
        debug!(symbol_type = %result.symbol_type(), "scan session resolved");
        self.state = SessionState::Resolved(result);
        Transition::Applied
    }

    /// `Awaiting -> Failed(reason)`; dropped in any other state
    pub fn on_failure(&mut self, reason: FailureReason) -> Transition {
        if !self.is_awaiting() {
            trace!(state = self.state.name(), %reason, "failure dropped");
            return Transition::Ignored;
        }
        debug!(%reason, "scan session failed");
        self.state = SessionState::Failed(reason);
        Transition::Applied
    }

    /// `Resolved | Failed -> Idle`
    pub fn reset(&mut self) -> Transition {
        match self.state {
            SessionState::Resolved(_) | SessionState::Failed(_) => {
                self.state = SessionState::Idle;
                debug!("scan session reset");
                Transition::Applied
            }
            SessionState::Idle | SessionState::Awaiting => {
                trace!(state = self.state.name(), "reset ignored");
                Transition::Ignored
            }
        }
    }
}

/// Shared handle to a [`ScanSession`].
///
/// Camera callbacks arrive on provider threads, so the adapters and the screen
/// reach the session through this handle. The lock is never held across an
/// await.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<Mutex<ScanSession>>,
}

impl SessionHandle {
    /// Handle to a fresh idle session
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScanSession> {
        // Transitions are single assignments, so a poisoned session is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> SessionState {
        self.lock().state().clone()
    }

    /// See [`ScanSession::is_idle`]
    pub fn is_idle(&self) -> bool {
        self.lock().is_idle()
    }

    /// See [`ScanSession::is_awaiting`]
    pub fn is_awaiting(&self) -> bool {
        self.lock().is_awaiting()
    }

    /// See [`ScanSession::scans_started`]
    pub fn scans_started(&self) -> u64 {
        self.lock().scans_started()
    }

    /// See [`ScanSession::start`]
    pub fn start(&self) -> Transition {
        self.lock().start()
    }

    /// See [`ScanSession::on_decoded`]
    pub fn on_decoded(&self, result: ScanResult) -> Transition {
        self.lock().on_decoded(result)
    }

    /// See [`ScanSession::on_failure`]
    pub fn on_failure(&self, reason: FailureReason) -> Transition {
        self.lock().on_failure(reason)
    }

    /// See [`ScanSession::reset`]
    pub fn reset(&self) -> Transition {
        self.lock().reset()
    }
}

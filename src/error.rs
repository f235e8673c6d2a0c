//! Error taxonomy for scanning
//!
//! Provider failures never reach the screens as raw errors. The adapters fold
//! them into a [`FailureReason`] that the session stores.

use std::fmt;
use thiserror::Error;

/// Platform capability guarded by a permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Device camera
    Camera,
    /// Photo / media library
    MediaLibrary,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Camera => f.write_str("camera"),
            Capability::MediaLibrary => f.write_str("media library"),
        }
    }
}

/// Why a scan ended without a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Decode succeeded but found nothing
    NoSymbolFound,
    /// Normalize or decode call failed
    ProviderError,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoSymbolFound => f.write_str("no symbol found"),
            FailureReason::ProviderError => f.write_str("provider error"),
        }
    }
}

/// Errors raised by capabilities, providers and configuration
#[derive(Error, Debug)]
pub enum ScanError {
    /// The user refused a permission prompt
    #[error("{0} permission denied")]
    PermissionDenied(Capability),

    /// Decode returned zero symbols
    #[error("no symbol found")]
    NoSymbolFound,

    /// A provider call failed
    #[error("provider error: {0}")]
    Provider(String),

    /// Image could not be decoded or encoded
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// QR symbol could not be generated
    #[error("render error: {0}")]
    Render(String),

    /// Invalid configuration file
    #[error("configuration error: {0}")]
    Config(String),
}

impl ScanError {
    /// Creates a Provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Creates a Render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Session-level reason for this error.
    ///
    /// Everything except an empty decode counts as a provider failure.
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            ScanError::NoSymbolFound => FailureReason::NoSymbolFound,
            _ => FailureReason::ProviderError,
        }
    }
}

impl From<tokio::task::JoinError> for ScanError {
    fn from(err: tokio::task::JoinError) -> Self {
        ScanError::Provider(format!("worker task failed: {err}"))
    }
}

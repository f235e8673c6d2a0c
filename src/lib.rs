//! qr_scan - QR scanning app core
//!
//! A scan session state machine fed by two acquisition paths (a live camera
//! stream and a picked still image), three screens presenting it, and
//! desktop implementations of the platform capabilities they rely on.
//!
//! ```no_run
//! use qr_scan::{ImageScanAdapter, PickedImage, SessionHandle};
//! use qr_scan::models::ImageHandle;
//! use qr_scan::providers::{ImageReencoder, QrDecoder};
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let adapter = ImageScanAdapter::new(Arc::new(ImageReencoder::new()), Arc::new(QrDecoder::new()));
//! let session = SessionHandle::new();
//! let picked = PickedImage::new(ImageHandle::from_path("code.png"));
//! adapter.scan(&session, picked).await;
//! println!("{:?}", session.snapshot());
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Live and still-image acquisition adapters
pub mod adapters;
/// Platform capability traits
pub mod capability;
/// TOML configuration
pub mod config;
/// Error taxonomy
pub mod error;
/// Scan results and picked images
pub mod models;
/// Desktop capability implementations (decode, normalize, render, permissions)
pub mod providers;
/// Scan session state machine
pub mod session;
/// Screens and navigation
pub mod shell;
/// Dataset helpers for the CLI and benches
pub mod tools;
/// Pixel conversion helpers
pub mod utils;

pub use adapters::{ImageScanAdapter, LiveScanAdapter};
pub use capability::{
    CameraPermission, DecodeProvider, ImageNormalizer, ImagePicker, PermissionStatus, QrRenderer,
    ResultCallback, StreamControl, StreamGuard,
};
pub use config::ScanConfig;
pub use error::{Capability, FailureReason, ScanError};
pub use models::{PickedImage, RawSymbol, ScanResult, SymbolType};
pub use session::{ScanSession, SessionHandle, SessionState, Transition};
pub use shell::{Capabilities, ScannerApp};

//! Acquisition paths feeding a [`crate::session::ScanSession`]
//!
//! Provider errors stop here: each adapter turns them into a session
//! transition, never into an error for the screens.

/// Camera stream adapter
pub mod live;
/// Picked-image adapter
pub mod picked;

pub use live::LiveScanAdapter;
pub use picked::ImageScanAdapter;

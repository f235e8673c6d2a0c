//! Desktop implementations of the platform capabilities
//!
//! - `decoder`: QR decoding of still images and frame streams (`rqrr`)
//! - `frames`: camera stand-ins feeding the frame stream
//! - `normalizer`: decode/rotate/re-encode of picked images (`image`)
//! - `renderer`: QR symbol generation (`qrcode`)
//! - `platform`: permission prompts and the file picker

pub mod decoder;
pub mod frames;
pub mod normalizer;
pub mod platform;
pub mod renderer;

pub use decoder::QrDecoder;
pub use frames::{DirectoryFrames, FrameSource, MemoryFrames};
pub use normalizer::ImageReencoder;
pub use platform::{PathPicker, ScriptedCameraPermission};
pub use renderer::{QrCodeRenderer, RenderedSymbol};

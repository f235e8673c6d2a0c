use crate::error::ScanError;
use image::{DynamicImage, ImageOutputFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
enum ImageSource {
    Path(PathBuf),
    Encoded(Arc<[u8]>),
}

/// Opaque reference to a still image.
///
/// Either a file on disk or an already-encoded buffer. Cloning is cheap.
#[derive(Clone)]
pub struct ImageHandle {
    source: ImageSource,
}

impl ImageHandle {
    /// Handle to an image file
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ImageSource::Path(path.into()),
        }
    }

    /// Handle to an encoded image (PNG, JPEG, ...) held in memory
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            source: ImageSource::Encoded(bytes.into()),
        }
    }

    /// File path, if the handle points at one
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            ImageSource::Path(path) => Some(path),
            ImageSource::Encoded(_) => None,
        }
    }

    /// Encoded bytes, if the handle holds them
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.source {
            ImageSource::Path(_) => None,
            ImageSource::Encoded(bytes) => Some(bytes),
        }
    }

    /// Decode the referenced image
    pub fn load(&self) -> Result<DynamicImage, ScanError> {
        let image = match &self.source {
            ImageSource::Path(path) => image::open(path)?,
            ImageSource::Encoded(bytes) => image::load_from_memory(bytes)?,
        };
        Ok(image)
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ImageSource::Path(path) => write!(f, "ImageHandle({})", path.display()),
            ImageSource::Encoded(bytes) => write!(f, "ImageHandle(<{} bytes>)", bytes.len()),
        }
    }
}

/// A still image the user selected, not yet normalized
#[derive(Debug, Clone)]
pub struct PickedImage {
    handle: ImageHandle,
}

impl PickedImage {
    /// Wrap a picker result
    pub fn new(handle: ImageHandle) -> Self {
        Self { handle }
    }

    /// Source handle
    pub fn handle(&self) -> &ImageHandle {
        &self.handle
    }

    /// Consume the pick
    pub fn into_handle(self) -> ImageHandle {
        self.handle
    }
}

/// Output encoding of a normalized image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG
    Png,
    /// JPEG at the configured quality
    Jpeg,
}

/// Clockwise rotation applied while normalizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    /// Keep as is
    #[default]
    None,
    /// 90 degrees clockwise
    Cw90,
    /// 180 degrees
    Cw180,
    /// 270 degrees clockwise
    Cw270,
}

impl Rotation {
    /// Rotation from a degree count (0, 90, 180, 270)
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Cw90),
            180 => Some(Rotation::Cw180),
            270 => Some(Rotation::Cw270),
            _ => None,
        }
    }

    /// Apply to a decoded image
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Rotation::None => image,
            Rotation::Cw90 => image.rotate90(),
            Rotation::Cw180 => image.rotate180(),
            Rotation::Cw270 => image.rotate270(),
        }
    }
}

/// Options for re-encoding a picked image before decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Encoder quality, 1-100 (100 = no loss)
    pub quality: u8,
    /// Target encoding
    pub format: OutputFormat,
    /// Orientation fix
    pub rotation: Rotation,
}

impl NormalizeOptions {
    pub(crate) fn output_format(&self) -> ImageOutputFormat {
        match self.format {
            OutputFormat::Png => ImageOutputFormat::Png,
            OutputFormat::Jpeg => ImageOutputFormat::Jpeg(self.quality.clamp(1, 100)),
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            quality: 100,
            format: OutputFormat::Png,
            rotation: Rotation::None,
        }
    }
}

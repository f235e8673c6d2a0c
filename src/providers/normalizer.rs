//! Image normalizer backed by the `image` crate

use crate::capability::ImageNormalizer;
use crate::error::ScanError;
use crate::models::{ImageHandle, NormalizeOptions, OutputFormat};
use async_trait::async_trait;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Decode, orient and re-encode an image into memory
pub fn reencode(image: &ImageHandle, options: &NormalizeOptions) -> Result<ImageHandle, ScanError> {
    let decoded = options.rotation.apply(image.load()?);
    let decoded = match options.format {
        // JPEG has no alpha channel
        OutputFormat::Jpeg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
        OutputFormat::Png => decoded,
    };

    let mut buffer = Cursor::new(Vec::new());
    decoded.write_to(&mut buffer, options.output_format())?;
    let bytes = buffer.into_inner();
    debug!(
        source = ?image,
        width = decoded.width(),
        height = decoded.height(),
        bytes = bytes.len(),
        "image normalized"
    );
    Ok(ImageHandle::from_bytes(bytes))
}

/// [`ImageNormalizer`] running [`reencode`] on the blocking pool
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageReencoder;

impl ImageReencoder {
    /// New normalizer
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImageNormalizer for ImageReencoder {
    async fn normalize(
        &self,
        image: &ImageHandle,
        options: &NormalizeOptions,
    ) -> Result<ImageHandle, ScanError> {
        let image = image.clone();
        let options = *options;
        tokio::task::spawn_blocking(move || reencode(&image, &options)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rotation;
    use image::{GrayImage, Luma};

    fn sample_png(width: u32, height: u32) -> ImageHandle {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([200])));
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, image::ImageOutputFormat::Png)
            .unwrap();
        ImageHandle::from_bytes(buffer.into_inner())
    }

    #[test]
    fn test_reencode_png_round_trips() {
        let normalized = reencode(&sample_png(6, 3), &NormalizeOptions::default()).unwrap();
        let bytes = normalized.bytes().unwrap();
        assert_eq!(image::guess_format(bytes).unwrap(), image::ImageFormat::Png);
        let loaded = normalized.load().unwrap();
        assert_eq!((loaded.width(), loaded.height()), (6, 3));
    }

    #[test]
    fn test_reencode_applies_rotation_and_format() {
        let options = NormalizeOptions {
            quality: 90,
            format: OutputFormat::Jpeg,
            rotation: Rotation::Cw270,
        };
        let normalized = reencode(&sample_png(6, 3), &options).unwrap();
        let bytes = normalized.bytes().unwrap();
        assert_eq!(image::guess_format(bytes).unwrap(), image::ImageFormat::Jpeg);
        let loaded = normalized.load().unwrap();
        assert_eq!((loaded.width(), loaded.height()), (3, 6));
    }

    #[tokio::test]
    async fn test_normalize_rejects_garbage() {
        let handle = ImageHandle::from_bytes(vec![1u8, 2, 3]);
        let err = ImageReencoder::new()
            .normalize(&handle, &NormalizeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Image(_)));
    }
}

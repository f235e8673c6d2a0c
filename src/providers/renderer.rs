//! QR rendering backed by the `qrcode` crate

use crate::capability::QrRenderer;
use crate::error::ScanError;
use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;

/// Quiet zone in modules required around a QR symbol
pub const DEFAULT_QUIET_ZONE: u32 = 4;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// A generated QR symbol: module grid plus a raster image
#[derive(Debug, Clone)]
pub struct RenderedSymbol {
    text: String,
    modules: Vec<bool>,
    modules_per_side: usize,
    quiet_zone: u32,
    image: GrayImage,
}

impl RenderedSymbol {
    /// Text encoded in the symbol
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Width of the module grid, without quiet zone
    pub fn modules_per_side(&self) -> usize {
        self.modules_per_side
    }

    /// True if module `(x, y)` is dark; out-of-range modules are light
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.modules_per_side
            && y < self.modules_per_side
            && self.modules[y * self.modules_per_side + x]
    }

    /// Raster image including the quiet zone
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Encode the raster as PNG
    pub fn to_png(&self) -> Result<Vec<u8>, ScanError> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(self.image.clone()).write_to(&mut buffer, ImageOutputFormat::Png)?;
        Ok(buffer.into_inner())
    }

    /// Terminal rendering, two characters per module
    pub fn to_text(&self) -> String {
        let quiet = self.quiet_zone as isize;
        let side = self.modules_per_side as isize;
        let mut out = String::new();
        for y in -quiet..side + quiet {
            for x in -quiet..side + quiet {
                let dark = x >= 0 && y >= 0 && self.is_dark(x as usize, y as usize);
                out.push_str(if dark { "██" } else { "  " });
            }
            out.push('\n');
        }
        out
    }
}

/// [`QrRenderer`] with medium error correction
#[derive(Debug, Clone, Copy)]
pub struct QrCodeRenderer {
    quiet_zone: u32,
}

impl QrCodeRenderer {
    /// Renderer with the standard quiet zone
    pub fn new() -> Self {
        Self::with_quiet_zone(DEFAULT_QUIET_ZONE)
    }

    /// Renderer with a custom quiet zone (in modules)
    pub fn with_quiet_zone(quiet_zone: u32) -> Self {
        Self { quiet_zone }
    }
}

impl Default for QrCodeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl QrRenderer for QrCodeRenderer {
    fn render(&self, text: &str, size: u32) -> Result<RenderedSymbol, ScanError> {
        if text.is_empty() {
            return Err(ScanError::render("nothing to encode"));
        }
        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)
            .map_err(|err| ScanError::render(err.to_string()))?;

        let modules_per_side = code.width();
        let modules: Vec<bool> = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();

        // Whole pixels per module; a symbol wider than `size` gets one pixel each.
        let quiet = self.quiet_zone;
        let side_modules = modules_per_side as u32 + 2 * quiet;
        let scale = (size / side_modules).max(1);
        let side_px = side_modules * scale;
        let image = GrayImage::from_fn(side_px, side_px, |px, py| {
            let mx = (px / scale) as i64 - quiet as i64;
            let my = (py / scale) as i64 - quiet as i64;
            let inside = (0..modules_per_side as i64).contains(&mx)
                && (0..modules_per_side as i64).contains(&my);
            if inside && modules[my as usize * modules_per_side + mx as usize] {
                DARK
            } else {
                LIGHT
            }
        });

        Ok(RenderedSymbol {
            text: text.to_string(),
            modules,
            modules_per_side,
            quiet_zone: quiet,
            image,
        })
    }
}

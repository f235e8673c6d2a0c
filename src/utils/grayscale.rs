//! Luma conversion for decode input
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
//!
//! Images at or above `PARALLEL_MIN_SIDE` on either side are converted row by
//! row on the rayon pool.

use image::DynamicImage;
use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Side length from which conversion runs in parallel
pub const PARALLEL_MIN_SIDE: usize = 800;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8).min(255) as u8
}

fn convert_row(src: &[u8], channels: usize, dst: &mut [u8]) {
    for (px, out) in src.chunks_exact(channels).zip(dst.iter_mut()) {
        *out = luma(px[0], px[1], px[2]);
    }
}

fn convert(src: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
    let pixel_count = width * height;
    let mut gray = vec![0u8; pixel_count];
    if width == 0 || src.len() < pixel_count * channels {
        return gray;
    }

    let stride = width * channels;
    if width >= PARALLEL_MIN_SIDE || height >= PARALLEL_MIN_SIDE {
        gray.par_chunks_mut(width)
            .zip(src.par_chunks(stride))
            .for_each(|(row, src_row)| convert_row(src_row, channels, row));
    } else {
        for (row, src_row) in gray.chunks_mut(width).zip(src.chunks(stride)) {
            convert_row(src_row, channels, row);
        }
    }
    gray
}

/// Convert packed RGB bytes to luma
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert(rgb, width, height, 3)
}

/// Convert packed RGBA bytes to luma (alpha ignored)
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert(rgba, width, height, 4)
}

/// Luma plane of any decoded image, with its dimensions
pub fn image_to_grayscale(image: &DynamicImage) -> (Vec<u8>, usize, usize) {
    let (width, height) = (image.width() as usize, image.height() as usize);
    match image {
        DynamicImage::ImageLuma8(buffer) => (buffer.as_raw().clone(), width, height),
        DynamicImage::ImageRgba8(buffer) => {
            (rgba_to_grayscale(buffer.as_raw(), width, height), width, height)
        }
        other => {
            let rgb = other.to_rgb8();
            (rgb_to_grayscale(rgb.as_raw(), width, height), width, height)
        }
    }
}

//! Utility functions for image processing
//!
//! - Grayscale conversion (RGB/RGBA to luminance) feeding the decode engine

pub mod grayscale;

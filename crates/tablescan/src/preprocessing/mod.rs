//! Image enhancement before OCR.
//!
//! Scorecard photos OCR noticeably better once narrow images are upscaled,
//! reduced to luminance, contrast-adjusted, denoised, sharpened and
//! binarized. With the `preprocessing` feature, [`ImagePreprocessor`] does
//! that with `image` and `imageproc` and hands back a PNG.

#[cfg(feature = "preprocessing")]
mod enhance;

#[cfg(feature = "preprocessing")]
pub use enhance::ImagePreprocessor;

use crate::Result;

/// Transforms encoded image bytes into encoded image bytes ready for OCR.
pub trait Preprocessor: Send + Sync {
    fn preprocess(&self, image_bytes: &[u8]) -> Result<Vec<u8>>;
}

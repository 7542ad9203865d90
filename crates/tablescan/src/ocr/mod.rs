//! OCR collaborator boundary.
//!
//! Everything that produces [`Detection`]s lives here: parsers for stored
//! engine output (Tesseract TSV, PaddleOCR JSON, plain detection JSON), the
//! [`OcrBackend`] trait, and the [`OcrChain`] that tries backends in order.
//!
//! The Tesseract subprocess backend requires the `tokio-runtime` feature.

pub mod backend;
pub mod chain;
pub mod json;
pub mod paddle;
#[cfg(feature = "tokio-runtime")]
pub mod tesseract;
pub mod tsv;

pub use backend::OcrBackend;
pub use chain::{OcrChain, Recognition};
pub use json::detections_from_json;
pub use paddle::detections_from_paddle_json;
#[cfg(feature = "tokio-runtime")]
pub use tesseract::TesseractBackend;
pub use tsv::detections_from_tsv;

use crate::Result;
use crate::types::Detection;
use serde::{Deserialize, Serialize};

/// Layout of stored detection input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionFormat {
    /// JSON array of detections.
    #[default]
    Json,
    /// Tesseract TSV output.
    Tsv,
    /// PaddleOCR 3.x result JSON.
    Paddle,
}

impl DetectionFormat {
    /// Guess the format from a file extension (`.tsv` is TSV, anything else JSON).
    pub fn from_extension(path: &std::path::Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => DetectionFormat::Tsv,
            _ => DetectionFormat::Json,
        }
    }
}

/// Parse stored detections in the given format.
pub fn parse_detections(content: &str, format: DetectionFormat) -> Result<Vec<Detection>> {
    match format {
        DetectionFormat::Json => detections_from_json(content),
        DetectionFormat::Tsv => detections_from_tsv(content),
        DetectionFormat::Paddle => detections_from_paddle_json(content),
    }
}

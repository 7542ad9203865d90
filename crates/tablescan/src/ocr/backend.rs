//! OCR backend trait.

use crate::Result;
use crate::core::config::OcrConfig;
use crate::types::Detection;
use async_trait::async_trait;

/// An OCR engine that turns image bytes into positioned text detections.
///
/// Backends must be thread-safe (`Send + Sync`) so a single chain can serve
/// concurrent batch scans.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use tablescan::ocr::OcrBackend;
/// use tablescan::{Detection, OcrConfig, Result};
///
/// struct FixedBackend;
///
/// #[async_trait]
/// impl OcrBackend for FixedBackend {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     async fn recognize(&self, _image_bytes: &[u8], _config: &OcrConfig) -> Result<Vec<Detection>> {
///         Ok(vec![Detection::from_box("72", 0.0, 0.0, 20.0, 10.0, 0.9)])
///     }
/// }
/// ```
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Unique backend name, used in logs and to report which backend succeeded.
    fn name(&self) -> &str;

    /// Recognize text in an encoded image (PNG, JPEG, TIFF, ...).
    ///
    /// # Errors
    ///
    /// - `TablescanError::Ocr` - the engine ran but failed
    /// - `TablescanError::MissingDependency` - the engine is not installed
    /// - `TablescanError::Io` - I/O errors (these always bubble up)
    async fn recognize(&self, image_bytes: &[u8], config: &OcrConfig) -> Result<Vec<Detection>>;

    /// Whether the backend can run in this environment.
    ///
    /// Unavailable backends are skipped by [`super::OcrChain`].
    async fn is_available(&self) -> bool {
        true
    }
}

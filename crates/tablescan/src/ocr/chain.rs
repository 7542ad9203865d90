//! Ordered OCR backend fallback chain.
//!
//! The chain is built explicitly by the caller and owned by it; there is no
//! process-wide backend registry. Backends are tried in insertion order and
//! the first one to succeed wins.

use super::backend::OcrBackend;
use crate::core::config::OcrConfig;
use crate::types::Detection;
use crate::{Result, TablescanError};
use std::sync::Arc;

/// Detections together with the name of the backend that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub backend: String,
    pub detections: Vec<Detection>,
}

fn validate_backend_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TablescanError::validation("OCR backend name cannot be empty"));
    }

    if name.contains(char::is_whitespace) {
        return Err(TablescanError::validation(format!(
            "OCR backend name '{}' cannot contain whitespace",
            name
        )));
    }

    Ok(())
}

/// Ordered list of OCR backends tried until one succeeds.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use tablescan::ocr::{OcrBackend, OcrChain};
/// use tablescan::{Detection, OcrConfig, Result};
///
/// struct Stub;
///
/// #[async_trait]
/// impl OcrBackend for Stub {
///     fn name(&self) -> &str { "stub" }
///     async fn recognize(&self, _: &[u8], _: &OcrConfig) -> Result<Vec<Detection>> { Ok(Vec::new()) }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let mut chain = OcrChain::new();
/// chain.push(Arc::new(Stub))?;
///
/// let recognition = chain.recognize(b"image", &OcrConfig::default()).await?;
/// assert_eq!(recognition.backend, "stub");
/// # Ok::<(), tablescan::TablescanError>(())
/// # }).unwrap();
/// ```
#[derive(Default, Clone)]
pub struct OcrChain {
    backends: Vec<Arc<dyn OcrBackend>>,
}

impl std::fmt::Debug for OcrChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrChain").field("backends", &self.names()).finish()
    }
}

impl OcrChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from the backend names in `config.backends`.
    ///
    /// # Errors
    ///
    /// Returns `TablescanError::Validation` for an unknown backend name or an
    /// empty list.
    #[cfg(feature = "tokio-runtime")]
    pub fn from_config(config: &OcrConfig) -> Result<Self> {
        if config.backends.is_empty() {
            return Err(TablescanError::validation("At least one OCR backend must be configured"));
        }

        let mut chain = Self::new();
        for name in &config.backends {
            let backend: Arc<dyn OcrBackend> = match name.as_str() {
                "tesseract" => Arc::new(super::TesseractBackend::from_config(config)),
                other => {
                    return Err(TablescanError::validation(format!(
                        "Unknown OCR backend '{}'. Supported: tesseract",
                        other
                    )));
                }
            };
            chain.push(backend)?;
        }
        Ok(chain)
    }

    /// Append a backend at the lowest priority.
    ///
    /// # Errors
    ///
    /// Returns `TablescanError::Validation` if the name is empty, contains
    /// whitespace, or is already in the chain.
    pub fn push(&mut self, backend: Arc<dyn OcrBackend>) -> Result<()> {
        let name = backend.name();
        validate_backend_name(name)?;

        if self.backends.iter().any(|existing| existing.name() == name) {
            return Err(TablescanError::validation(format!(
                "OCR backend '{}' is already in the chain",
                name
            )));
        }

        self.backends.push(backend);
        Ok(())
    }

    /// Builder-style [`push`](Self::push).
    pub fn with_backend(mut self, backend: Arc<dyn OcrBackend>) -> Result<Self> {
        self.push(backend)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Backend names in priority order.
    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|backend| backend.name()).collect()
    }

    /// Run the backends in order until one succeeds.
    ///
    /// A backend that succeeds with zero detections still wins. Unavailable
    /// backends are skipped.
    ///
    /// # Errors
    ///
    /// - `TablescanError::Validation` if the chain is empty
    /// - the last backend error if every backend failed
    /// - `TablescanError::MissingDependency` if no backend was available
    pub async fn recognize(&self, image_bytes: &[u8], config: &OcrConfig) -> Result<Recognition> {
        if self.backends.is_empty() {
            return Err(TablescanError::validation("OCR chain has no backends"));
        }

        let mut last_error = None;

        for backend in &self.backends {
            let name = backend.name();

            if !backend.is_available().await {
                tracing::debug!(backend = name, "OCR backend unavailable, skipping");
                continue;
            }

            match backend.recognize(image_bytes, config).await {
                Ok(detections) => {
                    tracing::debug!(backend = name, detections = detections.len(), "OCR backend succeeded");
                    return Ok(Recognition {
                        backend: name.to_string(),
                        detections,
                    });
                }
                Err(error) => {
                    tracing::warn!(backend = name, %error, "OCR backend failed, trying next");
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            TablescanError::MissingDependency(format!(
                "No OCR backend available (tried: {})",
                self.names().join(", ")
            ))
        }))
    }
}

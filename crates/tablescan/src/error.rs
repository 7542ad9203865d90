//! Error types for Tablescan.
//!
//! Errors only arise at the collaborator boundary: reading detection files,
//! loading configuration, running OCR backends and preprocessing images.
//! Table reconstruction itself never fails; anomalies inside the pipeline are
//! absorbed as diagnostics or stringly-typed cells.
//!
//! # Error Handling Philosophy
//!
//! **System errors MUST always bubble up unchanged:**
//! - `TablescanError::Io` (from `std::io::Error`) - file system and process spawn errors
//!
//! **Application errors are wrapped with context:**
//! - `Parsing` - malformed detection input (TSV, JSON)
//! - `Validation` - invalid configuration or parameters
//! - `Ocr` - OCR collaborator failures
//! - `MissingDependency` - OCR executable not installed
//!
//! # Example
//!
//! ```rust
//! use tablescan::{TablescanError, Result};
//!
//! fn read_detections(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!
//!     if content.trim().is_empty() {
//!         return Err(TablescanError::parsing(format!("Detection file is empty: {}", path)));
//!     }
//!
//!     Ok(content)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `TablescanError`.
pub type Result<T> = std::result::Result<T, TablescanError>;

/// Main error type for all Tablescan operations.
#[derive(Debug, Error)]
pub enum TablescanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("OCR backend '{backend}' failed: {message}")]
    Backend { message: String, backend: String },

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for TablescanError {
    fn from(err: serde_json::Error) -> Self {
        TablescanError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<csv::Error> for TablescanError {
    fn from(err: csv::Error) -> Self {
        TablescanError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "preprocessing")]
impl From<image::ImageError> for TablescanError {
    fn from(err: image::ImageError) -> Self {
        TablescanError::ImageProcessing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl TablescanError {
    error_constructor!(parsing, Parsing);
    error_constructor!(ocr, Ocr);
    error_constructor!(validation, Validation);
    error_constructor!(image_processing, ImageProcessing);
    error_constructor!(serialization, Serialization);

    /// Create a backend error attributed to a named OCR backend.
    pub fn backend<S: Into<String>, B: Into<String>>(backend: B, message: S) -> Self {
        Self::Backend {
            message: message.into(),
            backend: backend.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TablescanError = io_err.into();
        assert!(matches!(err, TablescanError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_parsing_error() {
        let err = TablescanError::parsing("invalid TSV header");
        assert_eq!(err.to_string(), "Parsing error: invalid TSV header");
    }

    #[test]
    fn test_ocr_error_with_source() {
        let source = std::io::Error::other("tesseract crashed");
        let err = TablescanError::ocr_with_source("OCR failed", source);
        assert_eq!(err.to_string(), "OCR error: OCR failed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_error() {
        let err = TablescanError::validation("row_threshold_factor must be positive");
        assert_eq!(
            err.to_string(),
            "Validation error: row_threshold_factor must be positive"
        );
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_backend_error() {
        let err = TablescanError::backend("tesseract", "exit status 1");
        assert_eq!(err.to_string(), "OCR backend 'tesseract' failed: exit status 1");
    }

    #[test]
    fn test_json_error_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: TablescanError = json_err.into();
        assert!(matches!(err, TablescanError::Serialization { .. }));
    }

    #[test]
    fn test_missing_dependency() {
        let err = TablescanError::MissingDependency("tesseract".to_string());
        assert_eq!(err.to_string(), "Missing dependency: tesseract");
    }
}

//! Tesseract OCR backend.
//!
//! Runs the `tesseract` executable as a subprocess, feeding the image on stdin
//! and reading word boxes back as TSV on stdout.

use super::backend::OcrBackend;
use super::tsv::detections_from_tsv;
use crate::core::config::OcrConfig;
use crate::types::Detection;
use crate::{Result, TablescanError};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

/// Seconds allowed for `tesseract --version` during availability checks.
const VERSION_CHECK_TIMEOUT_SECONDS: u64 = 10;

/// Validate a Tesseract language string such as `eng` or `eng+deu`.
pub fn validate_language(language: &str) -> Result<()> {
    let valid = !language.is_empty()
        && language
            .split('+')
            .all(|code| !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

    if !valid {
        return Err(TablescanError::validation(format!(
            "Invalid Tesseract language '{}'. Expected codes like 'eng' or 'eng+deu'",
            language
        )));
    }
    Ok(())
}

/// OCR backend that shells out to the Tesseract CLI.
#[derive(Debug, Clone)]
pub struct TesseractBackend {
    executable: String,
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractBackend {
    /// Create a backend running the given executable (a name on `PATH` or a path).
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.tesseract_path.clone())
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }
}

#[async_trait]
impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image_bytes: &[u8], config: &OcrConfig) -> Result<Vec<Detection>> {
        if image_bytes.is_empty() {
            return Err(TablescanError::validation("Empty image data"));
        }
        validate_language(&config.language)?;

        let mut child = Command::new(&self.executable)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&config.language)
            .arg("tsv")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TablescanError::MissingDependency(format!(
                        "Tesseract executable '{}' not found: {}",
                        self.executable, e
                    ))
                } else {
                    TablescanError::Io(e)
                }
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(image_bytes).await?;
            stdin.shutdown().await?;
        }

        let output = match timeout(Duration::from_secs(config.timeout_secs), child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(std::io::Error::other(format!("Failed to wait for tesseract: {}", e)).into()),
            Err(_) => {
                // child was consumed by wait_with_output(), kill_on_drop reaps it
                return Err(TablescanError::ocr(format!(
                    "Tesseract timed out after {} seconds",
                    config.timeout_secs
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TablescanError::ocr(format!(
                "Tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let tsv = String::from_utf8(output.stdout)
            .map_err(|e| TablescanError::ocr_with_source("Tesseract produced non-UTF-8 output", e))?;

        let detections = detections_from_tsv(&tsv)?;
        tracing::debug!(words = detections.len(), language = %config.language, "Tesseract recognized words");
        Ok(detections)
    }

    async fn is_available(&self) -> bool {
        let check = Command::new(&self.executable)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();

        matches!(
            timeout(Duration::from_secs(VERSION_CHECK_TIMEOUT_SECONDS), check).await,
            Ok(Ok(status)) if status.success()
        )
    }
}

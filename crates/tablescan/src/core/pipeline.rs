//! Image scanning pipeline.
//!
//! Glues the collaborators to the reconstruction engine: optional image
//! preprocessing, then the OCR chain, then [`reconstruct`]. Only the
//! collaborators can fail; once detections exist a table always comes out.

use super::config::ScanConfig;
use super::engine::reconstruct;
use crate::ocr::OcrChain;
use crate::preprocessing::Preprocessor;
use crate::types::Reconstruction;
use crate::{Result, TablescanError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of scanning one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Name of the OCR backend that produced the detections.
    pub backend: String,
    /// Whether the image went to OCR preprocessed.
    pub preprocessed: bool,
    pub detections: usize,
    pub reconstruction: Reconstruction,
}

/// Run a preprocessor on the blocking pool so image work never stalls the runtime.
async fn preprocess_blocking(preprocessor: Arc<dyn Preprocessor>, image_bytes: Vec<u8>) -> Result<Vec<u8>> {
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        let _guard = span.entered();
        preprocessor.preprocess(&image_bytes)
    })
    .await
    .map_err(|e| TablescanError::image_processing(format!("Preprocessing task failed: {}", e)))?
}

/// Scan an encoded image into a table.
///
/// Preprocessing runs on tokio's blocking pool. When it fails, the original
/// bytes go to OCR instead.
///
/// # Errors
///
/// Propagates OCR chain failures (see [`OcrChain::recognize`]).
pub async fn scan_image(
    image_bytes: &[u8],
    config: &ScanConfig,
    chain: &OcrChain,
    preprocessor: Option<Arc<dyn Preprocessor>>,
) -> Result<ScanResult> {
    let prepared = match preprocessor {
        Some(preprocessor) => match preprocess_blocking(preprocessor, image_bytes.to_vec()).await {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                tracing::warn!(%error, "Preprocessing failed, using original image");
                None
            }
        },
        None => None,
    };

    let preprocessed = prepared.is_some();
    let bytes = prepared.as_deref().unwrap_or(image_bytes);

    let recognition = chain.recognize(bytes, &config.ocr).await?;
    let detections = recognition.detections.len();
    let reconstruction = reconstruct(&recognition.detections, &config.table);

    Ok(ScanResult {
        backend: recognition.backend,
        preprocessed,
        detections,
        reconstruction,
    })
}

/// Read an image file and scan it.
pub async fn scan_file(
    path: impl AsRef<Path>,
    config: &ScanConfig,
    chain: &OcrChain,
    preprocessor: Option<Arc<dyn Preprocessor>>,
) -> Result<ScanResult> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Scanning image");
    scan_image(&bytes, config, chain, preprocessor).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Success,
    Failed,
}

/// One entry of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub file: PathBuf,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,
    /// Where the rendered table was written, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub scan: Option<ScanResult>,
}

impl BatchItem {
    fn from_outcome(file: PathBuf, outcome: Result<ScanResult>) -> Self {
        match outcome {
            Ok(scan) => Self {
                file,
                status: ItemStatus::Success,
                backend: Some(scan.backend.clone()),
                rows: Some(scan.reconstruction.table.row_count()),
                columns: Some(scan.reconstruction.table.column_count()),
                output: None,
                error: None,
                scan: Some(scan),
            },
            Err(error) => Self::failed(file, error.to_string()),
        }
    }

    fn failed(file: PathBuf, error: String) -> Self {
        Self {
            file,
            status: ItemStatus::Failed,
            backend: None,
            rows: None,
            columns: None,
            output: None,
            error: Some(error),
            scan: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ItemStatus::Success
    }
}

/// Totals over a batch run, serializable as a processing log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<BatchItem>,
}

impl BatchSummary {
    pub fn from_items(items: Vec<BatchItem>) -> Self {
        let succeeded = items.iter().filter(|item| item.is_success()).count();
        Self {
            total: items.len(),
            succeeded,
            failed: items.len() - succeeded,
            items,
        }
    }
}

/// Scan many image files concurrently.
///
/// Concurrency is bounded by `config.max_concurrent_scans` (default
/// `num_cpus * 2`). Items come back in input order; a failing file is
/// recorded as a failed item and never aborts the batch.
pub async fn batch_scan_files(
    paths: Vec<impl AsRef<Path>>,
    config: &ScanConfig,
    chain: Arc<OcrChain>,
    preprocessor: Option<Arc<dyn Preprocessor>>,
) -> Vec<BatchItem> {
    use tokio::sync::Semaphore;
    use tokio::task::JoinSet;

    if paths.is_empty() {
        return Vec::new();
    }

    let config = Arc::new(config.clone());
    let max_concurrent = config
        .max_concurrent_scans
        .unwrap_or_else(|| num_cpus::get() * 2)
        .max(1);
    let semaphore = Arc::new(Semaphore::new(max_concurrent));

    let files: Vec<PathBuf> = paths.iter().map(|path| path.as_ref().to_path_buf()).collect();
    let mut tasks = JoinSet::new();

    for (index, file) in files.iter().cloned().enumerate() {
        let config = Arc::clone(&config);
        let chain = Arc::clone(&chain);
        let preprocessor = preprocessor.clone();
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire().await else {
                return (index, Err(TablescanError::Other("Batch semaphore closed".to_string())));
            };
            let outcome = scan_file(&file, &config, &chain, preprocessor).await;
            (index, outcome)
        });
    }

    let mut outcomes: Vec<Option<Result<ScanResult>>> = (0..files.len()).map(|_| None).collect();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(join_error) => tracing::error!(%join_error, "Scan task panicked"),
        }
    }

    let items: Vec<BatchItem> = files
        .into_iter()
        .zip(outcomes)
        .map(|(file, outcome)| match outcome {
            Some(outcome) => BatchItem::from_outcome(file, outcome),
            None => BatchItem::failed(file, "Scan task panicked".to_string()),
        })
        .collect();

    let succeeded = items.iter().filter(|item| item.is_success()).count();
    tracing::info!(
        total = items.len(),
        succeeded,
        failed = items.len() - succeeded,
        "Batch scan finished"
    );

    items
}

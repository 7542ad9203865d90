//! Core reconstruction orchestration.
//!
//! # Architecture
//!
//! - **Engine** (`engine`): `reconstruct()` drives detections through row
//!   clustering, column sorting, assembly and value normalization
//! - **Pipeline** (`pipeline`): image scanning through preprocessing and an
//!   OCR chain, single and batched (requires `tokio-runtime`)
//! - **Configuration** (`config`): table options and file-based scan config
//!
//! # Example
//!
//! ```rust
//! use tablescan::core::engine::reconstruct;
//! use tablescan::{Stage, TableConfig};
//!
//! let result = reconstruct(&[], &TableConfig::default());
//! assert!(result.table.is_empty());
//! assert_eq!(result.stages, vec![Stage::Empty, Stage::Done]);
//! ```

pub mod config;
pub mod engine;
#[cfg(feature = "tokio-runtime")]
pub mod pipeline;

pub use config::{ColumnAnchor, OcrConfig, PreprocessingConfig, ScanConfig, TableConfig};
pub use engine::{reconstruct, reconstruct_batch, reconstruct_table};
#[cfg(feature = "tokio-runtime")]
pub use pipeline::{BatchItem, BatchSummary, ItemStatus, ScanResult, batch_scan_files, scan_file, scan_image};

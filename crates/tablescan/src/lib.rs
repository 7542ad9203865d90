//! Tablescan - OCR Table Reconstruction
//!
//! Tablescan turns positioned OCR text detections into a typed table. It is
//! built for printed scorecards and similar grids: detections are banded into
//! rows by vertical proximity, ordered into columns by horizontal position,
//! padded to a rectangle, and each cell is normalized into an integer, float,
//! text or missing value.
//!
//! # Quick Start
//!
//! ```rust
//! use tablescan::{CellValue, Detection, TableConfig, reconstruct};
//!
//! let detections = vec![
//!     Detection::from_box("Hole", 0.0, 0.0, 40.0, 20.0, 0.99),
//!     Detection::from_box("1", 100.0, 0.0, 10.0, 20.0, 0.99),
//!     Detection::from_box("Par", 0.0, 40.0, 30.0, 20.0, 0.98),
//!     Detection::from_box("4", 100.0, 40.0, 10.0, 20.0, 0.97),
//!     Detection::from_box("Smith", 0.0, 80.0, 50.0, 20.0, 0.96),
//!     Detection::from_box("--", 100.0, 80.0, 12.0, 20.0, 0.95),
//! ];
//!
//! let result = reconstruct(&detections, &TableConfig::default());
//! let table = &result.table;
//! assert_eq!(table.headers().unwrap(), ["Hole", "1"]);
//! assert_eq!(table.cell(0, 1), Some(&CellValue::Integer(4)));
//! assert_eq!(table.cell(1, 1), Some(&CellValue::Missing));
//! println!("{}", table.to_markdown());
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): reconstruction engine, scan pipeline, configuration
//! - **Table** (`table`): the individual stages and Markdown/CSV rendering
//! - **OCR** (`ocr`): detection parsers, the `OcrBackend` trait and fallback chain
//! - **Preprocessing** (`preprocessing`): image enhancement before OCR
//!
//! # Features
//!
//! - `tokio-runtime` (default): Tesseract subprocess backend and async scanning
//! - `preprocessing` (default): image enhancement via the `image` crate

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod ocr;
pub mod preprocessing;
pub mod table;
pub mod types;

pub use error::{Result, TablescanError};
pub use types::*;

pub use core::config::{ColumnAnchor, OcrConfig, PreprocessingConfig, ScanConfig, TableConfig};
pub use core::engine::{reconstruct, reconstruct_batch, reconstruct_table};
#[cfg(feature = "tokio-runtime")]
pub use core::pipeline::{BatchItem, BatchSummary, ItemStatus, ScanResult, batch_scan_files, scan_file, scan_image};

pub use ocr::{DetectionFormat, OcrBackend, OcrChain, Recognition, parse_detections};
#[cfg(feature = "tokio-runtime")]
pub use ocr::TesseractBackend;

pub use preprocessing::Preprocessor;
#[cfg(feature = "preprocessing")]
pub use preprocessing::ImagePreprocessor;

pub use table::{table_to_csv, table_to_markdown};

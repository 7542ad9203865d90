//! Table reconstruction engine.
//!
//! Turns an unordered bag of positioned text detections into a typed table.
//! The engine walks `Empty -> Clustering -> Sorting -> Assembling ->
//! Normalizing -> Done`, or straight `Empty -> Done` when no detection
//! survives filtering. It never fails: malformed detections are skipped and
//! reported as diagnostics, unparseable cells stay text.
//!
//! # Example
//!
//! ```rust
//! use tablescan::{CellValue, Detection, TableConfig, reconstruct_table};
//!
//! let detections = vec![
//!     Detection::from_box("Player", 10.0, 0.0, 60.0, 20.0, 0.99),
//!     Detection::from_box("Score", 120.0, 0.0, 50.0, 20.0, 0.98),
//!     Detection::from_box("Smith", 10.0, 40.0, 55.0, 20.0, 0.97),
//!     Detection::from_box("28", 120.0, 40.0, 20.0, 20.0, 0.95),
//! ];
//!
//! let table = reconstruct_table(&detections, &TableConfig::default());
//! assert_eq!(table.headers().unwrap(), ["Player", "Score"]);
//! assert_eq!(table.cell(0, 1), Some(&CellValue::Integer(28)));
//! ```

use crate::core::config::TableConfig;
use crate::table::{TextElement, assemble, cluster_rows, normalize_table, row_threshold, sort_row};
use crate::types::{Detection, Diagnostic, Reconstruction, Stage, Table};
use rayon::prelude::*;

/// Reconstruct a table and collect diagnostics for skipped detections.
#[tracing::instrument(name = "reconstruct", skip_all, fields(detections = detections.len()))]
pub fn reconstruct(detections: &[Detection], config: &TableConfig) -> Reconstruction {
    let mut stages = vec![Stage::Empty];
    let mut diagnostics = Vec::new();
    let mut elements = Vec::with_capacity(detections.len());

    for (index, detection) in detections.iter().enumerate() {
        match TextElement::from_detection(index, detection, config) {
            Ok(element) => elements.push(element),
            Err(reason) => {
                if matches!(reason, crate::types::SkipReason::InvalidGeometry) {
                    tracing::warn!(index, text = %detection.text, "Skipping detection with unusable geometry");
                } else {
                    tracing::trace!(index, %reason, "Skipping detection");
                }
                diagnostics.push(Diagnostic {
                    index,
                    text: detection.text.clone(),
                    reason,
                });
            }
        }
    }

    if elements.is_empty() {
        tracing::debug!(skipped = diagnostics.len(), "No usable text elements, returning empty table");
        stages.push(Stage::Done);
        return Reconstruction {
            table: Table::empty(),
            diagnostics,
            stages,
            row_threshold: None,
        };
    }

    stages.push(Stage::Clustering);
    let threshold = row_threshold(&elements, config.row_threshold_factor);
    let mut rows = cluster_rows(elements, threshold);
    tracing::debug!(threshold, rows = rows.len(), "Clustered elements into rows");

    stages.push(Stage::Sorting);
    for row in &mut rows {
        sort_row(row, config.column_anchor);
    }
    if tracing::enabled!(tracing::Level::TRACE) {
        for (i, row) in rows.iter().enumerate() {
            let texts: Vec<&str> = row.iter().map(|e| e.text.as_str()).collect();
            tracing::trace!("Row {}: {:?}", i, texts);
        }
    }

    stages.push(Stage::Assembling);
    let raw = assemble(rows, config.enable_header_promotion);

    stages.push(Stage::Normalizing);
    let table = normalize_table(raw, &config.missing_tokens);
    tracing::debug!(
        rows = table.row_count(),
        columns = table.column_count(),
        header = table.headers().is_some(),
        skipped = diagnostics.len(),
        "Reconstructed table"
    );

    stages.push(Stage::Done);
    Reconstruction {
        table,
        diagnostics,
        stages,
        row_threshold: Some(threshold),
    }
}

/// Reconstruct a table, discarding diagnostics.
pub fn reconstruct_table(detections: &[Detection], config: &TableConfig) -> Table {
    reconstruct(detections, config).table
}

/// Reconstruct many independent detection sets in parallel.
///
/// Output order matches input order.
pub fn reconstruct_batch(sets: &[Vec<Detection>], config: &TableConfig) -> Vec<Reconstruction> {
    sets.par_iter().map(|detections| reconstruct(detections, config)).collect()
}

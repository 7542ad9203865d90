use crate::error::TablescanError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D point in image-pixel coordinates.
///
/// Serialized as a two-element array `[x, y]`, the layout OCR engines emit
/// for polygon corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

fn default_confidence() -> f64 {
    1.0
}

/// One OCR-reported (text, geometry, confidence) triple.
///
/// This is the raw collaborator output. Nothing about it is validated until
/// the reconstruction engine turns it into a [`crate::table::TextElement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub text: String,
    pub polygon: Vec<Point>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

impl Detection {
    pub fn new(text: impl Into<String>, polygon: Vec<Point>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            polygon,
            confidence,
        }
    }

    /// Build a detection from an axis-aligned box given as left, top, width, height.
    pub fn from_box(text: impl Into<String>, left: f64, top: f64, width: f64, height: f64, confidence: f64) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self::new(
            text,
            vec![
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
            confidence,
        )
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}

/// A normalized table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    /// Placeholder cell rendered from a dash-like token or padding.
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(value) => Some(*value as f64),
            CellValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(value) => write!(f, "{}", value),
            CellValue::Float(value) => write!(f, "{:?}", value),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Missing => Ok(()),
        }
    }
}

/// Observed type of a column across its data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
    /// Every data cell in the column is missing.
    Empty,
}

/// A rectangular table of normalized cells.
///
/// Every row has exactly `column_count` cells. Header labels, when present,
/// are positional: duplicate labels are allowed and never used as keys.
/// Deserialization rejects ragged rows and mismatched headers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    headers: Option<Vec<String>>,
    rows: Vec<Vec<CellValue>>,
    column_count: usize,
}

/// Unchecked wire form of [`Table`].
#[derive(Deserialize)]
struct RawTable {
    headers: Option<Vec<String>>,
    rows: Vec<Vec<CellValue>>,
    column_count: usize,
}

impl TryFrom<RawTable> for Table {
    type Error = TablescanError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        if let Some((index, row)) = raw
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != raw.column_count)
        {
            return Err(TablescanError::validation(format!(
                "Row {} has {} cells, expected {}",
                index,
                row.len(),
                raw.column_count
            )));
        }
        if let Some(labels) = raw.headers.as_ref().filter(|labels| labels.len() != raw.column_count) {
            return Err(TablescanError::validation(format!(
                "Table has {} header labels, expected {}",
                labels.len(),
                raw.column_count
            )));
        }

        Ok(Self::from_parts(raw.headers, raw.rows, raw.column_count))
    }
}

impl Table {
    /// A table with no rows and no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(headers: Option<Vec<String>>, rows: Vec<Vec<CellValue>>, column_count: usize) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == column_count));
        debug_assert!(headers.as_ref().is_none_or(|labels| labels.len() == column_count));
        Self {
            headers,
            rows,
            column_count,
        }
    }

    /// Number of data rows (the promoted header row is not counted).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.headers.is_none()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Column labels: header text when promoted, otherwise `0..column_count`.
    pub fn column_labels(&self) -> Vec<String> {
        match &self.headers {
            Some(labels) => labels.clone(),
            None => (0..self.column_count).map(|index| index.to_string()).collect(),
        }
    }

    /// Infer the type of a column from its non-missing cells.
    ///
    /// Returns `None` when `col` is out of range.
    pub fn column_kind(&self, col: usize) -> Option<ColumnKind> {
        if col >= self.column_count {
            return None;
        }

        let mut kind = ColumnKind::Empty;
        for row in &self.rows {
            kind = match (&row[col], kind) {
                (CellValue::Missing, current) => current,
                (CellValue::Text(_), _) | (_, ColumnKind::Text) => ColumnKind::Text,
                (CellValue::Integer(_), ColumnKind::Empty) => ColumnKind::Integer,
                (CellValue::Integer(_), current) => current,
                (CellValue::Float(_), _) => ColumnKind::Float,
            };
        }
        Some(kind)
    }
}

/// Why an input detection was left out of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EmptyText,
    LowConfidence,
    LeftMargin,
    InvalidGeometry,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyText => f.write_str("empty text"),
            SkipReason::LowConfidence => f.write_str("confidence below threshold"),
            SkipReason::LeftMargin => f.write_str("inside left margin"),
            SkipReason::InvalidGeometry => f.write_str("non-finite or missing geometry"),
        }
    }
}

/// A detection that was skipped, keyed by its position in the input sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub index: usize,
    pub text: String,
    pub reason: SkipReason,
}

/// Pipeline states of a single reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Empty,
    Clustering,
    Sorting,
    Assembling,
    Normalizing,
    Done,
}

/// Output of one reconstruction: the table plus side-channel diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconstruction {
    pub table: Table,
    pub diagnostics: Vec<Diagnostic>,
    /// States visited, in order.
    pub stages: Vec<Stage>,
    /// Vertical threshold used for row banding, if clustering ran.
    pub row_threshold: Option<f64>,
}

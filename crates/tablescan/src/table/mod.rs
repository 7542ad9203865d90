//! Table reconstruction stages.
//!
//! Each stage is a pure transformation of the previous stage's output:
//!
//! - **Elements** (`element`): detections become [`TextElement`]s with derived geometry
//! - **Rows** (`rows`): adaptive vertical banding against a running row mean
//! - **Columns** (`columns`): left-to-right ordering by a configurable anchor
//! - **Assembly** (`assemble`): padding to a rectangle, optional header promotion
//! - **Normalization** (`normalize`): missing markers, integer and float coercion
//! - **Rendering** (`render`): Markdown and CSV output
//!
//! [`crate::reconstruct`] runs them in order.
pub mod assemble;
pub mod columns;
pub mod element;
pub mod normalize;
pub mod render;
pub mod rows;

pub use assemble::{RawTable, assemble};
pub use columns::sort_row;
pub use element::TextElement;
pub use normalize::{DEFAULT_MISSING_TOKENS, normalize_table, normalize_value, normalize_with_tokens};
pub use render::{table_to_csv, table_to_csv_with_delimiter, table_to_markdown};
pub use rows::{cluster_rows, median_height, row_threshold};

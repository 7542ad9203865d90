//! Table rendering to Markdown and CSV.
//!
//! Missing cells render as empty strings in both formats. Positional tables
//! (no promoted header) get a synthetic `0..n-1` header row.

use crate::error::{Result, TablescanError};
use crate::types::Table;
use csv::WriterBuilder;

/// Minimum rendered width of a Markdown column.
const MIN_COLUMN_WIDTH: usize = 3;

/// Render a table as a GitHub Flavored Markdown table.
///
/// Returns an empty string for an empty table. Pipes inside cells are escaped.
pub fn table_to_markdown(table: &Table) -> String {
    if table.is_empty() {
        return String::new();
    }

    let header: Vec<String> = table.column_labels().iter().map(|label| escape_pipes(label)).collect();
    let body: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|cell| escape_pipes(&cell.to_string())).collect())
        .collect();

    let widths: Vec<usize> = (0..table.column_count())
        .map(|col| {
            body.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(header[col].chars().count()))
                .max()
                .unwrap_or(0)
                .max(MIN_COLUMN_WIDTH)
        })
        .collect();

    let mut markdown = String::new();
    push_markdown_row(&mut markdown, &header, &widths);

    markdown.push('|');
    for width in &widths {
        markdown.push_str(&"-".repeat(width + 2));
        markdown.push('|');
    }
    markdown.push('\n');

    for row in &body {
        push_markdown_row(&mut markdown, row, &widths);
    }

    markdown
}

fn push_markdown_row(markdown: &mut String, cells: &[String], widths: &[usize]) {
    markdown.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let padding = width - cell.chars().count();
        markdown.push(' ');
        markdown.push_str(cell);
        markdown.push_str(&" ".repeat(padding));
        markdown.push_str(" |");
    }
    markdown.push('\n');
}

fn escape_pipes(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Render a table as CSV with a header row.
pub fn table_to_csv(table: &Table) -> Result<String> {
    table_to_csv_with_delimiter(table, b',')
}

/// Render a table as delimited text with a header row.
pub fn table_to_csv_with_delimiter(table: &Table, delimiter: u8) -> Result<String> {
    if table.is_empty() {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(Vec::<u8>::new());
    writer.write_record(table.column_labels())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| TablescanError::serialization_with_source("Failed to finish CSV output", error.into_error()))?;
    String::from_utf8(bytes).map_err(|error| TablescanError::serialization_with_source("CSV output is not UTF-8", error))
}

impl Table {
    /// Render as a GitHub Flavored Markdown table. See [`table_to_markdown`].
    pub fn to_markdown(&self) -> String {
        table_to_markdown(self)
    }

    /// Render as CSV. See [`table_to_csv`].
    pub fn to_csv(&self) -> Result<String> {
        table_to_csv(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn scorecard() -> Table {
        Table::from_parts(
            Some(vec!["Player".to_string(), "Score".to_string()]),
            vec![
                vec![CellValue::Text("Smith".to_string()), CellValue::Integer(28)],
                vec![CellValue::Text("Jones".to_string()), CellValue::Missing],
            ],
            2,
        )
    }

    #[test]
    fn test_markdown() {
        let markdown = table_to_markdown(&scorecard());
        let expected = "\
| Player | Score |
|--------|-------|
| Smith  | 28    |
| Jones  |       |
";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_markdown_positional_header_and_escaping() {
        let table = Table::from_parts(
            None,
            vec![vec![CellValue::Text("a|b".to_string()), CellValue::Float(4.5)]],
            2,
        );
        let markdown = table_to_markdown(&table);
        assert!(markdown.starts_with("| 0    | 1   |\n"));
        assert!(markdown.contains("a\\|b"));
    }

    #[test]
    fn test_markdown_empty() {
        assert_eq!(table_to_markdown(&Table::empty()), "");
    }

    #[test]
    fn test_csv() {
        let csv = table_to_csv(&scorecard()).unwrap();
        assert_eq!(csv, "Player,Score\nSmith,28\nJones,\n");
    }

    #[test]
    fn test_csv_quotes_and_delimiter() {
        let table = Table::from_parts(
            None,
            vec![vec![CellValue::Text("Smith, J".to_string()), CellValue::Float(3.0)]],
            2,
        );
        assert_eq!(table_to_csv(&table).unwrap(), "0,1\n\"Smith, J\",3.0\n");
        assert_eq!(table_to_csv_with_delimiter(&table, b';').unwrap(), "0;1\nSmith, J;3.0\n");
    }

    #[test]
    fn test_table_methods_delegate() {
        let table = scorecard();
        assert_eq!(table.to_markdown(), table_to_markdown(&table));
        assert_eq!(table.to_csv().unwrap(), table_to_csv(&table).unwrap());
    }

    #[test]
    fn test_csv_empty() {
        assert_eq!(table_to_csv(&Table::empty()).unwrap(), "");
    }
}

use super::element::TextElement;

/// Rectangular table of raw cell strings, before value normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
    pub column_count: usize,
}

/// Pad column-sorted rows to a common width and optionally promote a header.
///
/// The header is taken from the first row only when `promote_header` is set
/// and there is more than one row, so a single-row table stays data.
pub fn assemble(rows: Vec<Vec<TextElement>>, promote_header: bool) -> RawTable {
    let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);

    let mut rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|row| {
            let mut cells: Vec<String> = row.into_iter().map(|element| element.text).collect();
            cells.resize(column_count, String::new());
            cells
        })
        .collect();

    let headers = if promote_header && rows.len() > 1 {
        Some(rows.remove(0))
    } else {
        None
    };

    RawTable {
        headers,
        rows,
        column_count,
    }
}

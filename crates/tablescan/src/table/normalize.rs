//! Cell value normalization.
//!
//! Every cell is normalized on its own: trimmed, mapped to a missing marker
//! when it matches a dash-like token, else coerced to an integer or float,
//! else kept as text. The same raw string always normalizes the same way.

use super::assemble::RawTable;
use crate::types::{CellValue, Table};

/// Dash-like placeholders scorecards use for "no value".
///
/// Covers ASCII hyphen and double hyphen, em dash, en dash, minus sign, and
/// the empty string.
pub const DEFAULT_MISSING_TOKENS: [&str; 6] = ["--", "-", "\u{2014}", "\u{2013}", "\u{2212}", ""];

/// Normalize one raw cell against the default missing-token set.
pub fn normalize_value(raw: &str) -> CellValue {
    normalize_with_tokens(raw, &DEFAULT_MISSING_TOKENS)
}

/// Normalize one raw cell against a caller-supplied missing-token set.
///
/// An empty (or whitespace-only) cell is always missing, whatever the token
/// set, so padding cells never come out as empty text.
pub fn normalize_with_tokens<S: AsRef<str>>(raw: &str, missing_tokens: &[S]) -> CellValue {
    let value = raw.trim();

    if value.is_empty() || missing_tokens.iter().any(|token| token.as_ref() == value) {
        return CellValue::Missing;
    }

    coerce_number(value).unwrap_or_else(|| CellValue::Text(value.to_string()))
}

fn coerce_number(value: &str) -> Option<CellValue> {
    if !value.contains('.') {
        if let Ok(integer) = value.parse::<i64>() {
            return Some(CellValue::Integer(integer));
        }
        // Too wide for i64 but still all digits
        if is_integer_literal(value) {
            return parse_finite_float(value);
        }
        return None;
    }

    parse_finite_float(value)
}

fn is_integer_literal(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_finite_float(value: &str) -> Option<CellValue> {
    value
        .parse::<f64>()
        .ok()
        .filter(|float| float.is_finite())
        .map(CellValue::Float)
}

/// Normalize every cell of an assembled table.
pub fn normalize_table<S: AsRef<str>>(raw: RawTable, missing_tokens: &[S]) -> Table {
    let rows = raw
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| normalize_with_tokens(cell, missing_tokens))
                .collect()
        })
        .collect();

    Table::from_parts(raw.headers, rows, raw.column_count)
}

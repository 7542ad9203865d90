use crate::error::{Result, TablescanError};
use crate::types::Detection;

/// Tesseract TSV hierarchy level for single words.
pub const TSV_WORD_LEVEL: u32 = 5;
/// Columns in a complete TSV row, `text` included.
pub const TSV_MIN_FIELDS: usize = 12;

/// Convert Tesseract TSV output into detections.
///
/// Keeps word-level rows only and skips rows that are short or have an empty
/// `text` column. Boxes become four-corner polygons and confidences are
/// rescaled from Tesseract's 0-100 range to 0-1 (negative values map to 0).
///
/// # Errors
///
/// Returns `TablescanError::Parsing` when the input has no TSV header row.
pub fn detections_from_tsv(tsv_data: &str) -> Result<Vec<Detection>> {
    let mut lines = tsv_data.lines();

    match lines.next() {
        Some(header) if header.starts_with("level") => {}
        Some(_) => {
            return Err(TablescanError::parsing(
                "Tesseract TSV must start with a 'level' header row",
            ));
        }
        None => return Ok(Vec::new()),
    }

    let mut detections = Vec::new();

    for line in lines {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < TSV_MIN_FIELDS {
            continue;
        }

        let level = fields[0].trim().parse::<u32>().unwrap_or(0);
        if level != TSV_WORD_LEVEL {
            continue;
        }

        let text = fields[11].trim();
        if text.is_empty() {
            continue;
        }

        let (Some(left), Some(top), Some(width), Some(height)) = (
            parse_coordinate(fields[6]),
            parse_coordinate(fields[7]),
            parse_coordinate(fields[8]),
            parse_coordinate(fields[9]),
        ) else {
            tracing::debug!(line, "Skipping TSV word with unparseable box");
            continue;
        };

        let conf = fields[10].trim().parse::<f64>().unwrap_or(-1.0);
        let confidence = (conf / 100.0).max(0.0);

        detections.push(Detection::from_box(text, left, top, width, height, confidence));
    }

    Ok(detections)
}

fn parse_coordinate(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    const HEADER: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn test_detections_basic() {
        let tsv = format!(
            "{HEADER}\n5\t1\t0\t0\t0\t0\t100\t50\t80\t30\t95.5\tPlayer\n5\t1\t0\t0\t0\t1\t190\t50\t70\t30\t92\tScore"
        );

        let detections = detections_from_tsv(&tsv).unwrap();
        assert_eq!(detections.len(), 2);

        assert_eq!(detections[0].text, "Player");
        assert_eq!(detections[0].confidence, 0.955);
        assert_eq!(
            detections[0].polygon,
            vec![
                Point::new(100.0, 50.0),
                Point::new(180.0, 50.0),
                Point::new(180.0, 80.0),
                Point::new(100.0, 80.0)
            ]
        );
        assert_eq!(detections[1].text, "Score");
        assert_eq!(detections[1].confidence, 0.92);
    }

    #[test]
    fn test_level_filter() {
        let tsv = format!(
            "{HEADER}\n3\t1\t0\t0\t0\t0\t100\t50\t80\t30\t95.5\tParagraph\n5\t1\t0\t0\t0\t0\t100\t50\t80\t30\t95.5\tHole\n4\t1\t0\t0\t0\t1\t190\t50\t70\t30\t92.3\tLine"
        );

        let detections = detections_from_tsv(&tsv).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].text, "Hole");
    }

    #[test]
    fn test_negative_confidence_maps_to_zero() {
        let tsv = format!("{HEADER}\n5\t1\t0\t0\t0\t0\t10\t10\t20\t10\t-1\t--");
        let detections = detections_from_tsv(&tsv).unwrap();
        assert_eq!(detections[0].confidence, 0.0);
    }

    #[test]
    fn test_empty_text_and_short_rows_skipped() {
        let tsv = format!(
            "{HEADER}\n5\t1\t0\t0\t0\t0\t100\t50\t80\t30\t95.5\n5\t1\t0\t0\t0\t1\t190\t50\t70\t30\t92.3\t   \ninvalid line\n5\t1\t0\t0\t0\t2\t260\t50\t20\t30\t90\t4"
        );

        let detections = detections_from_tsv(&tsv).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].text, "4");
    }

    #[test]
    fn test_unparseable_box_skipped() {
        let tsv = format!("{HEADER}\n5\t1\t0\t0\t0\t0\tabc\t50\t80\t30\t95.5\tPar");
        assert!(detections_from_tsv(&tsv).unwrap().is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(detections_from_tsv("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_header_is_error() {
        let result = detections_from_tsv("5\t1\t0\t0\t0\t0\t100\t50\t80\t30\t95.5\tPar");
        assert!(matches!(result, Err(TablescanError::Parsing { .. })));
    }
}

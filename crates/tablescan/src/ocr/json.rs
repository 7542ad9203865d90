use crate::error::{Result, TablescanError};
use crate::types::Detection;

/// Parse a JSON array of `{"text", "polygon", "confidence"}` detections.
///
/// `confidence` defaults to 1.0 when absent.
pub fn detections_from_json(json: &str) -> Result<Vec<Detection>> {
    serde_json::from_str(json)
        .map_err(|e| TablescanError::parsing_with_source("Input is not a JSON array of detections", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn test_parse_detections() {
        let json = r#"[
            {"text": "Par", "polygon": [[0, 0], [30, 0], [30, 10], [0, 10]], "confidence": 0.8},
            {"text": "4", "polygon": [[50, 0], [60, 10]]}
        ]"#;

        let detections = detections_from_json(json).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].confidence, 0.8);
        assert_eq!(detections[1].confidence, 1.0);
        assert_eq!(detections[1].polygon, vec![Point::new(50.0, 0.0), Point::new(60.0, 10.0)]);
    }

    #[test]
    fn test_serialized_detections_parse_back() {
        let detections = vec![Detection::from_box("72", 5.0, 5.0, 20.0, 10.0, 0.5)];
        let json = serde_json::to_string(&detections).unwrap();
        assert_eq!(detections_from_json(&json).unwrap(), detections);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            detections_from_json("{not json"),
            Err(TablescanError::Parsing { .. })
        ));
    }
}

//! PaddleOCR 3.x result parsing.
//!
//! PaddleOCR reports recognized text as three parallel arrays on its result
//! object: `rec_texts`, `rec_polys` and `rec_scores`. Saved results come as a
//! bare object, as an object nested under `res`, or as a list of either.

use crate::error::{Result, TablescanError};
use crate::types::{Detection, Point};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PaddleResult {
    rec_texts: Vec<String>,
    rec_polys: Vec<Vec<[f64; 2]>>,
    rec_scores: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PaddleDocument {
    Direct(PaddleResult),
    Wrapped { res: PaddleResult },
    List(Vec<PaddleDocument>),
}

impl PaddleDocument {
    fn collect_into(self, detections: &mut Vec<Detection>) {
        match self {
            PaddleDocument::Direct(result) | PaddleDocument::Wrapped { res: result } => {
                push_result(result, detections);
            }
            PaddleDocument::List(documents) => {
                for document in documents {
                    document.collect_into(detections);
                }
            }
        }
    }
}

fn push_result(result: PaddleResult, detections: &mut Vec<Detection>) {
    let PaddleResult {
        rec_texts,
        rec_polys,
        rec_scores,
    } = result;

    if rec_texts.len() != rec_polys.len() || rec_texts.len() != rec_scores.len() {
        tracing::warn!(
            texts = rec_texts.len(),
            polys = rec_polys.len(),
            scores = rec_scores.len(),
            "PaddleOCR arrays differ in length, truncating to the shortest"
        );
    }

    detections.extend(
        rec_texts
            .into_iter()
            .zip(rec_polys)
            .zip(rec_scores)
            .map(|((text, poly), score)| Detection::new(text, poly.into_iter().map(Point::from).collect(), score)),
    );
}

/// Convert a saved PaddleOCR 3.x JSON result into detections.
///
/// Lists of results are concatenated in order.
///
/// # Errors
///
/// Returns `TablescanError::Parsing` if the JSON does not have the
/// `rec_texts`/`rec_polys`/`rec_scores` shape.
pub fn detections_from_paddle_json(json: &str) -> Result<Vec<Detection>> {
    let document: PaddleDocument = serde_json::from_str(json).map_err(|e| {
        TablescanError::parsing_with_source("Input is not a PaddleOCR result with rec_texts/rec_polys/rec_scores", e)
    })?;

    let mut detections = Vec::new();
    document.collect_into(&mut detections);
    Ok(detections)
}

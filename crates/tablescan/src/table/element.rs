use crate::core::config::TableConfig;
use crate::types::{Detection, SkipReason};

/// One recognized text fragment with derived geometry.
///
/// Bounds are computed once from the detection polygon; centers and height
/// are derived on demand. Degenerate (zero-area) boxes are valid.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    /// Position of the source detection in the input sequence.
    pub index: usize,
    pub text: String,
    pub confidence: f64,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl TextElement {
    /// Build an element from a raw detection, applying the inclusion filters.
    ///
    /// Geometry is checked first so malformed detections are reported as
    /// such even when their text is also empty.
    pub fn from_detection(index: usize, detection: &Detection, config: &TableConfig) -> Result<Self, SkipReason> {
        let (x_min, x_max, y_min, y_max) = bounds(detection).ok_or(SkipReason::InvalidGeometry)?;

        let text = detection.text.trim();
        if text.is_empty() {
            return Err(SkipReason::EmptyText);
        }

        if detection.confidence.is_nan() || detection.confidence < config.confidence_threshold {
            return Err(SkipReason::LowConfidence);
        }

        if x_min < config.x_margin_left {
            return Err(SkipReason::LeftMargin);
        }

        Ok(Self {
            index,
            text: text.to_string(),
            confidence: detection.confidence,
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    pub fn x_center(&self) -> f64 {
        (self.x_min + self.x_max) / 2.0
    }

    pub fn y_center(&self) -> f64 {
        (self.y_min + self.y_max) / 2.0
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }
}

fn bounds(detection: &Detection) -> Option<(f64, f64, f64, f64)> {
    let first = detection.polygon.first()?;
    if !first.is_finite() {
        return None;
    }

    let mut x_min = first.x;
    let mut x_max = first.x;
    let mut y_min = first.y;
    let mut y_max = first.y;

    for point in &detection.polygon[1..] {
        if !point.is_finite() {
            return None;
        }
        x_min = x_min.min(point.x);
        x_max = x_max.max(point.x);
        y_min = y_min.min(point.y);
        y_max = y_max.max(point.y);
    }

    Some((x_min, x_max, y_min, y_max))
}

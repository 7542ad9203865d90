//! Adaptive vertical banding of text elements into rows.
//!
//! The row threshold scales with the median element height, so the same
//! factor works across image resolutions. Membership is decided against the
//! running mean y-center of the row being built, which keeps a long row from
//! drifting into its neighbour one element at a time.

use super::element::TextElement;
use std::cmp::Ordering;

/// Median element height. Even counts average the two middle values.
///
/// Returns 0 for an empty slice.
pub fn median_height(elements: &[TextElement]) -> f64 {
    let mut heights: Vec<f64> = elements.iter().map(TextElement::height).collect();
    if heights.is_empty() {
        return 0.0;
    }
    heights.sort_by(f64::total_cmp);

    let mid = heights.len() / 2;
    if heights.len() % 2 == 0 {
        (heights[mid - 1] + heights[mid]) / 2.0
    } else {
        heights[mid]
    }
}

/// Maximum vertical distance from a row's mean y-center for an element to join it.
pub fn row_threshold(elements: &[TextElement], factor: f64) -> f64 {
    median_height(elements) * factor
}

/// Total order on elements for vertical scanning.
///
/// Ties on y-center fall back to the remaining geometry and then the text so
/// the result does not depend on input order.
pub(crate) fn vertical_order(a: &TextElement, b: &TextElement) -> Ordering {
    a.y_center()
        .total_cmp(&b.y_center())
        .then_with(|| a.x_min.total_cmp(&b.x_min))
        .then_with(|| a.x_max.total_cmp(&b.x_max))
        .then_with(|| a.y_min.total_cmp(&b.y_min))
        .then_with(|| a.text.cmp(&b.text))
}

/// Partition elements into rows, top to bottom.
///
/// Elements within a returned row keep their vertical scan order; column
/// ordering is a separate step.
pub fn cluster_rows(mut elements: Vec<TextElement>, threshold: f64) -> Vec<Vec<TextElement>> {
    elements.sort_by(vertical_order);

    let mut rows: Vec<Vec<TextElement>> = Vec::new();
    let mut current: Vec<TextElement> = Vec::new();
    let mut y_sum = 0.0;

    for element in elements {
        let y = element.y_center();
        if !current.is_empty() {
            let running_mean = y_sum / current.len() as f64;
            if (y - running_mean).abs() > threshold {
                rows.push(std::mem::take(&mut current));
                y_sum = 0.0;
            }
        }
        y_sum += y;
        current.push(element);
    }

    if !current.is_empty() {
        rows.push(current);
    }

    rows
}

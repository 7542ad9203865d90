use super::element::TextElement;
use crate::core::config::ColumnAnchor;

fn anchor_of(element: &TextElement, anchor: ColumnAnchor) -> f64 {
    match anchor {
        ColumnAnchor::XMin => element.x_min,
        ColumnAnchor::XCenter => element.x_center(),
    }
}

/// Order a row's elements left to right by the chosen anchor.
///
/// Equal anchors are broken by y-center and then text, keeping the order
/// independent of how the row was assembled.
pub fn sort_row(row: &mut [TextElement], anchor: ColumnAnchor) {
    row.sort_by(|a, b| {
        anchor_of(a, anchor)
            .total_cmp(&anchor_of(b, anchor))
            .then_with(|| a.y_center().total_cmp(&b.y_center()))
            .then_with(|| a.x_max.total_cmp(&b.x_max))
            .then_with(|| a.text.cmp(&b.text))
    });
}

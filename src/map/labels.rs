use geo::Coord;
use roxmltree::Node;

use crate::geom::matrix_translation;
use crate::types::SeatId;

/// A positioned integer text token naming a seat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapLabel {
    pub seat: SeatId,
    pub at: Coord<f64>,
}

/// Parse every `<text>` element under `root` into seat labels.
///
/// Only elements whose trimmed text content is a bare unsigned integer are
/// kept. Position comes from the `x`/`y` attributes, falling back to the
/// translation terms of a `matrix(...)` transform; labels with neither are
/// silently dropped, as are integers too large to be a seat id.
pub(crate) fn extract_labels(root: Node<'_, '_>) -> Vec<MapLabel> {
    root.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "text")
        .filter_map(label_of)
        .collect()
}

fn label_of(node: Node<'_, '_>) -> Option<MapLabel> {
    let content: String = node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let value = content.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) { return None }
    let seat = SeatId(value.parse::<u32>().ok()?);

    let at = explicit_position(node)
        .or_else(|| node.attribute("transform").and_then(matrix_translation))?;
    Some(MapLabel { seat, at })
}

fn explicit_position(node: Node<'_, '_>) -> Option<Coord<f64>> {
    let coord = |name: &str| {
        node.attribute(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };
    Some(Coord { x: coord("x")?, y: coord("y")? })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_of(svg: &str) -> Vec<MapLabel> {
        let doc = roxmltree::Document::parse(svg).unwrap();
        extract_labels(doc.root_element())
    }

    #[test]
    fn keeps_only_integer_text() {
        let labels = labels_of(r#"<svg>
            <text x="1" y="2">12</text>
            <text x="1" y="2"> 7 </text>
            <text x="1" y="2">Dhaka</text>
            <text x="1" y="2">-3</text>
            <text x="1" y="2">4.5</text>
            <text x="1" y="2"></text>
        </svg>"#);
        let seats: Vec<_> = labels.iter().map(|l| l.seat.0).collect();
        assert_eq!(seats, vec![12, 7]);
    }

    #[test]
    fn text_content_spans_tspans() {
        let labels = labels_of(r#"<svg><text x="3" y="4"><tspan>2</tspan><tspan>9</tspan></text></svg>"#);
        assert_eq!(labels, vec![MapLabel { seat: SeatId(29), at: Coord { x: 3.0, y: 4.0 } }]);
    }

    #[test]
    fn falls_back_to_matrix_translation() {
        let labels = labels_of(r#"<svg>
            <text transform="matrix(1 0 0 1 120.5 40)">5</text>
            <text x="10 20" y="4" transform="matrix(1,0,0,1,8,9)">6</text>
            <text>8</text>
            <text transform="rotate(45)">9</text>
        </svg>"#);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].at, Coord { x: 120.5, y: 40.0 });
        // a coordinate list in x is not a single position
        assert_eq!(labels[1].at, Coord { x: 8.0, y: 9.0 });
    }

    #[test]
    fn oversized_integers_are_discarded() {
        let labels = labels_of(r#"<svg><text x="0" y="0">99999999999999</text></svg>"#);
        assert!(labels.is_empty());
    }
}

use geo::{Coord, Rect};
use roxmltree::Node;
use tracing::trace;

use crate::geom::{parse_points, path_bounds, Bounds};
use crate::types::{Generation, ShapeId};

/// Graphical primitives that can represent (part of) a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Path,
    Polygon,
    Polyline,
    Rect,
    Circle,
    Ellipse,
}

impl ShapeKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "path" => Some(ShapeKind::Path),
            "polygon" => Some(ShapeKind::Polygon),
            "polyline" => Some(ShapeKind::Polyline),
            "rect" => Some(ShapeKind::Rect),
            "circle" => Some(ShapeKind::Circle),
            "ellipse" => Some(ShapeKind::Ellipse),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ShapeKind::Path => "path",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Polyline => "polyline",
            ShapeKind::Rect => "rect",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
        }
    }
}

/// One drawable primitive of a loaded map document.
#[derive(Debug, Clone)]
pub struct VectorShape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    /// Bounding box in the shape's local user space; `None` for degenerate
    /// or unparseable geometry.
    pub bounds: Option<Rect<f64>>,
    /// Fill the shape had when the document was loaded ("" if none).
    pub original_fill: String,
}

impl VectorShape {
    #[inline]
    pub fn center(&self) -> Option<Coord<f64>> { self.bounds.map(|b| b.center()) }
}

/// Enumerate every primitive under `root` in document order, assigning
/// sequential ids for `generation`.
pub(crate) fn extract_shapes(root: Node<'_, '_>, generation: Generation) -> Vec<VectorShape> {
    let mut shapes = Vec::new();
    for (node, kind) in shape_nodes(root) {
        let id = ShapeId::new(generation, shapes.len() as u32);
        let bounds = shape_bounds(node, kind);
        if bounds.is_none() { trace!("[map::shapes] {id} ({}) has no usable bounds", kind.tag()) }

        shapes.push(VectorShape {
            id,
            kind,
            bounds,
            original_fill: original_fill(node),
        });
    }
    shapes
}

/// Primitive elements under `root` in document order. Shape ids index into
/// this sequence.
pub(crate) fn shape_nodes<'a, 'input>(root: Node<'a, 'input>) -> impl Iterator<Item = (Node<'a, 'input>, ShapeKind)> {
    root.descendants()
        .filter(|n| n.is_element())
        .filter_map(|n| ShapeKind::from_tag(n.tag_name().name()).map(|kind| (n, kind)))
}

/// Parse a length attribute in user units ("12", "12.5px"). Percentages and
/// other units are not resolvable without layout and yield `None`.
fn length(node: Node<'_, '_>, name: &str) -> Option<f64> {
    let raw = node.attribute(name)?.trim();
    let raw = raw.strip_suffix("px").unwrap_or(raw);
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn shape_bounds(node: Node<'_, '_>, kind: ShapeKind) -> Option<Rect<f64>> {
    let mut bounds = Bounds::default();
    match kind {
        ShapeKind::Path => return path_bounds(node.attribute("d")?),
        ShapeKind::Polygon | ShapeKind::Polyline => {
            for p in parse_points(node.attribute("points")?) { bounds.add(p) }
        }
        ShapeKind::Rect => {
            let x = length(node, "x").unwrap_or(0.0);
            let y = length(node, "y").unwrap_or(0.0);
            let w = length(node, "width")?;
            let h = length(node, "height")?;
            if w < 0.0 || h < 0.0 { return None }
            bounds.add(Coord { x, y });
            bounds.add(Coord { x: x + w, y: y + h });
        }
        ShapeKind::Circle => {
            let cx = length(node, "cx").unwrap_or(0.0);
            let cy = length(node, "cy").unwrap_or(0.0);
            let r = length(node, "r")?;
            if r < 0.0 { return None }
            bounds.add(Coord { x: cx - r, y: cy - r });
            bounds.add(Coord { x: cx + r, y: cy + r });
        }
        ShapeKind::Ellipse => {
            let cx = length(node, "cx").unwrap_or(0.0);
            let cy = length(node, "cy").unwrap_or(0.0);
            let (rx, ry) = match (length(node, "rx"), length(node, "ry")) {
                (Some(rx), Some(ry)) => (rx, ry),
                (Some(r), None) | (None, Some(r)) => (r, r),
                (None, None) => return None,
            };
            if rx < 0.0 || ry < 0.0 { return None }
            bounds.add(Coord { x: cx - rx, y: cy - ry });
            bounds.add(Coord { x: cx + rx, y: cy + ry });
        }
    }
    bounds.to_rect()
}

/// Value of `fill:` inside an inline `style` attribute.
fn style_fill(style: &str) -> Option<&str> {
    style.split(';').find_map(|decl| {
        let (key, value) = decl.split_once(':')?;
        (key.trim() == "fill").then(|| value.trim()).filter(|v| !v.is_empty())
    })
}

/// Fill attribute, else inline style, else the nearest ancestor's fill
/// (inherited), else empty.
fn original_fill(node: Node<'_, '_>) -> String {
    node.ancestors()
        .filter(|n| n.is_element())
        .find_map(|n| {
            n.attribute("fill")
                .map(str::trim)
                .filter(|f| !f.is_empty() && *f != "inherit")
                .or_else(|| n.attribute("style").and_then(style_fill).filter(|f| *f != "inherit"))
        })
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shapes_of(svg: &str) -> Vec<VectorShape> {
        let doc = roxmltree::Document::parse(svg).unwrap();
        extract_shapes(doc.root_element(), Generation(1))
    }

    #[test]
    fn enumerates_primitives_in_document_order() {
        let shapes = shapes_of(r#"<svg xmlns="http://www.w3.org/2000/svg">
            <g><rect x="0" y="0" width="10" height="10"/></g>
            <text>1</text>
            <circle cx="5" cy="5" r="2"/>
            <path d="M0 0 L4 4"/>
        </svg>"#);
        let kinds: Vec<_> = shapes.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![ShapeKind::Rect, ShapeKind::Circle, ShapeKind::Path]);
        let idx: Vec<_> = shapes.iter().map(|s| s.id.index).collect();
        assert_eq!(idx, vec![0, 1, 2]);
        assert!(shapes.iter().all(|s| s.id.generation == Generation(1)));
    }

    #[test]
    fn centers_of_simple_shapes() {
        let shapes = shapes_of(r#"<svg>
            <rect x="5" y="5" width="10" height="10"/>
            <circle cx="10" cy="10" r="3"/>
            <ellipse cx="10" cy="10" rx="4"/>
            <polygon points="5,5 15,5 15,15"/>
        </svg>"#);
        for s in &shapes {
            assert_eq!(s.center(), Some(Coord { x: 10.0, y: 10.0 }), "{:?}", s.kind);
        }
    }

    #[test]
    fn degenerate_shapes_have_no_bounds() {
        let shapes = shapes_of(r#"<svg><rect width="10"/><circle r="-1"/><path d=""/><rect width="50%" height="10"/></svg>"#);
        assert!(shapes.iter().all(|s| s.bounds.is_none()));
    }

    #[test]
    fn original_fill_prefers_attribute_then_style_then_inherited() {
        let shapes = shapes_of(r##"<svg>
            <path d="M0 0" fill="#111" style="fill:#222"/>
            <path d="M0 0" style="stroke:red; fill: #333"/>
            <g fill="#444"><path d="M0 0"/></g>
            <path d="M0 0"/>
        </svg>"##);
        let fills: Vec<_> = shapes.iter().map(|s| s.original_fill.as_str()).collect();
        assert_eq!(fills, vec!["#111", "#333", "#444", ""]);
    }

    #[test]
    fn style_fill_ignores_other_properties() {
        assert_eq!(style_fill("fill-opacity:0.5;fill:#abc"), Some("#abc"));
        assert_eq!(style_fill("stroke:#000"), None);
    }
}

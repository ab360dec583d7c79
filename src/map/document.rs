use roxmltree::{Document, Node, ParsingOptions};
use tracing::debug;

use crate::error::DocumentError;
use crate::types::{Generation, ShapeId};
use super::{labels::extract_labels, shapes::extract_shapes, MapLabel, VectorShape};

/// A parsed map document: its shapes and seat labels, owned for the
/// lifetime of one load.
#[derive(Debug, Clone)]
pub struct MapDocument {
    generation: Generation,
    shapes: Vec<VectorShape>,
    labels: Vec<MapLabel>,
}

impl MapDocument {
    /// Parse SVG text.
    ///
    /// Shapes are taken from under the element whose id equals `shapes_root`
    /// when such an element exists, otherwise from the whole document.
    /// Labels are always taken from the whole document.
    pub fn parse(text: &str, generation: Generation, shapes_root: Option<&str>) -> Result<Self, DocumentError> {
        let doc = parse_svg(text)?;
        let svg = doc.root_element();

        let root = find_shapes_root(svg, shapes_root);

        let shapes = extract_shapes(root, generation);
        let labels = extract_labels(svg);
        debug!(
            "[map::document] {generation}: {} shapes under <{}>, {} seat labels",
            shapes.len(),
            root.attribute("id").unwrap_or("svg"),
            labels.len()
        );

        Ok(Self {
            generation,
            shapes,
            labels,
        })
    }

    /// An empty document, used when a load fails.
    pub fn empty(generation: Generation) -> Self {
        Self { generation, shapes: Vec::new(), labels: Vec::new() }
    }

    #[inline] pub fn generation(&self) -> Generation { self.generation }

    #[inline] pub fn shapes(&self) -> &[VectorShape] { &self.shapes }

    #[inline] pub fn labels(&self) -> &[MapLabel] { &self.labels }

    /// Look up a shape of this document. Ids from another generation miss.
    pub fn shape(&self, id: ShapeId) -> Option<&VectorShape> {
        if id.generation != self.generation { return None }
        self.shapes.get(id.index as usize)
    }

    /// Look up a shape by its DOM-style id ("shape-3").
    pub fn shape_by_name(&self, name: &str) -> Option<&VectorShape> {
        let index = name.strip_prefix("shape-")?.parse::<u32>().ok()?;
        self.shapes.get(index as usize)
    }
}

/// Parse SVG text into a tree, requiring an `<svg>` root element.
pub(crate) fn parse_svg(text: &str) -> Result<Document<'_>, DocumentError> {
    let options = ParsingOptions { allow_dtd: true, ..ParsingOptions::default() };
    let doc = Document::parse_with_options(text, options)?;
    if doc.root_element().tag_name().name() != "svg" { return Err(DocumentError::NotSvg) }
    Ok(doc)
}

/// The element whose id is `id`, else `svg` itself.
pub(crate) fn find_shapes_root<'a, 'input>(svg: Node<'a, 'input>, id: Option<&str>) -> Node<'a, 'input> {
    id.and_then(|id| svg.descendants().find(|n| n.is_element() && n.attribute("id") == Some(id)))
        .unwrap_or(svg)
}

//! Recolored SVG output.
//!
//! The source text is copied through unchanged except for the start tags of
//! seat shapes, whose fill and style are replaced by the resolved layer
//! state and which gain `data-shape-id` / `data-seat-id` attributes.

use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use roxmltree::Node;

use crate::fill::{FillLayerController, ShapeStyle};
use crate::map::{find_shapes_root, parse_svg, shape_nodes, Bindings, MapDocument};
use crate::types::ShapeId;

/// Attributes rewritten on every shape.
const REPLACED: [&str; 4] = ["fill", "style", "data-shape-id", "data-seat-id"];

/// Style properties owned by the fill layers.
const OWNED_PROPERTIES: [&str; 3] = ["fill", "opacity", "filter"];

/// Render `text` (the source of `document`) with the current fill state.
pub fn render_svg(
    text: &str,
    document: &MapDocument,
    bindings: &Bindings,
    fills: &FillLayerController,
    shapes_root: Option<&str>,
) -> Result<String> {
    let doc = parse_svg(text).context("[io::svg] Failed to re-parse map document")?;
    let root = find_shapes_root(doc.root_element(), shapes_root);

    let mut out = String::with_capacity(text.len() + document.shapes().len() * 96);
    let mut copied = 0;
    let mut count = 0;
    for (index, (node, _)) in shape_nodes(root).enumerate() {
        let id = ShapeId::new(document.generation(), index as u32);
        let Some(style) = fills.style(id) else {
            bail!("[io::svg] {id} has no fill state; document and source text disagree");
        };
        let start = node.range().start;
        out.push_str(&text[copied..start]);
        copied = write_tag(&mut out, text, node, id, bindings, &style)
            .with_context(|| format!("[io::svg] Malformed start tag for {id} at byte {start}"))?;
        count += 1;
    }
    out.push_str(&text[copied..]);

    if count != document.shapes().len() {
        bail!("[io::svg] source has {count} shapes but the document has {}", document.shapes().len());
    }
    Ok(out)
}

/// Write the rewritten start tag of `node` and return the byte offset just
/// past the source start tag.
///
/// Kept attributes (namespace declarations included) are copied from the
/// source text untouched; only the replaced ones are cut out by range.
fn write_tag(
    out: &mut String,
    text: &str,
    node: Node<'_, '_>,
    id: ShapeId,
    bindings: &Bindings,
    style: &ShapeStyle,
) -> Option<usize> {
    let start = node.range().start;
    let name_end = start + text[start..].find(|c: char| c.is_whitespace() || c == '/' || c == '>')?;
    let attrs_end = node.attributes().map(|a| a.range().end).max().unwrap_or(name_end).max(name_end);
    let gt = attrs_end + text[attrs_end..].find('>')?;
    let tail = text[attrs_end..gt].trim_end();
    let self_closing = tail.ends_with('/');

    out.push_str(&text[start..name_end]);
    let mut pos = name_end;
    let mut kept_style = String::new();
    for attr in node.attributes().filter(|a| a.namespace().is_none() && REPLACED.contains(&a.name())) {
        if attr.name() == "style" { kept_style = strip_owned_properties(attr.value()) }
        let range = attr.range();
        out.push_str(text[pos..range.start].trim_end());
        pos = range.end;
    }
    out.push_str(text[pos..gt].trim_end().trim_end_matches('/').trim_end());

    if !style.fill.is_empty() {
        let _ = write!(out, r#" fill="{}""#, escape_attr(&style.fill));
    }
    let mut css = kept_style;
    let _ = write!(css, "opacity:{}", style.opacity);
    if let Some(glow) = &style.glow {
        let _ = write!(css, ";filter:{glow}");
    }
    let _ = write!(out, r#" style="{}""#, escape_attr(&css));
    let _ = write!(out, r#" data-shape-id="{id}""#);
    if let Some(seat) = bindings.seat_of(id) {
        let _ = write!(out, r#" data-seat-id="{seat}""#);
    }
    out.push_str(if self_closing { "/>" } else { ">" });
    Some(gt + 1)
}

/// Drop the declarations the fill layers own from a decoded style value;
/// the rest keeps a trailing `;`.
fn strip_owned_properties(style: &str) -> String {
    style.split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let key = decl.split_once(':').map_or(*decl, |(k, _)| k).trim();
            !OWNED_PROPERTIES.contains(&key)
        })
        .fold(String::new(), |mut acc, decl| {
            acc.push_str(decl);
            acc.push(';');
            acc
        })
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

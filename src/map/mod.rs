//! Loaded map documents and the geometric shape → seat binding.

mod binding;
mod document;
mod labels;
mod shapes;

pub use binding::{build_bindings, Bindings};
pub use document::MapDocument;
pub use labels::MapLabel;
pub use shapes::{ShapeKind, VectorShape};

pub(crate) use document::{find_shapes_root, parse_svg};
pub(crate) use shapes::shape_nodes;

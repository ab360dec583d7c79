mod bbox;
mod path;
mod transform;

pub(crate) use bbox::{Bounds, IndexedPoint};
pub(crate) use path::{parse_points, path_bounds};
pub(crate) use transform::matrix_translation;

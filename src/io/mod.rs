//! Source fetching and file output.
//!
//! - `http` - map document and winners feed retrieval
//! - `svg` - recolored SVG rendering
//! - `write` - atomic file writes

pub(crate) mod http;
mod svg;
mod write;

pub use svg::render_svg;
pub use write::write_atomic;

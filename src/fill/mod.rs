//! Layered fill state of map shapes.

mod color;
mod controller;
mod layer;

pub use color::ColorTable;
pub use controller::{Changed, FillLayerController, ShapeStyle};
pub use layer::{FillLayer, FillState};

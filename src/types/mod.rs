mod ids;
mod party;

pub use ids::{Generation, SeatId, ShapeId};
pub use party::PartyRef;

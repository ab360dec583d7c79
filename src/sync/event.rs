use crate::results::Candidate;
use crate::types::{SeatId, ShapeId};
use super::MapSource;

/// Input to the map event loop from the UI and its collaborators.
#[derive(Debug, Clone)]
pub enum MapEvent {
    /// Replace the map document. Cancels a load still in flight.
    Load(MapSource),
    PointerEnter(ShapeId),
    PointerLeave(ShapeId),
    Click(ShapeId),
    /// Selection driven from outside the map (e.g. a seat picker).
    Select(Option<ShapeId>),
    Candidates(Vec<Candidate>),
    /// Seat roster; seats without candidates lead with "No votes".
    Seats(Vec<SeatId>),
    /// One vote cast for the candidate with this id.
    Vote(String),
    Dispose,
}

use std::collections::BTreeMap;

use crate::fill::ColorTable;
use crate::types::{PartyRef, SeatId};
use super::{LeaderKind, SeatLeader, WinnerRecord, aggregate::NO_WINNER};

/// Overlay declared winners on a locally computed leader map.
///
/// Each seat named by `winners` is replaced outright; seats the feed does
/// not mention keep their local leader. An empty feed returns `leaders`
/// unchanged. Later records for the same seat win.
pub fn apply_winners(
    leaders: &BTreeMap<SeatId, SeatLeader>,
    winners: &[WinnerRecord],
    colors: &ColorTable,
) -> BTreeMap<SeatId, SeatLeader> {
    let mut merged = leaders.clone();
    for winner in winners {
        let label = winner.party_label.as_deref();
        merged.insert(winner.seat_id, SeatLeader {
            seat_id: winner.seat_id,
            party: PartyRef::from_label(label),
            leader_name: winner.candidate_name.clone().unwrap_or_else(|| NO_WINNER.to_string()),
            votes: winner.votes,
            margin: 0,
            party_color: label.and_then(|l| colors.resolve(l)),
            kind: LeaderKind::Declared,
        });
    }
    merged
}

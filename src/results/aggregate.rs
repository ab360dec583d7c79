use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::{PartyRef, SeatId};
use super::Candidate;

pub const NO_VOTES: &str = "No votes";
pub const TIED: &str = "Tied";
pub const NO_WINNER: &str = "No winner";

/// How a seat's leader record was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeaderKind {
    /// A single candidate has strictly the most votes.
    Leading,
    /// The top two candidates have the same number of votes.
    Tied,
    /// The seat has no candidates.
    NoVotes,
    /// Taken from the external winners feed.
    Declared,
}

/// The current leader of one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatLeader {
    pub seat_id: SeatId,
    pub party: PartyRef,
    pub leader_name: String,
    pub votes: u64,
    /// Votes ahead of the runner-up; 0 for sentinels and declared winners.
    pub margin: u64,
    /// Color carried by the record itself, overriding the color table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_color: Option<String>,
    pub kind: LeaderKind,
}

impl SeatLeader {
    pub fn no_votes(seat_id: SeatId) -> Self {
        Self {
            seat_id,
            party: PartyRef::Neutral,
            leader_name: NO_VOTES.to_string(),
            votes: 0,
            margin: 0,
            party_color: None,
            kind: LeaderKind::NoVotes,
        }
    }

    pub fn tied(seat_id: SeatId, votes: u64) -> Self {
        Self {
            seat_id,
            party: PartyRef::Neutral,
            leader_name: TIED.to_string(),
            votes,
            margin: 0,
            party_color: None,
            kind: LeaderKind::Tied,
        }
    }
}

/// Derive the leader of every seat that has at least one candidate.
///
/// Within a seat, candidates are ranked by descending votes; equal counts
/// keep their input order. The output is keyed by seat, so it does not
/// depend on the order of `candidates`.
pub fn compute_leaders(candidates: &[Candidate]) -> BTreeMap<SeatId, SeatLeader> {
    let mut groups: AHashMap<SeatId, SmallVec<[&Candidate; 8]>> = AHashMap::new();
    for candidate in candidates {
        groups.entry(candidate.seat_id).or_default().push(candidate);
    }

    groups.into_iter()
        .map(|(seat, mut group)| {
            group.sort_by(|a, b| b.votes.cmp(&a.votes));
            (seat, leader_of(seat, &group))
        })
        .collect()
}

/// Like [`compute_leaders`], and also emits the "No votes" sentinel for every
/// seat in `seats` that has no candidates.
pub fn compute_leaders_for_seats(
    seats: impl IntoIterator<Item = SeatId>,
    candidates: &[Candidate],
) -> BTreeMap<SeatId, SeatLeader> {
    let mut leaders = compute_leaders(candidates);
    for seat in seats {
        leaders.entry(seat).or_insert_with(|| SeatLeader::no_votes(seat));
    }
    leaders
}

fn leader_of(seat: SeatId, ranked: &[&Candidate]) -> SeatLeader {
    match ranked {
        [] => SeatLeader::no_votes(seat),
        [top, second, ..] if top.votes == second.votes => SeatLeader::tied(seat, top.votes),
        [top, rest @ ..] => SeatLeader {
            seat_id: seat,
            party: PartyRef::Party(top.party_id.clone()),
            leader_name: top.name.clone(),
            votes: top.votes,
            margin: rest.first().map_or(top.votes, |second| top.votes - second.votes),
            party_color: None,
            kind: LeaderKind::Leading,
        },
    }
}

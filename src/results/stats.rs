//! Seat tallies for the summary bar and the full seat grid.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::Serialize;

use crate::types::{PartyRef, SeatId};
use super::{Party, Seat, SeatLeader, WinnerRecord};

pub const DEFAULT_TOTAL_SEATS: u32 = 300;
pub const PLACEHOLDER_VOTERS: u64 = 150_000;

/// Seats won by one party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyTally {
    pub party_id: String,
    pub seats: u32,
    /// Share of `total_seats`, rounded to a whole percent.
    pub percent: u32,
}

/// Count seats per roster party.
///
/// With a non-empty winners feed, declared winners are counted by party
/// label against each party's display name. Otherwise local leaders are
/// counted by party id. Neutral sentinels are never counted.
pub fn party_tally(
    parties: &[Party],
    leaders: &BTreeMap<SeatId, SeatLeader>,
    winners: &[WinnerRecord],
    total_seats: u32,
) -> Vec<PartyTally> {
    let mut counts: AHashMap<&str, u32> = AHashMap::new();
    let by_name = !winners.is_empty();
    if by_name {
        for label in winners.iter().filter_map(|w| w.party_label.as_deref()).filter(|l| !l.trim().is_empty()) {
            *counts.entry(label).or_default() += 1;
        }
    } else {
        for leader in leaders.values() {
            if let PartyRef::Party(id) = &leader.party { *counts.entry(id.as_str()).or_default() += 1 }
        }
    }

    parties.iter()
        .map(|party| {
            let key = if by_name { party.name.as_str() } else { party.id.as_str() };
            let seats = counts.get(key).copied().unwrap_or(0);
            PartyTally { party_id: party.id.clone(), seats, percent: percent(seats, total_seats) }
        })
        .collect()
}

/// The party with the most seats; ties keep roster order. `None` when no
/// party has a seat.
pub fn top_party(tally: &[PartyTally]) -> Option<&PartyTally> {
    tally.iter()
        .filter(|t| t.seats > 0)
        .fold(None, |best: Option<&PartyTally>, t| match best {
            Some(b) if b.seats >= t.seats => Some(b),
            _ => Some(t),
        })
}

fn percent(seats: u32, total: u32) -> u32 {
    if total == 0 { return 0 }
    (f64::from(seats) / f64::from(total) * 100.0).round() as u32
}

/// Seats `1..=total_seats`, taking known seats from `seats` and filling the
/// rest with placeholders.
pub fn seat_grid(seats: &[Seat], total_seats: u32) -> Vec<Seat> {
    let known: AHashMap<SeatId, &Seat> = seats.iter().map(|s| (s.id, s)).collect();
    (1..=total_seats)
        .map(SeatId)
        .map(|id| known.get(&id).map_or_else(|| placeholder(id), |s| (*s).clone()))
        .collect()
}

fn placeholder(id: SeatId) -> Seat {
    Seat {
        id,
        name: format!("Seat {id}"),
        division_id: String::new(),
        district_id: String::new(),
        total_voters: PLACEHOLDER_VOTERS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{compute_leaders, Candidate};

    fn parties() -> Vec<Party> {
        vec![
            Party { id: "bnp".into(), name: "BNP".into(), color: "#006a4e".into() },
            Party { id: "ncp".into(), name: "NCP".into(), color: "#f97316".into() },
        ]
    }

    fn cand(seat: u32, party: &str, votes: u64) -> Candidate {
        Candidate {
            id: format!("{seat}-{party}"),
            seat_id: SeatId(seat),
            party_id: party.into(),
            name: party.to_uppercase(),
            votes,
            party_label: None,
        }
    }

    #[test]
    fn counts_local_leaders_by_party_id() {
        let leaders = compute_leaders(&[
            cand(1, "bnp", 10), cand(1, "ncp", 3),
            cand(2, "bnp", 4),
            cand(3, "ncp", 5), cand(3, "bnp", 5),
        ]);
        let tally = party_tally(&parties(), &leaders, &[], 300);
        assert_eq!(tally[0], PartyTally { party_id: "bnp".into(), seats: 2, percent: 1 });
        assert_eq!(tally[1].seats, 0);
        assert_eq!(top_party(&tally).map(|t| t.party_id.as_str()), Some("bnp"));
    }

    #[test]
    fn live_feed_counts_winners_by_label() {
        let winners: Vec<_> = (1..=4)
            .map(|seat| WinnerRecord {
                seat_id: SeatId(seat),
                candidate_name: None,
                party_label: Some(if seat == 4 { "BNP" } else { "NCP" }.into()),
                votes: 0,
            })
            .collect();
        let tally = party_tally(&parties(), &BTreeMap::new(), &winners, 10);
        assert_eq!(tally[1], PartyTally { party_id: "ncp".into(), seats: 3, percent: 30 });
        assert_eq!(tally[0].seats, 1);
        assert_eq!(top_party(&tally).map(|t| t.party_id.as_str()), Some("ncp"));
    }

    #[test]
    fn top_party_is_none_without_seats_and_ties_keep_roster_order() {
        let empty = party_tally(&parties(), &BTreeMap::new(), &[], 300);
        assert!(top_party(&empty).is_none());

        let leaders = compute_leaders(&[cand(1, "ncp", 1), cand(2, "bnp", 1)]);
        let tally = party_tally(&parties(), &leaders, &[], 300);
        assert_eq!(top_party(&tally).map(|t| t.party_id.as_str()), Some("bnp"));
    }

    #[test]
    fn seat_grid_fills_unknown_seats() {
        let known = Seat {
            id: SeatId(2),
            name: "Dhaka-2".into(),
            division_id: "dhaka".into(),
            district_id: "dhaka".into(),
            total_voters: 400_000,
        };
        let grid = seat_grid(&[known.clone()], 3);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1], known);
        assert_eq!(grid[0].name, "Seat 1");
        assert_eq!(grid[2].total_voters, PLACEHOLDER_VOTERS);
    }
}

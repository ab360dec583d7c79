use serde::{Deserialize, Serialize};

use crate::types::SeatId;

/// One candidate standing for a seat, with the current tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub seat_id: SeatId,
    pub party_id: String,
    pub name: String,
    #[serde(default)]
    pub votes: u64,
    /// Display label of the party, when the roster provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_label: Option<String>,
}

/// A seat in the national roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: SeatId,
    pub name: String,
    #[serde(default)]
    pub division_id: String,
    #[serde(default)]
    pub district_id: String,
    #[serde(default)]
    pub total_voters: u64,
}

/// A party with its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// One entry of the external winners feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerRecord {
    pub seat_id: SeatId,
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub party_label: Option<String>,
    #[serde(default)]
    pub votes: u64,
}

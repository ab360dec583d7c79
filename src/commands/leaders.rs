use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, LeadersArgs};
use crate::results::{apply_winners, compute_leaders_for_seats, stats, Seat, SeatLeader};

use super::ResultInputs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeadersReport<'a> {
    leaders: Vec<&'a SeatLeader>,
    tally: Vec<stats::PartyTally>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_party: Option<String>,
}

pub fn run(cli: &Cli, args: &LeadersArgs) -> Result<()> {
    let config = super::load_config(cli)?;
    let inputs = ResultInputs::load(&args.results, &config)?;
    let seats: Vec<Seat> = args.seats.as_deref().map(super::read_json).transpose()?.unwrap_or_default();

    let local = compute_leaders_for_seats(seats.iter().map(|s| s.id), &inputs.candidates);
    let leaders = apply_winners(&local, &inputs.winners, &inputs.colors);
    info!(
        "[leaders] {} candidates, {} declared winners -> {} seats",
        inputs.candidates.len(),
        inputs.winners.len(),
        leaders.len()
    );

    let tally = stats::party_tally(&inputs.parties, &local, &inputs.winners, args.total_seats);
    let top_party = stats::top_party(&tally).map(|t| t.party_id.clone());
    let report = LeadersReport { leaders: leaders.values().collect(), tally, top_party };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

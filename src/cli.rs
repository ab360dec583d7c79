use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Election seat map CLI
#[derive(Parser, Debug)]
#[command(name = "seatmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON config file overriding the map defaults
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the shape → seat bindings of a map as JSON
    Bind(BindArgs),

    /// Aggregate a candidate tally into per-seat leaders
    Leaders(LeadersArgs),

    /// Write a recolored copy of a map (forbids stdout)
    Render(RenderArgs),

    /// Load a map, poll the winners feed and log leader changes until Ctrl-C
    Watch(WatchArgs),
}

/// Result inputs shared by the commands that compute leaders.
#[derive(Args, Debug, Default)]
pub struct ResultsArgs {
    /// Candidates JSON array ({id, seatId, partyId, name, votes})
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub candidates: Option<PathBuf>,

    /// Winners feed snapshot ([{seatId, candidateName, partyLabel, votes}])
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub winners: Option<PathBuf>,

    /// Party roster JSON array ({id, name, color})
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub parties: Option<PathBuf>,

    /// Party color table JSON object (label → color)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub colors: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BindArgs {
    /// Map document (file path or http(s) URL)
    pub map: String,

    /// Override the binding distance threshold
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Write JSON here instead of stdout
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct LeadersArgs {
    #[command(flatten)]
    pub results: ResultsArgs,

    /// Seat roster JSON array; listed seats without candidates get "No votes"
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub seats: Option<PathBuf>,

    /// Parliament size used for seat shares
    #[arg(long, default_value_t = crate::results::stats::DEFAULT_TOTAL_SEATS)]
    pub total_seats: u32,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Map document (file path or http(s) URL)
    pub map: String,

    #[command(flatten)]
    pub results: ResultsArgs,

    /// Shape to render as selected, e.g. shape-12
    #[arg(long)]
    pub select: Option<String>,

    /// Output SVG file (must be a file path; "-" is rejected)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Map document (file path or http(s) URL)
    pub map: String,

    /// Winners feed (file path or http(s) URL)
    #[arg(long)]
    pub feed: String,

    #[command(flatten)]
    pub results: ResultsArgs,
}

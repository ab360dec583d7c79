use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use seatmap::cli::{Cli, Commands};
use seatmap::commands::{bind, leaders, render, watch};

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Commands::Bind(args) => bind::run(&cli, args).await,
        Commands::Leaders(args) => leaders::run(&cli, args),
        Commands::Render(args) => render::run(&cli, args).await,
        Commands::Watch(args) => watch::run(&cli, args).await,
    }
}

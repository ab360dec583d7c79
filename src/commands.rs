pub mod bind;
pub mod leaders;
pub mod render;
pub mod watch;

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::cli::{Cli, ResultsArgs};
use crate::config::MapConfig;
use crate::fill::ColorTable;
use crate::results::{Candidate, Party, WinnerRecord};

/// Config from `--config`, else defaults.
pub(crate) fn load_config(cli: &Cli) -> Result<MapConfig> {
    match &cli.config {
        Some(path) => MapConfig::from_json_file(path),
        None => Ok(MapConfig::default()),
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("[commands] Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("[commands] Failed to parse {}", path.display()))
}

/// Result inputs resolved from [`ResultsArgs`]; missing files are empty.
#[derive(Debug, Default)]
pub(crate) struct ResultInputs {
    pub candidates: Vec<Candidate>,
    pub winners: Vec<WinnerRecord>,
    pub parties: Vec<Party>,
    pub colors: ColorTable,
}

impl ResultInputs {
    pub(crate) fn load(args: &ResultsArgs, config: &MapConfig) -> Result<Self> {
        let candidates = args.candidates.as_deref().map(read_json).transpose()?.unwrap_or_default();
        let winners = args.winners.as_deref().map(read_json).transpose()?.unwrap_or_default();
        let parties: Vec<Party> = args.parties.as_deref().map(read_json).transpose()?.unwrap_or_default();
        let colors = match &args.colors {
            Some(path) => ColorTable::from_json_file(path, config.palette.clone())?,
            None => ColorTable::new(config.palette.clone()),
        };
        Ok(Self { candidates, winners, colors: colors.with_parties(&parties), parties })
    }
}

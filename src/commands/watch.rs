use std::{collections::BTreeMap, sync::Arc};

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::{Cli, WatchArgs};
use crate::results::{FileResultsSource, HttpResultsSource, ResultsSource, SeatLeader};
use crate::sync::{DocumentLoader, FeedStatus, MapEvent, MapRuntime, MapSource, MapState, MapSync, SyncListener};
use crate::types::SeatId;

use super::ResultInputs;

/// Logs leader changes between successive updates.
#[derive(Default)]
struct ChangeLog {
    last: BTreeMap<SeatId, SeatLeader>,
}

impl SyncListener for ChangeLog {
    fn on_leaders(&mut self, leaders: &BTreeMap<SeatId, SeatLeader>) {
        let changed = leaders.iter()
            .filter(|(seat, leader)| self.last.get(*seat) != Some(*leader))
            .inspect(|(seat, leader)| {
                info!("[watch] seat {seat}: {} ({}, {} votes)", leader.leader_name, leader.party, leader.votes)
            })
            .count();
        if changed > 0 { info!("[watch] {changed} seats changed") }
        self.last = leaders.clone();
    }

    fn on_status(&mut self, status: FeedStatus) {
        match status {
            FeedStatus::Fallback => warn!("[watch] winners feed unavailable; using fallback data"),
            _ => info!("[watch] feed status: {status:?}"),
        }
    }

    fn on_state(&mut self, state: MapState) {
        info!("[watch] map state: {state:?}");
    }
}

pub async fn run(cli: &Cli, args: &WatchArgs) -> Result<()> {
    let config = super::load_config(cli)?;
    let inputs = ResultInputs::load(&args.results, &config)?;

    let feed: Arc<dyn ResultsSource> = match MapSource::parse(&args.feed) {
        MapSource::Url(url) => Arc::new(HttpResultsSource::new(url, config.request_timeout())?),
        MapSource::File(path) => Arc::new(FileResultsSource::new(path)),
        MapSource::Inline(_) => bail!("[watch] inline feeds are not supported"),
    };

    let (loader, loads) = DocumentLoader::new(&config)?;
    let period = config.poll_interval();
    let sync = MapSync::new(config, inputs.colors, ChangeLog::default());
    let runtime = MapRuntime::new(sync, loader, loads).with_feed(feed, period);

    let (tx, rx) = mpsc::channel(16);
    tx.send(MapEvent::Load(MapSource::parse(&args.map))).await?;
    tx.send(MapEvent::Candidates(inputs.candidates)).await?;
    let task = tokio::spawn(runtime.run(rx));

    tokio::signal::ctrl_c().await?;
    info!("[watch] interrupted, shutting down");
    tx.send(MapEvent::Dispose).await?;
    let sync = task.await?;
    info!("[watch] final: {} seats with leaders, feed {:?}", sync.leaders().len(), sync.feed_status());
    Ok(())
}

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::results::{FeedUpdate, ResultsPoller, ResultsSource};
use super::{DocumentLoader, Loaded, MapEvent, MapSync, SyncListener};

/// Event loop owning a [`MapSync`] and the background work feeding it.
pub struct MapRuntime<L: SyncListener> {
    sync: MapSync<L>,
    loader: DocumentLoader,
    loads: mpsc::UnboundedReceiver<Loaded>,
    poller: Option<ResultsPoller>,
    feed: Option<mpsc::Receiver<FeedUpdate>>,
}

impl<L: SyncListener> MapRuntime<L> {
    pub fn new(sync: MapSync<L>, loader: DocumentLoader, loads: mpsc::UnboundedReceiver<Loaded>) -> Self {
        Self { sync, loader, loads, poller: None, feed: None }
    }

    /// Poll `source` at the configured interval for the lifetime of the loop.
    pub fn with_feed(mut self, source: Arc<dyn ResultsSource>, period: std::time::Duration) -> Self {
        let (tx, rx) = mpsc::channel(4);
        self.poller = Some(ResultsPoller::spawn(source, period, tx));
        self.feed = Some(rx);
        self
    }

    #[inline] pub fn sync(&self) -> &MapSync<L> { &self.sync }

    /// Process events until [`MapEvent::Dispose`] arrives or every sender is
    /// dropped, then tear down and hand back the state machine.
    pub async fn run(mut self, mut events: mpsc::Receiver<MapEvent>) -> MapSync<L> {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(MapEvent::Dispose) | None => break,
                    Some(event) => self.handle(event),
                },
                Some(loaded) = self.loads.recv() => {
                    self.sync.finish_load(loaded.generation, loaded.result);
                }
                update = next_update(&mut self.feed) => match update {
                    Some(update) => { self.sync.apply_feed(update); }
                    None => {
                        debug!("[sync::runtime] feed closed");
                        self.feed = None;
                    }
                },
            }
        }

        info!("[sync::runtime] disposing map");
        self.loader.cancel();
        if let Some(mut poller) = self.poller.take() { poller.dispose() }
        self.sync.dispose();
        self.sync
    }

    fn handle(&mut self, event: MapEvent) {
        match event {
            MapEvent::Load(source) => {
                let generation = self.sync.begin_load();
                self.loader.start(generation, source);
            }
            MapEvent::PointerEnter(shape) => self.sync.hover(shape),
            MapEvent::PointerLeave(shape) => self.sync.leave(shape),
            MapEvent::Click(shape) => self.sync.click(shape),
            MapEvent::Select(shape) => self.sync.select_shape(shape),
            MapEvent::Candidates(candidates) => self.sync.set_candidates(candidates),
            MapEvent::Seats(seats) => self.sync.set_seats(seats),
            MapEvent::Vote(candidate_id) => { self.sync.record_vote(&candidate_id); }
            MapEvent::Dispose => self.sync.dispose(),
        }
    }
}

async fn next_update(feed: &mut Option<mpsc::Receiver<FeedUpdate>>) -> Option<FeedUpdate> {
    match feed {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

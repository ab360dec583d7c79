//! Periodic polling of the external winners feed.

use std::{path::PathBuf, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::io::http;
use crate::sync::CancelScope;
use crate::types::Generation;
use super::WinnerRecord;

/// Where declared winners come from.
#[async_trait]
pub trait ResultsSource: Send + Sync {
    /// Human-readable origin used in logs and errors.
    fn origin(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<WinnerRecord>, SourceError>;
}

/// Winners feed served over HTTP as a JSON array.
#[derive(Debug, Clone)]
pub struct HttpResultsSource {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpResultsSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let url = url.into();
        let client = http::client(timeout)
            .map_err(|source| SourceError::Http { url: url.clone(), source })?;
        Ok(Self { client, url, timeout })
    }
}

#[async_trait]
impl ResultsSource for HttpResultsSource {
    fn origin(&self) -> &str { &self.url }

    async fn fetch(&self) -> Result<Vec<WinnerRecord>, SourceError> {
        let body = http::get_bytes(&self.client, &self.url, self.timeout).await?;
        decode(&self.url, &body)
    }
}

/// Winners feed read from a local JSON file on every poll.
#[derive(Debug, Clone)]
pub struct FileResultsSource {
    path: PathBuf,
    origin: String,
}

impl FileResultsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let origin = path.display().to_string();
        Self { path, origin }
    }
}

#[async_trait]
impl ResultsSource for FileResultsSource {
    fn origin(&self) -> &str { &self.origin }

    async fn fetch(&self) -> Result<Vec<WinnerRecord>, SourceError> {
        let body = http::read_file(&self.path).await?;
        decode(&self.origin, &body)
    }
}

fn decode(origin: &str, body: &[u8]) -> Result<Vec<WinnerRecord>, SourceError> {
    serde_json::from_slice(body)
        .map_err(|source| SourceError::Decode { origin: origin.to_string(), source })
}

/// Outcome of one poll, tagged with the poll's generation.
#[derive(Debug)]
pub struct FeedUpdate {
    pub generation: Generation,
    pub outcome: Result<Vec<WinnerRecord>, SourceError>,
}

/// Background task polling a [`ResultsSource`] at a fixed period.
///
/// The first poll starts immediately. A poll that outlasts the period delays
/// the next one instead of overlapping it. Dropping the poller (or calling
/// [`ResultsPoller::dispose`]) cancels the poll in flight.
#[derive(Debug)]
pub struct ResultsPoller {
    stop: Option<CancelScope>,
    task: Option<JoinHandle<()>>,
}

impl ResultsPoller {
    pub fn spawn(source: Arc<dyn ResultsSource>, period: Duration, updates: mpsc::Sender<FeedUpdate>) -> Self {
        let stop = CancelScope::new(Generation::default());
        let mut stopped = stop.token();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut generation = Generation::default();

            loop {
                tokio::select! {
                    biased;
                    _ = stopped.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                generation = generation.next();

                let update = tokio::select! {
                    biased;
                    _ = stopped.cancelled() => break,
                    update = poll_once(source.as_ref(), generation) => update,
                };
                if updates.send(update).await.is_err() {
                    debug!("[results::feed] receiver closed, stopping poller");
                    break;
                }
            }
        });

        Self { stop: Some(stop), task: Some(task) }
    }

    /// Stop polling. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(stop) = self.stop.take() { stop.cancel() }
        if let Some(task) = self.task.take() { task.abort() }
    }

    #[inline] pub fn is_disposed(&self) -> bool { self.stop.is_none() }
}

impl Drop for ResultsPoller {
    fn drop(&mut self) { self.dispose() }
}

/// Run one poll in its own cancellation scope.
async fn poll_once(source: &dyn ResultsSource, generation: Generation) -> FeedUpdate {
    let scope = CancelScope::new(generation);
    let outcome = scope.token().run(source.fetch()).await;
    match &outcome {
        Ok(winners) => debug!("[results::feed] {generation}: {} winners from {}", winners.len(), source.origin()),
        Err(e) => warn!("[results::feed] {generation}: {e}"),
    }
    FeedUpdate { generation, outcome }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::types::SeatId;

    /// Counts fetches and sleeps `delay` inside each one.
    struct SlowSource {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Duration,
    }

    impl SlowSource {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                delay,
            })
        }
    }

    #[async_trait]
    impl ResultsSource for SlowSource {
        fn origin(&self) -> &str { "slow" }

        async fn fetch(&self) -> Result<Vec<WinnerRecord>, SourceError> {
            let n = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(n, Ordering::SeqCst);
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as u32;
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![WinnerRecord { seat_id: SeatId(call), candidate_name: None, party_label: None, votes: 0 }])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn polls_immediately_then_every_period() {
        let source = SlowSource::new(Duration::from_millis(1));
        let (tx, mut rx) = mpsc::channel(8);
        let _poller = ResultsPoller::spawn(source.clone(), Duration::from_millis(8000), tx);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.generation, Generation(1));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.generation, Generation(2));
        assert_eq!(second.outcome.unwrap()[0].seat_id, SeatId(1));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_polls_never_overlap() {
        let source = SlowSource::new(Duration::from_millis(20_000));
        let (tx, mut rx) = mpsc::channel(8);
        let _poller = ResultsPoller::spawn(source.clone(), Duration::from_millis(8000), tx);

        for _ in 0..3 { rx.recv().await.unwrap(); }
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_cancels_the_poll_in_flight() {
        let source = SlowSource::new(Duration::from_secs(3600));
        let (tx, mut rx) = mpsc::channel(8);
        let mut poller = ResultsPoller::spawn(source.clone(), Duration::from_millis(8000), tx);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.in_flight.load(Ordering::SeqCst), 1);
        poller.dispose();
        assert!(poller.is_disposed());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn file_source_decodes_and_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winners.json");
        std::fs::write(&path, r#"[{"seatId": 12, "candidateName": "A", "partyLabel": "BNP", "votes": 9}]"#).unwrap();
        let winners = FileResultsSource::new(&path).fetch().await.unwrap();
        assert_eq!(winners[0].seat_id, SeatId(12));

        std::fs::write(&path, "{not json").unwrap();
        let err = FileResultsSource::new(&path).fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }));
    }
}

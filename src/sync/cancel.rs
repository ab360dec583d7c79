use std::future::Future;

use tokio::sync::watch;

use crate::error::SourceError;
use crate::types::Generation;

/// Owner side of a cancellation scope for one generation of work.
///
/// Cancelling, or dropping the scope, wakes every [`CancelToken`] handed
/// out by it.
#[derive(Debug)]
pub struct CancelScope {
    generation: Generation,
    tx: watch::Sender<bool>,
}

/// Observer side of a [`CancelScope`]; cheap to clone into tasks.
#[derive(Debug, Clone)]
pub struct CancelToken {
    generation: Generation,
    rx: watch::Receiver<bool>,
}

impl CancelScope {
    pub fn new(generation: Generation) -> Self {
        let (tx, _) = watch::channel(false);
        Self { generation, tx }
    }

    #[inline] pub fn generation(&self) -> Generation { self.generation }

    pub fn token(&self) -> CancelToken {
        CancelToken { generation: self.generation, rx: self.tx.subscribe() }
    }

    pub fn cancel(&self) { self.tx.send_replace(true); }

    #[inline] pub fn is_cancelled(&self) -> bool { *self.tx.borrow() }
}

impl Drop for CancelScope {
    fn drop(&mut self) { self.cancel() }
}

impl CancelToken {
    #[inline] pub fn generation(&self) -> Generation { self.generation }

    /// True once the scope was cancelled or dropped.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolve when the scope is cancelled or dropped.
    pub async fn cancelled(&mut self) {
        // `wait_for` errors once the sender is gone, which also means cancelled
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Run `fut` unless the scope is cancelled first.
    pub async fn run<T, F>(&mut self, fut: F) -> Result<T, SourceError>
    where
        F: Future<Output = Result<T, SourceError>>,
    {
        if self.is_cancelled() { return Err(SourceError::Cancelled) }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(SourceError::Cancelled),
            out = fut => out,
        }
    }
}

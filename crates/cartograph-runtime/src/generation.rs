//! Generation tokens for scans.
//!
//! Every scan takes a new generation when it begins. Output from a scan
//! whose generation is no longer current is discarded, so a slow scan can
//! never overwrite the result of a newer one.

use tokio::sync::watch;
use tracing::debug;

use cartograph_models::Generation;

/// Issues generations and guards publication of results.
#[derive(Debug)]
pub struct ScanCoordinator {
    current: watch::Sender<Generation>,
}

impl Default for ScanCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanCoordinator {
    pub fn new() -> Self {
        let (current, _) = watch::channel(Generation::INITIAL);
        Self { current }
    }

    /// Starts a new scan, superseding every earlier one.
    pub fn begin(&self) -> ScanTicket {
        let mut generation = Generation::INITIAL;
        self.current.send_modify(|current| {
            *current = current.next();
            generation = *current;
        });
        let watcher = self.current.subscribe();
        debug!(generation = %generation, "scan started");
        ScanTicket {
            generation,
            watcher,
        }
    }

    /// The most recently issued generation.
    pub fn current(&self) -> Generation {
        *self.current.borrow()
    }

    /// Returns true if `generation` is still the newest.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }

    /// Runs `publish` only if `generation` is still current.
    ///
    /// No scan can begin while `publish` runs, so the check and the
    /// publication are a single step. `publish` must not call
    /// [`ScanCoordinator::begin`].
    pub fn publish_if_current<T>(
        &self,
        generation: Generation,
        publish: impl FnOnce() -> T,
    ) -> Option<T> {
        let current = self.current.borrow();
        if *current != generation {
            debug!(generation = %generation, current = %*current, "discarding stale result");
            return None;
        }
        Some(publish())
    }

    /// Invalidates every outstanding ticket without starting a new scan.
    pub fn cancel_all(&self) {
        self.current.send_modify(|generation| *generation = generation.next());
    }
}

/// A scan's claim on a generation.
#[derive(Debug, Clone)]
pub struct ScanTicket {
    generation: Generation,
    watcher: watch::Receiver<Generation>,
}

impl ScanTicket {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Returns true if no newer scan has begun.
    pub fn is_current(&self) -> bool {
        *self.watcher.borrow() == self.generation
    }

    /// Resolves once a newer scan begins or the coordinator is dropped.
    pub async fn superseded(&mut self) {
        let generation = self.generation;
        let _ = self.watcher.wait_for(|current| *current != generation).await;
    }
}

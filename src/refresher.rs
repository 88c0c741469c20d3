use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::{RefreshConfig, UpdateMode};
use crate::error::Result;
use crate::store::{CatalogStore, RefreshOutcome};

const THREAD_NAME: &str = "uadetector-refresh";

/// Delay before the next cycle: the steady interval after a success, then
/// doubling from the retry interval up to the ceiling after failures.
#[derive(Debug, Clone)]
pub(crate) struct Backoff {
    steady: Duration,
    retry: Duration,
    max_retry: Duration,
    failures: u32,
}

impl Backoff {
    pub(crate) fn new(config: &RefreshConfig) -> Self {
        Self {
            steady: config.update_interval(),
            retry: config.retry_interval(),
            max_retry: config.max_retry_interval(),
            failures: 0,
        }
    }

    pub(crate) fn success(&mut self) -> Duration {
        self.failures = 0;
        self.steady
    }

    pub(crate) fn failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        self.current()
    }

    /// The delay for the current failure count, without changing it.
    pub(crate) fn current(&self) -> Duration {
        match self.failures {
            0 => self.steady,
            n => {
                let factor = 2u32.saturating_pow(n - 1);
                self.retry.saturating_mul(factor).min(self.max_retry)
            }
        }
    }

    /// A coalesced cycle says nothing about the source, so it leaves the
    /// failure count alone.
    pub(crate) fn next(&mut self, outcome: &RefreshOutcome) -> Duration {
        match outcome {
            RefreshOutcome::Updated { .. } | RefreshOutcome::Unchanged { .. } => self.success(),
            RefreshOutcome::Failed(_) => self.failure(),
            RefreshOutcome::AlreadyRunning => self.current(),
        }
    }
}

/// Background thread driving [`CatalogStore::refresh`].
///
/// The thread sleeps in `recv_timeout` on a capacity-one trigger channel;
/// dropping the sender stops it.
#[derive(Debug)]
pub struct Refresher {
    trigger: Mutex<Option<Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Refresher {
    /// Start refreshing `store` according to its configured update mode. For
    /// [`UpdateMode::Never`] no thread is started.
    pub fn spawn(store: Arc<CatalogStore>) -> Result<Self> {
        let mode = store.config().update_mode;
        if mode == UpdateMode::Never {
            return Ok(Self {
                trigger: Mutex::new(None),
                handle: Mutex::new(None),
            });
        }

        let (tx, rx) = crossbeam_channel::bounded(1);
        let handle = std::thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || run(store, rx, mode))?;
        Ok(Self {
            trigger: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Ask for a refresh now. Returns `false` if one is already pending or the
    /// refresher is stopped.
    pub fn trigger(&self) -> bool {
        match self.trigger.lock().as_ref().map(|tx| tx.try_send(())) {
            Some(Ok(())) => true,
            Some(Err(TrySendError::Full(()))) => {
                debug!("refresh already pending");
                false
            }
            Some(Err(TrySendError::Disconnected(()))) | None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .map_or(false, |h| !h.is_finished())
    }

    /// Stop the thread and wait for it. A cycle in progress finishes first,
    /// bounded by the fetch timeout. Idempotent.
    pub fn shutdown(&self) {
        drop(self.trigger.lock().take());
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                tracing::error!("refresh thread panicked");
            }
        }
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(store: Arc<CatalogStore>, rx: Receiver<()>, mode: UpdateMode) {
    info!(?mode, catalog = %store.catalog_locator(), "refresher started");
    let mut backoff = Backoff::new(store.config());

    loop {
        let delay = backoff.next(&store.refresh());
        let signal = match mode {
            // Only explicit triggers after the startup cycle.
            UpdateMode::Once => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            _ => {
                debug!(?delay, "next catalog refresh scheduled");
                rx.recv_timeout(delay)
            }
        };
        if let Err(RecvTimeoutError::Disconnected) = signal {
            break;
        }
    }
    info!("refresher stopped");
}

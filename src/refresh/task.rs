use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

use crate::api::PageFetcher;
use crate::config::Config;
use crate::refresh::cursor::RefreshCursor;
use crate::state::TickerCache;
use crate::types::RefreshEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    AlreadyStarted,
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::AlreadyStarted => write!(f, "refresh loop already started"),
        }
    }
}

impl std::error::Error for StartError {}

type Subscribers = Arc<Mutex<Vec<mpsc::UnboundedSender<RefreshEvent>>>>;

/// Owns the background fetch/merge/notify cycle.
///
/// One instance per process, constructed in `main` and handed around by
/// reference. `start` spawns the loop on a tokio task; `stop` is a
/// cooperative flag checked between windows, so an in-flight fetch or sleep
/// finishes first.
pub struct RefreshLoop {
    cache: TickerCache,
    fetcher: Arc<dyn PageFetcher>,
    total_coins: usize,
    page_size: usize,
    fetch_retry: Duration,
    cycle_rest: Duration,
    started: AtomicBool,
    stop: Arc<AtomicBool>,
    subscribers: Subscribers,
}

impl RefreshLoop {
    pub fn new(cfg: &Config, cache: TickerCache, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            cache,
            fetcher,
            total_coins: cfg.total_coins,
            page_size: cfg.page_size,
            fetch_retry: Duration::from_millis(cfg.fetch_retry_ms),
            cycle_rest: Duration::from_secs(cfg.cycle_rest_s),
            started: AtomicBool::new(false),
            stop: Arc::new(AtomicBool::new(false)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register for refresh notifications. Subscribe before `start` to be
    /// sure not to miss the first windows; sends never block the loop.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<RefreshEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    /// Spawn the loop. Errors on the second call; the loop itself never
    /// returns an error (fetch failures are retried forever).
    pub fn start(&self) -> Result<(), StartError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(StartError::AlreadyStarted);
        }

        let cache = self.cache.clone();
        let fetcher = self.fetcher.clone();
        let stop = self.stop.clone();
        let subscribers = self.subscribers.clone();
        let cursor = RefreshCursor::new(self.total_coins, self.page_size);
        let fetch_retry = self.fetch_retry;
        let cycle_rest = self.cycle_rest;

        tokio::spawn(async move {
            run_refresh(cursor, fetcher, cache, subscribers, stop, fetch_retry, cycle_rest)
                .await;
        });
        Ok(())
    }

    /// Request termination. Fire-and-forget; the loop exits at the next
    /// window boundary.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }
}

fn publish(subscribers: &Subscribers, event: RefreshEvent) {
    // Drop senders whose receiver side is gone.
    let mut subs = subscribers.lock().unwrap();
    subs.retain(|tx| tx.send(event).is_ok());
}

async fn run_refresh(
    mut cursor: RefreshCursor,
    fetcher: Arc<dyn PageFetcher>,
    cache: TickerCache,
    subscribers: Subscribers,
    stop: Arc<AtomicBool>,
    fetch_retry: Duration,
    cycle_rest: Duration,
) {
    info!("refresh loop started");

    while !stop.load(Ordering::Acquire) {
        let (offset, size) = cursor.next_window();

        let snapshots = match fetcher.fetch_window(offset, size).await {
            Ok(s) => s,
            Err(e) => {
                // Non-fatal by policy: same window, fixed delay, no backoff.
                warn!(offset, size, error = %e, "window fetch failed, retrying");
                sleep(fetch_retry).await;
                continue;
            }
        };

        // A short page at the universe boundary is normal; an empty one
        // would advance the cursor by zero and spin, so treat it like a
        // failed fetch.
        if snapshots.is_empty() {
            warn!(offset, size, "window fetch returned no coins, retrying");
            sleep(fetch_retry).await;
            continue;
        }

        cache.merge_window(&snapshots);

        let high = offset + snapshots.len() - 1;
        publish(&subscribers, RefreshEvent::WindowUpdated { low: offset, high });
        debug!(low = offset, high, coins = snapshots.len(), "window merged");

        if let Some(end) = cursor.advance(snapshots.len()) {
            if end.first {
                info!(coins = cache.len(), "first full refresh pass complete");
                publish(&subscribers, RefreshEvent::CacheReady);
            }
            // Rest between full passes; successive windows within a pass
            // are fetched back-to-back.
            sleep(cycle_rest).await;
        }
    }

    info!("refresh loop stopped");
}

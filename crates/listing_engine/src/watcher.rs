use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use engine_logging::{engine_error, engine_info};
use futures_util::FutureExt;
use listing_core::Listing;

use crate::{Clock, CycleError, DigestScheduler, ListingAggregator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherSettings {
    pub poll_interval: Duration,
    /// Shorter wait used after a failed tick.
    pub retry_delay: Duration,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(300),
            retry_delay: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub listings: Vec<Listing>,
    pub digest_sent: bool,
}

/// Main loop: aggregate, maybe digest, sleep, forever.
pub struct Watcher {
    aggregator: ListingAggregator,
    digest: DigestScheduler,
    clock: Arc<dyn Clock>,
    settings: WatcherSettings,
    last_digest: DateTime<Utc>,
    cycle: u64,
}

impl Watcher {
    /// The digest clock starts at construction time, so no digest goes out on the
    /// start-up day.
    pub fn new(
        aggregator: ListingAggregator,
        digest: DigestScheduler,
        clock: Arc<dyn Clock>,
        settings: WatcherSettings,
    ) -> Self {
        let last_digest = clock.now();
        Self {
            aggregator,
            digest,
            clock,
            settings,
            last_digest,
            cycle: 0,
        }
    }

    pub fn last_digest(&self) -> DateTime<Utc> {
        self.last_digest
    }

    /// Number of ticks started so far, failed ones included.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    pub async fn tick(&mut self) -> Result<TickReport, CycleError> {
        self.cycle += 1;
        engine_logging::set_cycle(self.cycle);

        let now = self.clock.now();
        let listings = self.aggregator.run_cycle(now).await?;
        let last_digest = self.digest.maybe_send_digest(now, self.last_digest).await?;
        let digest_sent = last_digest != self.last_digest;
        self.last_digest = last_digest;

        Ok(TickReport {
            listings,
            digest_sent,
        })
    }

    /// Runs ticks until `shutdown` resolves. A failed or panicking tick is logged and
    /// followed by the retry delay instead of the poll interval.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        engine_info!(
            "Watcher started: poll every {:?}, retry after {:?}",
            self.settings.poll_interval,
            self.settings.retry_delay
        );
        tokio::pin!(shutdown);

        loop {
            let outcome = AssertUnwindSafe(self.tick())
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(CycleError::Panicked(panic_message(panic))));

            let delay = match outcome {
                Ok(_) => self.settings.poll_interval,
                Err(err) => {
                    engine_error!(
                        "Tick failed, retrying in {:?}: {}",
                        self.settings.retry_delay,
                        err
                    );
                    self.settings.retry_delay
                }
            };

            tokio::select! {
                _ = &mut shutdown => {
                    engine_info!("Shutdown requested after {} cycle(s)", self.cycle);
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

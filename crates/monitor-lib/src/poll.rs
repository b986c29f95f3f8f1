//! Polling loop driving one source through the detection pipeline
//!
//! Each active source gets its own loop: fetch a batch, normalize and
//! observe every record, dispatch every resulting alert, then sleep until
//! the next tick. The body is sequential, so a new cycle never starts
//! before the previous one finishes and in-cycle alert order follows
//! observation order.

use crate::dispatch::Dispatcher;
use crate::engine::DetectionEngine;
use crate::normalizer;
use crate::source::LogSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Default pause between polling cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Outcome tally for one polling cycle
#[derive(Debug, Default, Clone, Copy)]
pub struct CycleStats {
    /// Raw records fetched from the source
    pub fetched: usize,
    /// Records the normalizer recognized
    pub recognized: usize,
    /// Alerts triggered and dispatched
    pub alerts: usize,
}

/// Fixed-interval polling loop for one log source
pub struct PollLoop {
    source: Arc<dyn LogSource>,
    engine: Arc<DetectionEngine>,
    dispatcher: Arc<Dispatcher>,
    poll_interval: Duration,
}

impl PollLoop {
    pub fn new(
        source: Arc<dyn LogSource>,
        engine: Arc<DetectionEngine>,
        dispatcher: Arc<Dispatcher>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            engine,
            dispatcher,
            poll_interval,
        }
    }

    /// Run until the shutdown signal fires.
    ///
    /// Shutdown is observed between cycles; an in-flight cycle finishes
    /// before the loop exits.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            source = self.source.name(),
            interval_secs = self.poll_interval.as_secs(),
            "Starting poll loop"
        );

        let mut ticker = interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let stats = self.run_cycle().await;
                    debug!(
                        source = self.source.name(),
                        fetched = stats.fetched,
                        recognized = stats.recognized,
                        alerts = stats.alerts,
                        "Poll cycle complete"
                    );
                }
                _ = shutdown.recv() => {
                    info!(source = self.source.name(), "Shutting down poll loop");
                    break;
                }
            }
        }
    }

    /// Execute one fetch-normalize-observe-dispatch cycle.
    ///
    /// A source failure is recoverable: the cycle contributes zero events
    /// and the loop continues.
    pub async fn run_cycle(&self) -> CycleStats {
        let records = match self.source.fetch().await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    source = self.source.name(),
                    error = %e,
                    "Source fetch failed, skipping cycle"
                );
                return CycleStats::default();
            }
        };

        let mut stats = CycleStats {
            fetched: records.len(),
            ..CycleStats::default()
        };

        for record in &records {
            // Malformed or unrecognized records are dropped individually
            let Some(event) = normalizer::normalize(record) else {
                continue;
            };
            stats.recognized += 1;

            if let Some(alert) = self.engine.observe(event) {
                stats.alerts += 1;
                self.dispatcher.dispatch(&alert).await;
            }
        }

        stats
    }
}

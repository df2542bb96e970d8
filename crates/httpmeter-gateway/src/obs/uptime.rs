//! Uptime ticker.
//!
//! Increments the no-label uptime counter once per interval, independent of
//! request traffic. Runs on the host tokio runtime until its token is
//! cancelled. The first increment lands one full interval after spawn; missed
//! ticks are skipped rather than replayed in a burst.

use std::sync::Arc;
use std::time::Duration;

use httpmeter_core::{HttpMetrics, MetricRegistry};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const MIN_PERIOD: Duration = Duration::from_millis(1);

pub struct UptimeTicker;

impl UptimeTicker {
    /// Spawn the ticker on the current runtime.
    ///
    /// `period` is clamped to at least 1ms; a zero period would panic inside
    /// `tokio::time::interval_at`. Config validation already rejects 0, so the
    /// clamp only matters for direct callers.
    pub fn spawn(
        registry: Arc<MetricRegistry>,
        metrics: HttpMetrics,
        period: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let period = period.max(MIN_PERIOD);

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(period_ms = period.as_millis() as u64, "uptime ticker started");

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = metrics.tick_uptime(&registry) {
                            tracing::error!(error = %e, "uptime tick failed");
                        }
                    }
                }
            }

            tracing::debug!("uptime ticker stopped");
        })
    }
}

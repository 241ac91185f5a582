//! Background task advancing storms whose current phase ran out of time.

use crate::service::StormService;
use std::sync::Arc;
use std::time::Duration;
use storm_core::Timestamp;

/// Periodically advances expired phases.
pub struct ExpiryScheduler {
    service: Arc<StormService>,
    interval: Duration,
}

impl ExpiryScheduler {
    pub fn new(service: Arc<StormService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Run forever, sweeping once per interval.
    pub async fn run(self) {
        tracing::info!(interval = ?self.interval, "phase expiry scheduler started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let advanced = self.sweep(Timestamp::now()).await;
            if advanced > 0 {
                tracing::debug!(advanced, "expiry sweep finished");
            }
        }
    }

    /// Advance every storm whose phase has expired at `now`.
    /// Returns how many storms moved.
    pub async fn sweep(&self, now: Timestamp) -> usize {
        let mut advanced = 0;
        for handle in self.service.store().handles().await {
            let expired = handle.read().await.is_phase_expired(now);
            if !expired {
                continue;
            }
            // expiry is re-checked under the write lock
            let mut storm = handle.write().await;
            if let Some(phase) = storm.expire_phase(now) {
                tracing::info!(storm = %storm.code(), %phase, "phase time limit reached");
                advanced += 1;
            }
        }
        advanced
    }
}

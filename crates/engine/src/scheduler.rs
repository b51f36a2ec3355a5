use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::synchronizer::{Synchronizer, TickReport};

/// Periodic staleness checker.
///
/// The period is independent of every resource's TTL, so expiry is noticed
/// up to one period late. The first tick fires immediately and doubles as
/// the initial load of every resource.
pub struct Scheduler {
    sync: Synchronizer,
    period: Duration,
}

impl Scheduler {
    pub fn new(sync: Synchronizer, period_ms: u64) -> Self {
        Self {
            sync,
            period: Duration::from_millis(period_ms.max(1)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run one staleness check and log what it dispatched.
    pub fn tick(&self) -> TickReport {
        let report = self.sync.check_staleness();

        if report.is_empty() {
            tracing::debug!("Staleness check: everything fresh");
        } else {
            tracing::info!(
                fetched = ?report.fetched(),
                deferred = ?report.deferred(),
                in_flight = ?report.in_flight(),
                "Staleness check"
            );
        }

        report
    }

    /// Tick until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(period_ms = self.period.as_millis() as u64, "Scheduler started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    // Fetches complete on their own tasks.
                    let _ = self.tick();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Scheduler stopped");
    }
}

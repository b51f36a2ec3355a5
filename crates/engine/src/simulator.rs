//! Synthetic webhook simulator.
//!
//! Models an external push source that invalidates resources out of band
//! from the TTL schedule. Fires on a randomized period, skips a fraction of
//! its ticks, and routes every emitted event through the `EventProcessor`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use uuid::Uuid;

use lms_common::config::AppConfig;
use lms_common::types::{EventAction, EventKind, SyntheticEvent};

use crate::clock::Clock;
use crate::processor::EventProcessor;
use crate::random::RandomSource;

/// Number of events kept in the recent-history log.
pub const EVENT_LOG_CAPACITY: usize = 10;

/// Event templates the simulator draws from, uniformly.
const TEMPLATES: [(EventKind, EventAction, &str); 4] = [
    (EventKind::Transaction, EventAction::Created, "New high-risk transaction detected"),
    (EventKind::Alert, EventAction::Created, "Risk alert triggered"),
    (EventKind::Kyc, EventAction::Updated, "KYC status updated"),
    (EventKind::Transaction, EventAction::Updated, "Transaction flagged"),
];

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub min_period: Duration,
    pub max_period: Duration,
    /// Probability in [0, 1] that a tick produces no event.
    pub suppression: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            min_period: Duration::from_secs(8),
            max_period: Duration::from_secs(12),
            suppression: 0.3,
        }
    }
}

impl SimulatorConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            min_period: Duration::from_millis(config.simulator_min_period_ms),
            max_period: Duration::from_millis(config.simulator_max_period_ms),
            suppression: config.simulator_suppression,
        }
    }
}

/// Bounded, shareable log of the most recent events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<VecDeque<SyntheticEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, evicting the oldest beyond capacity.
    pub fn push(&self, event: SyntheticEvent) {
        let mut events = self.events.lock();
        events.push_front(event);
        events.truncate(EVENT_LOG_CAPACITY);
    }

    /// Recent events, newest first.
    pub fn recent(&self) -> Vec<SyntheticEvent> {
        self.events.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

pub struct EventSimulator {
    config: SimulatorConfig,
    random: Box<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    log: EventLog,
}

impl EventSimulator {
    pub fn new(
        config: SimulatorConfig,
        random: Box<dyn RandomSource>,
        clock: Arc<dyn Clock>,
        log: EventLog,
    ) -> Self {
        Self {
            config,
            random,
            clock,
            log,
        }
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Draw the delay until the next tick, uniform in `[min, max]`.
    pub fn next_delay(&mut self) -> Duration {
        let min = self.config.min_period.as_secs_f64();
        let max = self.config.max_period.as_secs_f64().max(min);
        let draw = self.random.next_f64().clamp(0.0, 1.0);
        Duration::from_secs_f64(min + draw * (max - min))
    }

    /// One simulator tick: maybe produce an event and log it.
    pub fn poll(&mut self) -> Option<SyntheticEvent> {
        if self.random.next_f64() < self.config.suppression {
            tracing::debug!("Simulator tick suppressed");
            return None;
        }

        let (kind, action, message) = TEMPLATES[self.pick(TEMPLATES.len())];
        let entity = self.pick(1000);

        let event = SyntheticEvent {
            id: Uuid::new_v4(),
            kind,
            action,
            message: message.to_string(),
            timestamp: self.clock.now(),
            data: serde_json::json!({ "id": format!("{}_{}", kind, entity) }),
        };

        self.log.push(event.clone());
        Some(event)
    }

    /// Tick on a freshly drawn period until `shutdown` flips to `true`.
    pub async fn run(mut self, processor: EventProcessor, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            min_period_ms = self.config.min_period.as_millis() as u64,
            max_period_ms = self.config.max_period.as_millis() as u64,
            suppression = self.config.suppression,
            "Event simulator started"
        );

        loop {
            let delay = self.next_delay();

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    if let Some(event) = self.poll() {
                        let _ = processor.process(&event);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Event simulator stopped");
    }

    /// Uniform index in `[0, n)`.
    fn pick(&mut self, n: usize) -> usize {
        let draw = self.random.next_f64().clamp(0.0, 1.0);
        ((draw * n as f64) as usize).min(n - 1)
    }
}

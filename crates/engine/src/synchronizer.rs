//! Freshness-gated synchronizer.
//!
//! Owns the cache registry, the pending flags and the view context behind a
//! single lock. Staleness detections (scheduler ticks, synthetic events) go
//! through the refresh gate; manual refreshes bypass it. Every fetch runs in
//! its own task with a timeout, and at most one fetch per resource is
//! outstanding at any time.
//!
//! A completion always applies, even if the resource came into view while
//! the fetch was running: the payload is stored and the pending flag is
//! cleared so the view never lags behind a flag that can no longer be acted
//! on.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;

use lms_common::config::AppConfig;
use lms_common::error::FetchError;
use lms_common::types::{Notification, Resource};

use crate::clock::Clock;
use crate::fetcher::FetcherSet;
use crate::gate::{self, GateDecision, PendingFlags};
use crate::registry::CacheRegistry;
use crate::sink::NotificationSink;

/// Tunables for a synchronizer instance.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Upper bound on one fetch. Exceeding it is a fetch failure.
    pub fetch_timeout: Duration,
    /// Clear the pending flag of the resource the view moves away from.
    pub clear_pending_on_defocus: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            clear_pending_on_defocus: false,
        }
    }
}

impl SyncOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            fetch_timeout: Duration::from_millis(config.fetch_timeout_ms),
            clear_pending_on_defocus: config.clear_pending_on_defocus,
        }
    }
}

/// Result of one completed fetch, after it has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Updated,
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, FetchOutcome::Updated)
    }
}

/// Handle to a spawned fetch. Dropping it does not cancel the fetch.
#[derive(Debug)]
pub struct FetchHandle {
    resource: Resource,
    handle: JoinHandle<FetchOutcome>,
}

impl FetchHandle {
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Wait until the fetch has completed and its result has been applied.
    pub async fn wait(self) -> FetchOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => FetchOutcome::Failed(FetchError::Transport(format!(
                "fetch task for {} did not complete: {}",
                self.resource, e
            ))),
        }
    }
}

/// What a staleness detection or refresh request led to.
#[derive(Debug)]
pub enum Dispatch {
    /// A fetch was started.
    Started(FetchHandle),
    /// The resource is in view; its pending flag is set instead.
    Deferred,
    /// A fetch for the resource was already outstanding.
    InFlight,
}

impl Dispatch {
    pub fn is_started(&self) -> bool {
        matches!(self, Dispatch::Started(_))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Dispatch::Deferred)
    }

    /// Wait for the started fetch, if any.
    pub async fn wait(self) -> Option<FetchOutcome> {
        match self {
            Dispatch::Started(handle) => Some(handle.wait().await),
            _ => None,
        }
    }
}

/// Everything one staleness check dispatched, in check order.
#[derive(Debug, Default)]
pub struct TickReport {
    pub dispatches: Vec<(Resource, Dispatch)>,
}

impl TickReport {
    pub fn fetched(&self) -> Vec<Resource> {
        self.select(Dispatch::is_started)
    }

    pub fn deferred(&self) -> Vec<Resource> {
        self.select(Dispatch::is_deferred)
    }

    pub fn in_flight(&self) -> Vec<Resource> {
        self.select(|d| matches!(d, Dispatch::InFlight))
    }

    pub fn is_empty(&self) -> bool {
        self.dispatches.is_empty()
    }

    /// Wait for every fetch started by this check.
    pub async fn wait_all(self) -> Vec<(Resource, FetchOutcome)> {
        let mut outcomes = Vec::new();
        for (resource, dispatch) in self.dispatches {
            if let Some(outcome) = dispatch.wait().await {
                outcomes.push((resource, outcome));
            }
        }
        outcomes
    }

    fn select(&self, pred: impl Fn(&Dispatch) -> bool) -> Vec<Resource> {
        self.dispatches
            .iter()
            .filter(|(_, d)| pred(d))
            .map(|(r, _)| *r)
            .collect()
    }
}

/// Point-in-time view of one resource's synchronization state.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceStatus {
    pub resource: Resource,
    pub ttl_ms: u64,
    pub last_fetch: Option<DateTime<Utc>>,
    pub age_ms: Option<u64>,
    pub stale: bool,
    pub pending: bool,
    pub in_flight: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct SyncState {
    registry: CacheRegistry,
    pending: PendingFlags,
    view: Option<Resource>,
    in_flight: [bool; Resource::COUNT],
}

struct Inner {
    state: Mutex<SyncState>,
    fetchers: FetcherSet,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    options: SyncOptions,
}

/// Shared handle to the synchronizer. Clones refer to the same state.
#[derive(Clone)]
pub struct Synchronizer {
    inner: Arc<Inner>,
}

impl Synchronizer {
    /// Build a synchronizer. Fails if any resource has no fetcher.
    pub fn new(
        fetchers: FetcherSet,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
        options: SyncOptions,
    ) -> Result<Self, FetchError> {
        fetchers.ensure_complete()?;

        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SyncState::default()),
                fetchers,
                sink,
                clock,
                options,
            }),
        })
    }

    /// Handle a staleness detection for `resource`, obeying the gate.
    pub fn on_stale(&self, resource: Resource) -> Dispatch {
        let now = self.inner.clock.now();
        let mut raised = false;

        let decision = {
            let mut state = self.inner.state.lock();
            let decision = gate::decide(resource, state.view, state.in_flight[resource as usize]);
            match decision {
                GateDecision::Fetch => state.in_flight[resource as usize] = true,
                GateDecision::Defer => raised = state.pending.raise(resource),
                GateDecision::InFlight => {}
            }
            decision
        };

        match decision {
            GateDecision::Fetch => Dispatch::Started(self.spawn_fetch(resource)),
            GateDecision::Defer => {
                if raised {
                    tracing::info!(resource = %resource, "Resource in view, update deferred");
                    self.inner.sink.notify(&Notification::pending(resource, now));
                }
                Dispatch::Deferred
            }
            GateDecision::InFlight => {
                tracing::debug!(resource = %resource, "Fetch already in flight");
                Dispatch::InFlight
            }
        }
    }

    /// Fetch `resource` regardless of TTL and view context.
    ///
    /// Used for dependent resources (the dashboard aggregate). The pending
    /// flag is left to the completion.
    pub fn refresh(&self, resource: Resource) -> Dispatch {
        match self.try_begin(resource) {
            true => Dispatch::Started(self.spawn_fetch(resource)),
            false => Dispatch::InFlight,
        }
    }

    /// Manual refresh: clear the pending flag and fetch.
    ///
    /// If a fetch is already outstanding no second one is started; its
    /// completion applies the fresh data.
    pub fn force_refresh(&self, resource: Resource) -> Dispatch {
        let started = {
            let mut state = self.inner.state.lock();
            state.pending.clear(resource);
            let idx = resource as usize;
            let free = !state.in_flight[idx];
            if free {
                state.in_flight[idx] = true;
            }
            free
        };

        tracing::info!(resource = %resource, started, "Manual refresh");
        match started {
            true => Dispatch::Started(self.spawn_fetch(resource)),
            false => Dispatch::InFlight,
        }
    }

    /// Manual refresh of every resource.
    pub fn force_refresh_all(&self) -> Vec<(Resource, Dispatch)> {
        Resource::ALL
            .iter()
            .map(|r| (*r, self.force_refresh(*r)))
            .collect()
    }

    /// One scheduler pass: gate every stale resource.
    pub fn check_staleness(&self) -> TickReport {
        let now = self.inner.clock.now();
        let stale = self.inner.state.lock().registry.stale_resources(now);

        TickReport {
            dispatches: stale.into_iter().map(|r| (r, self.on_stale(r))).collect(),
        }
    }

    /// Move the view context. Returns the previous one.
    pub fn set_view_context(&self, view: Option<Resource>) -> Option<Resource> {
        let mut state = self.inner.state.lock();
        let previous = std::mem::replace(&mut state.view, view);

        if self.inner.options.clear_pending_on_defocus {
            if let Some(left) = previous.filter(|p| Some(*p) != view) {
                state.pending.clear(left);
            }
        }

        tracing::debug!(previous = ?previous, current = ?view, "View context changed");
        previous
    }

    pub fn view_context(&self) -> Option<Resource> {
        self.inner.state.lock().view
    }

    /// Detail panel opened: the user now sees current data.
    pub fn open_detail(&self, resource: Resource) -> bool {
        self.inner.state.lock().pending.clear(resource)
    }

    /// Detail panel closed.
    pub fn close_detail(&self, resource: Resource) -> bool {
        self.inner.state.lock().pending.clear(resource)
    }

    pub fn is_pending(&self, resource: Resource) -> bool {
        self.inner.state.lock().pending.is_set(resource)
    }

    pub fn pending_resources(&self) -> Vec<Resource> {
        self.inner.state.lock().pending.raised()
    }

    pub fn is_in_flight(&self, resource: Resource) -> bool {
        self.inner.state.lock().in_flight[resource as usize]
    }

    pub fn is_stale(&self, resource: Resource) -> bool {
        let now = self.inner.clock.now();
        self.inner.state.lock().registry.is_stale(resource, now)
    }

    /// Last successfully fetched payload.
    pub fn data(&self, resource: Resource) -> Option<serde_json::Value> {
        self.inner.state.lock().registry.entry(resource).data.clone()
    }

    pub fn status(&self, resource: Resource) -> ResourceStatus {
        let now = self.inner.clock.now();
        let state = self.inner.state.lock();
        Self::status_locked(&state, resource, now)
    }

    pub fn status_all(&self) -> Vec<ResourceStatus> {
        let now = self.inner.clock.now();
        let state = self.inner.state.lock();
        Resource::ALL
            .iter()
            .map(|r| Self::status_locked(&state, *r, now))
            .collect()
    }

    fn status_locked(state: &SyncState, resource: Resource, now: DateTime<Utc>) -> ResourceStatus {
        let entry = state.registry.entry(resource);
        ResourceStatus {
            resource,
            ttl_ms: entry.ttl.as_millis() as u64,
            last_fetch: entry.last_fetch,
            age_ms: entry.age(now).map(|a| a.as_millis() as u64),
            stale: entry.is_stale(now),
            pending: state.pending.is_set(resource),
            in_flight: state.in_flight[resource as usize],
            error: entry.error.clone(),
        }
    }

    /// Mark `resource` in flight unless it already is.
    fn try_begin(&self, resource: Resource) -> bool {
        let mut state = self.inner.state.lock();
        let slot = &mut state.in_flight[resource as usize];
        if *slot {
            return false;
        }
        *slot = true;
        true
    }

    fn spawn_fetch(&self, resource: Resource) -> FetchHandle {
        tracing::debug!(resource = %resource, "Fetch started");
        let sync = self.clone();
        let handle = tokio::spawn(async move {
            let result = sync.run_fetch(resource).await;
            sync.complete(resource, result)
        });
        FetchHandle { resource, handle }
    }

    async fn run_fetch(&self, resource: Resource) -> Result<serde_json::Value, FetchError> {
        let Some(fetcher) = self.inner.fetchers.get(resource) else {
            return Err(FetchError::Unavailable(resource.to_string()));
        };

        // The fetcher runs in its own task so a panic or a timeout cannot
        // leave the resource marked in flight.
        let timeout = self.inner.options.fetch_timeout;
        let mut task = tokio::spawn(async move { fetcher.fetch(resource).await });

        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(FetchError::Transport(format!("fetcher task failed: {}", e))),
            Err(_) => {
                task.abort();
                Err(FetchError::Timeout(timeout))
            }
        }
    }

    fn complete(&self, resource: Resource, result: Result<serde_json::Value, FetchError>) -> FetchOutcome {
        let now = self.inner.clock.now();

        let (outcome, notification) = {
            let mut state = self.inner.state.lock();
            state.in_flight[resource as usize] = false;

            match result {
                Ok(data) => {
                    state.registry.store(resource, data, now);
                    state.pending.clear(resource);
                    (FetchOutcome::Updated, Notification::updated(resource, now))
                }
                Err(e) => {
                    state.registry.record_failure(resource, e.to_string());
                    let notification = Notification::failed(resource, e.to_string(), now);
                    (FetchOutcome::Failed(e), notification)
                }
            }
        };

        match &outcome {
            FetchOutcome::Updated => {
                tracing::info!(resource = %resource, "Resource updated");
            }
            FetchOutcome::Failed(e) => {
                tracing::warn!(resource = %resource, error = %e, "Fetch failed");
            }
        }

        self.inner.sink.notify(&notification);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::fetcher::Fetcher;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl Fetcher for Echo {
        async fn fetch(&self, resource: Resource) -> Result<serde_json::Value, FetchError> {
            Ok(serde_json::json!({ "resource": resource.as_str() }))
        }

        fn name(&self) -> &'static str {
            "echo"
        }
    }

    struct Silent;

    impl NotificationSink for Silent {
        fn notify(&self, _notification: &Notification) {}
    }

    fn sync() -> Synchronizer {
        let fetchers = Resource::ALL
            .iter()
            .fold(FetcherSet::new(), |set, r| set.register(*r, Arc::new(Echo)));
        Synchronizer::new(
            fetchers,
            Arc::new(Silent),
            Arc::new(SystemClock),
            SyncOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_incomplete_fetchers() {
        let fetchers = FetcherSet::new().register(Resource::Kyc, Arc::new(Echo));
        let result = Synchronizer::new(
            fetchers,
            Arc::new(Silent),
            Arc::new(SystemClock),
            SyncOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_view_context_replace() {
        let sync = sync();
        assert_eq!(sync.set_view_context(Some(Resource::Kyc)), None);
        assert_eq!(sync.set_view_context(None), Some(Resource::Kyc));
        assert_eq!(sync.view_context(), None);
    }

    #[tokio::test]
    async fn test_fetch_stores_payload() {
        let sync = sync();
        let outcome = sync.on_stale(Resource::Templates).wait().await;

        assert_eq!(outcome, Some(FetchOutcome::Updated));
        assert_eq!(
            sync.data(Resource::Templates),
            Some(serde_json::json!({ "resource": "templates" }))
        );
        let status = sync.status(Resource::Templates);
        assert!(!status.stale);
        assert!(!status.in_flight);
        assert_eq!(status.ttl_ms, 120_000);
    }

    #[tokio::test]
    async fn test_focused_resource_deferred() {
        let sync = sync();
        sync.set_view_context(Some(Resource::Alerts));

        assert!(sync.on_stale(Resource::Alerts).is_deferred());
        assert!(sync.is_pending(Resource::Alerts));
        assert!(sync.data(Resource::Alerts).is_none());
    }

    #[tokio::test]
    async fn test_detail_view_clears_pending() {
        let sync = sync();
        sync.set_view_context(Some(Resource::Kyc));
        sync.on_stale(Resource::Kyc);

        assert!(sync.close_detail(Resource::Kyc));
        assert!(!sync.is_pending(Resource::Kyc));

        sync.on_stale(Resource::Kyc);
        assert!(sync.open_detail(Resource::Kyc));
        assert!(sync.pending_resources().is_empty());
    }
}

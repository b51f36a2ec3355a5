//! Cache registry, the authoritative per-resource freshness store.
//!
//! One slot per resource, created at startup with no `last_fetch` (always
//! stale) and overwritten for the lifetime of the process. A slot's
//! `last_fetch` only moves when a fetch completes successfully; deciding to
//! fetch never touches it.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use lms_common::types::Resource;

/// Cached state of a single resource.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Last fetched payload, opaque to the synchronizer.
    pub data: Option<serde_json::Value>,
    /// Completion time of the last successful fetch.
    pub last_fetch: Option<DateTime<Utc>>,
    pub ttl: Duration,
    /// Error of the most recent failed fetch, cleared on success.
    pub error: Option<String>,
}

impl CacheEntry {
    fn empty(ttl: Duration) -> Self {
        Self {
            data: None,
            last_fetch: None,
            ttl,
            error: None,
        }
    }

    /// True if never fetched or older than its TTL at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.last_fetch {
            None => true,
            Some(last) => now.signed_duration_since(last) > ttl_delta(self.ttl),
        }
    }

    /// Time since the last successful fetch.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_fetch
            .map(|last| now.signed_duration_since(last).to_std().unwrap_or_default())
    }
}

/// Keyed store of cache entries, indexed by resource.
#[derive(Debug, Clone)]
pub struct CacheRegistry {
    entries: [CacheEntry; Resource::COUNT],
}

impl CacheRegistry {
    /// Registry with every resource stale and its fixed TTL.
    pub fn new() -> Self {
        Self {
            entries: Resource::ALL.map(|r| CacheEntry::empty(r.ttl())),
        }
    }

    pub fn is_stale(&self, resource: Resource, now: DateTime<Utc>) -> bool {
        self.entry(resource).is_stale(now)
    }

    pub fn record_fetch(&mut self, resource: Resource, now: DateTime<Utc>) {
        self.entry_mut(resource).last_fetch = Some(now);
    }

    /// Apply a successful fetch: payload, timestamp and error reset together.
    pub fn store(&mut self, resource: Resource, data: serde_json::Value, now: DateTime<Utc>) {
        let entry = self.entry_mut(resource);
        entry.data = Some(data);
        entry.error = None;
        self.record_fetch(resource, now);
    }

    /// Record a failed fetch. Leaves `data` and `last_fetch` untouched.
    pub fn record_failure(&mut self, resource: Resource, error: String) {
        self.entry_mut(resource).error = Some(error);
    }

    /// All resources stale at `now`, in check order.
    pub fn stale_resources(&self, now: DateTime<Utc>) -> Vec<Resource> {
        Resource::ALL
            .iter()
            .copied()
            .filter(|r| self.is_stale(*r, now))
            .collect()
    }

    pub fn entry(&self, resource: Resource) -> &CacheEntry {
        &self.entries[resource as usize]
    }

    fn entry_mut(&mut self, resource: Resource) -> &mut CacheEntry {
        &mut self.entries[resource as usize]
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn ttl_delta(ttl: Duration) -> TimeDelta {
    TimeDelta::milliseconds(ttl.as_millis() as i64)
}

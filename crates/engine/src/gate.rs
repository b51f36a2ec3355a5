//! Refresh gate: decides between a silent fetch and a deferred update.
//!
//! A stale resource that the user is looking at is not refetched: replacing a
//! list mid-scroll is worse than showing slightly old data. Instead its
//! pending flag is raised and the UI offers "new data available". Every other
//! stale resource is fetched immediately.

use lms_common::types::Resource;

/// Outcome of gating one staleness detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Invoke the fetcher now.
    Fetch,
    /// Resource is in view: raise its pending flag, do not fetch.
    Defer,
    /// A fetch for this resource is already outstanding.
    InFlight,
}

/// Gate a staleness detection for `resource`.
///
/// The view context is passed in explicitly; the decision depends on nothing
/// else.
pub fn decide(resource: Resource, view_context: Option<Resource>, in_flight: bool) -> GateDecision {
    if in_flight {
        GateDecision::InFlight
    } else if view_context == Some(resource) {
        GateDecision::Defer
    } else {
        GateDecision::Fetch
    }
}

/// Per-resource "new data available" flags.
#[derive(Debug, Clone, Default)]
pub struct PendingFlags {
    flags: [bool; Resource::COUNT],
}

impl PendingFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Returns `true` on a false→true transition.
    pub fn raise(&mut self, resource: Resource) -> bool {
        let slot = &mut self.flags[resource as usize];
        let transitioned = !*slot;
        *slot = true;
        transitioned
    }

    /// Clear the flag. Returns `true` if it was set.
    pub fn clear(&mut self, resource: Resource) -> bool {
        std::mem::take(&mut self.flags[resource as usize])
    }

    pub fn is_set(&self, resource: Resource) -> bool {
        self.flags[resource as usize]
    }

    /// Resources whose flag is currently set.
    pub fn raised(&self) -> Vec<Resource> {
        Resource::ALL
            .iter()
            .copied()
            .filter(|r| self.is_set(*r))
            .collect()
    }
}

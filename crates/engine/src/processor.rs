//! Synthetic event processing.
//!
//! Each event marks one resource as newly stale, bypassing its TTL:
//! 1. Translates the event into a human-readable summary
//! 2. Routes the affected resource through the refresh gate
//! 3. Refreshes the dashboard aggregate unconditionally, since it depends on
//!    every other resource

use lms_common::types::{EventAction, EventKind, EventSummary, Resource, Severity, SyntheticEvent};

use crate::synchronizer::{Dispatch, Synchronizer};

/// What routing one event dispatched.
#[derive(Debug)]
pub struct RouteReport {
    pub resource: Resource,
    pub primary: Dispatch,
    pub dashboard: Dispatch,
}

/// Routes synthetic events into the synchronizer.
#[derive(Clone)]
pub struct EventProcessor {
    sync: Synchronizer,
}

impl EventProcessor {
    pub fn new(sync: Synchronizer) -> Self {
        Self { sync }
    }

    /// Translate, log and route one event.
    pub fn process(&self, event: &SyntheticEvent) -> RouteReport {
        let summary = Self::translate_event(event);
        tracing::info!(
            event_id = %event.id,
            kind = %event.kind,
            action = %event.action,
            severity = %summary.severity,
            "{}: {}",
            summary.title,
            summary.body
        );

        self.route(event)
    }

    /// Treat the event's resource as stale and refresh the dashboard.
    pub fn route(&self, event: &SyntheticEvent) -> RouteReport {
        let resource = event.kind.resource();
        let primary = self.sync.on_stale(resource);
        let dashboard = self.sync.refresh(Resource::Dashboard);

        tracing::debug!(
            resource = %resource,
            fetched = primary.is_started(),
            deferred = primary.is_deferred(),
            dashboard_fetched = dashboard.is_started(),
            "Event routed"
        );

        RouteReport {
            resource,
            primary,
            dashboard,
        }
    }

    /// Translate an event into a human-readable summary.
    pub fn translate_event(event: &SyntheticEvent) -> EventSummary {
        let entity = event
            .data
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");

        let (title, body, severity) = match (event.kind, event.action) {
            (EventKind::Transaction, EventAction::Created) => (
                "New High-Risk Transaction".to_string(),
                format!("{} ({})", event.message, entity),
                Severity::Warning,
            ),
            (EventKind::Transaction, EventAction::Updated) => (
                "Transaction Flagged".to_string(),
                format!("Transaction {} flagged for review", entity),
                Severity::Warning,
            ),
            (EventKind::Transaction, EventAction::Deleted) => (
                "Transaction Removed".to_string(),
                format!("Transaction {} was removed", entity),
                Severity::Info,
            ),
            (EventKind::Alert, EventAction::Created) => (
                "Risk Alert Triggered".to_string(),
                format!("CRITICAL: {} ({})", event.message, entity),
                Severity::Critical,
            ),
            (EventKind::Alert, _) => (
                "Risk Alert Updated".to_string(),
                format!("Risk alert {} changed: {}", entity, event.action),
                Severity::Warning,
            ),
            (EventKind::Kyc, _) => (
                "KYC Status Updated".to_string(),
                format!("KYC application {} {}", entity, event.action),
                Severity::Info,
            ),
        };

        EventSummary {
            title,
            body,
            severity,
        }
    }
}

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::UnknownResource;

/// Named data resources managed by the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Dashboard,
    Transactions,
    Kyc,
    Alerts,
    Templates,
}

impl Resource {
    pub const COUNT: usize = 5;

    /// Every resource, in the order the scheduler checks them.
    pub const ALL: [Resource; Resource::COUNT] = [
        Resource::Dashboard,
        Resource::Transactions,
        Resource::Kyc,
        Resource::Alerts,
        Resource::Templates,
    ];

    /// Fixed time-to-live for this resource's cached data.
    pub fn ttl(&self) -> Duration {
        let ms = match self {
            Resource::Dashboard => 30_000,
            Resource::Transactions => 15_000,
            Resource::Kyc => 60_000,
            Resource::Alerts => 20_000,
            Resource::Templates => 120_000,
        };
        Duration::from_millis(ms)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Dashboard => "dashboard",
            Resource::Transactions => "transactions",
            Resource::Kyc => "kyc",
            Resource::Alerts => "alerts",
            Resource::Templates => "templates",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

/// Kind of a synthetic push event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Transaction,
    Kyc,
    Alert,
}

impl EventKind {
    /// The resource invalidated by an event of this kind.
    pub fn resource(&self) -> Resource {
        match self {
            EventKind::Transaction => Resource::Transactions,
            EventKind::Kyc => Resource::Kyc,
            EventKind::Alert => Resource::Alerts,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Transaction => write!(f, "transaction"),
            EventKind::Kyc => write!(f, "kyc"),
            EventKind::Alert => write!(f, "alert"),
        }
    }
}

/// What happened to the entity behind a synthetic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Created,
    Updated,
    Deleted,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Created => write!(f, "created"),
            EventAction::Updated => write!(f, "updated"),
            EventAction::Deleted => write!(f, "deleted"),
        }
    }
}

/// A simulated webhook notification that invalidates one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub action: EventAction,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Reference to the affected entity, e.g. `{"id": "kyc_412"}`.
    pub data: serde_json::Value,
}

/// Severity attached to a translated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Human-readable rendering of a synthetic event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

/// State change reported by the synchronizer to its notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Fresher data exists but was held back because the resource is in view.
    Pending,
    /// A fetch completed and replaced the resource's data.
    Updated,
    /// A fetch failed; the cached data and its timestamp are unchanged.
    Failed,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Pending => write!(f, "pending"),
            NotificationKind::Updated => write!(f, "updated"),
            NotificationKind::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub resource: Resource,
    pub kind: NotificationKind,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn pending(resource: Resource, timestamp: DateTime<Utc>) -> Self {
        Self {
            resource,
            kind: NotificationKind::Pending,
            error: None,
            timestamp,
        }
    }

    pub fn updated(resource: Resource, timestamp: DateTime<Utc>) -> Self {
        Self {
            resource,
            kind: NotificationKind::Updated,
            error: None,
            timestamp,
        }
    }

    pub fn failed(resource: Resource, error: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            resource,
            kind: NotificationKind::Failed,
            error: Some(error),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ttls() {
        assert_eq!(Resource::Dashboard.ttl(), Duration::from_millis(30_000));
        assert_eq!(Resource::Transactions.ttl(), Duration::from_millis(15_000));
        assert_eq!(Resource::Kyc.ttl(), Duration::from_millis(60_000));
        assert_eq!(Resource::Alerts.ttl(), Duration::from_millis(20_000));
        assert_eq!(Resource::Templates.ttl(), Duration::from_millis(120_000));
    }

    #[test]
    fn test_resource_from_str() {
        assert_eq!("kyc".parse::<Resource>().unwrap(), Resource::Kyc);
        assert_eq!("Alerts".parse::<Resource>().unwrap(), Resource::Alerts);
        let err = "wallets".parse::<Resource>().unwrap_err();
        assert_eq!(err.0, "wallets");
    }

    #[test]
    fn test_resource_serde_lowercase() {
        let json = serde_json::to_string(&Resource::Templates).unwrap();
        assert_eq!(json, "\"templates\"");
        let back: Resource = serde_json::from_str("\"transactions\"").unwrap();
        assert_eq!(back, Resource::Transactions);
    }

    #[test]
    fn test_event_kind_routing() {
        assert_eq!(EventKind::Transaction.resource(), Resource::Transactions);
        assert_eq!(EventKind::Kyc.resource(), Resource::Kyc);
        assert_eq!(EventKind::Alert.resource(), Resource::Alerts);
    }
}

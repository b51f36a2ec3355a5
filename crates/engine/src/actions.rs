//! Officer actions: backend mutations followed by a manual refresh of every
//! resource the mutation touches.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lms_common::error::FetchError;
use lms_common::models::NewLimitTemplate;
use lms_common::types::Resource;

use crate::synchronizer::{Dispatch, FetchOutcome, Synchronizer};

/// A write against the LMS backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    ApproveKyc {
        application_id: String,
        notes: Option<String>,
    },
    ResolveAlert {
        alert_id: String,
        resolution: String,
    },
    FlagTransaction {
        transaction_id: String,
        reason: String,
    },
    CreateTemplate(NewLimitTemplate),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::ApproveKyc { .. } => "approve_kyc",
            Action::ResolveAlert { .. } => "resolve_alert",
            Action::FlagTransaction { .. } => "flag_transaction",
            Action::CreateTemplate(_) => "create_template",
        }
    }

    /// Resources whose cached data is outdated once the action succeeds.
    ///
    /// Flagging a transaction raises an alert on the backend, so alerts are
    /// refreshed too. Templates do not feed the dashboard.
    pub fn affected(&self) -> &'static [Resource] {
        match self {
            Action::ApproveKyc { .. } => &[Resource::Kyc, Resource::Dashboard],
            Action::ResolveAlert { .. } => &[Resource::Alerts, Resource::Dashboard],
            Action::FlagTransaction { .. } => &[
                Resource::Transactions,
                Resource::Alerts,
                Resource::Dashboard,
            ],
            Action::CreateTemplate(_) => &[Resource::Templates],
        }
    }

    /// Check the inputs before anything is sent.
    pub fn validate(&self) -> Result<(), String> {
        let require = |field: &str, value: &str| {
            if value.trim().is_empty() {
                Err(format!("{field} must not be empty"))
            } else {
                Ok(())
            }
        };

        match self {
            Action::ApproveKyc { application_id, .. } => require("application_id", application_id),
            Action::ResolveAlert {
                alert_id,
                resolution,
            } => {
                require("alert_id", alert_id)?;
                require("resolution", resolution)
            }
            Action::FlagTransaction {
                transaction_id,
                reason,
            } => {
                require("transaction_id", transaction_id)?;
                require("reason", reason)
            }
            Action::CreateTemplate(template) => template.validate(),
        }
    }
}

/// Applies actions against the backend.
#[async_trait]
pub trait Mutator: Send + Sync {
    /// Apply `action`, returning the backend's result payload.
    async fn apply(&self, action: &Action) -> Result<serde_json::Value, FetchError>;

    /// Human-readable name for logs (e.g., "mock-mutator").
    fn name(&self) -> &'static str;
}

/// Result of one applied action and the refreshes it triggered.
#[derive(Debug)]
pub struct ActionReport {
    pub action: &'static str,
    pub result: serde_json::Value,
    pub refreshes: Vec<(Resource, Dispatch)>,
}

impl ActionReport {
    /// Wait for every refresh. `None` marks a refresh that joined an
    /// earlier in-flight fetch.
    pub async fn wait_all(self) -> Vec<(Resource, Option<FetchOutcome>)> {
        let mut outcomes = Vec::with_capacity(self.refreshes.len());
        for (resource, dispatch) in self.refreshes {
            outcomes.push((resource, dispatch.wait().await));
        }
        outcomes
    }
}

#[derive(Clone)]
pub struct ActionRunner {
    sync: Synchronizer,
    mutator: Arc<dyn Mutator>,
    timeout: Duration,
}

impl ActionRunner {
    pub fn new(sync: Synchronizer, mutator: Arc<dyn Mutator>, timeout: Duration) -> Self {
        Self {
            sync,
            mutator,
            timeout,
        }
    }

    /// Apply `action`; on success force-refresh every affected resource.
    ///
    /// A failed or timed-out mutation refreshes nothing.
    pub async fn run(&self, action: &Action) -> Result<ActionReport, FetchError> {
        let name = action.name();
        tracing::info!(action = name, mutator = self.mutator.name(), "Applying action");

        let result = match tokio::time::timeout(self.timeout, self.mutator.apply(action)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(action = name, error = %e, "Action failed");
                return Err(e);
            }
        };

        let refreshes: Vec<_> = action
            .affected()
            .iter()
            .map(|r| (*r, self.sync.force_refresh(*r)))
            .collect();

        tracing::info!(
            action = name,
            refreshed = ?action.affected(),
            "Action applied"
        );

        Ok(ActionReport {
            action: name,
            result,
            refreshes,
        })
    }
}

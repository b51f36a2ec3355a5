//! LMS REST sources: transactions, KYC applications and limit templates.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use lms_common::error::FetchError;
use lms_common::models::{DashboardData, RiskDistribution, SystemStatus};
use lms_common::types::Resource;
use lms_engine::{Action, Fetcher, Mutator};

use crate::actions::ensure_success;
use crate::fixtures;
use crate::latency::SimulatedLatency;

/// Serves the canned REST data after a simulated delay.
pub struct MockRestSource {
    latency: SimulatedLatency,
}

impl MockRestSource {
    pub fn new(latency: SimulatedLatency) -> Self {
        Self { latency }
    }

    /// Resources this source can serve.
    pub const RESOURCES: [Resource; 3] = [Resource::Transactions, Resource::Kyc, Resource::Templates];
}

#[async_trait]
impl Fetcher for MockRestSource {
    async fn fetch(&self, resource: Resource) -> Result<serde_json::Value, FetchError> {
        self.latency.wait().await;
        let now = Utc::now();

        let payload = match resource {
            Resource::Transactions => serde_json::to_value(fixtures::transactions(now)),
            Resource::Kyc => serde_json::to_value(fixtures::kyc_applications(now)),
            Resource::Templates => serde_json::to_value(fixtures::limit_templates(now)),
            other => return Err(FetchError::Unavailable(other.to_string())),
        };

        tracing::debug!(resource = %resource, source = self.name(), "Mock REST response");
        payload.map_err(|e| FetchError::Malformed(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "mock-rest"
    }
}

/// Flat counters returned by `/dashboard-stats/`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DashboardStats {
    active_alerts: u64,
    pending_kyc: u64,
    daily_volume: f64,
    average_risk_score: f64,
    high_risk_transactions: u64,
    medium_risk_transactions: u64,
    low_risk_transactions: u64,
    minimal_risk_transactions: u64,
}

impl From<DashboardStats> for DashboardData {
    fn from(stats: DashboardStats) -> Self {
        DashboardData {
            system_status: SystemStatus {
                active_alerts: stats.active_alerts,
                pending_kyc: stats.pending_kyc,
                daily_volume: stats.daily_volume,
                average_risk_score: stats.average_risk_score,
            },
            risk_distribution: RiskDistribution {
                high: stats.high_risk_transactions,
                medium: stats.medium_risk_transactions,
                low: stats.low_risk_transactions,
                minimal: stats.minimal_risk_transactions,
            },
            ..DashboardData::default()
        }
    }
}

/// Reads resources from a Django-style LMS REST API.
pub struct HttpRestSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRestSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Endpoint path (with default query) for a resource.
    pub fn path(resource: Resource) -> &'static str {
        match resource {
            Resource::Dashboard => "/dashboard-stats/",
            Resource::Transactions => "/transactions/?limit=50",
            Resource::Kyc => "/kyc-applications/?status=UNDER_REVIEW,REQUIRES_ACTION&limit=20",
            Resource::Alerts => "/risk-alerts/?status=ACTIVE,INVESTIGATING&limit=10",
            Resource::Templates => "/limit-templates/",
        }
    }

    pub fn url(&self, resource: Resource) -> String {
        format!("{}{}", self.base_url, Self::path(resource))
    }

    /// Method, URL and body of the request that applies `action`.
    pub fn action_request(&self, action: &Action) -> (reqwest::Method, String, serde_json::Value) {
        let base = &self.base_url;
        match action {
            Action::ApproveKyc {
                application_id,
                notes,
            } => (
                reqwest::Method::POST,
                format!("{base}/kyc-applications/{application_id}/approve/"),
                serde_json::json!({ "notes": notes }),
            ),
            Action::ResolveAlert {
                alert_id,
                resolution,
            } => (
                reqwest::Method::POST,
                format!("{base}/risk-alerts/{alert_id}/resolve/"),
                serde_json::json!({ "resolution": resolution }),
            ),
            Action::FlagTransaction {
                transaction_id,
                reason,
            } => (
                reqwest::Method::PATCH,
                format!("{base}/transactions/{transaction_id}/"),
                serde_json::json!({ "status": "FLAGGED", "reason": reason }),
            ),
            Action::CreateTemplate(template) => (
                reqwest::Method::POST,
                format!("{base}/limit-templates/"),
                serde_json::to_value(template).unwrap_or_default(),
            ),
        }
    }
}

#[async_trait]
impl Fetcher for HttpRestSource {
    async fn fetch(&self, resource: Resource) -> Result<serde_json::Value, FetchError> {
        let url = self.url(resource);
        tracing::debug!(resource = %resource, url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(crate::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        match resource {
            // The stats endpoint is flat; reshape it like the GraphQL aggregate.
            Resource::Dashboard => {
                let stats: DashboardStats = serde_json::from_value(body)
                    .map_err(|e| FetchError::Malformed(e.to_string()))?;
                serde_json::to_value(DashboardData::from(stats))
                    .map_err(|e| FetchError::Malformed(e.to_string()))
            }
            _ => Ok(body),
        }
    }

    fn name(&self) -> &'static str {
        "http-rest"
    }
}

#[async_trait]
impl Mutator for HttpRestSource {
    async fn apply(&self, action: &Action) -> Result<serde_json::Value, FetchError> {
        let (method, url, body) = self.action_request(action);
        tracing::debug!(action = action.name(), method = %method, url = %url, "Mutation");

        let response = self
            .client
            .request(method, &url)
            .json(&body)
            .send()
            .await
            .map_err(crate::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // 204 and other empty replies carry no representation.
        let bytes = response.bytes().await.map_err(crate::transport_error)?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        let payload = serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        ensure_success(payload)
    }

    fn name(&self) -> &'static str {
        "http-rest"
    }
}

//! LMS GraphQL sources: the dashboard aggregate and risk alerts.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use lms_common::error::FetchError;
use lms_common::models::RiskAlertStatus;
use lms_common::types::Resource;
use lms_engine::{Action, Fetcher, Mutator};

use crate::actions::ensure_success;
use crate::fixtures;
use crate::latency::SimulatedLatency;

pub const GET_DASHBOARD_DATA: &str = r#"
query GetDashboardData {
  systemStatus { activeAlerts pendingKyc dailyVolume averageRiskScore }
  riskDistribution { high medium low minimal }
  recentTransactions(limit: 5) {
    id timestamp user { id name email kycLevel } type asset amount value status riskScore
  }
  criticalAlerts(severity: "CRITICAL") {
    id type severity title description timestamp status riskScore
  }
  kycQueue(limit: 3) { id user { name email } status verification { score } }
}
"#;

pub const GET_RISK_ALERTS: &str = r#"
query GetRiskAlerts($filters: AlertFilters) {
  riskAlerts(filters: $filters) {
    id type severity title description timestamp status
    relatedEntities { user { id name } transaction { id } }
    riskScore
    assignee { id name }
    resolution { notes resolvedAt }
  }
}
"#;

pub const APPROVE_KYC: &str = r#"
mutation ApproveKyc($applicationId: ID!, $notes: String) {
  approveKyc(applicationId: $applicationId, notes: $notes) {
    success
    application { id status verification { score } }
    errors
  }
}
"#;

pub const RESOLVE_ALERT: &str = r#"
mutation ResolveAlert($alertId: ID!, $resolution: String!) {
  resolveAlert(alertId: $alertId, resolution: $resolution) {
    success
    alert { id status resolution { notes resolvedAt } }
    errors
  }
}
"#;

pub const FLAG_TRANSACTION: &str = r#"
mutation FlagTransaction($transactionId: ID!, $reason: String!) {
  flagTransaction(transactionId: $transactionId, reason: $reason) {
    success
    transaction { id status flags }
    alert { id title severity }
    errors
  }
}
"#;

/// Serves the canned GraphQL data after a simulated delay.
pub struct MockGraphQlSource {
    latency: SimulatedLatency,
}

impl MockGraphQlSource {
    pub fn new(latency: SimulatedLatency) -> Self {
        Self { latency }
    }

    pub const RESOURCES: [Resource; 2] = [Resource::Dashboard, Resource::Alerts];
}

#[async_trait]
impl Fetcher for MockGraphQlSource {
    async fn fetch(&self, resource: Resource) -> Result<serde_json::Value, FetchError> {
        self.latency.wait().await;
        let now = Utc::now();

        let payload = match resource {
            Resource::Dashboard => serde_json::to_value(fixtures::dashboard(now)),
            Resource::Alerts => {
                let open: Vec<_> = fixtures::risk_alerts(now)
                    .into_iter()
                    .filter(|a| {
                        matches!(
                            a.status,
                            RiskAlertStatus::Active | RiskAlertStatus::Investigating
                        )
                    })
                    .take(10)
                    .collect();
                serde_json::to_value(open)
            }
            other => return Err(FetchError::Unavailable(other.to_string())),
        };

        tracing::debug!(resource = %resource, source = self.name(), "Mock GraphQL response");
        payload.map_err(|e| FetchError::Malformed(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "mock-graphql"
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

/// Posts named queries to an LMS GraphQL endpoint.
pub struct HttpGraphQlSource {
    client: reqwest::Client,
    url: String,
}

impl HttpGraphQlSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Request body for a resource, and the `data` field holding its payload
    /// (`None` for the whole `data` object).
    pub fn request(resource: Resource) -> Result<(serde_json::Value, Option<&'static str>), FetchError> {
        match resource {
            Resource::Dashboard => Ok((serde_json::json!({ "query": GET_DASHBOARD_DATA }), None)),
            Resource::Alerts => Ok((
                serde_json::json!({
                    "query": GET_RISK_ALERTS,
                    "variables": { "filters": { "status": "ACTIVE,INVESTIGATING", "limit": 10 } }
                }),
                Some("riskAlerts"),
            )),
            other => Err(FetchError::Unavailable(other.to_string())),
        }
    }

    /// Request body for an action, and the `data` field holding its result.
    /// The GraphQL schema has no template mutation.
    pub fn mutation_request(action: &Action) -> Result<(serde_json::Value, &'static str), FetchError> {
        match action {
            Action::ApproveKyc {
                application_id,
                notes,
            } => Ok((
                serde_json::json!({
                    "query": APPROVE_KYC,
                    "variables": { "applicationId": application_id, "notes": notes }
                }),
                "approveKyc",
            )),
            Action::ResolveAlert {
                alert_id,
                resolution,
            } => Ok((
                serde_json::json!({
                    "query": RESOLVE_ALERT,
                    "variables": { "alertId": alert_id, "resolution": resolution }
                }),
                "resolveAlert",
            )),
            Action::FlagTransaction {
                transaction_id,
                reason,
            } => Ok((
                serde_json::json!({
                    "query": FLAG_TRANSACTION,
                    "variables": { "transactionId": transaction_id, "reason": reason }
                }),
                "flagTransaction",
            )),
            Action::CreateTemplate(_) => Err(FetchError::Unavailable(action.name().to_string())),
        }
    }

    async fn post(&self, body: &serde_json::Value) -> Result<serde_json::Value, FetchError> {
        let response = self
            .client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(crate::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }

    /// Pull the payload out of a GraphQL response body.
    pub fn extract(body: serde_json::Value, field: Option<&str>) -> Result<serde_json::Value, FetchError> {
        let response: GraphQlResponse =
            serde_json::from_value(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

        if let Some(error) = response.errors.first() {
            return Err(FetchError::Malformed(format!("graphql error: {}", error.message)));
        }

        let data = response
            .data
            .ok_or_else(|| FetchError::Malformed("response has no data".to_string()))?;

        match field {
            None => Ok(data),
            Some(name) => data
                .get(name)
                .cloned()
                .ok_or_else(|| FetchError::Malformed(format!("missing field '{}'", name))),
        }
    }
}

#[async_trait]
impl Fetcher for HttpGraphQlSource {
    async fn fetch(&self, resource: Resource) -> Result<serde_json::Value, FetchError> {
        let (body, field) = Self::request(resource)?;
        tracing::debug!(resource = %resource, url = %self.url, "POST graphql");

        let body = self.post(&body).await?;
        Self::extract(body, field)
    }

    fn name(&self) -> &'static str {
        "http-graphql"
    }
}

#[async_trait]
impl Mutator for HttpGraphQlSource {
    async fn apply(&self, action: &Action) -> Result<serde_json::Value, FetchError> {
        let (body, field) = Self::mutation_request(action)?;
        tracing::debug!(action = action.name(), url = %self.url, "POST graphql mutation");

        let body = self.post(&body).await?;
        ensure_success(Self::extract(body, Some(field))?)
    }

    fn name(&self) -> &'static str {
        "http-graphql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_dashboard() {
        let source = MockGraphQlSource::new(SimulatedLatency::none());
        let data = source.fetch(Resource::Dashboard).await.unwrap();
        assert_eq!(data["system_status"]["pending_kyc"], 8);
        assert_eq!(data["risk_distribution"]["minimal"], 89);
    }

    #[tokio::test]
    async fn test_mock_alerts_are_open() {
        let source = MockGraphQlSource::new(SimulatedLatency::none());
        let alerts = source.fetch(Resource::Alerts).await.unwrap();
        let alerts = alerts.as_array().unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a["status"] == "ACTIVE"));
    }

    #[tokio::test]
    async fn test_mock_rejects_rest_resources() {
        let source = MockGraphQlSource::new(SimulatedLatency::none());
        assert!(source.fetch(Resource::Kyc).await.is_err());
    }

    #[test]
    fn test_extract_field() {
        let body = serde_json::json!({ "data": { "riskAlerts": [{ "id": "a1" }] } });
        let alerts = HttpGraphQlSource::extract(body, Some("riskAlerts")).unwrap();
        assert_eq!(alerts, serde_json::json!([{ "id": "a1" }]));
    }

    #[test]
    fn test_extract_errors() {
        let body = serde_json::json!({ "errors": [{ "message": "boom" }] });
        assert_eq!(
            HttpGraphQlSource::extract(body, None),
            Err(FetchError::Malformed("graphql error: boom".to_string()))
        );

        let body = serde_json::json!({ "data": {} });
        assert!(HttpGraphQlSource::extract(body, Some("riskAlerts")).is_err());

        assert!(HttpGraphQlSource::extract(serde_json::json!({}), None).is_err());
    }

    #[test]
    fn test_mutation_request() {
        let action = Action::ResolveAlert {
            alert_id: "alert_001".to_string(),
            resolution: "false positive".to_string(),
        };
        let (body, field) = HttpGraphQlSource::mutation_request(&action).unwrap();
        assert!(body["query"].as_str().unwrap().contains("mutation ResolveAlert"));
        assert_eq!(body["variables"]["alertId"], "alert_001");
        assert_eq!(field, "resolveAlert");

        let template = Action::CreateTemplate(lms_common::models::NewLimitTemplate {
            name: "Basic".to_string(),
            description: String::new(),
            user_level: lms_common::models::KycLevel::Level1,
            daily_withdrawal_limit: 1_000.0,
            monthly_withdrawal_limit: 10_000.0,
            single_transaction_limit: 500.0,
            daily_deposit_limit: 5_000.0,
            monthly_deposit_limit: 50_000.0,
        });
        assert_eq!(
            HttpGraphQlSource::mutation_request(&template),
            Err(FetchError::Unavailable("create_template".to_string()))
        );
    }

    #[test]
    fn test_request_names_query() {
        let (body, field) = HttpGraphQlSource::request(Resource::Alerts).unwrap();
        assert!(body["query"].as_str().unwrap().contains("GetRiskAlerts"));
        assert_eq!(field, Some("riskAlerts"));
        assert!(HttpGraphQlSource::request(Resource::Templates).is_err());
    }
}

//! Mock LMS mutations and the shared result check for real backends.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use lms_common::error::FetchError;
use lms_engine::{Action, Mutator};

use crate::fixtures;
use crate::latency::SimulatedLatency;

/// Accepts actions on the fixture entities after a simulated delay.
///
/// The fixtures themselves are not changed, so a refresh after an action
/// returns the same data as before.
pub struct MockMutator {
    latency: SimulatedLatency,
}

impl MockMutator {
    pub fn new(latency: SimulatedLatency) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Mutator for MockMutator {
    async fn apply(&self, action: &Action) -> Result<serde_json::Value, FetchError> {
        self.latency.wait().await;
        let now = Utc::now();

        let result = match action {
            Action::ApproveKyc { application_id, .. } => {
                let known = fixtures::kyc_applications(now)
                    .results
                    .iter()
                    .any(|a| &a.id == application_id);
                if !known {
                    return Err(FetchError::Rejected(format!(
                        "kyc application {application_id} not found"
                    )));
                }
                json!({
                    "success": true,
                    "application": { "id": application_id, "status": "APPROVED" }
                })
            }
            Action::ResolveAlert {
                alert_id,
                resolution,
            } => {
                if !fixtures::risk_alerts(now).iter().any(|a| &a.id == alert_id) {
                    return Err(FetchError::Rejected(format!("alert {alert_id} not found")));
                }
                json!({
                    "success": true,
                    "alert": {
                        "id": alert_id,
                        "status": "RESOLVED",
                        "resolution": { "notes": resolution, "resolvedAt": now }
                    }
                })
            }
            Action::FlagTransaction {
                transaction_id,
                reason,
            } => {
                let known = fixtures::transactions(now)
                    .results
                    .iter()
                    .any(|t| &t.id == transaction_id);
                if !known {
                    return Err(FetchError::Rejected(format!(
                        "transaction {transaction_id} not found"
                    )));
                }
                json!({
                    "success": true,
                    "transaction": {
                        "id": transaction_id,
                        "status": "FLAGGED",
                        "flags": ["MANUALLY_FLAGGED", "OFFICER_REVIEW"]
                    },
                    "alert": {
                        "id": format!("alert_{}", now.timestamp_millis()),
                        "title": "Transaction Flagged for Review",
                        "description": reason,
                        "severity": "HIGH"
                    }
                })
            }
            Action::CreateTemplate(input) => {
                let id = format!("template_{}", now.timestamp_millis());
                let template = input.clone().into_template(id, now);
                serde_json::to_value(template).map_err(|e| FetchError::Malformed(e.to_string()))?
            }
        };

        tracing::debug!(action = action.name(), mutator = self.name(), "Mock mutation applied");
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "mock-mutator"
    }
}

/// Fail on a mutation payload of the form `{"success": false, "errors": [...]}`.
///
/// Payloads without a `success` field are plain resource representations
/// and pass through.
pub(crate) fn ensure_success(payload: serde_json::Value) -> Result<serde_json::Value, FetchError> {
    if payload.get("success").and_then(|v| v.as_bool()) != Some(false) {
        return Ok(payload);
    }

    let errors: Vec<&str> = payload
        .get("errors")
        .and_then(|v| v.as_array())
        .map(|list| list.iter().filter_map(|e| e.as_str()).collect())
        .unwrap_or_default();

    let message = if errors.is_empty() {
        "backend reported failure".to_string()
    } else {
        errors.join("; ")
    };
    Err(FetchError::Rejected(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_common::models::{KycLevel, NewLimitTemplate};

    fn mock() -> MockMutator {
        MockMutator::new(SimulatedLatency::none())
    }

    #[tokio::test]
    async fn test_flag_known_transaction() {
        let action = Action::FlagTransaction {
            transaction_id: "txn_002".to_string(),
            reason: "velocity".to_string(),
        };
        let result = mock().apply(&action).await.unwrap();
        assert_eq!(result["transaction"]["status"], "FLAGGED");
        assert_eq!(result["alert"]["severity"], "HIGH");
    }

    #[tokio::test]
    async fn test_unknown_entities_rejected() {
        let approve = Action::ApproveKyc {
            application_id: "kyc_999".to_string(),
            notes: None,
        };
        assert_eq!(
            mock().apply(&approve).await,
            Err(FetchError::Rejected("kyc application kyc_999 not found".to_string()))
        );

        let resolve = Action::ResolveAlert {
            alert_id: "alert_404".to_string(),
            resolution: "n/a".to_string(),
        };
        assert!(matches!(
            mock().apply(&resolve).await,
            Err(FetchError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_create_template_assigns_id() {
        let action = Action::CreateTemplate(NewLimitTemplate {
            name: "Institutional".to_string(),
            description: "High limits".to_string(),
            user_level: KycLevel::Level3,
            daily_withdrawal_limit: 100_000.0,
            monthly_withdrawal_limit: 1_000_000.0,
            single_transaction_limit: 50_000.0,
            daily_deposit_limit: 500_000.0,
            monthly_deposit_limit: 5_000_000.0,
        });
        let result = mock().apply(&action).await.unwrap();
        assert!(result["id"].as_str().unwrap().starts_with("template_"));
        assert_eq!(result["is_active"], true);
        assert_eq!(result["user_level"], "LEVEL_3");
    }

    #[test]
    fn test_ensure_success() {
        let ok = json!({ "success": true, "alert": { "id": "a1" } });
        assert_eq!(ensure_success(ok.clone()), Ok(ok));

        let plain = json!({ "id": "kyc_001", "status": "APPROVED" });
        assert!(ensure_success(plain).is_ok());

        let failed = json!({ "success": false, "errors": ["already resolved", "locked"] });
        assert_eq!(
            ensure_success(failed),
            Err(FetchError::Rejected("already resolved; locked".to_string()))
        );

        let bare = json!({ "success": false });
        assert_eq!(
            ensure_success(bare),
            Err(FetchError::Rejected("backend reported failure".to_string()))
        );
    }
}

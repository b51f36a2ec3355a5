//! Typed LMS payloads.
//!
//! The synchronizer treats resource data as opaque JSON. These models are used
//! by the data sources that produce it and by the read-side helpers (risk
//! analysis, transaction filtering) that consume it. Field names follow the
//! LMS REST payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Paginated list envelope returned by the LMS REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// A single page holding every result.
    pub fn complete(count: u64, results: Vec<T>) -> Self {
        Self {
            count,
            next: None,
            previous: None,
            results,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Trade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Flagged,
    Rejected,
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "COMPLETED" => Ok(TransactionStatus::Completed),
            "PENDING" => Ok(TransactionStatus::Pending),
            "FLAGGED" => Ok(TransactionStatus::Flagged),
            "REJECTED" => Ok(TransactionStatus::Rejected),
            other => Err(format!("unknown transaction status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KycLevel {
    #[serde(rename = "UNVERIFIED")]
    Unverified,
    #[serde(rename = "LEVEL_1")]
    Level1,
    #[serde(rename = "LEVEL_2")]
    Level2,
    #[serde(rename = "LEVEL_3")]
    Level3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub asset: String,
    pub amount: f64,
    pub value: f64,
    pub from_address: String,
    pub to_address: String,
    pub status: TransactionStatus,
    pub risk_score: u8,
    pub location: String,
    pub kyc_level: KycLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    UnderReview,
    RequiresAction,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Uploaded,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycDocument {
    pub id: String,
    pub filename: String,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: DocumentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycApplication {
    pub id: String,
    pub user: String,
    pub email: String,
    pub user_id: String,
    pub current_level: KycLevel,
    pub requested_level: KycLevel,
    pub submitted_at: DateTime<Utc>,
    pub status: KycStatus,
    pub documents: Vec<KycDocument>,
    pub reviewer_id: Option<String>,
    pub score: u8,
    pub risk_factors: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskAlertType {
    HighRiskTransaction,
    PatternMatch,
    KycVerification,
    ComplianceViolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskAlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskAlertStatus {
    Active,
    Investigating,
    Resolved,
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: RiskAlertType,
    pub severity: RiskAlertSeverity,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub status: RiskAlertStatus,
    pub user_id: Option<String>,
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub risk_score: u8,
    pub assigned_to: Option<String>,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub daily_withdrawal_limit: f64,
    pub monthly_withdrawal_limit: f64,
    pub single_transaction_limit: f64,
    pub daily_deposit_limit: f64,
    pub monthly_deposit_limit: f64,
    pub is_active: bool,
    pub user_level: KycLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a new limit template. Limits default to zero when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLimitTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub user_level: KycLevel,
    #[serde(default)]
    pub daily_withdrawal_limit: f64,
    #[serde(default)]
    pub monthly_withdrawal_limit: f64,
    #[serde(default)]
    pub single_transaction_limit: f64,
    #[serde(default)]
    pub daily_deposit_limit: f64,
    #[serde(default)]
    pub monthly_deposit_limit: f64,
}

impl NewLimitTemplate {
    /// Reject an empty name or a negative / non-finite limit.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("template name must not be empty".to_string());
        }

        let limits = [
            ("daily_withdrawal_limit", self.daily_withdrawal_limit),
            ("monthly_withdrawal_limit", self.monthly_withdrawal_limit),
            ("single_transaction_limit", self.single_transaction_limit),
            ("daily_deposit_limit", self.daily_deposit_limit),
            ("monthly_deposit_limit", self.monthly_deposit_limit),
        ];
        match limits.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            Some((field, value)) => Err(format!("{field} must be a non-negative number (got {value})")),
            None => Ok(()),
        }
    }

    /// The stored template, as the backend would return it.
    pub fn into_template(self, id: String, now: DateTime<Utc>) -> LimitTemplate {
        LimitTemplate {
            id,
            name: self.name,
            description: self.description,
            daily_withdrawal_limit: self.daily_withdrawal_limit,
            monthly_withdrawal_limit: self.monthly_withdrawal_limit,
            single_transaction_limit: self.single_transaction_limit,
            daily_deposit_limit: self.daily_deposit_limit,
            monthly_deposit_limit: self.monthly_deposit_limit,
            is_active: true,
            user_level: self.user_level,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Headline counters on the compliance dashboard.
///
/// Every field defaults to zero so a partial payload still deserializes.
/// The GraphQL camelCase names are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStatus {
    #[serde(alias = "activeAlerts")]
    pub active_alerts: u64,
    #[serde(alias = "pendingKyc")]
    pub pending_kyc: u64,
    #[serde(alias = "dailyVolume")]
    pub daily_volume: f64,
    #[serde(alias = "averageRiskScore")]
    pub average_risk_score: f64,
}

/// Transaction counts per risk bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskDistribution {
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub minimal: u64,
}

impl RiskDistribution {
    /// Sum of all buckets. Saturates instead of overflowing on absurd counts.
    pub fn total(&self) -> u64 {
        self.high
            .saturating_add(self.medium)
            .saturating_add(self.low)
            .saturating_add(self.minimal)
    }
}

/// Aggregate dashboard payload. Depends on every other resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardData {
    #[serde(alias = "systemStatus")]
    pub system_status: SystemStatus,
    #[serde(alias = "riskDistribution")]
    pub risk_distribution: RiskDistribution,
    #[serde(alias = "recentTransactions")]
    pub recent_transactions: Vec<Transaction>,
    #[serde(alias = "criticalAlerts")]
    pub critical_alerts: Vec<RiskAlert>,
    #[serde(alias = "kycQueue")]
    pub kyc_queue: Vec<KycApplication>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kyc_level_wire_names() {
        assert_eq!(serde_json::to_string(&KycLevel::Level2).unwrap(), "\"LEVEL_2\"");
        let lvl: KycLevel = serde_json::from_str("\"UNVERIFIED\"").unwrap();
        assert_eq!(lvl, KycLevel::Unverified);
    }

    #[test]
    fn test_transaction_status_parse() {
        assert_eq!(
            "flagged".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Flagged
        );
        assert!("lost".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn test_dashboard_partial_payload_defaults() {
        let data: DashboardData = serde_json::from_value(serde_json::json!({
            "system_status": { "active_alerts": 3 }
        }))
        .unwrap();
        assert_eq!(data.system_status.active_alerts, 3);
        assert_eq!(data.system_status.pending_kyc, 0);
        assert_eq!(data.risk_distribution.total(), 0);
        assert!(data.recent_transactions.is_empty());
    }

    #[test]
    fn test_risk_total_saturates() {
        let dist = RiskDistribution {
            high: u64::MAX,
            medium: 1,
            low: 0,
            minimal: 7,
        };
        assert_eq!(dist.total(), u64::MAX);
    }

    #[test]
    fn test_new_template_defaults_and_validation() {
        let input: NewLimitTemplate = serde_json::from_value(serde_json::json!({
            "name": "Premium",
            "user_level": "LEVEL_3",
            "daily_withdrawal_limit": 25000.0
        }))
        .unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.monthly_deposit_limit, 0.0);

        let template = input.clone().into_template("template_9".to_string(), Utc::now());
        assert!(template.is_active);
        assert_eq!(template.user_level, KycLevel::Level3);

        let unnamed = NewLimitTemplate {
            name: "  ".to_string(),
            ..input.clone()
        };
        assert!(unnamed.validate().is_err());

        let negative = NewLimitTemplate {
            daily_deposit_limit: -1.0,
            ..input
        };
        assert!(negative.validate().unwrap_err().contains("daily_deposit_limit"));
    }

    #[test]
    fn test_transaction_type_field_renamed() {
        let json = serde_json::json!({
            "id": "txn_001",
            "timestamp": "2024-05-01T12:00:00Z",
            "user": "John Doe",
            "user_id": "user_123",
            "type": "DEPOSIT",
            "asset": "BTC",
            "amount": 2.5,
            "value": 107619.75,
            "from_address": "a",
            "to_address": "b",
            "status": "COMPLETED",
            "risk_score": 15,
            "location": "New York, US",
            "kyc_level": "LEVEL_3",
            "created_at": "2024-05-01T12:00:00Z",
            "updated_at": "2024-05-01T12:00:00Z"
        });
        let tx: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(tx.tx_type, TransactionType::Deposit);
        assert!(tx.flags.is_empty());
    }
}
